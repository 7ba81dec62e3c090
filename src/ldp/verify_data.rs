// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde_json::{json, Map, Value};

use super::{
    jws::Jws,
    proof::{Proof, SignatureRepresentation},
};
use crate::{
    errors::Error,
    processor::{context::SECURITY_V2_URL, context::SECURITY_JWS_V1_URL, ProcessorOptions},
    suites::SignatureSuite,
};

const CONTEXT: &str = "@context";
const PROOF: &str = "proof";
/// Dropped from proof options before canonicalization.
const VOLATILE_PROOF_FIELDS: [&str; 4] = ["id", "proofValue", "jws", "nonce"];

/// # Description
/// Builds the bytes signed (and verified) for `doc` under `proof`.
///
/// With a `proofValue` proof the result is the canonical proof options
/// followed by the canonical document. With a detached JWS proof the JWS
/// header and a `.` come first.
///
/// # Inputs:
/// * `suite` (REQUIRED), the suite providing canonicalization and digest.
/// * `doc` (REQUIRED), the JSON-LD document, its `proof` member is ignored.
/// * `proof` (REQUIRED), the proof options. `created` must be set.
/// * `options` (REQUIRED), processor options.
///
/// # Output:
/// the verify data or [`Error`].
pub fn create_verify_data(
    suite: &dyn SignatureSuite,
    doc: &Value,
    proof: &Proof,
    options: &ProcessorOptions,
) -> Result<Vec<u8>, Error> {
    if proof.created.as_deref().map_or(true, str::is_empty) {
        return Err(Error::MissingField("created".to_owned()));
    }
    let doc = as_object(doc)?;

    match proof.representation() {
        SignatureRepresentation::ProofValue => {
            let proof_options = canonical_proof_options(suite, doc, proof, options)?;
            let document = suite.canonicalize(&Value::Object(without_proof(doc)), options)?;
            Ok([suite.digest(&proof_options), suite.digest(&document)].concat())
        }
        SignatureRepresentation::Jws => {
            let jws = proof.jws.as_deref().ok_or_else(|| Error::MissingField("jws".to_owned()))?;
            let header = Jws::parse(jws)?.header;

            let mut proof_options = proof_map(proof)?;
            proof_options.insert(CONTEXT.to_owned(), json!([SECURITY_V2_URL, SECURITY_JWS_V1_URL]));
            proof_options.remove("jws");
            proof_options.remove("proofValue");
            let proof_options = suite.canonicalize(&Value::Object(proof_options), options)?;

            let mut document = Value::Object(without_proof(doc));
            if suite.compact_proof() {
                document = compact_with_security_context(suite, &document, options)?;
            }
            let document = suite.canonicalize(&document, options)?;

            let mut data = format!("{}.", header).into_bytes();
            data.extend(suite.digest(&proof_options));
            data.extend(suite.digest(&document));
            Ok(data)
        }
    }
}

/// Canonical form of `proof` with its volatile fields removed. A proof
/// without `@context` borrows the one of `doc`.
pub(crate) fn canonical_proof_options(
    suite: &dyn SignatureSuite,
    doc: &Map<String, Value>,
    proof: &Proof,
    options: &ProcessorOptions,
) -> Result<Vec<u8>, Error> {
    let mut proof_options = proof_map(proof)?;
    if !proof_options.contains_key(CONTEXT) {
        if let Some(context) = doc.get(CONTEXT) {
            proof_options.insert(CONTEXT.to_owned(), context.clone());
        }
    }
    for field in VOLATILE_PROOF_FIELDS {
        proof_options.remove(field);
    }

    let mut proof_options = Value::Object(proof_options);
    if suite.compact_proof() {
        proof_options = compact_with_security_context(suite, &proof_options, options)?;
    }
    suite.canonicalize(&proof_options, options)
}

/// Shallow copy of `doc` without its `proof` member.
pub(crate) fn without_proof(doc: &Map<String, Value>) -> Map<String, Value> {
    doc.iter()
        .filter(|(key, _)| key.as_str() != PROOF)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub(crate) fn as_object(doc: &Value) -> Result<&Map<String, Value>, Error> {
    doc.as_object()
        .ok_or_else(|| Error::InvalidInput("JSON-LD document must be an object".to_owned()))
}

pub(crate) fn compact_with_security_context(
    suite: &dyn SignatureSuite,
    doc: &Value,
    options: &ProcessorOptions,
) -> Result<Value, Error> {
    suite.processor().compact(doc, &json!(SECURITY_V2_URL), options)
}

fn proof_map(proof: &Proof) -> Result<Map<String, Value>, Error> {
    match proof.to_value()? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidInput("proof must serialize to an object".to_owned())),
    }
}
