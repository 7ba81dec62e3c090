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

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};

use super::Credential;
use crate::{
    errors::Error,
    ldp::{
        statements::{split_statements, transform_to_blank_node},
        verify_data::{canonical_proof_options, compact_with_security_context, without_proof},
        Proof, SignatureRepresentation,
    },
    processor::ProcessorOptions,
    resolver::PublicKeyResolver,
    suites::{BbsBlsSignature2020, BbsBlsSignatureProof2020, SignatureSuite, SuiteRegistry},
};

/// Canonical statements of a credential and the positions of the statements
/// that survive framing with a reveal document.
#[derive(Clone, Debug)]
pub struct DocVerificationData {
    pub reveal_indexes: Vec<usize>,
    pub reveal_document: Value,
    pub document_statements: Vec<String>,
}

/// Messages fed to proof derivation for one source proof: proof statements
/// first, then document statements.
#[derive(Clone, Debug)]
pub struct VerificationData {
    pub messages: Vec<String>,
    pub reveal_indexes: Vec<usize>,
}

impl Credential {
    /// # Description
    /// Derives a credential revealing only what `reveal` frames out of this
    /// one. Every `BbsBlsSignature2020` proof becomes a
    /// `BbsBlsSignatureProof2020` proof bound to `nonce`.
    ///
    /// # Inputs:
    /// * `registry` (REQUIRED), must hold a suite able to derive proofs.
    /// * `reveal` (REQUIRED), a JSON-LD frame with its own `@context`.
    /// * `resolver` (REQUIRED), resolves the signer public key.
    /// * `nonce` (REQUIRED), presentation nonce.
    /// * `options` (REQUIRED), processor options.
    ///
    /// # Output:
    /// the derived [`Credential`] or [`Error`].
    pub fn generate_bbs_selective_disclosure(
        &self,
        registry: &SuiteRegistry,
        reveal: &Value,
        resolver: &dyn PublicKeyResolver,
        nonce: &[u8],
        options: &ProcessorOptions,
    ) -> Result<Credential, Error> {
        if reveal.as_object().map_or(true, Map::is_empty) {
            return Err(Error::InvalidInput("no reveal document".to_owned()));
        }
        if self.proofs().is_empty() {
            return Err(Error::MissingProof);
        }
        let source_proofs: Vec<&Proof> = self
            .proofs()
            .iter()
            .filter(|p| p.proof_type.ends_with(BbsBlsSignature2020::ALG))
            .collect();
        if source_proofs.is_empty() {
            return Err(Error::NoApplicableProof(format!("no {} proof present", BbsBlsSignature2020::ALG)));
        }

        let suite = registry.get(BbsBlsSignatureProof2020::ALG)?;
        let deriver = registry.proof_derivable(BbsBlsSignatureProof2020::ALG)?;

        let doc = self.to_value()?;
        let doc = match doc.as_object() {
            Some(doc) => Value::Object(without_proof(doc)),
            None => return Err(Error::InvalidInput("credential must serialize to an object".to_owned())),
        };
        let compacted = compact_with_security_context(suite, &doc, options)?;
        let doc_data = build_doc_verification_data(suite, &compacted, reveal, options)?;
        log::debug!(
            "revealing {} of {} statements",
            doc_data.reveal_indexes.len(),
            doc_data.document_statements.len()
        );

        let mut derived_proofs = Vec::with_capacity(source_proofs.len());
        for source in source_proofs {
            if source.representation() != SignatureRepresentation::ProofValue {
                return Err(Error::UnsupportedRepresentation(
                    "selective disclosure needs a proofValue signature".to_owned(),
                ));
            }
            let data = build_verification_data(suite, &compacted, source, &doc_data, options)?;

            let key = resolver.resolve(source.public_key_id()?)?;
            let signature = source.signature_bytes()?;
            let proof_bytes = deriver.derive_proof(
                &data.messages,
                &signature,
                nonce,
                key.bytes_for(source.representation()),
                &data.reveal_indexes,
            )?;
            derived_proofs.push(derived_proof(source, nonce, &proof_bytes).to_value()?);
        }

        let mut revealed = doc_data.reveal_document;
        match revealed.as_object_mut() {
            Some(map) => {
                map.insert("proof".to_owned(), Value::Array(derived_proofs));
            }
            None => return Err(Error::InvalidInput("framed document is not an object".to_owned())),
        }
        Credential::from_value(revealed)
    }
}

/// Frames `compacted` with `reveal` and locates every statement of the
/// result among the statements of `compacted`.
pub fn build_doc_verification_data(
    suite: &dyn SignatureSuite,
    compacted: &Value,
    reveal: &Value,
    options: &ProcessorOptions,
) -> Result<DocVerificationData, Error> {
    let document_statements = split_statements(&suite.canonicalize(compacted, options)?, false);
    let positions: HashMap<String, usize> = document_statements
        .iter()
        .enumerate()
        .map(|(i, statement)| (transform_to_blank_node(statement), i))
        .collect();

    let frame_options = options.with_frame_blank_nodes(true);
    let reveal_document = suite.processor().frame(compacted, reveal, &frame_options)?;
    let reveal_statements = split_statements(&suite.canonicalize(&reveal_document, options)?, false);

    let reveal_indexes = reveal_statements
        .iter()
        .map(|statement| {
            positions.get(statement).copied().ok_or_else(|| {
                Error::InvalidInput(format!("revealed statement not found in the document: {}", statement))
            })
        })
        .collect::<Result<Vec<usize>, Error>>()?;

    Ok(DocVerificationData { reveal_indexes, reveal_document, document_statements })
}

/// Prepends the statements of `source` to the document statements and
/// shifts the reveal indexes past them. Proof statements are always revealed.
pub fn build_verification_data(
    suite: &dyn SignatureSuite,
    compacted: &Value,
    source: &Proof,
    doc_data: &DocVerificationData,
    options: &ProcessorOptions,
) -> Result<VerificationData, Error> {
    let compacted = compacted
        .as_object()
        .ok_or_else(|| Error::InvalidInput("compacted document is not an object".to_owned()))?;
    let proof_statements = split_statements(&canonical_proof_options(suite, compacted, source, options)?, false);
    let offset = proof_statements.len();

    let reveal_indexes = (0..offset)
        .chain(doc_data.reveal_indexes.iter().map(|i| i + offset))
        .collect();
    let mut messages = proof_statements;
    messages.extend(doc_data.document_statements.iter().cloned());
    Ok(VerificationData { messages, reveal_indexes })
}

fn derived_proof(source: &Proof, nonce: &[u8], proof_bytes: &[u8]) -> Proof {
    let mut proof = Proof {
        proof_type: BbsBlsSignatureProof2020::ALG.to_owned(),
        created: source.created.clone(),
        creator: source.creator.clone(),
        verification_method: source.verification_method.clone(),
        proof_purpose: source.proof_purpose.clone(),
        domain: source.domain.clone(),
        challenge: source.challenge.clone(),
        capability_chain: source.capability_chain.clone(),
        proof_value: Some(STANDARD.encode(proof_bytes)),
        ..Default::default()
    };
    proof.set_nonce(nonce);
    proof
}
