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

use serde_json::Value;

use super::{bbs_bls_signature_2020::sign_statements, LdpCiphersuite, ProofDerivable, SignatureSuite};
use crate::{
    bbsplus::{
        keys::{BBSplusPublicKey, BBSplusSecretKey},
        proof::BBSplusPoKSignature,
        signature::BBSplusSignature,
    },
    errors::Error,
    ldp::statements::{split_statements, to_messages},
    processor::{JsonLdProcessor, Processor, ProcessorOptions},
};

const SIGNATURE_TYPE: &str = "BbsBlsSignature2020";

/// `BbsBlsSignatureProof2020`: derives and verifies selective disclosure
/// proofs of a `BbsBlsSignature2020` signature.
#[derive(Clone, Debug, Default)]
pub struct BbsBlsSignatureProof2020 {
    private_key: Option<BBSplusSecretKey>,
    compact_proof: bool,
    processor: JsonLdProcessor,
}

impl BbsBlsSignatureProof2020 {
    pub const ALG: &'static str = "BbsBlsSignatureProof2020";

    pub fn new(private_key: Option<BBSplusSecretKey>, compact_proof: bool) -> Self {
        Self { private_key, compact_proof, processor: JsonLdProcessor::default() }
    }

    pub fn with_processor(mut self, processor: JsonLdProcessor) -> Self {
        self.processor = processor;
        self
    }
}

impl SignatureSuite for BbsBlsSignatureProof2020 {
    fn alg(&self) -> &str {
        Self::ALG
    }

    fn compact_proof(&self) -> bool {
        self.compact_proof
    }

    fn processor(&self) -> &dyn Processor {
        &self.processor
    }

    /// A derived proof is checked against the statements of the original
    /// signature, so its type is canonicalized as the signature type.
    fn canonicalize(&self, doc: &Value, options: &ProcessorOptions) -> Result<Vec<u8>, Error> {
        let derived_type = doc.get("type").and_then(Value::as_str).filter(|t| t.ends_with(Self::ALG));
        match derived_type {
            Some(derived_type) => {
                let mut doc = doc.clone();
                doc["type"] = Value::String(derived_type.replacen(Self::ALG, SIGNATURE_TYPE, 1));
                self.processor.canonicalize(&doc, options)
            }
            None => self.processor.canonicalize(doc, options),
        }
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let sk = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::MissingField("private key".to_owned()))?;
        sign_statements(sk, data)
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8], nonce: Option<&[u8]>) -> Result<(), Error> {
        let pk = BBSplusPublicKey::from_bytes(public_key)?;
        let proof = BBSplusPoKSignature::from_bytes(signature)?;
        let statements = split_statements(data, true);
        log::debug!(
            "verifying proof disclosing {} of {} statements",
            statements.len(),
            proof.message_count()
        );
        proof
            .proof_verify::<LdpCiphersuite, _>(&pk, &to_messages(&statements), nonce)
            .map_err(|e| Error::SignatureMismatch(e.to_string()))
    }

    fn as_proof_derivable(&self) -> Option<&dyn ProofDerivable> {
        Some(self)
    }
}

impl ProofDerivable for BbsBlsSignatureProof2020 {
    fn derive_proof(
        &self,
        messages: &[String],
        signature: &[u8],
        nonce: &[u8],
        public_key: &[u8],
        revealed_indexes: &[usize],
    ) -> Result<Vec<u8>, Error> {
        let pk = BBSplusPublicKey::from_bytes(public_key)?;
        let signature = BBSplusSignature::from_bytes(signature)?;
        log::debug!("deriving proof revealing {} of {} messages", revealed_indexes.len(), messages.len());
        let proof = BBSplusPoKSignature::proof_gen::<LdpCiphersuite, _>(
            &signature,
            &pk,
            messages,
            revealed_indexes,
            Some(nonce),
        )?;
        Ok(proof.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bbsplus::ciphersuites::Bls12381Sha256, suites::BbsBlsSignature2020};
    use serde_json::json;

    #[test]
    fn derive_and_verify() {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let pk = sk.public_key().to_bytes().to_vec();
        let messages: Vec<String> = ["<urn:a> <urn:p> \"1\" .", "<urn:a> <urn:p> \"2\" .", "<urn:a> <urn:p> \"3\" ."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let data = messages.join("\n");

        let signature = BbsBlsSignature2020::new(Some(sk), false).sign(data.as_bytes()).unwrap();
        let suite = BbsBlsSignatureProof2020::default();
        let proof = suite
            .as_proof_derivable()
            .unwrap()
            .derive_proof(&messages, &signature, b"nonce", &pk, &[0, 2])
            .unwrap();

        let disclosed = format!("{}\n{}\n", messages[0], messages[2]);
        assert!(suite.verify(&pk, disclosed.as_bytes(), &proof, Some(b"nonce")).is_ok());
        assert!(matches!(
            suite.verify(&pk, disclosed.as_bytes(), &proof, Some(b"other")),
            Err(Error::SignatureMismatch(_))
        ));
    }

    #[test]
    fn canonicalizes_derived_type_as_signature_type() {
        let suite = BbsBlsSignatureProof2020::default();
        let opts = ProcessorOptions::default();
        let proof = |t: &str| {
            json!({
                "@context": "https://w3id.org/security/v2",
                "type": t,
                "created": "2024-01-01T00:00:00Z",
                "proofPurpose": "assertionMethod"
            })
        };
        let derived = suite.canonicalize(&proof("BbsBlsSignatureProof2020"), &opts).unwrap();
        let original = suite.processor().canonicalize(&proof("BbsBlsSignature2020"), &opts).unwrap();
        assert_eq!(derived, original);
    }
}
