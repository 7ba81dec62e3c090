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

use crate::{
    bbsplus::keys::BBSplusSecretKey,
    ldp::{LinkedDataProofContext, SignatureRepresentation},
    processor::ProcessorOptions,
    suites::{BbsBlsSignature2020, SuiteRegistry},
};

/// Configuration shared by [`super::VCBuilder`] and [`super::PresentationBuilder`].
#[derive(Clone, Debug)]
pub struct BuilderOptions {
    pub(crate) did: String,
    pub(crate) suites: SuiteRegistry,
    pub(crate) processor_options: ProcessorOptions,
    pub(crate) proof_context: Option<LinkedDataProofContext>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            did: String::new(),
            suites: SuiteRegistry::verify_only(),
            processor_options: ProcessorOptions::default().with_validate(true),
            proof_context: None,
        }
    }
}

impl BuilderOptions {
    /// Verify only suites, strict processing, no DID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both BBS suites signing with `sk`.
    pub fn with_private_key(mut self, sk: BBSplusSecretKey) -> Self {
        self.suites = SuiteRegistry::with_private_key(sk);
        self
    }

    pub fn with_signature_suites(mut self, suites: SuiteRegistry) -> Self {
        self.suites = suites;
        self
    }

    pub fn with_processor_options(mut self, options: ProcessorOptions) -> Self {
        self.processor_options = options;
        self
    }

    pub fn with_linked_data_proof_context(mut self, context: LinkedDataProofContext) -> Self {
        self.proof_context = Some(context);
        self
    }

    /// DID of the issuer. Also names the default verification method `<did>#owner`.
    pub fn with_did(mut self, did: &str) -> Self {
        self.did = did.to_owned();
        self
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn suites(&self) -> &SuiteRegistry {
        &self.suites
    }

    pub fn processor_options(&self) -> &ProcessorOptions {
        &self.processor_options
    }

    /// The configured proof context, or a `BbsBlsSignature2020` proof value
    /// context verified by `<did>#owner`.
    pub fn proof_context(&self) -> LinkedDataProofContext {
        self.proof_context.clone().unwrap_or_else(|| LinkedDataProofContext {
            representation: SignatureRepresentation::ProofValue,
            ..LinkedDataProofContext::new(BbsBlsSignature2020::ALG, &format!("{}#owner", self.did))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BuilderOptions::new().with_did("did:example:issuer");
        let context = options.proof_context();
        assert_eq!(context.signature_type, "BbsBlsSignature2020");
        assert_eq!(context.representation, SignatureRepresentation::ProofValue);
        assert_eq!(context.verification_method.as_deref(), Some("did:example:issuer#owner"));
        assert!(context.created.is_none());
        assert!(options.processor_options().validate);
        assert_eq!(options.suites().algs(), vec!["BbsBlsSignature2020", "BbsBlsSignatureProof2020"]);
    }

    #[test]
    fn explicit_context_wins() {
        let context = LinkedDataProofContext::new("BbsBlsSignature2020", "did:example:other#key-1");
        let options = BuilderOptions::new()
            .with_did("did:example:issuer")
            .with_linked_data_proof_context(context.clone());
        assert_eq!(options.proof_context(), context);
    }
}
