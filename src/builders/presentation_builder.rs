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

use super::{options::BuilderOptions, vc_builder::VCBuilder};
use crate::{errors::Error, presentation::Presentation, resolver::PublicKeyResolver};

/// Holder operations on presentations. Credential operations stay
/// available through [`PresentationBuilder::credentials`].
#[derive(Clone, Debug, Default)]
pub struct PresentationBuilder {
    inner: VCBuilder,
}

impl PresentationBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { inner: VCBuilder::new(options) }
    }

    pub fn credentials(&self) -> &VCBuilder {
        &self.inner
    }

    pub fn add_linked_data_proof(&self, presentation: &mut Presentation) -> Result<(), Error> {
        let options = self.inner.options();
        let context = options.proof_context();
        let suite = options.suites().get(&context.signature_type)?;
        presentation.add_linked_data_proof(suite, &context, options.processor_options())
    }

    /// Checks the presentation proofs and the proofs of every embedded credential.
    pub fn verify(&self, presentation: &Presentation, resolver: &dyn PublicKeyResolver) -> Result<(), Error> {
        let options = self.inner.options();
        presentation.verify_proof(options.suites(), resolver, options.processor_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        credential::Credential,
        resolver::{PublicKey, StaticKeyResolver},
    };
    use serde_json::json;

    fn credential() -> Credential {
        Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2022-01-01T00:00:00Z",
            "credentialSubject": {"id": "did:example:holder", "givenName": "Jane"}
        }))
        .unwrap()
    }

    #[test]
    fn holder_signs_issuer_credential() {
        let issuer_sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let holder_sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::default()
            .with_variant("did:example:issuer#owner", PublicKey::from_bbs(&issuer_sk.public_key()))
            .with_variant("did:example:holder#owner", PublicKey::from_bbs(&holder_sk.public_key()));

        let issuer = PresentationBuilder::new(
            BuilderOptions::new().with_did("did:example:issuer").with_private_key(issuer_sk),
        );
        let holder = PresentationBuilder::new(
            BuilderOptions::new().with_did("did:example:holder").with_private_key(holder_sk),
        );

        let mut signed = credential();
        issuer.credentials().add_linked_data_proof(&mut signed).unwrap();

        let mut presentation = Presentation::new().with_credential(signed);
        holder.add_linked_data_proof(&mut presentation).unwrap();
        assert_eq!(presentation.proofs().len(), 1);

        let verifier = PresentationBuilder::new(BuilderOptions::new());
        verifier.verify(&presentation, &resolver).unwrap();

        presentation.holder = Some("did:example:someone-else".to_owned());
        assert!(matches!(verifier.verify(&presentation, &resolver), Err(Error::SignatureMismatch(_))));
    }

    #[test]
    fn empty_presentation() {
        let verifier = PresentationBuilder::default();
        assert_eq!(
            verifier.verify(&Presentation::new(), &StaticKeyResolver::default()).err(),
            Some(Error::MissingProof)
        );
    }
}
