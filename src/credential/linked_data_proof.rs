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

use super::Credential;
use crate::{
    errors::Error,
    ldp::{create_verify_data, LinkedDataProofContext, Proof},
    processor::ProcessorOptions,
    resolver::PublicKeyResolver,
    suites::{SignatureSuite, SuiteRegistry},
};

/// # Description
/// Signs `doc` with `suite` and returns the finished proof.
///
/// # Inputs:
/// * `suite` (REQUIRED), a suite holding a private key.
/// * `doc` (REQUIRED), the JSON-LD document to sign, existing proofs are ignored.
/// * `context` (REQUIRED), how the proof is built. Missing `created` and
///   `purpose` are filled in.
/// * `options` (REQUIRED), processor options.
///
/// # Output:
/// the signed [`Proof`] or [`Error`].
pub fn create_proof(
    suite: &dyn SignatureSuite,
    doc: &Value,
    context: &LinkedDataProofContext,
    options: &ProcessorOptions,
) -> Result<Proof, Error> {
    let mut context = context.clone();
    context.validate()?;

    let mut proof = Proof::from_context(&context, suite.alg());
    let data = create_verify_data(suite, doc, &proof, options)?;
    let signature = suite.sign(&data)?;
    proof.apply_signature_value(context.representation, &signature);
    log::debug!("{} proof created by {:?}", suite.alg(), proof.verification_method);
    Ok(proof)
}

/// Verifies every proof in `proofs` over `doc`, failing on the first bad one.
pub fn verify_proofs(
    doc: &Value,
    proofs: &[Proof],
    registry: &SuiteRegistry,
    resolver: &dyn PublicKeyResolver,
    options: &ProcessorOptions,
) -> Result<(), Error> {
    if proofs.is_empty() {
        return Err(Error::MissingProof);
    }
    for proof in proofs {
        let suite = registry.get(&proof.proof_type)?;
        let data = create_verify_data(suite, doc, proof, options)?;
        let key = resolver.resolve(proof.public_key_id()?)?;
        let signature = proof.signature_bytes()?;
        let nonce = proof.nonce_bytes()?;
        suite.verify(key.bytes_for(proof.representation()), &data, &signature, nonce.as_deref())?;
        log::debug!("{} proof verified", proof.proof_type);
    }
    Ok(())
}

impl Credential {
    /// Signs the credential and appends the proof.
    pub fn add_linked_data_proof(
        &mut self,
        suite: &dyn SignatureSuite,
        context: &LinkedDataProofContext,
        options: &ProcessorOptions,
    ) -> Result<(), Error> {
        let proof = create_proof(suite, &self.to_value()?, context, options)?;
        self.add_proof(proof);
        Ok(())
    }

    pub fn verify_proof(
        &self,
        registry: &SuiteRegistry,
        resolver: &dyn PublicKeyResolver,
        options: &ProcessorOptions,
    ) -> Result<(), Error> {
        verify_proofs(&self.to_value()?, self.proofs(), registry, resolver, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        ldp::SignatureRepresentation,
        resolver::{PublicKey, StaticKeyResolver},
        suites::BbsBlsSignature2020,
    };
    use serde_json::json;

    fn credential() -> Credential {
        Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1",
                "https://w3id.org/security/bbs/v1"
            ],
            "id": "http://example.gov/credentials/3732",
            "type": ["VerifiableCredential", "UniversityDegreeCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2024-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:example:subject",
                "givenName": "Jane",
                "degree": {"type": "BachelorDegree", "name": "Bachelor of Science and Arts"}
            }
        }))
        .unwrap()
    }

    fn setup() -> (SuiteRegistry, StaticKeyResolver) {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        (SuiteRegistry::with_private_key(sk), resolver)
    }

    fn context(representation: SignatureRepresentation) -> LinkedDataProofContext {
        let mut ctx = LinkedDataProofContext::new(BbsBlsSignature2020::ALG, "did:example:issuer#owner");
        ctx.representation = representation;
        ctx
    }

    #[test]
    fn sign_and_verify_both_representations() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();

        for representation in [SignatureRepresentation::ProofValue, SignatureRepresentation::Jws] {
            let mut cred = credential();
            cred.add_linked_data_proof(suite, &context(representation), &opts).unwrap();
            assert_eq!(cred.proofs()[0].representation(), representation);
            cred.verify_proof(&registry, &resolver, &opts).unwrap();
        }
    }

    #[test]
    fn multiple_proofs_verify_independently() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();

        let mut cred = credential();
        cred.add_linked_data_proof(suite, &context(SignatureRepresentation::ProofValue), &opts).unwrap();
        cred.add_linked_data_proof(suite, &context(SignatureRepresentation::Jws), &opts).unwrap();
        assert_eq!(cred.proofs().len(), 2);
        cred.verify_proof(&registry, &resolver, &opts).unwrap();
    }

    #[test]
    fn tampered_subject_fails() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let mut cred = credential();
        cred.add_linked_data_proof(registry.get(BbsBlsSignature2020::ALG).unwrap(), &context(SignatureRepresentation::ProofValue), &opts)
            .unwrap();

        cred.credential_subject.as_mut().unwrap()["givenName"] = json!("Jone");
        assert!(matches!(
            cred.verify_proof(&registry, &resolver, &opts),
            Err(Error::SignatureMismatch(_))
        ));
    }

    #[test]
    fn verification_errors() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        assert_eq!(credential().verify_proof(&registry, &resolver, &opts), Err(Error::MissingProof));

        let mut cred = credential();
        cred.add_proof(Proof {
            proof_type: "Ed25519Signature2018".to_owned(),
            created: Some("2024-01-01T00:00:00Z".to_owned()),
            ..Default::default()
        });
        assert_eq!(
            cred.verify_proof(&registry, &resolver, &opts),
            Err(Error::UnknownSuite("Ed25519Signature2018".to_owned()))
        );
    }
}
