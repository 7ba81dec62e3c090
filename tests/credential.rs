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

#[cfg(test)]
mod credential_tests {
    use std::fs;

    use serde_json::{json, Value};
    use zkryptium_vc::{
        bbsplus::keys::BBSplusSecretKey,
        builders::{BuilderOptions, VCBuilder},
        credential::Credential,
        errors::Error,
        ldp::{LinkedDataProofContext, Proof, SignatureRepresentation},
        processor::{context::StaticContextLoader, JsonLdProcessor, ProcessorOptions},
        resolver::{LocalResolver, PublicKey, StaticKeyResolver},
        suites::{BbsBlsSignature2020, BbsBlsSignatureProof2020, SuiteRegistry},
    };

    fn fixture(name: &str) -> Value {
        let data = fs::read_to_string(format!("./fixture_data/{}", name)).expect("Unable to read file");
        serde_json::from_str(&data).expect("Unable to parse")
    }

    fn issuer_key() -> (String, BBSplusSecretKey) {
        let issuer = fixture("issuer.json");
        let did = issuer["did"].as_str().unwrap().to_owned();
        let sk = BBSplusSecretKey::decode(issuer["secretKey"].as_str().unwrap()).unwrap();
        (did, sk)
    }

    fn did_document(did: &str, sk: &BBSplusSecretKey) -> Value {
        json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": did,
            "verificationMethod": [{
                "id": format!("{}#owner", did),
                "type": "Bls12381G2Key2020",
                "controller": did,
                "publicKeyHex": sk.public_key().encode()
            }],
            "assertionMethod": [format!("{}#owner", did)]
        })
    }

    fn signed(representation: SignatureRepresentation) -> (VCBuilder, Credential, StaticKeyResolver) {
        let (did, sk) = issuer_key();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        let context = LinkedDataProofContext {
            representation,
            ..LinkedDataProofContext::new(BbsBlsSignature2020::ALG, &format!("{}#owner", did))
        };
        let builder = VCBuilder::new(
            BuilderOptions::new()
                .with_did(&did)
                .with_private_key(sk)
                .with_linked_data_proof_context(context),
        );
        let mut credential = Credential::from_value(fixture("permanent_resident_card.json")).unwrap();
        builder.add_linked_data_proof(&mut credential).unwrap();
        (builder, credential, resolver)
    }

    #[test]
    fn sign_and_verify_proof_value() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (builder, credential, resolver) = signed(SignatureRepresentation::ProofValue);

        let proof = &credential.proofs()[0];
        assert_eq!(proof.proof_type, "BbsBlsSignature2020");
        assert_eq!(proof.proof_purpose.as_deref(), Some("assertionMethod"));
        assert!(proof.proof_value.is_some());
        assert!(proof.jws.is_none());

        builder.verify(&credential, &resolver).unwrap();
    }

    #[test]
    fn sign_and_verify_jws() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (builder, credential, resolver) = signed(SignatureRepresentation::Jws);

        let proof = &credential.proofs()[0];
        let jws = proof.jws.as_deref().unwrap();
        assert_eq!(jws.split('.').count(), 3);
        assert_eq!(jws.split('.').nth(1), Some(""));
        assert_eq!(proof.representation(), SignatureRepresentation::Jws);

        builder.verify(&credential, &resolver).unwrap();
    }

    #[test]
    fn mutated_subject_fails() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (builder, credential, resolver) = signed(SignatureRepresentation::ProofValue);

        let mut bytes = credential.to_bytes().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        let at = text.find("SMITH").unwrap() + 4;
        bytes[at] = b'I';
        let mutated = Credential::from_bytes(&bytes).unwrap();
        assert_eq!(mutated.credential_subject.as_ref().unwrap()["familyName"], json!("SMITI"));

        assert!(matches!(builder.verify(&mutated, &resolver), Err(Error::SignatureMismatch(_))));
    }

    #[test]
    fn wrong_key_fails() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (builder, credential, _) = signed(SignatureRepresentation::ProofValue);
        let other = BBSplusSecretKey::random::<zkryptium_vc::bbsplus::ciphersuites::Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&other.public_key()));
        assert!(builder.verify(&credential, &resolver).is_err());
    }

    #[test]
    fn verify_through_did_document() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (builder, credential, _) = signed(SignatureRepresentation::ProofValue);
        let (did, sk) = issuer_key();
        let resolver = LocalResolver::new().with_document(did_document(&did, &sk)).unwrap();
        builder.verify(&credential, &resolver).unwrap();

        let unknown = LocalResolver::new()
            .with_document(did_document("did:example:other", &sk))
            .unwrap();
        assert!(matches!(builder.verify(&credential, &unknown), Err(Error::ResolutionFailure(_))));
    }

    #[test]
    fn proof_survives_serialization() {
        let (builder, credential, resolver) = signed(SignatureRepresentation::ProofValue);
        let reparsed = Credential::from_bytes(credential.to_string().as_bytes()).unwrap();
        assert_eq!(reparsed, credential);

        let proof = &credential.proofs()[0];
        assert_eq!(&Proof::from_value(&proof.to_value().unwrap()).unwrap(), proof);
        builder.verify(&reparsed, &resolver).unwrap();
    }

    #[test]
    fn second_proof_is_appended() {
        let (builder, mut credential, resolver) = signed(SignatureRepresentation::ProofValue);
        builder.add_linked_data_proof(&mut credential).unwrap();
        assert_eq!(credential.proofs().len(), 2);
        builder.verify(&credential, &resolver).unwrap();
    }

    #[test]
    fn suites_with_custom_contexts() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (did, sk) = issuer_key();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        let processor = JsonLdProcessor::new(StaticContextLoader::new().with_document(
            "https://example.com/alumni/v1",
            json!({"@context": {"alumniOf": "http://schema.org/alumniOf"}}),
        ));
        let registry = SuiteRegistry::new()
            .with_suite(BbsBlsSignature2020::new(Some(sk), false).with_processor(processor.clone()))
            .with_suite(BbsBlsSignatureProof2020::new(None, false).with_processor(processor));
        let builder = VCBuilder::new(
            BuilderOptions::new()
                .with_did(&did)
                .with_signature_suites(registry)
                .with_processor_options(ProcessorOptions::default().with_validate(true)),
        );

        let mut credential = Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://example.com/alumni/v1"
            ],
            "type": ["VerifiableCredential"],
            "issuer": did,
            "issuanceDate": "2020-01-01T00:00:00Z",
            "credentialSubject": {"id": "did:example:alumnus", "alumniOf": "Example University"}
        }))
        .unwrap();
        builder.add_linked_data_proof(&mut credential).unwrap();
        builder.verify(&credential, &resolver).unwrap();

        let strict = VCBuilder::new(BuilderOptions::new());
        assert!(matches!(strict.verify(&credential, &resolver), Err(Error::EncodingError { .. })));
    }
}
