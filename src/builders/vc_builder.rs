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

use serde_json::{json, Value};

use super::options::BuilderOptions;
#[cfg(feature = "bbsplus_blind")]
use crate::{
    bbsplus::blind::BBSplusBlindSignature,
    credential::blind::{self, BlindSession, BlindSignRequest},
    suites::{BbsBlsSignature2020, SignatureSuite},
};
use crate::{
    credential::{Credential, VERIFIABLE_CREDENTIAL},
    errors::Error,
    processor::context::{BBS_V1_URL, CREDENTIALS_V1_URL, STATUS_LIST_2021_URL},
    resolver::PublicKeyResolver,
    status::{
        self,
        entry::{REVOCATION_PURPOSE, STATUS_LIST_2021, STATUS_LIST_2021_CREDENTIAL},
        StatusEntry,
    },
    suites::BbsBlsSignatureProof2020,
};

/// Issuer and holder operations on credentials, configured once through
/// [`BuilderOptions`].
#[derive(Clone, Debug, Default)]
pub struct VCBuilder {
    options: BuilderOptions,
}

impl VCBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    #[cfg(feature = "bbsplus_blind")]
    fn blind_suite(&self) -> Result<&dyn SignatureSuite, Error> {
        self.options.suites.get(BbsBlsSignature2020::ALG)
    }

    /// Signs `credential` with the suite named by the proof context.
    pub fn add_linked_data_proof(&self, credential: &mut Credential) -> Result<(), Error> {
        let context = self.options.proof_context();
        let suite = self.options.suites.get(&context.signature_type)?;
        log::debug!("adding {} proof", suite.alg());
        credential.add_linked_data_proof(suite, &context, &self.options.processor_options)
    }

    /// See [`Credential::generate_bbs_selective_disclosure`].
    pub fn generate_bbs_selective_disclosure(
        &self,
        credential: &Credential,
        reveal: &Value,
        resolver: &dyn PublicKeyResolver,
        nonce: &[u8],
    ) -> Result<Credential, Error> {
        self.options.suites.proof_derivable(BbsBlsSignatureProof2020::ALG)?;
        credential.generate_bbs_selective_disclosure(
            &self.options.suites,
            reveal,
            resolver,
            nonce,
            &self.options.processor_options,
        )
    }

    /// # Description
    /// Holder side of blind issuance. Opens a [`BlindSession`] over the proof
    /// context of the builder, which must carry an explicit `created`.
    ///
    /// # Output:
    /// the session to keep and the request to send to the issuer.
    #[cfg(feature = "bbsplus_blind")]
    pub fn pre_blind_sign(
        &self,
        credential: &Credential,
        revealed: &Credential,
        issuer_resolver: &dyn PublicKeyResolver,
        nonce: &[u8],
    ) -> Result<(BlindSession, BlindSignRequest), Error> {
        let mut session = BlindSession::new(self.options.proof_context());
        let request = session.pre_blind_sign(
            self.blind_suite()?,
            credential,
            revealed,
            issuer_resolver,
            nonce,
            &self.options.processor_options,
        )?;
        Ok((session, request))
    }

    /// Issuer side of blind issuance.
    #[cfg(feature = "bbsplus_blind")]
    pub fn blind_sign(
        &self,
        revealed: &Credential,
        request: &BlindSignRequest,
        nonce: &[u8],
    ) -> Result<BBSplusBlindSignature, Error> {
        blind::blind_sign(
            self.blind_suite()?,
            revealed,
            request,
            &self.options.proof_context(),
            nonce,
            &self.options.processor_options,
        )
    }

    /// Holder side, last phase: appends the unblinded proof to `credential`.
    #[cfg(feature = "bbsplus_blind")]
    pub fn complete_signature(
        &self,
        session: &mut BlindSession,
        credential: &mut Credential,
        blind_signature: BBSplusBlindSignature,
    ) -> Result<(), Error> {
        session.accept_blind_signature(blind_signature)?;
        session.complete_signature(self.blind_suite()?, credential)
    }

    pub fn verify(&self, credential: &Credential, resolver: &dyn PublicKeyResolver) -> Result<(), Error> {
        credential.verify_proof(&self.options.suites, resolver, &self.options.processor_options)
    }

    /// https://w3c.github.io/vc-status-list-2021/#generate-algorithm
    ///
    /// # Description
    /// Builds the `StatusList2021Credential` `id` of the builder DID over the
    /// `issued` credentials, then signs it.
    pub fn gen_status_credential_list(&self, id: &str, issued: &[Credential]) -> Result<Credential, Error> {
        let pre_built = Credential {
            context: vec![json!(CREDENTIALS_V1_URL), json!(BBS_V1_URL), json!(STATUS_LIST_2021_URL)].into(),
            id: Some(id.to_owned()),
            types: vec![VERIFIABLE_CREDENTIAL.to_owned(), STATUS_LIST_2021_CREDENTIAL.to_owned()].into(),
            issuer: Some(Value::String(self.options.did.clone())),
            credential_subject: Some(json!({
                "type": STATUS_LIST_2021,
                "statusPurpose": REVOCATION_PURPOSE,
            })),
            ..Credential::default()
        };
        let mut list = status::gen_status_credential(issued, pre_built)?;
        self.add_linked_data_proof(&mut list)?;
        Ok(list)
    }

    /// https://w3c.github.io/vc-status-list-2021/#validate-algorithm
    ///
    /// # Description
    /// Verifies `status_list` and `credential`, then reads the bit of
    /// `credential` out of `status_list`.
    ///
    /// # Output:
    /// `true` when the bit is set.
    pub fn validate_status_credential(
        &self,
        status_list: &Credential,
        credential: &Credential,
        issuer_resolver: &dyn PublicKeyResolver,
    ) -> Result<bool, Error> {
        self.verify(status_list, issuer_resolver)?;
        self.verify(credential, issuer_resolver)?;
        let entry = StatusEntry::from_credential(credential)
            .ok_or_else(|| Error::MissingField("credentialStatus".to_owned()))?;
        status::check_status(status_list, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        ldp::proof::now,
        resolver::{PublicKey, StaticKeyResolver},
        suites::SuiteRegistry,
    };

    const DID: &str = "did:example:issuer";

    fn issuer() -> (VCBuilder, StaticKeyResolver) {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        (VCBuilder::new(BuilderOptions::new().with_did(DID).with_private_key(sk)), resolver)
    }

    fn credential(index: usize) -> Credential {
        let mut credential = Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/bbs/v1",
                "https://w3id.org/vc/status-list/2021/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "id": "https://example.com/credentials/1",
            "type": ["VerifiableCredential"],
            "issuer": DID,
            "issuanceDate": "2022-01-01T00:00:00Z",
            "credentialSubject": {"id": "did:example:holder", "givenName": "Jane"}
        }))
        .unwrap();
        StatusEntry::new("https://example.com/status/1#0", index, "https://example.com/status/1")
            .attach(&mut credential)
            .unwrap();
        credential
    }

    #[test]
    fn sign_and_verify() {
        let (builder, resolver) = issuer();
        let mut credential = credential(1);
        builder.add_linked_data_proof(&mut credential).unwrap();
        assert_eq!(credential.proofs()[0].verification_method.as_deref(), Some("did:example:issuer#owner"));
        builder.verify(&credential, &resolver).unwrap();

        let verifier = VCBuilder::new(BuilderOptions::new());
        verifier.verify(&credential, &resolver).unwrap();
    }

    #[test]
    fn verify_only_cannot_sign() {
        let builder = VCBuilder::new(BuilderOptions::new().with_did(DID));
        assert_eq!(
            builder.add_linked_data_proof(&mut credential(1)).err(),
            Some(Error::MissingField("private key".to_owned()))
        );
    }

    #[test]
    fn missing_suite() {
        let builder = VCBuilder::new(BuilderOptions::new().with_signature_suites(SuiteRegistry::new()));
        assert_eq!(
            builder.add_linked_data_proof(&mut credential(1)).err(),
            Some(Error::UnknownSuite("BbsBlsSignature2020".to_owned()))
        );
    }

    #[test]
    fn status_list_validation() {
        let (builder, resolver) = issuer();
        let mut issued = vec![credential(1), credential(5), credential(9)];
        for credential in issued.iter_mut() {
            builder.add_linked_data_proof(credential).unwrap();
        }
        let list = builder.gen_status_credential_list("https://example.com/status/1", &issued).unwrap();
        builder.verify(&list, &resolver).unwrap();
        assert_eq!(list.issuer, Some(json!(DID)));

        assert!(builder.validate_status_credential(&list, &issued[1], &resolver).unwrap());

        let mut unset = credential(4);
        builder.add_linked_data_proof(&mut unset).unwrap();
        assert!(!builder.validate_status_credential(&list, &unset, &resolver).unwrap());

        let mut tampered = issued[1].clone();
        tampered.credential_subject = Some(json!({"id": "did:example:holder", "givenName": "John"}));
        assert!(matches!(
            builder.validate_status_credential(&list, &tampered, &resolver),
            Err(Error::SignatureMismatch(_))
        ));
    }

    #[test]
    fn status_list_proof_is_checked() {
        let (builder, resolver) = issuer();
        let mut issued = vec![credential(1), credential(5)];
        for credential in issued.iter_mut() {
            builder.add_linked_data_proof(credential).unwrap();
        }
        let list = builder.gen_status_credential_list("https://example.com/status/1", &issued).unwrap();

        let mut unsigned = list.clone();
        unsigned.proof = None;
        assert_eq!(
            builder.validate_status_credential(&unsigned, &issued[0], &resolver).err(),
            Some(Error::MissingProof)
        );

        let mut tampered = list.clone();
        tampered.credential_subject.as_mut().unwrap()["encodedList"] =
            json!(crate::status::BitString::new().encode().unwrap());
        assert!(matches!(
            builder.validate_status_credential(&tampered, &issued[0], &resolver),
            Err(Error::SignatureMismatch(_))
        ));
    }

    #[cfg(feature = "bbsplus_blind")]
    #[test]
    fn blind_issuance() {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        let context = crate::ldp::LinkedDataProofContext {
            created: Some(now()),
            ..crate::ldp::LinkedDataProofContext::new(BbsBlsSignature2020::ALG, "did:example:issuer#owner")
        };
        let issuer = VCBuilder::new(
            BuilderOptions::new()
                .with_private_key(sk)
                .with_linked_data_proof_context(context.clone()),
        );
        let holder = VCBuilder::new(BuilderOptions::new().with_linked_data_proof_context(context));

        let full = credential(1);
        let mut revealed = full.clone();
        revealed.credential_subject = Some(json!({"id": "did:example:holder"}));
        let nonce = b"issuer nonce";

        let (mut session, request) = holder.pre_blind_sign(&full, &revealed, &resolver, nonce).unwrap();
        let blind_signature = issuer.blind_sign(&revealed, &request, nonce).unwrap();

        let mut signed = full.clone();
        holder.complete_signature(&mut session, &mut signed, blind_signature).unwrap();
        issuer.verify(&signed, &resolver).unwrap();
    }

    #[cfg(feature = "bbsplus_blind")]
    #[test]
    fn blind_issuance_requires_created() {
        let (builder, resolver) = issuer();
        let full = credential(1);
        assert_eq!(
            builder.pre_blind_sign(&full, &full, &resolver, b"nonce").err(),
            Some(Error::MissingField("created".to_owned()))
        );
    }
}
