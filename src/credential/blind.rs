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

//! Blind issuance of a credential.
//!
//! The holder opens a [`BlindSession`], which commits to the statements the
//! issuer must not see. The issuer signs the commitment with
//! [`blind_sign`] and the holder finishes the signature inside the same
//! session. The blinding factor never leaves the session.

use crate::{
    bbsplus::{blind::BBSplusBlindSignature, commitment::BlindFactor, commitment::BlindSignatureContext},
    credential::Credential,
    errors::Error,
    ldp::{create_verify_data, statements::split_statements, LinkedDataProofContext, Proof},
    processor::ProcessorOptions,
    resolver::PublicKeyResolver,
    suites::{Blindable, SignatureSuite},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlindState {
    Created,
    ContextBuilt,
    BlindSigned,
    Completed,
}

/// What the holder sends to the issuer.
#[derive(Clone, Debug)]
pub struct BlindSignRequest {
    pub context: BlindSignatureContext,
    pub revealed_indexes: Vec<usize>,
    pub message_count: usize,
}

/// Holder side state of one blind issuance. One session per issuance.
#[derive(Debug)]
pub struct BlindSession {
    state: BlindState,
    proof_context: LinkedDataProofContext,
    factor: Option<BlindFactor>,
    blind_signature: Option<BBSplusBlindSignature>,
    revealed_indexes: Vec<usize>,
    message_count: usize,
}

fn blindable(suite: &dyn SignatureSuite) -> Result<&dyn Blindable, Error> {
    suite.as_blindable().ok_or_else(|| Error::WrongSuiteForOperation {
        suite: suite.alg().to_owned(),
        operation: "blind signature".to_owned(),
    })
}

/// Proof template shared by holder and issuer. Both sides sign the same
/// proof statements, so `created` has to be agreed on up front.
fn proof_template(suite: &dyn SignatureSuite, context: &LinkedDataProofContext) -> Result<(LinkedDataProofContext, Proof), Error> {
    if context.created.is_none() {
        return Err(Error::MissingField("created".to_owned()));
    }
    let mut context = context.clone();
    context.validate()?;
    let proof = Proof::from_context(&context, suite.alg());
    Ok((context, proof))
}

impl BlindSession {
    pub fn new(proof_context: LinkedDataProofContext) -> Self {
        Self {
            state: BlindState::Created,
            proof_context,
            factor: None,
            blind_signature: None,
            revealed_indexes: Vec::new(),
            message_count: 0,
        }
    }

    pub fn state(&self) -> BlindState {
        self.state
    }

    pub fn revealed_indexes(&self) -> &[usize] {
        &self.revealed_indexes
    }

    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// # Description
    /// Holder, first phase. Statements of `credential` also found in
    /// `revealed` are left in the clear, the others are committed to.
    ///
    /// # Inputs:
    /// * `suite` (REQUIRED), a suite with the blind capability.
    /// * `credential` (REQUIRED), the full credential to get signed.
    /// * `revealed` (REQUIRED), the part of it the issuer gets to see.
    /// * `resolver` (REQUIRED), resolves the issuer public key.
    /// * `nonce` (REQUIRED), issuer provided nonce.
    /// * `options` (REQUIRED), processor options.
    ///
    /// # Output:
    /// the [`BlindSignRequest`] for the issuer or [`Error`].
    pub fn pre_blind_sign(
        &mut self,
        suite: &dyn SignatureSuite,
        credential: &Credential,
        revealed: &Credential,
        resolver: &dyn PublicKeyResolver,
        nonce: &[u8],
        options: &ProcessorOptions,
    ) -> Result<BlindSignRequest, Error> {
        if self.state != BlindState::Created {
            return Err(Error::ProtocolState(format!("pre blind sign in state {:?}", self.state)));
        }
        let blindable = blindable(suite)?;
        let (context, proof) = proof_template(suite, &self.proof_context)?;

        let all = create_verify_data(suite, &credential.to_value()?, &proof, options)?;
        let revealed = create_verify_data(suite, &revealed.to_value()?, &proof, options)?;
        let key = resolver.resolve(proof.public_key_id()?)?;

        let commitment = blindable.create_context(&all, &revealed, key.bytes_for(context.representation), nonce)?;
        log::debug!(
            "blind request over {} messages, {} revealed",
            commitment.message_count,
            commitment.revealed_indexes.len()
        );

        self.proof_context = context;
        self.factor = Some(commitment.factor);
        self.revealed_indexes = commitment.revealed_indexes.clone();
        self.message_count = commitment.message_count;
        self.state = BlindState::ContextBuilt;

        Ok(BlindSignRequest {
            context: commitment.context,
            revealed_indexes: commitment.revealed_indexes,
            message_count: commitment.message_count,
        })
    }

    /// Holder takes delivery of the issuer blind signature.
    pub fn accept_blind_signature(&mut self, blind_signature: BBSplusBlindSignature) -> Result<(), Error> {
        match self.state {
            BlindState::Created => Err(Error::NoBlindingFactor),
            BlindState::ContextBuilt => {
                self.blind_signature = Some(blind_signature);
                self.state = BlindState::BlindSigned;
                Ok(())
            }
            state => Err(Error::ProtocolState(format!("blind signature received in state {:?}", state))),
        }
    }

    /// Holder, last phase: unblinds the signature and appends it to
    /// `credential` as a regular proof.
    pub fn complete_signature(&mut self, suite: &dyn SignatureSuite, credential: &mut Credential) -> Result<(), Error> {
        let (factor, blind_signature) = match (self.state, &self.factor, &self.blind_signature) {
            (BlindState::BlindSigned, Some(factor), Some(blind_signature)) => (factor, blind_signature),
            (BlindState::Created, _, _) | (_, None, _) => return Err(Error::NoBlindingFactor),
            (state, _, _) => return Err(Error::ProtocolState(format!("complete signature in state {:?}", state))),
        };
        let blindable = blindable(suite)?;
        let (context, mut proof) = proof_template(suite, &self.proof_context)?;

        let signature = blindable.complete_signature(blind_signature, factor)?;
        proof.apply_signature_value(context.representation, &signature);
        credential.add_proof(proof);

        self.factor = None;
        self.state = BlindState::Completed;
        Ok(())
    }
}

/// # Description
/// Issuer side. Signs the holder commitment together with the statements of
/// `revealed`, which must be exactly the ones at `request.revealed_indexes`.
///
/// # Inputs:
/// * `suite` (REQUIRED), a blind capable suite holding the issuer key.
/// * `revealed` (REQUIRED), the issuer copy of the revealed credential.
/// * `request` (REQUIRED), the holder [`BlindSignRequest`].
/// * `context` (REQUIRED), the proof context the holder used.
/// * `nonce` (REQUIRED), the nonce handed to the holder.
/// * `options` (REQUIRED), processor options.
///
/// # Output:
/// a [`BBSplusBlindSignature`] or [`Error`].
pub fn blind_sign(
    suite: &dyn SignatureSuite,
    revealed: &Credential,
    request: &BlindSignRequest,
    context: &LinkedDataProofContext,
    nonce: &[u8],
    options: &ProcessorOptions,
) -> Result<BBSplusBlindSignature, Error> {
    let blindable = blindable(suite)?;
    let (_, proof) = proof_template(suite, context)?;

    let data = create_verify_data(suite, &revealed.to_value()?, &proof, options)?;
    let statements = split_statements(&data, true);
    if statements.len() != request.revealed_indexes.len() {
        return Err(Error::InvalidInput("revealed message length not equal revealed indexes".to_owned()));
    }
    let mut indexes = request.revealed_indexes.clone();
    indexes.sort_unstable();
    let revealed_messages: Vec<(usize, String)> = indexes.into_iter().zip(statements).collect();

    blindable.blind_sign(&request.context, &revealed_messages, request.message_count, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bbsplus::{ciphersuites::Bls12381Sha256, keys::BBSplusSecretKey},
        resolver::{PublicKey, StaticKeyResolver},
        suites::{BbsBlsSignature2020, SuiteRegistry},
    };
    use serde_json::json;

    fn credential(with_secret: bool) -> Credential {
        let mut subject = json!({"id": "did:example:holder", "givenName": "Jane"});
        if with_secret {
            subject["familyName"] = json!("Doe");
        }
        Credential::from_value(json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1",
                "https://w3id.org/security/bbs/v1"
            ],
            "id": "urn:uuid:5e2b3b7e-0c4a-4d8e-9a1f-0b7b1c7d2a11",
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2024-01-01T00:00:00Z",
            "credentialSubject": subject
        }))
        .unwrap()
    }

    fn context() -> LinkedDataProofContext {
        let mut ctx = LinkedDataProofContext::new(BbsBlsSignature2020::ALG, "did:example:issuer#owner");
        ctx.created = Some("2024-01-01T00:00:00Z".to_owned());
        ctx
    }

    fn setup() -> (SuiteRegistry, StaticKeyResolver) {
        let sk = BBSplusSecretKey::random::<Bls12381Sha256>().unwrap();
        let resolver = StaticKeyResolver::new(PublicKey::from_bbs(&sk.public_key()));
        (SuiteRegistry::with_private_key(sk), resolver)
    }

    #[test]
    fn full_protocol() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();
        let nonce = b"issuer nonce";

        let mut full = credential(true);
        let revealed = credential(false);
        let mut session = BlindSession::new(context());
        let request = session.pre_blind_sign(suite, &full, &revealed, &resolver, nonce, &opts).unwrap();
        assert_eq!(session.state(), BlindState::ContextBuilt);
        assert_eq!(request.message_count, request.revealed_indexes.len() + 1);

        let blind_signature = blind_sign(suite, &revealed, &request, &context(), nonce, &opts).unwrap();
        session.accept_blind_signature(blind_signature).unwrap();
        session.complete_signature(suite, &mut full).unwrap();
        assert_eq!(session.state(), BlindState::Completed);

        full.verify_proof(&registry, &resolver, &opts).unwrap();
    }

    #[test]
    fn partition_is_stable() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();

        let run = || {
            let mut session = BlindSession::new(context());
            session
                .pre_blind_sign(suite, &credential(true), &credential(false), &resolver, b"n", &opts)
                .unwrap();
            (session.revealed_indexes().to_vec(), session.message_count())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn out_of_order_calls() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();

        let mut session = BlindSession::new(context());
        let mut cred = credential(true);
        assert_eq!(session.complete_signature(suite, &mut cred), Err(Error::NoBlindingFactor));

        session
            .pre_blind_sign(suite, &credential(true), &credential(false), &resolver, b"n", &opts)
            .unwrap();
        assert!(matches!(session.complete_signature(suite, &mut cred), Err(Error::ProtocolState(_))));
        assert!(matches!(
            session.pre_blind_sign(suite, &credential(true), &credential(false), &resolver, b"n", &opts),
            Err(Error::ProtocolState(_))
        ));
    }

    #[test]
    fn issuer_rejects_mismatched_reveal() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let suite = registry.get(BbsBlsSignature2020::ALG).unwrap();

        let mut session = BlindSession::new(context());
        let request = session
            .pre_blind_sign(suite, &credential(true), &credential(false), &resolver, b"n", &opts)
            .unwrap();
        let res = blind_sign(suite, &credential(true), &request, &context(), b"n", &opts);
        assert!(matches!(res, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn explicit_created_and_blind_suite_required() {
        let (registry, resolver) = setup();
        let opts = ProcessorOptions::default();
        let mut ctx = context();
        ctx.created = None;
        let mut session = BlindSession::new(ctx);
        let res = session.pre_blind_sign(
            registry.get(BbsBlsSignature2020::ALG).unwrap(),
            &credential(true),
            &credential(false),
            &resolver,
            b"n",
            &opts,
        );
        assert_eq!(res.err(), Some(Error::MissingField("created".to_owned())));

        let mut session = BlindSession::new(context());
        let proof_suite = registry.get("BbsBlsSignatureProof2020").unwrap();
        let res = session.pre_blind_sign(proof_suite, &credential(true), &credential(false), &resolver, b"n", &opts);
        assert!(matches!(res, Err(Error::WrongSuiteForOperation { .. })));
    }
}
