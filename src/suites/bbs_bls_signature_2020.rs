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

#[cfg(feature = "bbsplus_blind")]
use std::collections::HashSet;

#[cfg(feature = "bbsplus_blind")]
use super::{BlindCommitment, Blindable};
use super::{LdpCiphersuite, SignatureSuite};
#[cfg(feature = "bbsplus_blind")]
use crate::bbsplus::{
    blind::BBSplusBlindSignature,
    commitment::{BlindFactor, BlindSignatureContext},
};
use crate::{
    bbsplus::{
        keys::{BBSplusPublicKey, BBSplusSecretKey},
        signature::BBSplusSignature,
    },
    errors::Error,
    ldp::statements::{split_statements, to_messages},
    processor::{JsonLdProcessor, Processor},
};

/// `BbsBlsSignature2020`: a BBS+ signature over every statement of the
/// verify data.
#[derive(Clone, Debug, Default)]
pub struct BbsBlsSignature2020 {
    private_key: Option<BBSplusSecretKey>,
    compact_proof: bool,
    processor: JsonLdProcessor,
}

impl BbsBlsSignature2020 {
    pub const ALG: &'static str = "BbsBlsSignature2020";

    /// A suite without private key can only verify.
    pub fn new(private_key: Option<BBSplusSecretKey>, compact_proof: bool) -> Self {
        Self { private_key, compact_proof, processor: JsonLdProcessor::default() }
    }

    pub fn with_processor(mut self, processor: JsonLdProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub(crate) fn private_key(&self) -> Result<&BBSplusSecretKey, Error> {
        self.private_key
            .as_ref()
            .ok_or_else(|| Error::MissingField("private key".to_owned()))
    }
}

pub(crate) fn sign_statements(sk: &BBSplusSecretKey, data: &[u8]) -> Result<Vec<u8>, Error> {
    let statements = split_statements(data, true);
    log::debug!("signing {} statements", statements.len());
    let signature = BBSplusSignature::sign::<LdpCiphersuite, _>(&to_messages(&statements), sk, &sk.public_key())?;
    Ok(signature.to_bytes().to_vec())
}

impl SignatureSuite for BbsBlsSignature2020 {
    fn alg(&self) -> &str {
        Self::ALG
    }

    fn compact_proof(&self) -> bool {
        self.compact_proof
    }

    fn processor(&self) -> &dyn Processor {
        &self.processor
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        sign_statements(self.private_key()?, data)
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8], _nonce: Option<&[u8]>) -> Result<(), Error> {
        let pk = BBSplusPublicKey::from_bytes(public_key)?;
        let signature = BBSplusSignature::from_bytes(signature)?;
        let statements = split_statements(data, true);
        signature
            .verify::<LdpCiphersuite, _>(&pk, &to_messages(&statements))
            .map_err(|e| Error::SignatureMismatch(e.to_string()))
    }

    #[cfg(feature = "bbsplus_blind")]
    fn as_blindable(&self) -> Option<&dyn Blindable> {
        Some(self)
    }
}

#[cfg(feature = "bbsplus_blind")]
impl Blindable for BbsBlsSignature2020 {
    fn create_context(
        &self,
        all: &[u8],
        revealed: &[u8],
        issuer_public_key: &[u8],
        nonce: &[u8],
    ) -> Result<BlindCommitment, Error> {
        let all = split_statements(all, true);
        let revealed = split_statements(revealed, true);
        if all.is_empty() || revealed.is_empty() {
            return Err(Error::InvalidInput("nothing to blind sign".to_owned()));
        }

        let revealed: HashSet<&str> = revealed.iter().map(String::as_str).collect();
        let mut revealed_indexes = Vec::new();
        let mut secret = Vec::new();
        for (i, statement) in all.iter().enumerate() {
            if revealed.contains(statement.as_str()) {
                revealed_indexes.push(i);
            } else {
                secret.push((i, statement.as_bytes()));
            }
        }
        log::debug!("blinding {} of {} statements", secret.len(), all.len());

        let pk = BBSplusPublicKey::from_bytes(issuer_public_key)?;
        let (context, factor) = BlindSignatureContext::new::<LdpCiphersuite, _>(&pk, &secret, all.len(), nonce)?;
        Ok(BlindCommitment { context, factor, revealed_indexes, message_count: all.len() })
    }

    fn blind_sign(
        &self,
        context: &BlindSignatureContext,
        revealed_messages: &[(usize, String)],
        message_count: usize,
        nonce: &[u8],
    ) -> Result<BBSplusBlindSignature, Error> {
        let sk = self.private_key()?;
        BBSplusBlindSignature::blind_sign::<LdpCiphersuite, _>(
            sk,
            &sk.public_key(),
            context,
            revealed_messages,
            message_count,
            nonce,
        )
    }

    fn complete_signature(&self, blind_signature: &BBSplusBlindSignature, factor: &BlindFactor) -> Result<Vec<u8>, Error> {
        Ok(blind_signature.unblind(factor).to_bytes().to_vec())
    }
}
