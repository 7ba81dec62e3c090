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

//! Signature suites binding BBS+ to linked data proofs.
//!
//! [`SignatureSuite`] is what every suite offers: canonicalization, signing
//! and verification over verify data. Sub-protocols only some suites support
//! are separate capability traits ([`Blindable`], [`ProofDerivable`]) reached
//! through `as_blindable` / `as_proof_derivable`; a suite without the
//! capability answers `None`.

pub mod bbs_bls_signature_2020;
pub mod bbs_bls_signature_proof_2020;
pub mod registry;

use serde_json::Value;

pub use self::{
    bbs_bls_signature_2020::BbsBlsSignature2020, bbs_bls_signature_proof_2020::BbsBlsSignatureProof2020,
    registry::SuiteRegistry,
};
#[cfg(feature = "bbsplus_blind")]
use crate::bbsplus::{
    blind::BBSplusBlindSignature,
    commitment::{BlindFactor, BlindSignatureContext},
};
use crate::{
    bbsplus::ciphersuites::Bls12381Sha256,
    errors::Error,
    processor::{Processor, ProcessorOptions},
};

/// Ciphersuite used by the `BbsBlsSignature2020` family.
pub(crate) type LdpCiphersuite = Bls12381Sha256;

pub trait SignatureSuite: Send + Sync {
    /// Identifier matched against `proof.type`.
    fn alg(&self) -> &str;

    /// Compact proof options and documents against the security context
    /// before canonicalization.
    fn compact_proof(&self) -> bool;

    fn processor(&self) -> &dyn Processor;

    fn canonicalize(&self, doc: &Value, options: &ProcessorOptions) -> Result<Vec<u8>, Error> {
        self.processor().canonicalize(doc, options)
    }

    /// Statements are signed one per message, so the digest is the identity.
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    /// Signs verify data, one BBS+ message per statement.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error>;

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8], nonce: Option<&[u8]>) -> Result<(), Error>;

    #[cfg(feature = "bbsplus_blind")]
    fn as_blindable(&self) -> Option<&dyn Blindable> {
        None
    }

    fn as_proof_derivable(&self) -> Option<&dyn ProofDerivable> {
        None
    }
}

/// Holder side output of a blind signature request.
#[cfg(feature = "bbsplus_blind")]
#[derive(Clone, Debug)]
pub struct BlindCommitment {
    pub context: BlindSignatureContext,
    pub factor: BlindFactor,
    pub revealed_indexes: Vec<usize>,
    pub message_count: usize,
}

#[cfg(feature = "bbsplus_blind")]
pub trait Blindable {
    /// Partitions the statements of `all` into those also present in
    /// `revealed` and the secret rest, then commits to the secret ones.
    fn create_context(
        &self,
        all: &[u8],
        revealed: &[u8],
        issuer_public_key: &[u8],
        nonce: &[u8],
    ) -> Result<BlindCommitment, Error>;

    /// Issuer side: signs the commitment together with the revealed statements.
    fn blind_sign(
        &self,
        context: &BlindSignatureContext,
        revealed_messages: &[(usize, String)],
        message_count: usize,
        nonce: &[u8],
    ) -> Result<BBSplusBlindSignature, Error>;

    /// Unblinds an issuer signature into plain signature bytes.
    fn complete_signature(&self, blind_signature: &BBSplusBlindSignature, factor: &BlindFactor) -> Result<Vec<u8>, Error>;
}

pub trait ProofDerivable {
    /// Zero-knowledge proof that `signature` covers `messages`, revealing
    /// only those at `revealed_indexes`.
    fn derive_proof(
        &self,
        messages: &[String],
        signature: &[u8],
        nonce: &[u8],
        public_key: &[u8],
        revealed_indexes: &[usize],
    ) -> Result<Vec<u8>, Error>;
}
