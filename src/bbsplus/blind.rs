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

use bls12_381_plus::{G1Projective, Scalar};
use elliptic_curve::{group::Curve, hash2curve::ExpandMsg};

use super::{
    ciphersuites::BbsCiphersuite,
    commitment::{BlindFactor, BlindSignatureContext},
    generators::Generators,
    keys::{BBSplusPublicKey, BBSplusSecretKey},
    message::BBSplusMessage,
    signature::{calculate_b_without_blinding, calculate_domain, finalize_sign, parse_g1, BBSplusSignature},
};
use crate::{
    errors::Error,
    utils::util::{calculate_random_scalars, get_remaining_indexes, scalar_from_slice},
};

/// Signature issued over a commitment. It only becomes a [`BBSplusSignature`]
/// once the holder adds back its blinding factor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplusBlindSignature {
    A: G1Projective,
    e: Scalar,
    s_double_prime: Scalar,
}

impl BBSplusBlindSignature {
    pub const BYTES: usize = BBSplusSignature::BYTES;

    /// # Description
    /// Issuer side of the blind signature protocol. Verifies the holder proof
    /// over the commitment, then signs the commitment together with the
    /// revealed messages.
    ///
    /// # Inputs:
    /// * `sk` (REQUIRED), the issuer secret key.
    /// * `pk` (REQUIRED), the issuer public key.
    /// * `context` (REQUIRED), the holder [`BlindSignatureContext`].
    /// * `revealed_messages` (REQUIRED), pairs of message index and message known to the issuer.
    /// * `message_count` (REQUIRED), total number of signed messages.
    /// * `nonce` (REQUIRED), the nonce the holder proof is bound to.
    ///
    /// # Output:
    /// a [`BBSplusBlindSignature`] or [`Error`].
    pub fn blind_sign<CS, M>(
        sk: &BBSplusSecretKey,
        pk: &BBSplusPublicKey,
        context: &BlindSignatureContext,
        revealed_messages: &[(usize, M)],
        message_count: usize,
        nonce: &[u8],
    ) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let revealed_indexes: Vec<usize> = revealed_messages.iter().map(|(i, _)| *i).collect();
        if revealed_indexes.iter().any(|&i| i >= message_count) {
            return Err(Error::BlindSignError("revealed index out of range".to_owned()));
        }
        let secret_indexes = get_remaining_indexes(message_count, &revealed_indexes);
        context.verify::<CS>(pk, &secret_indexes, message_count, nonce)?;

        let messages: Vec<&[u8]> = revealed_messages.iter().map(|(_, m)| m.as_ref()).collect();
        let scalars = BBSplusMessage::messages_to_scalar::<CS, &[u8]>(&messages)?;
        let revealed: Vec<(usize, BBSplusMessage)> = revealed_indexes.into_iter().zip(scalars).collect();

        let generators = Generators::create::<CS>(pk, message_count)?;
        let domain = calculate_domain::<CS>(pk, &generators)?;

        let random = calculate_random_scalars(2);
        let (e, s_double_prime) = (random[0], random[1]);

        let B = calculate_b_without_blinding(&generators, domain, &revealed)?
            + generators.q1 * s_double_prime
            + context.commitment;
        let A = finalize_sign(sk, B, e).map_err(|e| Error::BlindSignError(e.to_string()))?;

        Ok(Self { A, e, s_double_prime })
    }

    /// `s = s' + s''`
    pub fn unblind(&self, factor: &BlindFactor) -> BBSplusSignature {
        BBSplusSignature { A: self.A, e: self.e, s: self.s_double_prime + factor.0 }
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0..48].copy_from_slice(&self.A.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_be_bytes());
        bytes[80..112].copy_from_slice(&self.s_double_prime.to_be_bytes());
        bytes
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() != Self::BYTES {
            return Err(Error::DeserializationError(format!(
                "blind signature must be {} bytes, got {}",
                Self::BYTES,
                data.len()
            )));
        }
        let A = parse_g1(&data[0..48])?;
        let e = scalar_from_slice(&data[48..80])?;
        let s_double_prime = scalar_from_slice(&data[80..112])?;
        Ok(Self { A, e, s_double_prime })
    }
}
