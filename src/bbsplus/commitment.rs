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
    generators::Generators,
    keys::BBSplusPublicKey,
    message::BBSplusMessage,
    signature::parse_g1,
};
use crate::{
    errors::Error,
    utils::util::{calculate_random_scalars, hash_to_scalar, i2osp, scalar_from_slice},
};

/// Secret scalar `s'` blinding a commitment. The holder keeps it until the
/// blind signature comes back and is unblinded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlindFactor(pub(crate) Scalar);

impl BlindFactor {
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(scalar_from_slice(bytes)?))
    }
}

/// Commitment to the holder secret messages together with a Schnorr proof
/// of knowledge of its opening.
///
/// Encoded as `C || challenge || s_cap || r_cap_1 || ... || r_cap_U`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlindSignatureContext {
    pub(crate) commitment: G1Projective,
    challenge: Scalar,
    s_cap: Scalar,
    r_cap: Vec<Scalar>,
}

impl BlindSignatureContext {
    /// # Description
    /// Commits to the messages the holder wants signed without the issuer
    /// learning them: `C = Q1 * s' + sum(H_i * m_i)`.
    ///
    /// # Inputs:
    /// * `pk` (REQUIRED), the issuer public key.
    /// * `secret_messages` (REQUIRED), pairs of message index and message.
    /// * `message_count` (REQUIRED), total number of messages the final signature covers.
    /// * `nonce` (REQUIRED), issuer supplied nonce bound into the proof.
    ///
    /// # Output:
    /// ([`BlindSignatureContext`], [`BlindFactor`]) or [`Error`].
    pub fn new<CS, M>(
        pk: &BBSplusPublicKey,
        secret_messages: &[(usize, M)],
        message_count: usize,
        nonce: &[u8],
    ) -> Result<(Self, BlindFactor), Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let indexes: Vec<usize> = secret_messages.iter().map(|(i, _)| *i).collect();
        check_indexes(&indexes, message_count)?;

        let messages: Vec<&[u8]> = secret_messages.iter().map(|(_, m)| m.as_ref()).collect();
        let scalars = BBSplusMessage::messages_to_scalar::<CS, &[u8]>(&messages)?;
        let generators = Generators::create::<CS>(pk, message_count)?;

        let random = calculate_random_scalars(2 + scalars.len());
        let s_prime = random[0];
        let s_tilde = random[1];
        let r_tilde = &random[2..];

        let mut C = generators.q1 * s_prime;
        let mut U_tilde = generators.q1 * s_tilde;
        for ((i, m), r) in indexes.iter().zip(&scalars).zip(r_tilde) {
            let H_i = generators.message_generators[*i];
            C += H_i * m.value;
            U_tilde += H_i * r;
        }

        let challenge = blind_challenge::<CS>(&C, &U_tilde, &indexes, nonce)?;

        let s_cap = s_tilde + challenge * s_prime;
        let r_cap: Vec<Scalar> = r_tilde
            .iter()
            .zip(&scalars)
            .map(|(r, m)| r + challenge * m.value)
            .collect();

        Ok((Self { commitment: C, challenge, s_cap, r_cap }, BlindFactor(s_prime)))
    }

    /// Checks the proof of knowledge of the commitment opening for the given
    /// secret indexes.
    pub fn verify<CS>(
        &self,
        pk: &BBSplusPublicKey,
        secret_indexes: &[usize],
        message_count: usize,
        nonce: &[u8],
    ) -> Result<(), Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        check_indexes(secret_indexes, message_count)?;
        if secret_indexes.len() != self.r_cap.len() {
            return Err(Error::InvalidCommitmentProof);
        }
        let generators = Generators::create::<CS>(pk, message_count)?;

        let mut U_cap = self.commitment * (-self.challenge) + generators.q1 * self.s_cap;
        for (i, r) in secret_indexes.iter().zip(&self.r_cap) {
            U_cap += generators.message_generators[*i] * r;
        }

        let challenge = blind_challenge::<CS>(&self.commitment, &U_cap, secret_indexes, nonce)?;
        if challenge == self.challenge {
            Ok(())
        } else {
            Err(Error::InvalidCommitmentProof)
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(&self.commitment.to_affine().to_compressed());
        bytes.extend_from_slice(&self.challenge.to_be_bytes());
        bytes.extend_from_slice(&self.s_cap.to_be_bytes());
        self.r_cap.iter().for_each(|r| bytes.extend_from_slice(&r.to_be_bytes()));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 48 + 2 * Scalar::BYTES || (bytes.len() - 48) % Scalar::BYTES != 0 {
            return Err(Error::DeserializationError("invalid blind signature context length".to_owned()));
        }
        let commitment = parse_g1(&bytes[0..48])?;
        let mut scalars = bytes[48..]
            .chunks_exact(Scalar::BYTES)
            .map(scalar_from_slice)
            .collect::<Result<Vec<Scalar>, Error>>()?
            .into_iter();

        let challenge = scalars.next().ok_or(Error::InvalidCommitmentProof)?;
        let s_cap = scalars.next().ok_or(Error::InvalidCommitmentProof)?;
        let r_cap = scalars.collect();

        Ok(Self { commitment, challenge, s_cap, r_cap })
    }
}

fn check_indexes(indexes: &[usize], message_count: usize) -> Result<(), Error> {
    if let Some(i) = indexes.iter().find(|&&i| i >= message_count) {
        return Err(Error::InvalidInput(format!(
            "secret message index {} out of range for {} messages",
            i, message_count
        )));
    }
    if indexes.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidInput("secret message indexes must be strictly increasing".to_owned()));
    }
    Ok(())
}

/// `c = hash_to_scalar(C || U~ || I2OSP(U, 8) || i_1 || ... || i_U || nonce)`
fn blind_challenge<CS>(C: &G1Projective, U: &G1Projective, indexes: &[usize], nonce: &[u8]) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&C.to_affine().to_compressed());
    c_arr.extend_from_slice(&U.to_affine().to_compressed());
    c_arr.extend_from_slice(&i2osp(indexes.len(), 8));
    indexes.iter().for_each(|&i| c_arr.extend_from_slice(&i2osp(i, 8)));
    c_arr.extend_from_slice(nonce);

    hash_to_scalar::<CS>(&c_arr, CS::H2S_DST)
}
