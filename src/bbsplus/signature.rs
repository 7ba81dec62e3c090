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

use bls12_381_plus::{multi_miller_loop, G1Affine, G1Projective, G2Prepared, G2Projective, Scalar};
use elliptic_curve::{group::Curve, hash2curve::ExpandMsg, Group};

use super::{
    ciphersuites::BbsCiphersuite,
    generators::Generators,
    keys::{BBSplusPublicKey, BBSplusSecretKey},
    message::BBSplusMessage,
};
use crate::{
    errors::Error,
    utils::util::{calculate_random_scalars, hash_to_scalar, i2osp, scalar_from_slice},
};

/// BBS+ signature `(A, e, s)`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplusSignature {
    pub A: G1Projective,
    pub e: Scalar,
    pub s: Scalar,
}

impl BBSplusSignature {
    pub const BYTES: usize = 48 + 2 * Scalar::BYTES;

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0..48].copy_from_slice(&self.A.to_affine().to_compressed());
        bytes[48..80].copy_from_slice(&self.e.to_be_bytes());
        bytes[80..112].copy_from_slice(&self.s.to_be_bytes());
        bytes
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() != Self::BYTES {
            return Err(Error::DeserializationError(format!(
                "signature must be {} bytes, got {}",
                Self::BYTES,
                data.len()
            )));
        }
        let A = parse_g1(&data[0..48])?;
        let e = scalar_from_slice(&data[48..80])?;
        let s = scalar_from_slice(&data[80..112])?;
        Ok(Self { A, e, s })
    }

    /// # Description
    /// Signs an ordered list of messages. Every message is mapped to a scalar
    /// and bound to its own generator, so message order is significant.
    ///
    /// # Inputs:
    /// * `messages` (REQUIRED), a vector of octet strings.
    /// * `sk` (REQUIRED), the signer secret key.
    /// * `pk` (REQUIRED), the signer public key.
    ///
    /// # Output:
    /// a [`BBSplusSignature`] or [`Error`].
    pub fn sign<CS, M>(messages: &[M], sk: &BBSplusSecretKey, pk: &BBSplusPublicKey) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS, M>(messages)?;
        let generators = Generators::create::<CS>(pk, message_scalars.len())?;
        core_sign::<CS>(sk, pk, &generators, &message_scalars)
    }

    pub fn verify<CS, M>(&self, pk: &BBSplusPublicKey, messages: &[M]) -> Result<(), Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS, M>(messages)?;
        let generators = Generators::create::<CS>(pk, message_scalars.len())?;
        core_verify::<CS>(pk, self, &generators, &message_scalars)
    }
}

pub(crate) fn parse_g1(slice: &[u8]) -> Result<G1Projective, Error> {
    let bytes = <[u8; 48]>::try_from(slice)
        .map_err(|_| Error::DeserializationError("invalid G1 point length".to_owned()))?;
    Option::<G1Affine>::from(G1Affine::from_compressed(&bytes))
        .map(G1Projective::from)
        .ok_or_else(|| Error::DeserializationError("invalid G1 point".to_owned()))
}

/// `domain = hash_to_scalar(PK || L || Q1 || Q2 || H_1 || ... || H_L || ID)`
pub(crate) fn calculate_domain<CS>(pk: &BBSplusPublicKey, generators: &Generators) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let L = generators.message_generators.len();

    let mut dom_input: Vec<u8> = Vec::new();
    dom_input.extend_from_slice(&pk.to_bytes());
    dom_input.extend_from_slice(&i2osp(L, 8));
    dom_input.extend_from_slice(&generators.q1.to_affine().to_compressed());
    dom_input.extend_from_slice(&generators.q2.to_affine().to_compressed());
    generators
        .message_generators
        .iter()
        .for_each(|p| dom_input.extend_from_slice(&p.to_affine().to_compressed()));
    dom_input.extend_from_slice(CS::ID);

    hash_to_scalar::<CS>(&dom_input, CS::H2S_DST)
}

/// `B = P1 + Q2 * domain + H_1 * m_1 + ... + H_L * m_L` without the `Q1 * s` term
pub(crate) fn calculate_b_without_blinding(
    generators: &Generators,
    domain: Scalar,
    messages: &[(usize, BBSplusMessage)],
) -> Result<G1Projective, Error> {
    let mut B = generators.g1_base_point + generators.q2 * domain;
    for (i, m) in messages {
        let H_i = generators.message_generators.get(*i).ok_or(Error::NotEnoughGenerators)?;
        B += *H_i * m.value;
    }
    Ok(B)
}

pub(crate) fn finalize_sign(sk: &BBSplusSecretKey, B: G1Projective, e: Scalar) -> Result<G1Projective, Error> {
    let sk_e_inv = Option::<Scalar>::from((sk.0 + e).invert())
        .ok_or_else(|| Error::SignatureGenerationError("Invert scalar failed".to_owned()))?;
    let A = B * sk_e_inv;
    if A.is_identity().into() {
        return Err(Error::G1IdentityError);
    }
    Ok(A)
}

fn core_sign<CS>(
    sk: &BBSplusSecretKey,
    pk: &BBSplusPublicKey,
    generators: &Generators,
    messages: &[BBSplusMessage],
) -> Result<BBSplusSignature, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    if generators.message_generators.len() < messages.len() {
        return Err(Error::NotEnoughGenerators);
    }

    let domain = calculate_domain::<CS>(pk, generators)?;
    let random = calculate_random_scalars(2);
    let (e, s) = (random[0], random[1]);

    let indexed: Vec<(usize, BBSplusMessage)> = messages.iter().copied().enumerate().collect();
    let B = calculate_b_without_blinding(generators, domain, &indexed)? + generators.q1 * s;
    let A = finalize_sign(sk, B, e)?;

    Ok(BBSplusSignature { A, e, s })
}

fn core_verify<CS>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    generators: &Generators,
    messages: &[BBSplusMessage],
) -> Result<(), Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    if generators.message_generators.len() < messages.len() {
        return Err(Error::NotEnoughGenerators);
    }

    let domain = calculate_domain::<CS>(pk, generators)?;
    let indexed: Vec<(usize, BBSplusMessage)> = messages.iter().copied().enumerate().collect();
    let B = calculate_b_without_blinding(generators, domain, &indexed)? + generators.q1 * signature.s;

    let BP2 = G2Projective::GENERATOR;
    let A2 = pk.0 + BP2 * signature.e;

    let term1 = (&signature.A.to_affine(), &G2Prepared::from(A2.to_affine()));
    let term2 = (&B.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    if pairing.is_identity().into() {
        Ok(())
    } else {
        Err(Error::SignatureMismatch("pairing check failed".to_owned()))
    }
}
