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

use bls12_381_plus::{multi_miller_loop, G1Projective, G2Prepared, G2Projective, Scalar};
use elliptic_curve::{group::Curve, hash2curve::ExpandMsg, Group};

use super::{
    ciphersuites::BbsCiphersuite,
    generators::Generators,
    keys::BBSplusPublicKey,
    message::BBSplusMessage,
    signature::{calculate_b_without_blinding, calculate_domain, parse_g1, BBSplusSignature},
};
use crate::{
    errors::Error,
    utils::util::{
        calculate_random_scalars, get_messages, get_remaining_indexes, hash_to_scalar, i2osp, os2ip, scalar_from_slice,
    },
};

/// Zero-knowledge proof of knowledge of a BBS+ signature, disclosing a subset
/// of the signed messages.
///
/// The encoded proof is self-describing: it starts with the total number of
/// signed messages and the disclosed indexes, so a verifier only needs the
/// disclosed messages in ascending index order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BBSplusPoKSignature {
    L: usize,
    disclosed_indexes: Vec<usize>,
    Abar: G1Projective,
    Bbar: G1Projective,
    D: G1Projective,
    e_cap: Scalar,
    r1_cap: Scalar,
    r3_cap: Scalar,
    s_cap: Scalar,
    m_cap: Vec<Scalar>,
    challenge: Scalar,
}

struct ProofInitResult {
    Abar: G1Projective,
    Bbar: G1Projective,
    D: G1Projective,
    T1: G1Projective,
    T2: G1Projective,
    domain: Scalar,
}

impl BBSplusPoKSignature {
    const HEADER_INT_LEN: usize = 4;
    const FIXED_LEN: usize = 3 * 48 + 5 * 32;

    pub fn message_count(&self) -> usize {
        self.L
    }

    pub fn disclosed_indexes(&self) -> &[usize] {
        &self.disclosed_indexes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();

        bytes.extend_from_slice(&i2osp(self.L, Self::HEADER_INT_LEN));
        bytes.extend_from_slice(&i2osp(self.disclosed_indexes.len(), Self::HEADER_INT_LEN));
        self.disclosed_indexes
            .iter()
            .for_each(|&i| bytes.extend_from_slice(&i2osp(i, Self::HEADER_INT_LEN)));

        bytes.extend_from_slice(&self.Abar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.Bbar.to_affine().to_compressed());
        bytes.extend_from_slice(&self.D.to_affine().to_compressed());
        bytes.extend_from_slice(&self.e_cap.to_be_bytes());
        bytes.extend_from_slice(&self.r1_cap.to_be_bytes());
        bytes.extend_from_slice(&self.r3_cap.to_be_bytes());
        bytes.extend_from_slice(&self.s_cap.to_be_bytes());
        self.m_cap.iter().for_each(|v| bytes.extend_from_slice(&v.to_be_bytes()));
        bytes.extend_from_slice(&self.challenge.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let invalid = |msg: &str| Error::DeserializationError(format!("invalid proof: {}", msg));
        let n = Self::HEADER_INT_LEN;

        if bytes.len() < 2 * n {
            return Err(invalid("too short"));
        }
        let L = os2ip(&bytes[0..n]);
        let R = os2ip(&bytes[n..2 * n]);
        if R > L {
            return Err(invalid("more disclosed messages than signed messages"));
        }
        let U = L - R;

        let header_len = 2 * n + R * n;
        if bytes.len() != header_len + Self::FIXED_LEN + U * 32 {
            return Err(invalid("unexpected length"));
        }

        let disclosed_indexes: Vec<usize> = bytes[2 * n..header_len].chunks_exact(n).map(os2ip).collect();
        if disclosed_indexes.windows(2).any(|w| w[0] >= w[1]) || disclosed_indexes.iter().any(|&i| i >= L) {
            return Err(invalid("disclosed indexes not valid"));
        }

        let body = &bytes[header_len..];
        let Abar = parse_g1(&body[0..48])?;
        let Bbar = parse_g1(&body[48..96])?;
        let D = parse_g1(&body[96..144])?;
        let e_cap = scalar_from_slice(&body[144..176])?;
        let r1_cap = scalar_from_slice(&body[176..208])?;
        let r3_cap = scalar_from_slice(&body[208..240])?;
        let s_cap = scalar_from_slice(&body[240..272])?;

        let mut m_cap: Vec<Scalar> = body[272..]
            .chunks_exact(32)
            .map(scalar_from_slice)
            .collect::<Result<_, _>>()?;
        // at least the challenge is present, even if every message is disclosed
        let challenge = m_cap.pop().ok_or_else(|| invalid("missing challenge"))?;

        Ok(Self { L, disclosed_indexes, Abar, Bbar, D, e_cap, r1_cap, r3_cap, s_cap, m_cap, challenge })
    }

    /// # Description
    /// Computes a zero-knowledge proof of knowledge of `signature` that discloses
    /// the messages at `disclosed_indexes` and hides the others together with
    /// the signature blinding scalar.
    ///
    /// # Inputs:
    /// * `signature` (REQUIRED), a valid signature over `messages`.
    /// * `pk` (REQUIRED), the signer public key.
    /// * `messages` (REQUIRED), every signed message in signing order.
    /// * `disclosed_indexes` (REQUIRED), indexes of the messages to reveal.
    /// * `nonce` (OPTIONAL), presentation nonce bound into the challenge.
    ///
    /// # Output:
    /// a [`BBSplusPoKSignature`] or [`Error`].
    pub fn proof_gen<CS, M>(
        signature: &BBSplusSignature,
        pk: &BBSplusPublicKey,
        messages: &[M],
        disclosed_indexes: &[usize],
        nonce: Option<&[u8]>,
    ) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS, M>(messages)?;
        let generators = Generators::create::<CS>(pk, message_scalars.len())?;
        core_proof_gen::<CS>(pk, signature, &generators, &message_scalars, disclosed_indexes, nonce)
    }

    pub fn proof_verify<CS, M>(
        &self,
        pk: &BBSplusPublicKey,
        disclosed_messages: &[M],
        nonce: Option<&[u8]>,
    ) -> Result<(), Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        let message_scalars = BBSplusMessage::messages_to_scalar::<CS, M>(disclosed_messages)?;
        let generators = Generators::create::<CS>(pk, self.L)?;
        core_proof_verify::<CS>(pk, self, &generators, &message_scalars, nonce)
    }
}

fn core_proof_gen<CS>(
    pk: &BBSplusPublicKey,
    signature: &BBSplusSignature,
    generators: &Generators,
    messages: &[BBSplusMessage],
    disclosed_indexes: &[usize],
    nonce: Option<&[u8]>,
) -> Result<BBSplusPoKSignature, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let L = messages.len();
    let mut disclosed_indexes = disclosed_indexes.to_vec();
    disclosed_indexes.sort_unstable();
    disclosed_indexes.dedup();

    if let Some(invalid_index) = disclosed_indexes.iter().find(|&&i| i >= L) {
        return Err(Error::ProofGenError(format!("Invalid disclosed index: {}", invalid_index)));
    }
    if generators.message_generators.len() != L {
        return Err(Error::NotEnoughGenerators);
    }

    let undisclosed_indexes = get_remaining_indexes(L, &disclosed_indexes);
    let U = undisclosed_indexes.len();

    let disclosed_messages = get_messages(messages, &disclosed_indexes);
    let undisclosed_messages = get_messages(messages, &undisclosed_indexes);

    let random_scalars = calculate_random_scalars(6 + U);
    let r1 = random_scalars[0];
    let r2 = random_scalars[1];
    let e_tilde = random_scalars[2];
    let r1_tilde = random_scalars[3];
    let r3_tilde = random_scalars[4];
    let s_tilde = random_scalars[5];
    let m_tilde = &random_scalars[6..];

    let domain = calculate_domain::<CS>(pk, generators)?;
    let indexed: Vec<(usize, BBSplusMessage)> = messages.iter().copied().enumerate().collect();
    let B = calculate_b_without_blinding(generators, domain, &indexed)? + generators.q1 * signature.s;

    let D = B * r2;
    let Abar = signature.A * (r1 * r2);
    let Bbar = D * r1 - Abar * signature.e;

    let T1 = Abar * e_tilde + D * r1_tilde;
    let mut T2 = D * r3_tilde + generators.q1 * s_tilde;
    for (j, &i) in undisclosed_indexes.iter().enumerate() {
        T2 += generators.message_generators[i] * m_tilde[j];
    }

    let init_res = ProofInitResult { Abar, Bbar, D, T1, T2, domain };
    let challenge = proof_challenge_calculate::<CS>(&init_res, &disclosed_indexes, &disclosed_messages, nonce)?;

    let r3 = Option::<Scalar>::from(r2.invert())
        .ok_or_else(|| Error::ProofGenError("Invert scalar failed".to_owned()))?;

    let e_cap = e_tilde + signature.e * challenge;
    let r1_cap = r1_tilde - r1 * challenge;
    let r3_cap = r3_tilde - r3 * challenge;
    let s_cap = s_tilde + signature.s * challenge;
    let m_cap: Vec<Scalar> = undisclosed_messages
        .iter()
        .zip(m_tilde)
        .map(|(m, m_t)| m_t + m.value * challenge)
        .collect();

    Ok(BBSplusPoKSignature {
        L,
        disclosed_indexes,
        Abar,
        Bbar,
        D,
        e_cap,
        r1_cap,
        r3_cap,
        s_cap,
        m_cap,
        challenge,
    })
}

fn proof_challenge_calculate<CS>(
    init_res: &ProofInitResult,
    disclosed_indexes: &[usize],
    disclosed_messages: &[BBSplusMessage],
    nonce: Option<&[u8]>,
) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let R = disclosed_indexes.len();
    if disclosed_messages.len() != R {
        return Err(Error::ProofGenError(
            "Number of disclosed indexes different from number of disclosed messages".to_owned(),
        ));
    }
    let nonce = nonce.unwrap_or(b"");

    let mut c_arr: Vec<u8> = Vec::new();
    c_arr.extend_from_slice(&init_res.Abar.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.Bbar.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.D.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.T1.to_affine().to_compressed());
    c_arr.extend_from_slice(&init_res.T2.to_affine().to_compressed());
    c_arr.extend_from_slice(&i2osp(R, 8));
    disclosed_indexes.iter().for_each(|&i| c_arr.extend_from_slice(&i2osp(i, 8)));
    disclosed_messages.iter().for_each(|m| c_arr.extend_from_slice(&m.value.to_be_bytes()));
    c_arr.extend_from_slice(&init_res.domain.to_be_bytes());
    c_arr.extend_from_slice(&i2osp(nonce.len(), 8));
    c_arr.extend_from_slice(nonce);

    hash_to_scalar::<CS>(&c_arr, CS::H2S_DST)
}

fn core_proof_verify<CS>(
    pk: &BBSplusPublicKey,
    proof: &BBSplusPoKSignature,
    generators: &Generators,
    disclosed_messages: &[BBSplusMessage],
    nonce: Option<&[u8]>,
) -> Result<(), Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let R = proof.disclosed_indexes.len();
    if disclosed_messages.len() != R {
        return Err(Error::PoKSVerificationError(format!(
            "expected {} disclosed messages, got {}",
            R,
            disclosed_messages.len()
        )));
    }
    if proof.Abar.is_identity().into() {
        return Err(Error::PoKSVerificationError("Abar == Identity_G1".to_owned()));
    }

    let undisclosed_indexes = get_remaining_indexes(proof.L, &proof.disclosed_indexes);
    if undisclosed_indexes.len() != proof.m_cap.len() {
        return Err(Error::PoKSVerificationError("len m_cap != len undisclosed indexes".to_owned()));
    }

    let domain = calculate_domain::<CS>(pk, generators)?;

    let T1 = proof.Bbar * proof.challenge + proof.Abar * proof.e_cap + proof.D * proof.r1_cap;

    let disclosed: Vec<(usize, BBSplusMessage)> =
        proof.disclosed_indexes.iter().copied().zip(disclosed_messages.iter().copied()).collect();
    let Bv = calculate_b_without_blinding(generators, domain, &disclosed)?;

    let mut T2 = Bv * proof.challenge + proof.D * proof.r3_cap + generators.q1 * proof.s_cap;
    for (j, &i) in undisclosed_indexes.iter().enumerate() {
        T2 += generators.message_generators[i] * proof.m_cap[j];
    }

    let init_res = ProofInitResult { Abar: proof.Abar, Bbar: proof.Bbar, D: proof.D, T1, T2, domain };
    let challenge = proof_challenge_calculate::<CS>(&init_res, &proof.disclosed_indexes, disclosed_messages, nonce)?;

    if proof.challenge != challenge {
        return Err(Error::PoKSVerificationError("invalid challenge".to_owned()));
    }

    let BP2 = G2Projective::GENERATOR;
    let term1 = (&proof.Abar.to_affine(), &G2Prepared::from(pk.0.to_affine()));
    let term2 = (&proof.Bbar.to_affine(), &G2Prepared::from(-BP2.to_affine()));

    let pairing = multi_miller_loop(&[term1, term2]).final_exponentiation();

    if pairing.is_identity().into() {
        Ok(())
    } else {
        Err(Error::PoKSVerificationError("Invalid Proof".to_owned()))
    }
}
