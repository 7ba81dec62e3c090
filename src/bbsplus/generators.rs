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

use bls12_381_plus::G1Projective;
use elliptic_curve::hash2curve::{ExpandMsg, Expander};

use super::{ciphersuites::BbsCiphersuite, keys::BBSplusPublicKey};
use crate::{errors::Error, utils::util::i2osp};

/// Points used by a BBS+ signature over `message_generators.len()` messages.
///
/// * `g1_base_point` (P1) is fixed by the ciphersuite
/// * `q1` carries the signature blinding scalar `s`
/// * `q2` carries the domain
/// * `message_generators` H_1..H_L, one per message
///
/// Everything except the base point is seeded by the signer public key, so the
/// holder and the issuer derive the same generators independently.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Generators {
    pub g1_base_point: G1Projective,
    pub q1: G1Projective,
    pub q2: G1Projective,
    pub message_generators: Vec<G1Projective>,
}

impl Generators {
    pub fn create<CS>(pk: &BBSplusPublicKey, len: usize) -> Result<Generators, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let seed = pk.to_bytes();
        let mut points = Self::create_generators::<CS>(&seed, len + 2)?;
        let message_generators = points.split_off(2);

        Ok(Generators {
            g1_base_point: Self::create_g1_base_point::<CS>()?,
            q1: points[0],
            q2: points[1],
            message_generators,
        })
    }

    fn create_generators<CS>(seed: &[u8], count: usize) -> Result<Vec<G1Projective>, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let mut generators: Vec<G1Projective> = Vec::with_capacity(count);

        let mut v = vec![0u8; CS::EXPAND_LEN];
        let mut buffer = vec![0u8; CS::EXPAND_LEN];

        CS::Expander::expand_message(&[seed], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
            .map_err(|_| Error::NotEnoughGenerators)?
            .fill_bytes(&mut v);

        let mut n = 1usize;
        while generators.len() < count {
            v.extend_from_slice(&i2osp(n, 4));
            CS::Expander::expand_message(&[&v], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
                .map_err(|_| Error::NotEnoughGenerators)?
                .fill_bytes(&mut buffer);
            v = buffer.clone();
            n += 1;

            let candidate = G1Projective::hash::<CS::Expander>(&v, CS::GENERATOR_DST);
            if !generators.contains(&candidate) {
                generators.push(candidate);
            }
        }

        Ok(generators)
    }

    fn create_g1_base_point<CS>() -> Result<G1Projective, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let mut v = vec![0u8; CS::EXPAND_LEN];
        let mut buffer = vec![0u8; CS::EXPAND_LEN];

        CS::Expander::expand_message(&[CS::GENERATOR_SEED_BP], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
            .map_err(|_| Error::NotEnoughGenerators)?
            .fill_bytes(&mut v);

        v.extend_from_slice(&i2osp(1, 4));
        CS::Expander::expand_message(&[&v], &[CS::GENERATOR_SEED_DST], CS::EXPAND_LEN)
            .map_err(|_| Error::NotEnoughGenerators)?
            .fill_bytes(&mut buffer);

        Ok(G1Projective::hash::<CS::Expander>(&buffer, CS::GENERATOR_DST))
    }
}
