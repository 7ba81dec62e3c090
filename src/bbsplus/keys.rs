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

use bls12_381_plus::{G2Affine, G2Projective, Scalar};
use elliptic_curve::{group::Curve, hash2curve::ExpandMsg};
use rand::RngCore;

use super::ciphersuites::BbsCiphersuite;
use crate::{
    errors::Error,
    utils::util::{hash_to_scalar, i2osp, scalar_from_slice},
};

/// Compressed G2 point, 96 bytes
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplusPublicKey(pub G2Projective);

impl BBSplusPublicKey {
    pub const BYTES: usize = G2Affine::COMPRESSED_BYTES;

    pub fn to_bytes(&self) -> [u8; G2Affine::COMPRESSED_BYTES] {
        self.0.to_affine().to_compressed()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; G2Affine::COMPRESSED_BYTES] =
            bytes.try_into().map_err(|_| Error::KeyDeserializationError)?;
        let g2 = Option::<G2Affine>::from(G2Affine::from_compressed(&bytes))
            .ok_or(Error::KeyDeserializationError)?;
        Ok(Self(G2Projective::from(g2)))
    }

    pub fn decode(hex_str: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex_str).map_err(|_| Error::KeyDeserializationError)?;
        Self::from_bytes(&bytes)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BBSplusSecretKey(pub Scalar);

impl BBSplusSecretKey {
    /// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures#name-secret-key
    ///
    /// # Inputs:
    /// * `key_material` (REQUIRED), at least 32 bytes of random material.
    /// * `key_info` (OPTIONAL), context bound into the derived key.
    ///
    /// # Output:
    /// a [`BBSplusSecretKey`] or [`Error`].
    pub fn generate<CS>(key_material: &[u8], key_info: &[u8]) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        if key_material.len() < 32 {
            return Err(Error::KeyGenError("key_material too short, MUST be at least 32 bytes".to_owned()));
        }
        if key_info.len() > 65535 {
            return Err(Error::KeyGenError("key_info too long".to_owned()));
        }

        let mut derive_input = key_material.to_vec();
        derive_input.extend_from_slice(&i2osp(key_info.len(), 2));
        derive_input.extend_from_slice(key_info);

        let sk = hash_to_scalar::<CS>(&derive_input, CS::KEYGEN_DST)?;
        Ok(Self(sk))
    }

    pub fn random<CS>() -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let mut key_material = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key_material);
        Self::generate::<CS>(&key_material, b"")
    }

    pub fn public_key(&self) -> BBSplusPublicKey {
        BBSplusPublicKey(G2Projective::GENERATOR * self.0)
    }

    //in BE order
    pub fn to_bytes(&self) -> [u8; Scalar::BYTES] {
        self.0.to_be_bytes()
    }

    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        scalar_from_slice(bytes)
            .map(Self)
            .map_err(|_| Error::KeyDeserializationError)
    }

    pub fn decode(hex_str: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex_str).map_err(|_| Error::KeyDeserializationError)?;
        Self::from_bytes(&bytes)
    }
}
