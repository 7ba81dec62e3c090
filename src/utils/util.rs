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

use bls12_381_plus::Scalar;
use elliptic_curve::hash2curve::{ExpandMsg, Expander};
use ff::Field;
use rand::RngCore;

use crate::{bbsplus::ciphersuites::BbsCiphersuite, errors::Error};

/// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures#name-hash-to-scalar
///
/// # Description
/// Hashes an arbitrary octet string into a non-zero scalar using the
/// ciphersuite expander. A one byte counter is appended to the message and
/// incremented until the output is not zero.
///
/// # Inputs:
/// * `msg_octets` (REQUIRED), an octet string.
/// * `dst` (REQUIRED), the domain separation tag.
///
/// # Output:
/// a [`Scalar`] or [`Error`].
pub fn hash_to_scalar<CS>(msg_octets: &[u8], dst: &[u8]) -> Result<Scalar, Error>
where
    CS: BbsCiphersuite,
    CS::Expander: for<'a> ExpandMsg<'a>,
{
    let mut uniform_bytes = [0u8; 48];
    let mut counter: u8 = 0;

    loop {
        let msg_prime = [msg_octets, &[counter]].concat();
        CS::Expander::expand_message(&[&msg_prime], &[dst], CS::EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);

        let hashed_scalar = Scalar::from_okm(&uniform_bytes);
        if !bool::from(hashed_scalar.is_zero()) {
            return Ok(hashed_scalar);
        }

        counter = counter.checked_add(1).ok_or(Error::HashToScalarError)?;
    }
}

/// Integer to big-endian octet string of `len` bytes
pub fn i2osp(value: usize, len: usize) -> Vec<u8> {
    let bytes = (value as u64).to_be_bytes();
    if len >= bytes.len() {
        let mut out = vec![0u8; len - bytes.len()];
        out.extend_from_slice(&bytes);
        out
    } else {
        bytes[bytes.len() - len..].to_vec()
    }
}

/// Big-endian octet string to integer
pub fn os2ip(bytes: &[u8]) -> usize {
    bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize)
}

pub fn calculate_random_scalars(count: usize) -> Vec<Scalar> {
    let mut rng = rand::thread_rng();
    let mut random_scalars = Vec::with_capacity(count);
    for _ in 0..count {
        let mut buf = [0u8; 48];
        rng.fill_bytes(&mut buf);
        random_scalars.push(Scalar::from_okm(&buf));
    }
    random_scalars
}

/// 32 random bytes, for presentation and issuance nonces.
pub fn generate_nonce() -> Vec<u8> {
    let mut nonce = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

pub fn get_remaining_indexes(length: usize, indexes: &[usize]) -> Vec<usize> {
    (0..length).filter(|i| !indexes.contains(i)).collect()
}

pub fn get_messages<T: Copy>(messages: &[T], indexes: &[usize]) -> Vec<T> {
    indexes.iter().map(|&i| messages[i]).collect()
}

pub(crate) fn scalar_from_slice(bytes: &[u8]) -> Result<Scalar, Error> {
    let array = <[u8; Scalar::BYTES]>::try_from(bytes)
        .map_err(|_| Error::DeserializationError("invalid scalar length".to_owned()))?;
    Option::<Scalar>::from(Scalar::from_be_bytes(&array))
        .ok_or_else(|| Error::DeserializationError("invalid scalar".to_owned()))
}
