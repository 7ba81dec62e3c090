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

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use super::entry::StatusEntry;
use crate::{credential::Credential, errors::Error};

/// 16 KiB, the smallest list ever produced.
pub const MIN_BYTES_LEN: usize = 1024 << 4;

/// 16 MiB, the largest list `set` will grow to.
pub const MAX_BYTES_LEN: usize = MIN_BYTES_LEN << 10;

/// Status bits, one per credential index.
///
/// Index `i` lives in byte `i >> 3` under mask `1 << (8 - (i & 7))`. The
/// shift is kept as deployed lists use it, so indexes that are a multiple
/// of 8 map to no bit at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitString {
    bits: Vec<u8>,
}

fn mask(index: usize) -> u8 {
    let sub = (index - ((index >> 3) << 3)) as u32;
    1u8.checked_shl(8 - sub).unwrap_or(0)
}

impl Default for BitString {
    fn default() -> Self {
        Self { bits: vec![0u8; MIN_BYTES_LEN] }
    }
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    /// https://w3c.github.io/vc-status-list-2021/#bitstring-generation-algorithm
    ///
    /// Sets the bit of every credential carrying a usable
    /// `StatusList2021Entry`. Entries that cannot be used are skipped.
    pub fn generate(credentials: &[Credential]) -> Self {
        let mut bit_string = Self::new();
        for credential in credentials {
            let Some(entry) = StatusEntry::from_credential(credential) else {
                log::warn!("skipping credential {:?}: no usable status entry", credential.id);
                continue;
            };
            if !entry.is_status_list_entry() {
                log::warn!("skipping status entry of type {}", entry.entry_type);
                continue;
            }
            if entry.is_revoked() {
                continue;
            }
            if let Err(e) = entry.index().and_then(|index| bit_string.set(index)) {
                log::warn!("skipping status entry: {}", e);
            }
        }
        bit_string
    }

    /// Decodes a list produced by [`BitString::encode`].
    pub fn parse(encoded: &str) -> Result<Self, Error> {
        Ok(Self { bits: expand(encoded)? })
    }

    /// Sets the bit of `index`, growing the list up to [`MAX_BYTES_LEN`].
    pub fn set(&mut self, index: usize) -> Result<(), Error> {
        let byte = index >> 3;
        if byte >= MAX_BYTES_LEN {
            return Err(Error::InvalidInput(format!("status index {} exceeds the list capacity", index)));
        }
        if byte >= self.bits.len() {
            self.bits.resize(byte + 1, 0);
        }
        self.bits[byte] |= mask(index);
        Ok(())
    }

    pub fn check(&self, index: usize) -> Result<bool, Error> {
        let byte = self
            .bits
            .get(index >> 3)
            .ok_or_else(|| Error::InvalidInput(format!("status index {} out of range", index)))?;
        Ok(byte & mask(index) != 0)
    }

    pub fn encode(&self) -> Result<String, Error> {
        compress(&self.bits)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

/// gzip then unpadded base64.
pub fn compress(bits: &[u8]) -> Result<String, Error> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bits).map_err(|e| Error::encoding("gzip", e))?;
    let compressed = encoder.finish().map_err(|e| Error::encoding("gzip", e))?;
    Ok(STANDARD_NO_PAD.encode(compressed))
}

/// https://w3c.github.io/vc-status-list-2021/#bitstring-expansion-algorithm
pub fn expand(encoded: &str) -> Result<Vec<u8>, Error> {
    let compressed = STANDARD_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|e| Error::encoding("status list base64", e))?;
    let mut bits = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(MAX_BYTES_LEN as u64 + 1)
        .read_to_end(&mut bits)
        .map_err(|e| Error::encoding("gzip", e))?;
    if bits.len() > MAX_BYTES_LEN {
        return Err(Error::encoding("status list", "expanded list exceeds the list capacity"));
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn with_status(index: &str, purpose: &str, entry_type: &str) -> Credential {
        Credential::from_value(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1", "https://w3id.org/vc/status-list/2021/v1"],
            "type": ["VerifiableCredential"],
            "credentialSubject": {"id": "did:example:subject"},
            "credentialStatus": {
                "id": "https://example.com/status/1#0",
                "type": entry_type,
                "statusPurpose": purpose,
                "statusListIndex": index,
                "statusListCredential": "https://example.com/status/1"
            }
        }))
        .unwrap()
    }

    #[test]
    fn minimum_size() {
        assert_eq!(MIN_BYTES_LEN, 16 * 1024);
        assert_eq!(BitString::new().as_bytes().len(), MIN_BYTES_LEN);
    }

    #[test]
    fn bit_layout() {
        let mut bits = BitString::new();
        bits.set(5).unwrap();
        assert_eq!(bits.as_bytes()[0], 1 << 3);
        bits.set(9).unwrap();
        assert_eq!(bits.as_bytes()[1], 1 << 7);
        bits.set(16).unwrap();
        assert_eq!(bits.as_bytes()[2], 0);
        assert!(!bits.check(16).unwrap());
    }

    #[test]
    fn generate_and_check() {
        let creds = vec![
            with_status("1", "revocation", "StatusList2021Entry"),
            with_status("5", "revocation", "StatusList2021Entry"),
            with_status("3", "revoked", "StatusList2021Entry"),
            with_status("6", "revocation", "RevocationList2020Status"),
            with_status("x", "revocation", "StatusList2021Entry"),
            Credential::new(),
        ];
        let bits = BitString::parse(&BitString::generate(&creds).encode().unwrap()).unwrap();
        assert!(bits.check(5).unwrap());
        assert!(bits.check(1).unwrap());
        assert!(!bits.check(4).unwrap());
        assert!(!bits.check(3).unwrap());
        assert!(!bits.check(6).unwrap());
        assert!(bits.check(MIN_BYTES_LEN * 8).is_err());
    }

    #[test]
    fn large_index_grows_the_list() {
        let index = MIN_BYTES_LEN * 8 + 3;
        let bits = BitString::generate(&[with_status(&index.to_string(), "revocation", "StatusList2021Entry")]);
        assert!(bits.check(index).unwrap());
    }

    #[test]
    fn oversized_index_is_skipped() {
        let creds = vec![
            with_status("18446744073709551615", "revocation", "StatusList2021Entry"),
            with_status(&(MAX_BYTES_LEN * 8).to_string(), "revocation", "StatusList2021Entry"),
            with_status("5", "revocation", "StatusList2021Entry"),
        ];
        let bits = BitString::generate(&creds);
        assert_eq!(bits.as_bytes().len(), MIN_BYTES_LEN);
        assert!(bits.check(5).unwrap());

        let mut bits = BitString::new();
        assert!(matches!(bits.set(usize::MAX), Err(Error::InvalidInput(_))));
        assert!(bits.set(MAX_BYTES_LEN * 8 - 1).is_ok());
        assert_eq!(bits.as_bytes().len(), MAX_BYTES_LEN);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(BitString::parse("***"), Err(Error::EncodingError { .. })));
        assert!(matches!(BitString::parse("aGVsbG8"), Err(Error::EncodingError { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn expand_inverts_compress(bits in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(expand(&compress(&bits).unwrap()).unwrap(), bits);
        }

        #[test]
        fn check_reflects_set(indexes in proptest::collection::btree_set(0usize..(MIN_BYTES_LEN * 8), 1..32)) {
            let mut bits = BitString::new();
            for &i in &indexes {
                bits.set(i).unwrap();
            }
            let bits = BitString::parse(&bits.encode().unwrap()).unwrap();
            for i in 0..(MIN_BYTES_LEN * 8) {
                let expected = indexes.contains(&i) && i % 8 != 0;
                prop_assert_eq!(bits.check(i).unwrap(), expected);
            }
        }
    }
}
