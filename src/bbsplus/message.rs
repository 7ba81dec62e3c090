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
use elliptic_curve::hash2curve::ExpandMsg;

use super::ciphersuites::BbsCiphersuite;
use crate::{errors::Error, utils::util::hash_to_scalar};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BBSplusMessage {
    pub value: Scalar,
}

impl BBSplusMessage {
    pub fn new(value: Scalar) -> Self {
        Self { value }
    }

    /// https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-bbs-signatures#name-messages-to-scalars
    pub fn map_message_to_scalar_as_hash<CS>(data: &[u8]) -> Result<Self, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
    {
        let scalar = hash_to_scalar::<CS>(data, CS::MAP_MSG_DST).map_err(|_| Error::MapMessageToScalarError)?;
        Ok(Self::new(scalar))
    }

    pub fn messages_to_scalar<CS, M>(messages: &[M]) -> Result<Vec<Self>, Error>
    where
        CS: BbsCiphersuite,
        CS::Expander: for<'a> ExpandMsg<'a>,
        M: AsRef<[u8]>,
    {
        messages
            .iter()
            .map(|m| Self::map_message_to_scalar_as_hash::<CS>(m.as_ref()))
            .collect()
    }
}
