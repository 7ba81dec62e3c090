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

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;

use crate::errors::Error;

const PARTS: usize = 3;

/// Detached JWS (RFC 7797) as stored in a proof `jws` field:
/// `header..signature`, the payload segment left empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jws {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

impl Jws {
    /// base64url(`{"alg":alg,"b64":false,"crit":["b64"]}`)
    pub fn new_header(alg: &str) -> String {
        let header = json!({"alg": alg, "b64": false, "crit": ["b64"]});
        URL_SAFE_NO_PAD.encode(header.to_string())
    }

    pub fn parse(jws: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = jws.split('.').collect();
        if parts.len() != PARTS {
            return Err(Error::encoding("jws", format!("expected {} segments, got {}", PARTS, parts.len())));
        }
        Ok(Self {
            header: parts[0].to_owned(),
            payload: parts[1].to_owned(),
            signature: parts[2].to_owned(),
        })
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>, Error> {
        URL_SAFE_NO_PAD.decode(&self.signature).map_err(|e| Error::encoding("jws signature", e))
    }
}
