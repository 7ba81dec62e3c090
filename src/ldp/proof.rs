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

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::jws::Jws;
use crate::errors::Error;

pub const DEFAULT_PROOF_PURPOSE: &str = "assertionMethod";

/// Where the signature value of a proof lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignatureRepresentation {
    /// `proofValue` holds the encoded signature.
    #[default]
    ProofValue,
    /// `jws` holds a detached JWS.
    Jws,
}

impl TryFrom<u8> for SignatureRepresentation {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ProofValue),
            1 => Ok(Self::Jws),
            other => Err(Error::UnsupportedRepresentation(other.to_string())),
        }
    }
}

impl From<SignatureRepresentation> for u8 {
    fn from(value: SignatureRepresentation) -> Self {
        match value {
            SignatureRepresentation::ProofValue => 0,
            SignatureRepresentation::Jws => 1,
        }
    }
}

/// Signer side description of the proof to build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedDataProofContext {
    pub signature_type: String,
    #[serde(default)]
    pub representation: SignatureRepresentation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_chain: Option<Vec<Value>>,
}

impl LinkedDataProofContext {
    pub fn new(signature_type: &str, verification_method: &str) -> Self {
        Self {
            signature_type: signature_type.to_owned(),
            verification_method: Some(verification_method.to_owned()),
            ..Default::default()
        }
    }

    /// Requires a signature type and fills `created` (now) and `purpose`
    /// (`assertionMethod`) when they are not set.
    pub fn validate(&mut self) -> Result<(), Error> {
        if self.signature_type.is_empty() {
            return Err(Error::MissingField("signature type".to_owned()));
        }
        match &self.created {
            Some(created) => {
                parse_created(created)?;
            }
            None => self.created = Some(now()),
        }
        if self.purpose.as_deref().map_or(true, str::is_empty) {
            self.purpose = Some(DEFAULT_PROOF_PURPOSE.to_owned());
        }
        Ok(())
    }
}

/// Current UTC time, RFC 3339 with second precision.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_created(created: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(created)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("created is not an RFC 3339 timestamp: {}", e)))
}

/// Linked data proof attached to a credential or presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub proof_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// base64 of the raw nonce bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_chain: Option<Vec<Value>>,
}

impl Proof {
    /// Fresh proof for a signing operation. With the JWS representation the
    /// `jws` field starts as `header..`, the signature being appended later.
    pub fn from_context(ctx: &LinkedDataProofContext, alg: &str) -> Self {
        let jws = match ctx.representation {
            SignatureRepresentation::Jws => Some(format!("{}..", Jws::new_header(alg))),
            SignatureRepresentation::ProofValue => None,
        };
        Self {
            proof_type: ctx.signature_type.clone(),
            created: ctx.created.clone(),
            verification_method: ctx.verification_method.clone(),
            proof_purpose: ctx.purpose.clone(),
            domain: ctx.domain.clone(),
            challenge: ctx.challenge.clone(),
            capability_chain: ctx.capability_chain.clone(),
            jws,
            ..Default::default()
        }
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let proof: Proof = serde_json::from_value(value.clone())?;
        if let Some(created) = &proof.created {
            parse_created(created)?;
        }
        Ok(proof)
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn representation(&self) -> SignatureRepresentation {
        if self.proof_value.is_none() && self.jws.is_some() {
            SignatureRepresentation::Jws
        } else {
            SignatureRepresentation::ProofValue
        }
    }

    pub fn public_key_id(&self) -> Result<&str, Error> {
        fn non_empty(id: &Option<String>) -> Option<&str> {
            id.as_deref().filter(|id| !id.is_empty())
        }
        non_empty(&self.verification_method)
            .or_else(|| non_empty(&self.creator))
            .ok_or_else(|| Error::MissingField("verificationMethod".to_owned()))
    }

    pub fn nonce_bytes(&self) -> Result<Option<Vec<u8>>, Error> {
        self.nonce.as_deref().map(decode_base64).transpose()
    }

    pub fn set_nonce(&mut self, nonce: &[u8]) {
        self.nonce = Some(STANDARD.encode(nonce));
    }

    /// Raw signature (or derived proof) bytes carried by this proof.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, Error> {
        match self.representation() {
            SignatureRepresentation::ProofValue => {
                let value = self
                    .proof_value
                    .as_deref()
                    .ok_or_else(|| Error::MissingField("proofValue".to_owned()))?;
                decode_base64(value)
            }
            SignatureRepresentation::Jws => {
                let jws = self.jws.as_deref().ok_or_else(|| Error::MissingField("jws".to_owned()))?;
                Jws::parse(jws)?.signature_bytes()
            }
        }
    }

    pub fn apply_signature_value(&mut self, representation: SignatureRepresentation, signature: &[u8]) {
        let encoded = URL_SAFE_NO_PAD.encode(signature);
        match representation {
            SignatureRepresentation::ProofValue => self.proof_value = Some(encoded),
            SignatureRepresentation::Jws => self.jws.get_or_insert_with(String::new).push_str(&encoded),
        }
    }
}

/// Accepts URL-safe unpadded, standard padded and standard unpadded base64.
pub fn decode_base64(value: &str) -> Result<Vec<u8>, Error> {
    URL_SAFE_NO_PAD
        .decode(value)
        .or_else(|_| STANDARD.decode(value))
        .or_else(|_| STANDARD_NO_PAD.decode(value))
        .map_err(|e| Error::encoding("base64", e))
}
