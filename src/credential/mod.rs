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

//! W3C verifiable credential model and the linked data proof operations on it.

#[cfg(feature = "bbsplus_blind")]
pub mod blind;
pub mod disclosure;
pub mod linked_data_proof;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{errors::Error, ldp::Proof, processor::context::CREDENTIALS_V1_URL};

pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// A single value or a list of them, as JSON-LD allows for most members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(value)
    }

    /// Turns a single value into a list before pushing.
    pub fn push(self, value: T) -> Self {
        match self {
            OneOrMany::One(first) => OneOrMany::Many(vec![first, value]),
            OneOrMany::Many(mut values) => {
                values.push(value);
                OneOrMany::Many(values)
            }
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(rename = "@context")]
    pub context: OneOrMany<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub types: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneOrMany<Proof>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_service: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_use: Option<Value>,
    /// Members not modelled above, kept as they are.
    #[serde(flatten)]
    pub custom_fields: Map<String, Value>,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            context: OneOrMany::Many(vec![Value::String(CREDENTIALS_V1_URL.to_owned())]),
            id: None,
            types: OneOrMany::Many(vec![VERIFIABLE_CREDENTIAL.to_owned()]),
            credential_subject: None,
            issuer: None,
            issuance_date: None,
            expiration_date: None,
            valid_from: None,
            valid_until: None,
            proof: None,
            credential_status: None,
            evidence: None,
            name: None,
            description: None,
            holder: None,
            credential_schema: None,
            refresh_service: None,
            terms_of_use: None,
            custom_fields: Map::new(),
        }
    }
}

impl Credential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Appends `proof`. The first proof is stored alone, later ones turn the
    /// member into a list.
    pub fn add_proof(&mut self, proof: Proof) {
        self.proof = Some(match self.proof.take() {
            None => OneOrMany::One(proof),
            Some(proofs) => proofs.push(proof),
        });
    }

    pub fn proofs(&self) -> &[Proof] {
        self.proof.as_ref().map(OneOrMany::as_slice).unwrap_or_default()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proof(n: u8) -> Proof {
        Proof {
            proof_type: "BbsBlsSignature2020".to_owned(),
            created: Some("2024-01-01T00:00:00Z".to_owned()),
            proof_value: Some(format!("sig{}", n)),
            ..Default::default()
        }
    }

    #[test]
    fn add_proof_appends() {
        let mut cred = Credential::new();
        assert!(cred.proofs().is_empty());
        cred.add_proof(proof(1));
        assert!(matches!(cred.proof, Some(OneOrMany::One(_))));
        cred.add_proof(proof(2));
        cred.add_proof(proof(3));
        let values: Vec<_> = cred.proofs().iter().map(|p| p.proof_value.clone().unwrap()).collect();
        assert_eq!(values, vec!["sig1", "sig2", "sig3"]);
    }

    #[test]
    fn keeps_custom_fields() {
        let doc = json!({
            "@context": "https://www.w3.org/2018/credentials/v1",
            "id": "urn:uuid:1",
            "type": "VerifiableCredential",
            "issuer": {"id": "did:example:issuer", "name": "Example University"},
            "credentialSubject": {"id": "did:example:subject"},
            "proof": {"type": "BbsBlsSignature2020", "created": "2024-01-01T00:00:00Z", "proofValue": "abc"},
            "credentialStatus": {"type": "StatusList2021Entry", "statusListIndex": "5"},
            "custom": {"nested": [1, 2, 3]}
        });
        let cred = Credential::from_value(doc.clone()).unwrap();
        assert_eq!(cred.custom_fields.get("custom"), Some(&json!({"nested": [1, 2, 3]})));
        assert_eq!(cred.proofs().len(), 1);
        assert_eq!(cred.to_value().unwrap(), doc);
        assert_eq!(Credential::from_bytes(cred.to_string().as_bytes()).unwrap(), cred);
    }

    #[test]
    fn requires_context_and_type() {
        assert!(Credential::from_value(json!({"id": "urn:uuid:1"})).is_err());
    }
}
