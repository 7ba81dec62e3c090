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

//! Verifiable presentations: credentials wrapped and signed by a holder.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    credential::{
        linked_data_proof::{create_proof, verify_proofs},
        Credential, OneOrMany,
    },
    errors::Error,
    ldp::{LinkedDataProofContext, Proof},
    processor::{
        context::{BBS_V1_URL, CREDENTIALS_V1_URL},
        ProcessorOptions,
    },
    resolver::PublicKeyResolver,
    suites::{SignatureSuite, SuiteRegistry},
};

pub const VERIFIABLE_PRESENTATION: &str = "VerifiablePresentation";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    #[serde(rename = "@context")]
    pub context: OneOrMany<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub types: OneOrMany<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verifiable_credential: Vec<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<OneOrMany<Proof>>,
    #[serde(flatten)]
    pub custom_fields: Map<String, Value>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            context: OneOrMany::Many(vec![
                Value::String(CREDENTIALS_V1_URL.to_owned()),
                Value::String(BBS_V1_URL.to_owned()),
            ]),
            id: None,
            types: OneOrMany::Many(vec![VERIFIABLE_PRESENTATION.to_owned()]),
            verifiable_credential: Vec::new(),
            holder: None,
            proof: None,
            custom_fields: Map::new(),
        }
    }
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.verifiable_credential.push(credential);
        self
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

    pub fn add_proof(&mut self, proof: Proof) {
        self.proof = Some(match self.proof.take() {
            None => OneOrMany::One(proof),
            Some(proofs) => proofs.push(proof),
        });
    }

    pub fn proofs(&self) -> &[Proof] {
        self.proof.as_ref().map(OneOrMany::as_slice).unwrap_or_default()
    }

    /// Holder signature over the whole presentation, embedded credentials
    /// and their proofs included.
    pub fn add_linked_data_proof(
        &mut self,
        suite: &dyn SignatureSuite,
        context: &LinkedDataProofContext,
        options: &ProcessorOptions,
    ) -> Result<(), Error> {
        let proof = create_proof(suite, &self.to_value()?, context, options)?;
        self.add_proof(proof);
        Ok(())
    }

    /// Verifies the presentation proofs, if any, then every embedded credential.
    pub fn verify_proof(
        &self,
        registry: &SuiteRegistry,
        resolver: &dyn PublicKeyResolver,
        options: &ProcessorOptions,
    ) -> Result<(), Error> {
        if self.proofs().is_empty() && self.verifiable_credential.is_empty() {
            return Err(Error::MissingProof);
        }
        if !self.proofs().is_empty() {
            verify_proofs(&self.to_value()?, self.proofs(), registry, resolver, options)?;
        }
        for credential in &self.verifiable_credential {
            credential.verify_proof(registry, resolver, options)?;
        }
        Ok(())
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
