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

//! VC JSON Schemas: schema metadata documents carrying a JSON Schema that
//! credential subjects are checked against.
//!
//! https://w3c-ccg.github.io/vc-json-schemas/v2/index.html

use jsonschema::{Retrieve, Uri, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{credential::Credential, errors::Error};

/// `type` of every VC JSON Schema metadata document.
pub const VC_JSON_SCHEMA_TYPE: &str = "https://w3c-ccg.github.io/vc-json-schemas/schema/2.0/schema.json";

const VC_JSON_SCHEMA_METADATA: &str = include_str!("vc_json_schema_v2.json");

/// Schemas are only ever read from bytes, `$ref`s to anything else fail.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("cannot retrieve {}: remote schemas are not loaded", uri.as_str()).into())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VCJSONSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub version: String,
    pub id: String,
    pub name: String,
    pub author: String,
    pub authored: String,
    pub schema: Map<String, Value>,
}

impl VCJSONSchema {
    /// Parses a metadata document and checks it with [`VCJSONSchema::validate`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let schema: Self = serde_json::from_slice(data)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(serde_json::to_value(self)?)
    }

    /// Checks the metadata document itself against the VC JSON Schema 2.0 definition.
    pub fn validate(&self) -> Result<(), Error> {
        let metadata: Value = serde_json::from_str(VC_JSON_SCHEMA_METADATA)?;
        check(&compile(&metadata)?, &self.to_value()?)
    }

    /// Checks `subject` against the embedded JSON Schema.
    pub fn validate_subject(&self, subject: &Value) -> Result<(), Error> {
        let validator = compile(&Value::Object(self.schema.clone()))?;
        check(&validator, subject)
    }

    /// Checks every `credentialSubject` of `credential`.
    pub fn validate_credential(&self, credential: &Credential) -> Result<(), Error> {
        let validator = compile(&Value::Object(self.schema.clone()))?;
        match &credential.credential_subject {
            Some(Value::Array(subjects)) => subjects.iter().try_for_each(|subject| check(&validator, subject)),
            Some(subject) => check(&validator, subject),
            None => Err(Error::MissingField("credentialSubject".to_owned())),
        }
    }
}

fn compile(schema: &Value) -> Result<Validator, Error> {
    let mut opts = jsonschema::options();
    opts.should_validate_formats(true);
    opts.with_retriever(OfflineRetriever);
    opts.build(schema).map_err(|e| Error::encoding("json schema", e))
}

fn check(validator: &Validator, instance: &Value) -> Result<(), Error> {
    let violations: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        log::debug!("{} schema violations", violations.len());
        Err(Error::SchemaViolation(violations.join("; ")))
    }
}
