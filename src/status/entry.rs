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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{credential::Credential, errors::Error};

pub const STATUS_LIST_2021_ENTRY: &str = "StatusList2021Entry";
pub const STATUS_LIST_2021: &str = "StatusList2021";
pub const STATUS_LIST_2021_CREDENTIAL: &str = "StatusList2021Credential";
pub const REVOCATION_PURPOSE: &str = "revocation";
/// Entries carrying this purpose are not reflected in the bitstring.
pub const REVOKED_PURPOSE: &str = "revoked";

/// The `credentialStatus` object of a credential tracked by a status list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub status_purpose: String,
    #[serde(default)]
    pub status_list_index: String,
    #[serde(default)]
    pub status_list_credential: String,
}

impl StatusEntry {
    pub fn new(id: &str, index: usize, list_credential: &str) -> Self {
        Self {
            id: Some(id.to_owned()),
            entry_type: STATUS_LIST_2021_ENTRY.to_owned(),
            status_purpose: REVOCATION_PURPOSE.to_owned(),
            status_list_index: index.to_string(),
            status_list_credential: list_credential.to_owned(),
        }
    }

    /// Reads the entry out of `credentialStatus`, if the credential has a well formed one.
    pub fn from_credential(credential: &Credential) -> Option<Self> {
        let status = credential.credential_status.as_ref()?;
        serde_json::from_value(Value::Object(status.clone())).ok()
    }

    pub fn is_status_list_entry(&self) -> bool {
        self.entry_type == STATUS_LIST_2021_ENTRY
    }

    pub fn is_revoked(&self) -> bool {
        self.status_purpose == REVOKED_PURPOSE
    }

    pub fn index(&self) -> Result<usize, Error> {
        self.status_list_index
            .trim()
            .parse::<usize>()
            .map_err(|e| Error::InvalidInput(format!("statusListIndex {:?}: {}", self.status_list_index, e)))
    }

    /// Writes the entry into `credential.credentialStatus`.
    pub fn attach(&self, credential: &mut Credential) -> Result<(), Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => {
                credential.credential_status = Some(map);
                Ok(())
            }
            _ => Err(Error::encoding("status entry", "not a JSON object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attach_and_read_back() {
        let mut credential = Credential::new();
        let entry = StatusEntry::new("https://example.com/status/1#7", 7, "https://example.com/status/1");
        entry.attach(&mut credential).unwrap();

        let value = credential.to_value().unwrap();
        assert_eq!(value["credentialStatus"]["statusListIndex"], json!("7"));
        assert_eq!(value["credentialStatus"]["type"], json!(STATUS_LIST_2021_ENTRY));

        let read = StatusEntry::from_credential(&credential).unwrap();
        assert_eq!(read, entry);
        assert_eq!(read.index().unwrap(), 7);
        assert!(!read.is_revoked());
    }

    #[test]
    fn malformed_entries() {
        let mut credential = Credential::new();
        assert!(StatusEntry::from_credential(&credential).is_none());

        credential.credential_status = json!({"statusListIndex": "1"}).as_object().cloned();
        assert!(StatusEntry::from_credential(&credential).is_none());

        let entry = StatusEntry {
            status_list_index: "-1".to_owned(),
            ..StatusEntry::new("x", 0, "y")
        };
        assert!(matches!(entry.index(), Err(Error::InvalidInput(_))));
    }
}
