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

//! Status List 2021: a gzip compressed bitstring published inside a credential.

pub mod bitstring;
pub mod entry;

use serde_json::Value;

pub use bitstring::BitString;
pub use entry::StatusEntry;

use crate::{credential::Credential, errors::Error};

/// # Description
/// Computes the bitstring of `issued` and stores it in the `encodedList` of the
/// status list credential `pre_built`.
///
/// # Inputs:
/// * `issued`, credentials carrying a `credentialStatus` entry.
/// * `pre_built`, status list credential whose subject is a JSON object.
///
/// # Output:
/// the status list credential, unsigned.
pub fn gen_status_credential(issued: &[Credential], mut pre_built: Credential) -> Result<Credential, Error> {
    let encoded = BitString::generate(issued).encode()?;
    let subject = pre_built
        .credential_subject
        .get_or_insert_with(|| Value::Object(Default::default()));
    let subject = subject
        .as_object_mut()
        .ok_or_else(|| Error::InvalidInput("credentialSubject of a status list must be an object".to_owned()))?;
    subject.insert("encodedList".to_owned(), Value::String(encoded));
    Ok(pre_built)
}

/// Looks up the bit of `entry` in `status_list`. The purposes of the entry and
/// of the list must agree.
pub fn check_status(status_list: &Credential, entry: &StatusEntry) -> Result<bool, Error> {
    let subject = status_list
        .credential_subject
        .as_ref()
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MissingField("credentialSubject".to_owned()))?;

    let purpose = subject.get("statusPurpose").and_then(Value::as_str).unwrap_or_default();
    if purpose != entry.status_purpose {
        return Err(Error::InvalidInput(format!(
            "status purpose mismatch: list {:?}, credential {:?}",
            purpose, entry.status_purpose
        )));
    }

    let index = entry.index()?;
    let encoded = subject
        .get("encodedList")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MissingField("encodedList".to_owned()))?;
    BitString::parse(encoded)?.check(index)
}
