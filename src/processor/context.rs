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

use std::collections::{BTreeMap, BTreeSet, HashMap};

use json_ld::{IriBuf, RemoteDocument};
use serde_json::Value;

use crate::errors::Error;

pub const CREDENTIALS_V1_URL: &str = "https://www.w3.org/2018/credentials/v1";
pub const CREDENTIALS_EXAMPLES_V1_URL: &str = "https://www.w3.org/2018/credentials/examples/v1";
pub const SECURITY_V2_URL: &str = "https://w3id.org/security/v2";
pub const SECURITY_JWS_V1_URL: &str = "https://w3id.org/security/jws/v1";
pub const BBS_V1_URL: &str = "https://w3id.org/security/bbs/v1";
pub const STATUS_LIST_2021_URL: &str = "https://w3id.org/vc/status-list/2021/v1";

const BUILTIN_CONTEXTS: &[(&str, &str)] = &[
    (CREDENTIALS_V1_URL, include_str!("contexts/credentials_v1.jsonld")),
    (CREDENTIALS_EXAMPLES_V1_URL, include_str!("contexts/credentials_examples_v1.jsonld")),
    (SECURITY_V2_URL, include_str!("contexts/security_v2.jsonld")),
    (SECURITY_JWS_V1_URL, include_str!("contexts/security_jws_v1.jsonld")),
    (BBS_V1_URL, include_str!("contexts/bbs_v1.jsonld")),
    (STATUS_LIST_2021_URL, include_str!("contexts/status_list_2021_v1.jsonld")),
];

/// Remote contexts one document may pull in, nested ones included.
const MAX_CONTEXT_DOCUMENTS: usize = 64;

/// Context documents handed to the JSON-LD processor, by URL.
pub(crate) type Documents = BTreeMap<IriBuf, RemoteDocument>;

/// Source of remote context documents. Implementations never touch the network
/// on behalf of this crate; a context must be known up front.
pub trait ContextLoader {
    /// Returns the whole context document, i.e. the object holding `@context`.
    fn load(&self, url: &str) -> Result<Value, Error>;
}

/// In-memory loader preloaded with the credential, security, bbs and
/// status list contexts. Extra documents can be registered with
/// [`StaticContextLoader::with_document`].
#[derive(Clone, Debug, Default)]
pub struct StaticContextLoader {
    documents: HashMap<String, Value>,
}

impl StaticContextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_owned(), document);
        self
    }
}

impl ContextLoader for StaticContextLoader {
    fn load(&self, url: &str) -> Result<Value, Error> {
        if let Some(doc) = self.documents.get(url) {
            return Ok(doc.clone());
        }
        let (_, text) = BUILTIN_CONTEXTS
            .iter()
            .find(|(known, _)| *known == url)
            .ok_or_else(|| Error::encoding("context", format!("unknown context {}", url)))?;
        serde_json::from_str(text).map_err(|e| Error::encoding("context", e))
    }
}

/// Collects the remote context URLs named anywhere under `value`, scoped
/// contexts and `@import`s included.
fn context_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "@context" || key == "@import" {
                    match value {
                        Value::String(url) => out.push(url.clone()),
                        Value::Array(items) => out.extend(items.iter().filter_map(Value::as_str).map(str::to_owned)),
                        _ => {}
                    }
                }
                context_urls(value, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| context_urls(item, out)),
        _ => {}
    }
}

/// Loads every remote context `values` refer to, following the references
/// of the loaded contexts in turn.
pub(crate) fn referenced_documents(values: &[&Value], loader: &dyn ContextLoader) -> Result<Documents, Error> {
    let mut pending = Vec::new();
    for value in values {
        context_urls(value, &mut pending);
    }

    let mut seen = BTreeSet::new();
    let mut documents = Documents::new();
    while let Some(url) = pending.pop() {
        if !seen.insert(url.clone()) {
            continue;
        }
        if seen.len() > MAX_CONTEXT_DOCUMENTS {
            return Err(Error::encoding("context", "too many remote contexts"));
        }
        let document = loader.load(&url)?;
        context_urls(&document, &mut pending);

        let iri = IriBuf::new(url.clone()).map_err(|_| Error::encoding("context", format!("invalid context IRI {}", url)))?;
        log::trace!("loaded context {}", url);
        documents.insert(
            iri.clone(),
            RemoteDocument::new(Some(iri), None, json_syntax::Value::from(document)),
        );
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_contexts_parse() {
        let loader = StaticContextLoader::new();
        for (url, _) in BUILTIN_CONTEXTS {
            let document = loader.load(url).unwrap();
            assert!(document.get("@context").map_or(false, Value::is_object), "{}", url);
        }
    }

    #[test]
    fn nested_references_are_followed() {
        let loader = StaticContextLoader::new()
            .with_document("https://example.com/outer", json!({"@context": ["https://example.com/inner", {"a": "urn:a"}]}))
            .with_document("https://example.com/inner", json!({"@context": {"b": {"@id": "urn:b", "@context": BBS_V1_URL}}}));
        let doc = json!({
            "@context": ["https://example.com/outer", CREDENTIALS_V1_URL],
            "nested": {"@context": {"@import": STATUS_LIST_2021_URL}}
        });

        let documents = referenced_documents(&[&doc], &loader).unwrap();
        let mut urls: Vec<String> = documents.keys().map(|iri| iri.as_str().to_owned()).collect();
        urls.sort();
        assert_eq!(
            urls,
            vec![
                "https://example.com/inner",
                "https://example.com/outer",
                BBS_V1_URL,
                STATUS_LIST_2021_URL,
                CREDENTIALS_V1_URL,
            ]
        );
    }

    #[test]
    fn unknown_context_is_an_error() {
        let loader = StaticContextLoader::new();
        let doc = json!({"@context": "https://example.com/unknown"});
        assert!(matches!(referenced_documents(&[&doc], &loader), Err(Error::EncodingError { .. })));

        let loader = loader.with_document("https://example.com/unknown", json!({"@context": {"foo": "urn:foo"}}));
        assert_eq!(referenced_documents(&[&doc], &loader).unwrap().len(), 1);
    }
}
