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

//! JSON-LD processing behind the [`Processor`] trait: expansion and
//! compaction through `json-ld`, URDNA2015 canonical N-Quads through
//! `ssi-rdf`, and framing over the canonical statements. Contexts come from a
//! [`ContextLoader`] and are never fetched from the network.

pub mod context;
mod frame;
mod nquads;

use std::{collections::BTreeSet, sync::Arc};

use futures::executor::block_on;
use json_ld::{
    context_processing::{Options, Process, Processed},
    syntax::{Context, TryFromJson},
    BlankIdBuf, Compact, ExpandedDocument, IriBuf, JsonLdProcessor as _, RemoteDocument,
};
use rdf_types::generator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub use self::context::{ContextLoader, StaticContextLoader};
use self::context::{referenced_documents, Documents};
use crate::errors::Error;

/// Vocabulary catching terms no context defines while validating.
const UNDEFINED_TERM_VOCAB: &str = "urn:undefined-term:";

/// Options shared by every processor operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorOptions {
    /// Fail on terms the active context does not define instead of dropping them.
    pub validate: bool,
    /// Give blank nodes `urn:bnid:_:c14nN` identifiers before framing.
    pub frame_blank_nodes: bool,
}

impl ProcessorOptions {
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_frame_blank_nodes(mut self, frame_blank_nodes: bool) -> Self {
        self.frame_blank_nodes = frame_blank_nodes;
        self
    }
}

pub trait Processor {
    /// URDNA2015 canonical N-Quads of `doc`, one `s p o .` line each.
    fn canonicalize(&self, doc: &Value, options: &ProcessorOptions) -> Result<Vec<u8>, Error>;

    /// Re-expresses `doc` with the terms of `context`.
    fn compact(&self, doc: &Value, context: &Value, options: &ProcessorOptions) -> Result<Value, Error>;

    /// Selects the part of `doc` described by `frame`, compacted with the
    /// frame's own `@context`.
    fn frame(&self, doc: &Value, frame: &Value, options: &ProcessorOptions) -> Result<Value, Error>;
}

/// Default [`Processor`], resolving contexts through a shared loader.
#[derive(Clone)]
pub struct JsonLdProcessor {
    loader: Arc<dyn ContextLoader + Send + Sync>,
}

impl JsonLdProcessor {
    pub fn new(loader: impl ContextLoader + Send + Sync + 'static) -> Self {
        Self { loader: Arc::new(loader) }
    }

    fn documents(&self, values: &[&Value]) -> Result<Documents, Error> {
        referenced_documents(values, self.loader.as_ref())
    }

    fn expand(&self, doc: &Value, documents: &mut Documents, options: &ProcessorOptions) -> Result<ExpandedDocument, Error> {
        if options.validate {
            check_terms(doc, documents)?;
        }
        block_on(expand(doc, documents))
    }
}

impl Default for JsonLdProcessor {
    fn default() -> Self {
        Self::new(StaticContextLoader::new())
    }
}

impl std::fmt::Debug for JsonLdProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLdProcessor").finish_non_exhaustive()
    }
}

impl Processor for JsonLdProcessor {
    fn canonicalize(&self, doc: &Value, options: &ProcessorOptions) -> Result<Vec<u8>, Error> {
        let mut documents = self.documents(&[doc])?;
        let expanded = self.expand(doc, &mut documents, options)?;
        Ok(to_nquads(&expanded)?.into_bytes())
    }

    fn compact(&self, doc: &Value, context: &Value, options: &ProcessorOptions) -> Result<Value, Error> {
        let mut documents = self.documents(&[doc, &json!({ "@context": context })])?;
        let expanded = self.expand(doc, &mut documents, options)?;
        block_on(compact(&expanded, context, &mut documents))
    }

    fn frame(&self, doc: &Value, frame: &Value, options: &ProcessorOptions) -> Result<Value, Error> {
        let frame_map = frame
            .as_object()
            .ok_or_else(|| Error::InvalidInput("frame must be a JSON object".to_owned()))?;
        let context = frame_map.get("@context").cloned().unwrap_or(Value::Null);

        let mut documents = self.documents(&[doc, frame])?;
        let expanded = self.expand(doc, &mut documents, options)?;
        let statements = nquads::parse(&to_nquads(&expanded)?)?;
        let flattened = nquads::to_expanded(&statements, options.frame_blank_nodes);

        let compacted = block_on(async {
            let expanded = expand(&flattened, &mut documents).await?;
            compact(&expanded, &context, &mut documents).await
        })?;
        frame::frame_document(&compacted, frame_map)
    }
}

async fn expand(doc: &Value, loader: &mut Documents) -> Result<ExpandedDocument, Error> {
    let input: RemoteDocument<IriBuf, json_syntax::Value> =
        RemoteDocument::new(Option::<IriBuf>::None, None, json_syntax::Value::from(doc.clone()));
    input
        .expand(loader)
        .await
        .map_err(|e| Error::encoding("json-ld expansion", e))
}

async fn compact(expanded: &ExpandedDocument, context: &Value, loader: &mut Documents) -> Result<Value, Error> {
    let local = Context::try_from_json(json_syntax::Value::from(context.clone()))
        .map_err(|e| Error::encoding("json-ld context", e))?;
    let active_context = json_ld::Context::default();
    let vocabulary = &mut ();
    let processed: Processed<IriBuf, BlankIdBuf> = local
        .process_with(vocabulary, &active_context, loader, None, Options::default())
        .await
        .map_err(|e| Error::encoding("json-ld context", e))?;

    let compacted = expanded
        .compact(processed.as_ref(), loader)
        .await
        .map_err(|e| Error::encoding("json-ld compaction", e))?;
    let mut map = match compacted.into_serde_json() {
        Value::Object(map) => map,
        Value::Array(nodes) => {
            let mut map = Map::new();
            map.insert("@graph".to_owned(), Value::Array(nodes));
            map
        }
        other => return Err(Error::encoding("json-ld compaction", format!("unexpected document {}", other))),
    };
    if !context.is_null() {
        map.insert("@context".to_owned(), context.clone());
    }
    Ok(Value::Object(map))
}

fn to_nquads(expanded: &ExpandedDocument) -> Result<String, Error> {
    let quads = linked_data::to_lexical_quads(generator::Blank::new(), expanded)
        .map_err(|e| Error::encoding("rdf", e))?;
    Ok(ssi_rdf::urdna2015::normalize(quads.iter().map(|quad| quad.as_lexical_quad_ref())).into_nquads())
}

/// Expands `doc` once more under a fallback `@vocab`: any statement using it
/// names a term that no context defines.
fn check_terms(doc: &Value, documents: &mut Documents) -> Result<(), Error> {
    let mut guarded = doc.clone();
    if let Value::Object(map) = &mut guarded {
        let fallback = json!({ "@vocab": UNDEFINED_TERM_VOCAB });
        let context = match map.remove("@context") {
            Some(Value::Array(mut items)) => {
                items.insert(0, fallback);
                Value::Array(items)
            }
            Some(Value::Null) | None => fallback,
            Some(other) => Value::Array(vec![fallback, other]),
        };
        map.insert("@context".to_owned(), context);
    }

    let nquads = to_nquads(&block_on(expand(&guarded, documents))?)?;
    let marker = format!("<{}", UNDEFINED_TERM_VOCAB);
    let undefined: BTreeSet<&str> = nquads
        .match_indices(&marker)
        .filter_map(|(at, _)| {
            let rest = &nquads[at + marker.len()..];
            rest.find('>').map(|end| &rest[..end])
        })
        .collect();
    if undefined.is_empty() {
        return Ok(());
    }
    let terms: Vec<&str> = undefined.into_iter().collect();
    Err(Error::encoding("json-ld", format!("terms not defined in the context: {}", terms.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> Value {
        json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1",
                "https://w3id.org/security/bbs/v1"
            ],
            "id": "http://example.edu/credentials/1872",
            "type": ["VerifiableCredential", "UniversityDegreeCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2024-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:example:subject",
                "givenName": "Jane",
                "degree": {"type": "BachelorDegree", "name": "Bachelor of Science and Arts"}
            }
        })
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn canonical_form_ignores_key_order_and_context_choice() {
        let processor = JsonLdProcessor::default();
        let options = ProcessorOptions::default();
        let doc = credential();

        let canonical = processor.canonicalize(&doc, &options).unwrap();
        let text = String::from_utf8(canonical.clone()).unwrap();
        assert!(text.contains(
            "<did:example:subject> <https://example.org/examples#givenName> \"Jane\" .\n"
        ));
        assert!(text.contains("_:c14n0 <http://schema.org/name> \"Bachelor of Science and Arts\" .\n"));
        assert!(text.ends_with(" .\n"));

        let compacted = processor.compact(&doc, &json!("https://w3id.org/security/v2"), &options).unwrap();
        assert_eq!(processor.canonicalize(&compacted, &options).unwrap(), canonical);
    }

    #[test]
    fn blank_nodes_are_labelled_by_first_degree_hash() {
        let processor = JsonLdProcessor::default();
        let doc = json!({
            "@context": {"p": "http://ex/p", "q": "http://ex/q"},
            "@id": "http://ex/s",
            "q": [{"p": "a"}, {"p": "d"}]
        });
        let canonical = String::from_utf8(processor.canonicalize(&doc, &ProcessorOptions::default()).unwrap()).unwrap();
        assert_eq!(
            canonical,
            "<http://ex/s> <http://ex/q> _:c14n0 .\n\
             <http://ex/s> <http://ex/q> _:c14n1 .\n\
             _:c14n0 <http://ex/p> \"d\" .\n\
             _:c14n1 <http://ex/p> \"a\" .\n"
        );
    }

    #[test]
    fn framed_subset_lines_appear_in_source() {
        let processor = JsonLdProcessor::default();
        let doc = credential();
        let frame = json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1",
                "https://w3id.org/security/bbs/v1"
            ],
            "type": ["VerifiableCredential", "UniversityDegreeCredential"],
            "credentialSubject": {
                "@explicit": true,
                "degree": {}
            }
        });

        let options = ProcessorOptions::default().with_frame_blank_nodes(true);
        let framed = processor.frame(&doc, &frame, &options).unwrap();
        assert_eq!(framed["credentialSubject"]["degree"]["id"], json!("urn:bnid:_:c14n0"));
        assert!(framed["credentialSubject"].get("givenName").is_none());
        assert_eq!(framed["issuer"], json!("did:example:issuer"));

        let source = lines(processor.canonicalize(&doc, &ProcessorOptions::default()).unwrap());
        let revealed = lines(processor.canonicalize(&framed, &ProcessorOptions::default()).unwrap());
        let unwrapped: Vec<String> = revealed.iter().map(|l| l.replace("<urn:bnid:_:c14n0>", "_:c14n0")).collect();

        let mut last = None;
        for line in &unwrapped {
            let index = source.iter().position(|s| s == line).expect("revealed line missing from source");
            assert!(last.map_or(true, |l| index > l), "revealed lines out of source order");
            last = Some(index);
        }
        assert_eq!(unwrapped.len(), source.len() - 1);
    }

    #[test]
    fn frame_must_match_root() {
        let processor = JsonLdProcessor::default();
        let frame = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1", "https://w3id.org/security/bbs/v1"],
            "type": "VerifiablePresentation"
        });
        let res = processor.frame(&credential(), &frame, &ProcessorOptions::default());
        assert!(matches!(res, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn validation_rejects_undefined_terms() {
        let processor = JsonLdProcessor::default();
        let doc = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": "urn:a",
            "notDefined": "value"
        });
        let strict = ProcessorOptions::default().with_validate(true);
        match processor.canonicalize(&doc, &strict) {
            Err(Error::EncodingError { message, .. }) => assert!(message.ends_with("notDefined")),
            other => panic!("expected an encoding error, got {:?}", other),
        }
        assert!(processor.canonicalize(&doc, &ProcessorOptions::default()).is_ok());
        assert!(processor.canonicalize(&credential(), &strict).is_ok());
    }
}
