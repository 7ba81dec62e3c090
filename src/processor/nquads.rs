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

//! Canonical N-Quads read back into flattened, expanded JSON-LD so that a
//! canonical document can be framed.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Map, Value};

use crate::errors::Error;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Prefix wrapping a blank node label so that it survives framing as an IRI.
pub(crate) const BNID_PREFIX: &str = "urn:bnid:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Quad {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
    pub graph: Option<Term>,
}

pub(crate) fn parse(nquads: &str) -> Result<Vec<Quad>, Error> {
    nquads
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<Quad, Error> {
    let invalid = || Error::encoding("n-quads", format!("malformed statement {}", line));
    let mut cursor = Cursor { rest: line };
    let subject = cursor.term()?.ok_or_else(invalid)?;
    let predicate = match cursor.term()? {
        Some(Term::Iri(iri)) => iri,
        _ => return Err(invalid()),
    };
    let object = cursor.term()?.ok_or_else(invalid)?;
    let graph = cursor.term()?;
    if cursor.rest.trim() != "." {
        return Err(invalid());
    }
    Ok(Quad { subject, predicate, object, graph })
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    /// Next term, `None` once the closing `.` is reached.
    fn term(&mut self) -> Result<Option<Term>, Error> {
        self.rest = self.rest.trim_start();
        if self.rest.starts_with('<') {
            return Ok(Some(Term::Iri(self.until('>', 1)?)));
        }
        if self.rest.starts_with("_:") {
            let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
            let label = self.rest[..end].to_owned();
            self.rest = &self.rest[end..];
            return Ok(Some(Term::Blank(label)));
        }
        if self.rest.starts_with('"') {
            return self.literal().map(Some);
        }
        Ok(None)
    }

    fn until(&mut self, close: char, skip: usize) -> Result<String, Error> {
        let end = self.rest[skip..]
            .find(close)
            .ok_or_else(|| Error::encoding("n-quads", format!("unterminated term {}", self.rest)))?;
        let text = self.rest[skip..skip + end].to_owned();
        self.rest = &self.rest[skip + end + close.len_utf8()..];
        Ok(text)
    }

    fn literal(&mut self) -> Result<Term, Error> {
        let mut value = String::new();
        let mut chars = self.rest.char_indices().skip(1);
        let end = loop {
            match chars.next() {
                Some((i, '"')) => break i,
                Some((_, '\\')) => {
                    let escaped = match chars.next().map(|(_, c)| c) {
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('f') => '\u{c}',
                        Some(c @ ('"' | '\'' | '\\')) => c,
                        Some(c @ ('u' | 'U')) => {
                            let width = if c == 'u' { 4 } else { 8 };
                            let hex: String = chars.by_ref().take(width).map(|(_, c)| c).collect();
                            u32::from_str_radix(&hex, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| Error::encoding("n-quads", format!("bad escape \\{}{}", c, hex)))?
                        }
                        other => return Err(Error::encoding("n-quads", format!("bad escape {:?}", other))),
                    };
                    value.push(escaped);
                }
                Some((_, c)) => value.push(c),
                None => return Err(Error::encoding("n-quads", format!("unterminated literal {}", self.rest))),
            }
        };
        self.rest = &self.rest[end + 1..];

        let mut datatype = None;
        let mut language = None;
        if self.rest.starts_with("^^<") {
            datatype = Some(self.until('>', 3)?);
        } else if let Some(tagged) = self.rest.strip_prefix('@') {
            let len = tagged.find(char::is_whitespace).unwrap_or(tagged.len());
            language = Some(tagged[..len].to_owned());
            self.rest = &tagged[len..];
        }
        Ok(Term::Literal { value, datatype, language })
    }
}

/// Rebuilds flattened expanded JSON-LD from `quads`.
///
/// With `identify_blank_nodes` every blank node but graph names becomes
/// `urn:bnid:<label>`. Blank named graphs are written inline under the
/// property pointing at them, other named graphs at the top level.
pub(crate) fn to_expanded(quads: &[Quad], identify_blank_nodes: bool) -> Value {
    let graph_names: BTreeSet<String> = quads
        .iter()
        .filter_map(|quad| match &quad.graph {
            Some(Term::Iri(name)) | Some(Term::Blank(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();
    let id_of = |label: &str| -> String {
        if identify_blank_nodes && label.starts_with("_:") && !graph_names.contains(label) {
            format!("{}{}", BNID_PREFIX, label)
        } else {
            label.to_owned()
        }
    };

    let mut graphs: BTreeMap<Option<String>, BTreeMap<String, Map<String, Value>>> = BTreeMap::new();
    for quad in quads {
        let graph = match &quad.graph {
            Some(Term::Iri(name)) | Some(Term::Blank(name)) => Some(name.clone()),
            _ => None,
        };
        let subject = match &quad.subject {
            Term::Iri(id) | Term::Blank(id) => id_of(id),
            Term::Literal { .. } => continue,
        };
        let node = graphs
            .entry(graph)
            .or_default()
            .entry(subject.clone())
            .or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".to_owned(), Value::String(subject));
                node
            });

        let (key, value) = match &quad.object {
            Term::Iri(id) | Term::Blank(id) if quad.predicate == RDF_TYPE => ("@type".to_owned(), json!(id_of(id))),
            Term::Iri(id) | Term::Blank(id) => (quad.predicate.clone(), json!({"@id": id_of(id)})),
            Term::Literal { value, datatype, language } => {
                let mut literal = Map::new();
                literal.insert("@value".to_owned(), Value::String(value.clone()));
                if let Some(language) = language {
                    literal.insert("@language".to_owned(), Value::String(language.clone()));
                } else if let Some(datatype) = datatype.as_ref().filter(|dt| *dt != XSD_STRING) {
                    literal.insert("@type".to_owned(), Value::String(datatype.clone()));
                }
                (quad.predicate.clone(), Value::Object(literal))
            }
        };
        if let Value::Array(values) = node.entry(key).or_insert_with(|| Value::Array(Vec::new())) {
            values.push(value);
        }
    }

    let mut inlined = BTreeSet::new();
    let mut nodes = render(&graphs, &None, &mut inlined);
    for name in graph_names.iter() {
        if inlined.contains(name) {
            continue;
        }
        let contents = render(&graphs, &Some(name.clone()), &mut inlined);
        nodes.push(json!({"@id": name, "@graph": contents}));
    }
    Value::Array(nodes)
}

type Graphs = BTreeMap<Option<String>, BTreeMap<String, Map<String, Value>>>;

fn render(graphs: &Graphs, name: &Option<String>, inlined: &mut BTreeSet<String>) -> Vec<Value> {
    let Some(nodes) = graphs.get(name) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes.values() {
        let mut node = node.clone();
        for values in node.values_mut() {
            let Value::Array(values) = values else { continue };
            for value in values.iter_mut() {
                let Some(id) = value.get("@id").and_then(Value::as_str).map(str::to_owned) else {
                    continue;
                };
                let target = Some(id.clone());
                if id.starts_with("_:") && graphs.contains_key(&target) && inlined.insert(id) {
                    *value = json!({"@graph": render(graphs, &target, inlined)});
                }
            }
        }
        out.push(Value::Object(node));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NQUADS: &str = "<did:example:s> <http://schema.org/knows> _:c14n0 .\n\
        <did:example:s> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .\n\
        _:c14n0 <http://schema.org/name> \"Jane \\\"J\\\" Doe\\n\" .\n\
        _:c14n0 <http://schema.org/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n\
        _:c14n0 <http://schema.org/motto> \"ciao\"@it .\n\
        _:c14n1 <http://schema.org/name> \"inner\" _:c14n2 .\n\
        <did:example:s> <https://w3id.org/security#proof> _:c14n2 .\n";

    #[test]
    fn parses_terms() {
        let quads = parse(NQUADS).unwrap();
        assert_eq!(quads.len(), 7);
        assert_eq!(
            quads[2].object,
            Term::Literal { value: "Jane \"J\" Doe\n".to_owned(), datatype: None, language: None }
        );
        assert_eq!(
            quads[3].object,
            Term::Literal {
                value: "42".to_owned(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".to_owned()),
                language: None
            }
        );
        assert_eq!(
            quads[4].object,
            Term::Literal { value: "ciao".to_owned(), datatype: None, language: Some("it".to_owned()) }
        );
        assert_eq!(quads[5].graph, Some(Term::Blank("_:c14n2".to_owned())));
        assert!(parse("<urn:a> \"p\" <urn:b> .").is_err());
        assert!(parse("<urn:a> <urn:p> \"open .").is_err());
    }

    #[test]
    fn expanded_nodes() {
        let expanded = to_expanded(&parse(NQUADS).unwrap(), true);
        let nodes = expanded.as_array().unwrap();
        assert_eq!(nodes.len(), 2);

        let knows = &nodes[0];
        assert_eq!(knows["@id"], json!("did:example:s"));
        assert_eq!(knows["@type"], json!(["http://schema.org/Person"]));
        assert_eq!(knows["http://schema.org/knows"], json!([{"@id": "urn:bnid:_:c14n0"}]));
        assert_eq!(
            knows["https://w3id.org/security#proof"],
            json!([{"@graph": [{"@id": "urn:bnid:_:c14n1", "http://schema.org/name": [{"@value": "inner"}]}]}])
        );

        let person = &nodes[1];
        assert_eq!(person["@id"], json!("urn:bnid:_:c14n0"));
        assert_eq!(
            person["http://schema.org/age"],
            json!([{"@value": "42", "@type": "http://www.w3.org/2001/XMLSchema#integer"}])
        );
        assert_eq!(person["http://schema.org/motto"], json!([{"@value": "ciao", "@language": "it"}]));

        let plain = to_expanded(&parse(NQUADS).unwrap(), false);
        assert_eq!(plain[1]["@id"], json!("_:c14n0"));
    }
}
