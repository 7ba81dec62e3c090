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

//! Framing over a compacted, flattened node list. Frame keys are compared
//! with the keys of nodes compacted under the frame's own `@context`.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::Error;

#[derive(Clone, Debug, Default)]
struct FrameSpec {
    ids: Vec<String>,
    types: Vec<String>,
    any_type: bool,
    explicit: Option<bool>,
    props: Vec<(String, FrameValue)>,
}

#[derive(Clone, Debug)]
enum FrameValue {
    /// `{}` or `[]`: keep every value, embedding referenced nodes whole.
    Wildcard,
    Nested(FrameSpec),
    /// Keep only the listed values.
    Match(Vec<Value>),
}

fn is_id_key(key: &str) -> bool {
    key == "@id" || key == "id"
}

fn is_type_key(key: &str) -> bool {
    key == "@type" || key == "type"
}

fn is_wildcard(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty() || (items.len() == 1 && is_wildcard(&items[0])),
        _ => false,
    }
}

fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_owned).collect(),
        _ => Vec::new(),
    }
}

fn values(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    }
}

impl FrameSpec {
    fn parse(frame: &Map<String, Value>) -> Result<Self, Error> {
        let mut spec = FrameSpec::default();
        for (key, value) in frame {
            match key.as_str() {
                id if is_id_key(id) => spec.ids = strings(value),
                t if is_type_key(t) && is_wildcard(value) => spec.any_type = true,
                t if is_type_key(t) => spec.types = strings(value),
                "@explicit" => spec.explicit = value.as_bool(),
                keyword if keyword.starts_with('@') => {}
                _ => spec.props.push((key.clone(), FrameValue::parse(value)?)),
            }
        }
        Ok(spec)
    }

    fn prop(&self, key: &str) -> Option<&FrameValue> {
        self.props.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn constrains_identity(&self) -> bool {
        !self.ids.is_empty() || !self.types.is_empty() || self.any_type
    }
}

impl FrameValue {
    fn parse(value: &Value) -> Result<Self, Error> {
        if is_wildcard(value) {
            return Ok(FrameValue::Wildcard);
        }
        match value {
            Value::Array(items) if items.len() == 1 => Self::parse(&items[0]),
            Value::Object(map) if !map.contains_key("@value") => Ok(FrameValue::Nested(FrameSpec::parse(map)?)),
            Value::Array(items) => Ok(FrameValue::Match(items.clone())),
            other => Ok(FrameValue::Match(vec![other.clone()])),
        }
    }
}

/// Nodes of one document, by identifier.
struct Graph<'a> {
    nodes: Vec<&'a Map<String, Value>>,
    by_id: HashMap<&'a str, &'a Map<String, Value>>,
}

fn node_id(node: &Map<String, Value>) -> Option<&str> {
    node.iter().find(|(k, _)| is_id_key(k)).and_then(|(_, v)| v.as_str())
}

fn node_types(node: &Map<String, Value>) -> Vec<String> {
    node.iter().find(|(k, _)| is_type_key(k)).map(|(_, v)| strings(v)).unwrap_or_default()
}

impl<'a> Graph<'a> {
    fn new(compacted: &'a Value) -> Self {
        let nodes: Vec<&Map<String, Value>> = match compacted.get("@graph") {
            Some(graph) => values(graph).iter().filter_map(Value::as_object).collect(),
            None => compacted.as_object().into_iter().collect(),
        };
        let by_id = nodes.iter().copied().filter_map(|node| node_id(node).map(|id| (id, node))).collect();
        Self { nodes, by_id }
    }

    /// The node `value` refers to: a bare `{"id": ..}` object, a string naming
    /// a node of the document, or an inline node object.
    fn resolve(&self, value: &'a Value) -> Option<&'a Map<String, Value>> {
        match value {
            Value::String(id) => self.by_id.get(id.as_str()).copied(),
            Value::Object(map) if map.keys().any(|k| matches!(k.as_str(), "@value" | "@list" | "@set" | "@graph")) => None,
            Value::Object(map) => match node_id(map) {
                Some(id) if map.len() == 1 => self.by_id.get(id).copied(),
                _ => Some(map),
            },
            _ => None,
        }
    }

    fn matches(&self, node: &Map<String, Value>, frame: &FrameSpec) -> bool {
        if !frame.ids.is_empty() && !node_id(node).map_or(false, |id| frame.ids.iter().any(|i| i == id)) {
            return false;
        }
        let types = node_types(node);
        if frame.any_type && types.is_empty() {
            return false;
        }
        if !frame.types.is_empty() && !types.iter().any(|t| frame.types.contains(t)) {
            return false;
        }
        for (key, framed) in &frame.props {
            if let FrameValue::Match(wanted) = framed {
                let present = node.get(key).map(values).unwrap_or_default();
                if !wanted.iter().all(|w| present.contains(w)) {
                    return false;
                }
            }
        }
        if !frame.constrains_identity() {
            // no identity constraint: the node must carry every framed property
            return frame.props.iter().all(|(key, _)| node.contains_key(key));
        }
        true
    }

    fn embed(&self, value: &'a Value, frame: &FrameSpec, stack: &mut Vec<&'a str>) -> Value {
        match self.resolve(value) {
            Some(node) if !node_id(node).map_or(false, |id| stack.contains(&id)) => {
                Value::Object(self.apply(node, frame, stack))
            }
            _ => value.clone(),
        }
    }

    fn apply(&self, node: &'a Map<String, Value>, frame: &FrameSpec, stack: &mut Vec<&'a str>) -> Map<String, Value> {
        let explicit = frame.explicit.unwrap_or(false);
        let id = node_id(node);
        if let Some(id) = id {
            stack.push(id);
        }

        let mut out = Map::new();
        for (key, value) in node {
            if key == "@context" {
                continue;
            }
            if is_id_key(key) {
                out.insert(key.clone(), value.clone());
                continue;
            }
            if is_type_key(key) {
                if !explicit || frame.constrains_identity() {
                    out.insert(key.clone(), value.clone());
                }
                continue;
            }

            let wildcard = FrameSpec::default();
            let kept: Vec<Value> = match frame.prop(key) {
                Some(FrameValue::Wildcard) => values(value).iter().map(|v| self.embed(v, &wildcard, stack)).collect(),
                Some(FrameValue::Nested(sub)) => values(value)
                    .iter()
                    .filter_map(|v| match self.resolve(v) {
                        Some(child) if self.matches(child, sub) => Some(self.embed(v, sub, stack)),
                        None if v.is_string() || v.get("id").or_else(|| v.get("@id")).is_some() => {
                            let mut bare = Map::new();
                            bare.insert("@id".to_owned(), v.clone());
                            self.matches(&bare, sub).then(|| v.clone())
                        }
                        _ => None,
                    })
                    .collect(),
                Some(FrameValue::Match(wanted)) => values(value).iter().filter(|v| wanted.contains(v)).cloned().collect(),
                None if !explicit => values(value).iter().map(|v| self.embed(v, &wildcard, stack)).collect(),
                None => continue,
            };
            if kept.is_empty() {
                continue;
            }
            let kept = if value.is_array() || kept.len() > 1 {
                Value::Array(kept)
            } else {
                kept.into_iter().next().unwrap_or(Value::Null)
            };
            out.insert(key.clone(), kept);
        }

        if id.is_some() {
            stack.pop();
        }
        out
    }
}

/// Selects the nodes of `compacted` matching `frame` and embeds the nodes they
/// reference as the frame describes. A frame matching no top level node is an
/// error.
pub(crate) fn frame_document(compacted: &Value, frame: &Map<String, Value>) -> Result<Value, Error> {
    let spec = FrameSpec::parse(frame)?;
    let graph = Graph::new(compacted);

    let mut stack = Vec::new();
    let mut framed: Vec<Value> = graph
        .nodes
        .iter()
        .filter(|node| graph.matches(node, &spec))
        .map(|node| Value::Object(graph.apply(*node, &spec, &mut stack)))
        .collect();

    let mut out = match framed.len() {
        0 => return Err(Error::InvalidInput("frame does not match the document".to_owned())),
        1 => match framed.pop() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => {
            let mut map = Map::new();
            map.insert("@graph".to_owned(), Value::Array(framed));
            map
        }
    };
    if let Some(context) = frame.get("@context") {
        out.insert("@context".to_owned(), context.clone());
    }
    Ok(Value::Object(out))
}
