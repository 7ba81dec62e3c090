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

//! Splitting canonical documents into the statement lines signed as
//! individual BBS+ messages.

const BNID_PLACEHOLDER: &str = "<urn:bnid:_:c14n";
/// Length of `<urn:bnid:`, the part dropped when unwrapping.
const BNID_PREFIX_LEN: usize = 10;
const BLANK_LABEL: &str = "_:c14n";

/// Splits canonical bytes into statements, skipping whitespace-only lines.
/// With `transform_blank_nodes` every line goes through
/// [`transform_from_blank_node`].
pub fn split_statements(data: &[u8], transform_blank_nodes: bool) -> Vec<String> {
    String::from_utf8_lossy(data)
        .split('\n')
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            if transform_blank_nodes {
                transform_from_blank_node(row)
            } else {
                row.to_owned()
            }
        })
        .collect()
}

/// `<urn:bnid:_:c14n0>` becomes `_:c14n0`. Only the first occurrence of a
/// line is rewritten.
pub fn transform_from_blank_node(row: &str) -> String {
    let Some(start) = row.find(BNID_PLACEHOLDER) else {
        return row.to_owned();
    };
    let Some(end) = row[start..].find('>').map(|i| i + start) else {
        return row.to_owned();
    };
    format!("{}{}{}", &row[..start], &row[start + BNID_PREFIX_LEN..end], &row[end + 1..])
}

/// Inverse of [`transform_from_blank_node`]: wraps the first `_:c14nN` label
/// of a line as `<urn:bnid:_:c14nN>`.
pub fn transform_to_blank_node(row: &str) -> String {
    let Some(start) = row.find(BLANK_LABEL) else {
        return row.to_owned();
    };
    let end = row[start..].find(' ').map(|i| i + start).unwrap_or(row.len());
    format!("{}<urn:bnid:{}>{}", &row[..start], &row[start..end], &row[end..])
}

pub(crate) fn to_messages(statements: &[String]) -> Vec<&[u8]> {
    statements.iter().map(|s| s.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_skips_blank_lines() {
        let data = b"<urn:a> <urn:p> \"1\" .\n\n   \n<urn:b> <urn:p> \"2\" .\n";
        assert_eq!(
            split_statements(data, false),
            vec!["<urn:a> <urn:p> \"1\" .", "<urn:b> <urn:p> \"2\" ."]
        );
    }

    #[test]
    fn transform_unwraps_first_placeholder_only() {
        let row = "<urn:bnid:_:c14n0> <urn:p> <urn:bnid:_:c14n1> .";
        assert_eq!(transform_from_blank_node(row), "_:c14n0 <urn:p> <urn:bnid:_:c14n1> .");
        assert_eq!(transform_from_blank_node("<urn:a> <urn:p> \"x\" ."), "<urn:a> <urn:p> \"x\" .");
        // unterminated placeholder is left alone
        assert_eq!(transform_from_blank_node("<urn:bnid:_:c14n0"), "<urn:bnid:_:c14n0");
    }

    #[test]
    fn transform_to_blank_node_wraps_label() {
        assert_eq!(transform_to_blank_node("_:c14n2 <urn:p> \"x\" ."), "<urn:bnid:_:c14n2> <urn:p> \"x\" .");
        assert_eq!(transform_to_blank_node("<urn:a> <urn:p> _:c14n3"), "<urn:a> <urn:p> <urn:bnid:_:c14n3>");
        assert_eq!(transform_to_blank_node("<urn:a> <urn:p> \"x\" ."), "<urn:a> <urn:p> \"x\" .");
    }

    proptest! {
        #[test]
        fn wrap_then_unwrap_is_identity(n in 0u32..1000, subject_first in any::<bool>(), literal in "[a-z ]{0,12}") {
            let row = if subject_first {
                format!("_:c14n{} <urn:p> \"{}\" .", n, literal)
            } else {
                format!("<urn:s> <urn:p> _:c14n{} .", n)
            };
            prop_assert_eq!(transform_from_blank_node(&transform_to_blank_node(&row)), row);
        }

        #[test]
        fn split_never_yields_blank_lines(lines in proptest::collection::vec("[ a-z<>:_.]{0,20}", 0..20)) {
            let joined = lines.join("\n");
            let split = split_statements(joined.as_bytes(), true);
            prop_assert!(split.iter().all(|l| !l.trim().is_empty()));
            prop_assert!(split.len() <= lines.len());
        }
    }
}
