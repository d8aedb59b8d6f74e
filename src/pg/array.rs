//! Codec for the backend's delimited array literals (`{1,NULL,"a,b"}`).

use std::str::Chars;

use crate::pg::cast::{decode_scalar, encode_scalar};
use crate::types::{ScalarKind, SqlValue};

/// Parse an array literal into elements of `element_kind`.
///
/// Grammar: outer braces, comma separators. An element may be
/// double-quoted; inside quotes a backslash escapes the next character
/// literally. The unquoted token `NULL` (exactly that spelling) is a null
/// element, while a quoted `"NULL"` is the four-character string. Unquoted
/// empty tokens are skipped; only a quoted empty string produces an
/// empty-string element. An element that fails to decode as
/// `element_kind` becomes a null element.
///
/// Nested braces are parsed but their contents discarded.
// TODO: represent multi-dimensional arrays instead of dropping inner lists
pub fn parse(literal: &str, element_kind: ScalarKind) -> Vec<SqlValue> {
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => return parse_contents(&mut chars, element_kind),
            '}' => break,
            _ => {}
        }
    }
    Vec::new()
}

fn parse_contents(chars: &mut Chars<'_>, element_kind: ScalarKind) -> Vec<SqlValue> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut escaping = false;
    let mut quoted = false;
    let mut was_quoted = false;

    while let Some(token) = chars.next() {
        if escaping {
            current.push(token);
            escaping = false;
            continue;
        }

        if quoted {
            match token {
                '"' => {
                    quoted = false;
                    was_quoted = true;
                }
                '\\' => escaping = true,
                _ => current.push(token),
            }
            continue;
        }

        match token {
            '\\' => escaping = true,
            '"' => quoted = true,
            ',' => {
                push_element(&mut elements, &current, was_quoted, element_kind);
                current.clear();
                was_quoted = false;
            }
            '{' => {
                // Nested element list: consume it, discard its contents.
                let _ = parse_contents(chars, element_kind);
            }
            '}' => {
                push_element(&mut elements, &current, was_quoted, element_kind);
                return elements;
            }
            _ => current.push(token),
        }
    }

    elements
}

fn push_element(
    elements: &mut Vec<SqlValue>,
    current: &str,
    quoted: bool,
    element_kind: ScalarKind,
) {
    if !quoted && current.is_empty() {
        return;
    }

    if !quoted && current == "NULL" {
        elements.push(SqlValue::Null);
    } else {
        elements.push(decode_scalar(element_kind, current).unwrap_or(SqlValue::Null));
    }
}

/// Serialize elements back to an array literal.
///
/// Null elements become unquoted `NULL`; everything else goes through the
/// scalar encoder. No quoting is added on this path, so the result is only
/// the strict inverse of [`parse`] when element content is free of
/// delimiter characters; callers embedding commas, braces, quotes or
/// backslashes must quote for themselves.
pub fn serialize(elements: &[SqlValue]) -> String {
    let rendered: Vec<String> = elements
        .iter()
        .map(|element| match element {
            SqlValue::Null => "NULL".to_string(),
            value => encode_scalar(value),
        })
        .collect();

    format!("{{{}}}", rendered.join(","))
}
