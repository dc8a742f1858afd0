//! `/etc/os-release` parsing

use super::{compile, ids};
use crate::sources::raw_text;
use hostfacts_core::component::{ComponentError, Fact, Inputs};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

const ASSIGNMENT: &str = r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$";
static ASSIGNMENT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Parse shell-style `KEY=value` assignments into a JSON object
pub fn parse_os_release(content: &str) -> Result<Fact, ComponentError> {
    let assignment = compile(&ASSIGNMENT_REGEX, ASSIGNMENT)?;
    let mut fields = Map::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(captures) = assignment.captures(line) {
            fields.insert(captures[1].to_string(), Value::String(unquote(&captures[2])));
        }
    }

    if fields.is_empty() {
        return Err(ComponentError::content("no KEY=value assignments found"));
    }
    Ok(Value::Object(fields))
}

/// Extractor over the raw os-release file
pub fn extract(inputs: &Inputs) -> Result<Fact, ComponentError> {
    parse_os_release(raw_text(inputs.require(ids::OS_RELEASE_FILE)?)?)
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && bytes[0] == bytes[bytes.len() - 1] {
        let inner = &value[1..value.len() - 1];
        match bytes[0] {
            b'\'' => return inner.to_string(),
            b'"' => return unescape(inner),
            _ => {}
        }
    }
    value.to_string()
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\' | '$' | '`')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
