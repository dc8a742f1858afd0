//! SELinux mode evaluation from the runtime state and the configured state

use super::{compile, ids};
use crate::sources::raw_text;
use hostfacts_core::component::{ComponentError, Fact, Inputs};
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;

const MODES: [&str; 3] = ["enforcing", "permissive", "disabled"];
const CONFIG_LINE: &str = r"^\s*(SELINUX|SELINUXTYPE)\s*=\s*(\S+)\s*$";
static CONFIG_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Normalize `getenforce` output to a lowercase mode
pub fn parse_getenforce(text: &str) -> Result<String, ComponentError> {
    let mode = text.trim().to_ascii_lowercase();
    if MODES.contains(&mode.as_str()) {
        Ok(mode)
    } else {
        Err(ComponentError::content(format!("unexpected getenforce output '{}'", text.trim())))
    }
}

/// Parse `/etc/selinux/config` into `{ "mode", "policy" }`
pub fn parse_selinux_config(content: &str) -> Result<Fact, ComponentError> {
    let line = compile(&CONFIG_LINE_REGEX, CONFIG_LINE)?;
    let mut mode = None;
    let mut policy = None;

    for captures in content
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .filter_map(|l| line.captures(l))
    {
        let value = captures[2].trim_matches('"').to_string();
        match &captures[1] {
            "SELINUX" => mode = Some(value.to_ascii_lowercase()),
            _ => policy = Some(value),
        }
    }

    let mode = mode.ok_or_else(|| ComponentError::content("SELINUX= not set"))?;
    if !MODES.contains(&mode.as_str()) {
        return Err(ComponentError::content(format!("unknown SELINUX mode '{}'", mode)));
    }
    Ok(json!({ "mode": mode, "policy": policy }))
}

/// Extractor over the raw config file
pub fn extract_config(inputs: &Inputs) -> Result<Fact, ComponentError> {
    parse_selinux_config(raw_text(inputs.require(ids::SELINUX_CONFIG_FILE)?)?)
}

/// Evaluator combining runtime (`getenforce`) and configured mode
///
/// The runtime mode takes precedence; `consistent` is false when both are
/// known and differ (a reboot is pending).
pub fn evaluate(inputs: &Inputs) -> Result<Fact, ComponentError> {
    let mut runtime = None;
    let mut configured = None;

    for (id, value) in inputs.group(0) {
        match id.as_str() {
            ids::GETENFORCE => runtime = Some(parse_getenforce(raw_text(value)?)?),
            ids::SELINUX_CONFIG => {
                configured = value.get("mode").and_then(Fact::as_str).map(String::from)
            }
            _ => {}
        }
    }

    let effective = runtime
        .clone()
        .or_else(|| configured.clone())
        .ok_or_else(|| ComponentError::skip("SELinux state unknown"))?;
    let consistent = match (&runtime, &configured) {
        (Some(runtime), Some(configured)) => runtime == configured,
        _ => true,
    };
    let os = inputs
        .optional(ids::OS_RELEASE)
        .and_then(|release| release.get("ID"))
        .cloned();

    Ok(json!({
        "mode": effective,
        "enforcing": effective == "enforcing",
        "runtime": runtime,
        "configured": configured,
        "consistent": consistent,
        "os": os,
    }))
}
