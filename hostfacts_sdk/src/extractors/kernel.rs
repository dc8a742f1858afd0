//! Kernel release: two alternative providers and an aggregator choosing
//! between them

use super::compile;
use crate::sources::raw_text;
use hostfacts_core::component::{ComponentError, Fact, Inputs};
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;

const RELEASE: &str = r"^(\d+)\.(\d+)(?:\.(\d+))?(?:[-+](\S+))?$";
static RELEASE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Parse a release string such as `5.14.0-362.8.1.el9_3.x86_64`
pub fn parse_kernel_release(text: &str) -> Result<Fact, ComponentError> {
    let release = text.trim();
    let captures = compile(&RELEASE_REGEX, RELEASE)?
        .captures(release)
        .ok_or_else(|| ComponentError::content(format!("unrecognized kernel release '{}'", release)))?;

    let number = |index: usize| -> Result<Option<u64>, ComponentError> {
        captures
            .get(index)
            .map(|m| {
                m.as_str()
                    .parse::<u64>()
                    .map_err(|e| ComponentError::content(e.to_string()))
            })
            .transpose()
    };

    Ok(json!({
        "release": release,
        "major": number(1)?,
        "minor": number(2)?,
        "patch": number(3)?,
        "build": captures.get(4).map(|m| m.as_str()),
    }))
}

/// Extractor reading the release from the output of `source`
pub fn from_source(source: &'static str) -> impl Fn(&Inputs) -> Result<Fact, ComponentError> {
    move |inputs: &Inputs| parse_kernel_release(raw_text(inputs.require(source)?)?)
}

/// Aggregator over every `kernel_release` provider
///
/// The first successful provider in declaration order wins; the others are
/// only used to report whether they agree.
pub fn aggregate(inputs: &Inputs) -> Result<Fact, ComponentError> {
    let providers = inputs.group(0);
    let (chosen, value) = providers
        .first()
        .ok_or_else(|| ComponentError::skip("no kernel release provider succeeded"))?;

    let release = value.get("release").cloned().unwrap_or_default();
    let consistent = providers
        .iter()
        .all(|(_, other)| other.get("release") == Some(&release));

    let mut fact = (**value).clone();
    if let Some(object) = fact.as_object_mut() {
        object.insert("provider".to_string(), json!(chosen.as_str()));
        object.insert(
            "providers".to_string(),
            json!(providers.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>()),
        );
        object.insert("consistent".to_string(), json!(consistent));
    }
    Ok(fact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ids;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_rhel_release() {
        let fact = parse_kernel_release("5.14.0-362.8.1.el9_3.x86_64\n").unwrap();
        assert_eq!(fact["major"], 5);
        assert_eq!(fact["minor"], 14);
        assert_eq!(fact["patch"], 0);
        assert_eq!(fact["build"], "362.8.1.el9_3.x86_64");
    }

    #[test]
    fn test_parse_short_release() {
        let fact = parse_kernel_release("6.1").unwrap();
        assert_eq!(fact["patch"], serde_json::Value::Null);
        assert_eq!(fact["build"], serde_json::Value::Null);
    }

    #[test]
    fn test_parse_garbage() {
        assert_matches!(
            parse_kernel_release("not a kernel"),
            Err(ComponentError::Content { .. })
        );
    }

    #[test]
    fn test_from_source() {
        let extract = from_source(ids::UNAME_R);
        let inputs = Inputs::new().with_required(
            ids::UNAME_R,
            json!({"command": "uname -r", "stdout": "6.5.6-300.fc39.x86_64\n", "exit_code": 0}),
        );
        assert_eq!(extract(&inputs).unwrap()["minor"], 5);
    }

    #[test]
    fn test_aggregate_prefers_first_provider() {
        let inputs = Inputs::new().with_group([
            (ids::KERNEL_RELEASE_UNAME, json!({"release": "5.14.0-1"})),
            (ids::KERNEL_RELEASE_PROC, json!({"release": "5.14.0-2"})),
        ]);

        let fact = aggregate(&inputs).unwrap();
        assert_eq!(fact["release"], "5.14.0-1");
        assert_eq!(fact["provider"], ids::KERNEL_RELEASE_UNAME);
        assert_eq!(fact["consistent"], false);
    }

    #[test]
    fn test_aggregate_single_provider() {
        let inputs = Inputs::new()
            .with_group([(ids::KERNEL_RELEASE_PROC, json!({"release": "6.1.0"}))]);

        let fact = aggregate(&inputs).unwrap();
        assert_eq!(fact["provider"], ids::KERNEL_RELEASE_PROC);
        assert_eq!(fact["consistent"], true);
    }
}
