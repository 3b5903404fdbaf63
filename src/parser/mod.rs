//! Input parser (verb module)
//!
//! Transforms JSON intents and YAML policy/configuration files into model
//! types. Policies and configuration are validated on load; intents are
//! validated later, during compilation.

use serde_json::Value;
use std::path::Path;

use crate::config::CompilerConfig;
use crate::error::ParseError;
use crate::intent::{extract_json, QueryIntent};
use crate::policy::StaticPolicy;

fn read_file<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
    let path_str = path.as_ref().display().to_string();
    std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })
}

/// Parse an intent from a JSON string.
///
/// Only a document that is not a JSON object at all fails; malformed
/// fields inside it fall back to their defaults.
pub fn parse_intent_str(json: &str) -> Result<QueryIntent, ParseError> {
    let value: Value = serde_json::from_str(json)?;
    parse_intent_value(value)
}

pub fn parse_intent_value(value: Value) -> Result<QueryIntent, ParseError> {
    if !value.is_object() {
        return Err(ParseError::from(<serde_json::Error as serde::de::Error>::custom(
            "intent must be a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(ParseError::from)
}

/// Parse an intent out of a raw interpreter response (prose, code fences).
pub fn parse_intent_response(response: &str) -> Result<QueryIntent, ParseError> {
    parse_intent_str(extract_json(response))
}

/// Parse an intent from a JSON file
pub fn parse_intent_file<P: AsRef<Path>>(path: P) -> Result<QueryIntent, ParseError> {
    parse_intent_str(&read_file(path)?)
}

/// Parse and validate an access policy from a YAML string
pub fn parse_policy_str(yaml: &str) -> Result<StaticPolicy, ParseError> {
    let policy: StaticPolicy = serde_yaml::from_str(yaml)?;
    policy.validate()?;
    Ok(policy)
}

/// Parse and validate an access policy from a YAML file
pub fn parse_policy_file<P: AsRef<Path>>(path: P) -> Result<StaticPolicy, ParseError> {
    parse_policy_str(&read_file(path)?)
}

/// Parse and validate compiler configuration from a YAML string
pub fn parse_config_str(yaml: &str) -> Result<CompilerConfig, ParseError> {
    let config: CompilerConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate compiler configuration from a YAML file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<CompilerConfig, ParseError> {
    parse_config_str(&read_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Aggregate, TimeFilterKind};

    #[test]
    fn test_parse_intent_with_junk_fields() {
        let intent = parse_intent_str(
            r#"{"table": "sales_orders", "metrics": [{"field": "amount_total", "aggregate": "median"}, 42],
                "timeFilter": "yesterday", "limit": "lots", "unknownKey": true}"#,
        )
        .unwrap();
        assert_eq!(intent.metrics.len(), 1);
        assert_eq!(intent.metrics[0].aggregate, Aggregate::Sum);
        assert!(intent.time_filter.is_none());
        assert_eq!(intent.limit, None);
    }

    #[test]
    fn test_parse_intent_rejects_non_object() {
        assert!(matches!(parse_intent_str("not json"), Err(ParseError::Json { .. })));
        assert!(matches!(parse_intent_str("[1, 2]"), Err(ParseError::Json { .. })));
    }

    #[test]
    fn test_parse_intent_response() {
        let response = "Sure! Here it is:\n```json\n{\"table\": \"sales_orders\", \"timeFilter\": {\"type\": \"last_year\"}}\n```";
        let intent = parse_intent_response(response).unwrap();
        assert_eq!(intent.table, "sales_orders");
        assert_eq!(intent.time_filter.unwrap().kind, TimeFilterKind::LastYear);
    }

    #[test]
    fn test_parse_policy_validates() {
        let yaml = "tables:\n  \"orders; --\":\n    fields: [id]\n";
        assert!(matches!(parse_policy_str(yaml), Err(ParseError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_config_validates() {
        assert!(parse_config_str("defaultLimit: 25\n").is_ok());
        assert!(matches!(
            parse_config_str("tenantColumn: \"a b\"\n"),
            Err(ParseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_policy_file("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}
