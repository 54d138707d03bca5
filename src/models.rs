use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ApiError;

/// Longest abbreviation accepted by `/add`, in characters
pub const MAX_KEY_CHARS: usize = 50;

/// Request body for `/guess`
///
/// Built from an already parsed body with `Value::get`, so a body that is
/// not a JSON object, or whose `text` is missing, null or not a string, is
/// reported as a missing key rather than as a parse failure.
#[derive(utoipa::ToSchema)]
pub struct GuessRequest {
    #[schema(value_type = String, example = "ast")]
    pub text: JsonValue,
}

impl GuessRequest {
    pub fn from_body(body: &JsonValue) -> Self {
        Self {
            text: field(body, "text"),
        }
    }

    /// The abbreviation as submitted, if it is a non-empty string
    pub fn abbreviation(&self) -> Result<&str, ApiError> {
        self.text
            .as_str()
            .filter(|text| !text.is_empty())
            .ok_or(ApiError::MissingText)
    }
}

/// One lookup hit in the `/guess` response
#[derive(Debug, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct GuessEntry {
    /// The abbreviation in the case it was looked up with
    pub name: String,
    pub trans: Vec<String>,
}

/// Request body for `/add`
#[derive(utoipa::ToSchema)]
pub struct AddRequest {
    #[schema(value_type = String, example = "ast")]
    pub key: JsonValue,
    #[schema(value_type = Vec<String>, example = json!(["abstract syntax tree"]))]
    pub value: JsonValue,
}

/// A validated registration: normalized key plus deduplicated translations
#[derive(Debug, PartialEq)]
pub struct Registration {
    pub key: String,
    pub translations: Vec<String>,
}

impl AddRequest {
    pub fn from_body(body: &JsonValue) -> Self {
        Self {
            key: field(body, "key"),
            value: field(body, "value"),
        }
    }

    /// Validate the key first, then the value.
    ///
    /// The length limit applies to the stored, lowercased key: lowercasing
    /// can add characters (`İ` becomes `i̇`).
    pub fn into_registration(self) -> Result<Registration, ApiError> {
        let key = self
            .key
            .as_str()
            .map(normalize_key)
            .filter(|key| !key.is_empty() && key.chars().count() <= MAX_KEY_CHARS)
            .ok_or(ApiError::InvalidKey)?;

        let translations: Vec<String> =
            serde_json::from_value(self.value).map_err(|_| ApiError::InvalidValue)?;

        Ok(Registration {
            key,
            translations: merge_translations(Vec::new(), translations),
        })
    }
}

/// Member of a JSON object body; `Null` if absent or the body is not an object
fn field(body: &JsonValue, name: &str) -> JsonValue {
    body.get(name).cloned().unwrap_or(JsonValue::Null)
}

/// Store key for an abbreviation
pub fn normalize_key(abbreviation: &str) -> String {
    abbreviation.to_lowercase()
}

/// Union of two translation lists with duplicates removed
///
/// Existing entries keep their stored order, then incoming entries follow
/// in submission order. Only the first occurrence of each string is kept.
pub fn merge_translations(existing: Vec<String>, incoming: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .into_iter()
        .chain(incoming)
        .filter(|translation| seen.insert(translation.clone()))
        .collect()
}

/// Stored record format: a JSON array of strings
pub fn decode_translations(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn encode_translations(translations: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(translations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn add_request(body: JsonValue) -> AddRequest {
        AddRequest::from_body(&body)
    }

    #[test]
    fn test_merge_appends_new_values_after_existing() {
        let merged = merge_translations(
            strings(&["abstract syntax tree"]),
            strings(&["another syntax thing"]),
        );
        assert_eq!(merged, strings(&["abstract syntax tree", "another syntax thing"]));
    }

    #[test]
    fn test_merge_drops_duplicates_keeping_first() {
        let merged = merge_translations(strings(&["a", "b"]), strings(&["b", "c", "a", "c"]));
        assert_eq!(merged, strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_is_idempotent_on_resubmission() {
        let once = merge_translations(Vec::new(), strings(&["x", "y"]));
        let twice = merge_translations(once.clone(), strings(&["x", "y"]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_is_case_sensitive_on_values() {
        let merged = merge_translations(strings(&["Tree"]), strings(&["tree"]));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_guess_request_abbreviation() {
        let req = GuessRequest::from_body(&json!({"text": "AST"}));
        assert_eq!(req.abbreviation().unwrap(), "AST");

        for body in [json!({}), json!({"text": ""}), json!({"text": null}), json!({"text": 5})] {
            let req = GuessRequest::from_body(&body);
            assert!(matches!(req.abbreviation(), Err(ApiError::MissingText)));
        }
    }

    #[test]
    fn test_non_object_bodies_have_no_fields() {
        for body in [json!(42), json!("ast"), json!(["ast"]), json!(null), json!(true)] {
            let req = GuessRequest::from_body(&body);
            assert!(matches!(req.abbreviation(), Err(ApiError::MissingText)), "body: {}", body);
        }

        for body in [json!(42), json!("ast"), json!(["new", ["y"]])] {
            let result = add_request(body.clone()).into_registration();
            assert!(matches!(result, Err(ApiError::InvalidKey)), "body: {}", body);
        }
    }

    #[test]
    fn test_registration_lowercases_and_dedups() {
        let registration = add_request(json!({"key": "AST", "value": ["t", "t", "u"]}))
            .into_registration()
            .unwrap();
        assert_eq!(
            registration,
            Registration {
                key: "ast".to_string(),
                translations: strings(&["t", "u"]),
            }
        );
    }

    #[test]
    fn test_registration_key_limit_counts_characters() {
        let at_limit = "é".repeat(MAX_KEY_CHARS);
        assert!(add_request(json!({"key": at_limit, "value": []}))
            .into_registration()
            .is_ok());

        let over_limit = "a".repeat(MAX_KEY_CHARS + 1);
        assert!(matches!(
            add_request(json!({"key": over_limit, "value": []})).into_registration(),
            Err(ApiError::InvalidKey)
        ));
    }

    #[test]
    fn test_registration_key_limit_applies_after_lowercasing() {
        // "İ" lowercases to "i" plus a combining dot, two characters
        let half = "İ".repeat(MAX_KEY_CHARS / 2);
        let registration = add_request(json!({"key": half, "value": []}))
            .into_registration()
            .unwrap();
        assert_eq!(registration.key.chars().count(), MAX_KEY_CHARS);

        let over_limit = "İ".repeat(MAX_KEY_CHARS);
        assert!(matches!(
            add_request(json!({"key": over_limit, "value": []})).into_registration(),
            Err(ApiError::InvalidKey)
        ));
    }

    #[test]
    fn test_registration_rejects_bad_keys() {
        for key in [json!(""), json!(42), json!(null), json!(["ast"])] {
            let result = add_request(json!({"key": key, "value": ["x"]})).into_registration();
            assert!(matches!(result, Err(ApiError::InvalidKey)));
        }
        let result = add_request(json!({"value": ["x"]})).into_registration();
        assert!(matches!(result, Err(ApiError::InvalidKey)));
    }

    #[test]
    fn test_registration_key_checked_before_value() {
        let result = add_request(json!({"key": "", "value": "not a list"})).into_registration();
        assert!(matches!(result, Err(ApiError::InvalidKey)));
    }

    #[test]
    fn test_registration_rejects_bad_values() {
        for value in [json!("tree"), json!([1, 2]), json!(null), json!({"a": "b"})] {
            let result = add_request(json!({"key": "ast", "value": value})).into_registration();
            assert!(matches!(result, Err(ApiError::InvalidValue)));
        }
    }

    #[test]
    fn test_stored_format_is_json_array() {
        let encoded = encode_translations(&strings(&["a", "b"])).unwrap();
        assert_eq!(encoded, r#"["a","b"]"#);
        assert!(decode_translations("{\"not\": \"a list\"}").is_err());
    }
}
