//! Helpers for validating request fields.
//!
//! Request bodies are parsed with `deny_unknown_fields`, so the set of
//! accepted keys is exactly the struct's fields. These helpers apply the
//! remaining per-field rules (trimming, required values).

/// Trim a required field, rejecting empty or whitespace-only values.
pub fn required(value: Option<String>, field: &str) -> Result<String, String> {
    let trimmed = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(format!("'{field}' is required"));
    }
    Ok(trimmed)
}

/// Trim an optional field. Whitespace-only values become `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a JSON body into `T`, mapping serde errors to a readable message.
///
/// `T` is expected to use `#[serde(deny_unknown_fields)]`; an unexpected key
/// is reported as "unknown field `x`".
pub fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, String> {
    if !body.is_object() {
        return Err("request body must be a JSON object".to_string());
    }
    serde_json::from_value(body).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  bob ".to_string()), "username").unwrap(), "bob");
    }

    #[test]
    fn test_required_rejects_blank() {
        let err = required(Some("   ".to_string()), "name").unwrap_err();
        assert_eq!(err, "'name' is required");
        assert!(required(None, "name").is_err());
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some(" ".to_string())), None);
        assert_eq!(optional(Some(" Doe ".to_string())), Some("Doe".to_string()));
    }

    #[test]
    fn test_parse_body_rejects_non_object() {
        #[derive(serde::Deserialize)]
        struct Empty {}
        let err = parse_body::<Empty>(serde_json::json!([1, 2])).err().unwrap();
        assert!(err.contains("JSON object"));
    }
}
