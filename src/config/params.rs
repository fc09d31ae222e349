//! Typed accessors over a capability's raw TOML parameter table.
//!
//! Every accessor attributes failures to the owning capability so compile
//! errors read as `Invalid parameters for 'size': ...`.

use toml::Table;
use toml::Value;

use crate::conflict::ConflictPolicy;
use crate::error::ConfigError;

fn bad(capability: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::BadParams {
        capability: capability.to_string(),
        message: message.into(),
    }
}

/// Reject parameter keys outside `allowed`.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] naming the first unknown key.
pub fn ensure_known(table: &Table, capability: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(bad(capability, format!("unknown parameter '{key}'")));
        }
    }
    Ok(())
}

/// Optional string parameter.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] when present but not a string.
pub fn opt_str(table: &Table, capability: &str, key: &str) -> Result<Option<String>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(bad(
            capability,
            format!("'{key}' must be a string, got {}", other.type_str()),
        )),
    }
}

/// Required string parameter.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] when absent or not a string.
pub fn require_str(table: &Table, capability: &str, key: &str) -> Result<String, ConfigError> {
    opt_str(table, capability, key)?
        .ok_or_else(|| bad(capability, format!("missing required parameter '{key}'")))
}

/// String-or-list parameter, normalised to a list. Absent means empty.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] on any non-string element.
pub fn str_list(table: &Table, capability: &str, key: &str) -> Result<Vec<String>, ConfigError> {
    match table.get(key) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(bad(
                    capability,
                    format!("'{key}' must contain strings, got {}", other.type_str()),
                )),
            })
            .collect(),
        Some(other) => Err(bad(
            capability,
            format!(
                "'{key}' must be a string or list of strings, got {}",
                other.type_str()
            ),
        )),
    }
}

/// Optional boolean parameter, with a default.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] when present but not a boolean.
pub fn opt_bool(
    table: &Table,
    capability: &str,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match table.get(key) {
        None => Ok(default),
        Some(Value::Boolean(b)) => Ok(*b),
        Some(other) => Err(bad(
            capability,
            format!("'{key}' must be a boolean, got {}", other.type_str()),
        )),
    }
}

/// Optional integer parameter.
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] when present but not an integer.
pub fn opt_int(table: &Table, capability: &str, key: &str) -> Result<Option<i64>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(n)) => Ok(Some(*n)),
        Some(other) => Err(bad(
            capability,
            format!("'{key}' must be an integer, got {}", other.type_str()),
        )),
    }
}

/// Optional per-action conflict policy (`on_conflict` key).
///
/// # Errors
///
/// Returns [`ConfigError::BadParams`] on an unknown policy name.
pub fn opt_policy(table: &Table, capability: &str) -> Result<Option<ConflictPolicy>, ConfigError> {
    match table.get("on_conflict") {
        None => Ok(None),
        Some(value) => value
            .clone()
            .try_into::<ConflictPolicy>()
            .map(Some)
            .map_err(|e| bad(capability, format!("'on_conflict': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn ensure_known_rejects_stray_keys() {
        let t = table("dest = \"/a\"\ntypo = 1");
        assert!(ensure_known(&t, "move", &["dest", "on_conflict"]).is_err());
        assert!(ensure_known(&t, "move", &["dest", "typo"]).is_ok());
    }

    #[test]
    fn require_str_missing() {
        let t = table("");
        let err = require_str(&t, "move", "dest").unwrap_err();
        assert!(err.to_string().contains("missing required parameter"));
    }

    #[test]
    fn str_list_accepts_scalar_and_array() {
        let t = table("extensions = \"pdf\"");
        assert_eq!(str_list(&t, "extension", "extensions").unwrap(), ["pdf"]);
        let t = table("extensions = [\"pdf\", \"doc\"]");
        assert_eq!(
            str_list(&t, "extension", "extensions").unwrap(),
            ["pdf", "doc"]
        );
        let t = table("extensions = [1]");
        assert!(str_list(&t, "extension", "extensions").is_err());
    }

    #[test]
    fn opt_bool_defaults() {
        let t = table("");
        assert!(opt_bool(&t, "name", "case_sensitive", true).unwrap());
        let t = table("case_sensitive = false");
        assert!(!opt_bool(&t, "name", "case_sensitive", true).unwrap());
        let t = table("case_sensitive = \"yes\"");
        assert!(opt_bool(&t, "name", "case_sensitive", true).is_err());
    }

    #[test]
    fn opt_policy_parses_known_names() {
        let t = table("on_conflict = \"rename_new\"");
        assert_eq!(
            opt_policy(&t, "move").unwrap(),
            Some(ConflictPolicy::RenameNew)
        );
        let t = table("on_conflict = \"explode\"");
        assert!(opt_policy(&t, "move").is_err());
        let t = table("");
        assert_eq!(opt_policy(&t, "move").unwrap(), None);
    }

    #[test]
    fn opt_int_type_checked() {
        let t = table("days = 30");
        assert_eq!(opt_int(&t, "created", "days").unwrap(), Some(30));
        let t = table("days = \"30\"");
        assert!(opt_int(&t, "created", "days").is_err());
    }
}
