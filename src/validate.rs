//! Input validation for keys, table names and CLI values.
//!
//! Keys are checked before any write so a malformed key never reaches the
//! persistent table.

use crate::error::{Error, Result};
use crate::resolver::SEPARATOR;
use serde_json::Value;

/// Validate a dotted key: non-empty, with no empty segments.
///
/// # Errors
///
/// Returns `Error::InvalidKey` describing the first problem found.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "key is empty"));
    }
    if key.split(SEPARATOR).any(str::is_empty) {
        return Err(invalid(key, "key contains an empty segment"));
    }
    Ok(())
}

/// Validate a root key used by bulk `store`: a single non-empty segment.
///
/// # Errors
///
/// Returns `Error::InvalidKey` if the key is empty or dotted.
pub fn validate_root_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "key is empty"));
    }
    if key.contains(SEPARATOR) {
        return Err(invalid(key, "bulk store only accepts root keys"));
    }
    Ok(())
}

/// Check that a table name is a plain SQL identifier.
///
/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*`
/// is accepted.
///
/// # Errors
///
/// Returns `Error::Config` if the name is not a valid identifier.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= 64 {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid table name '{name}'")))
    }
}

/// Parse a CLI value argument.
///
/// Valid JSON is taken as-is (`42`, `true`, `{"a":1}`, `"quoted"`); anything
/// else becomes a JSON string so `reg set app.name demo` works unquoted.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn invalid(key: &str, reason: &'static str) -> Error {
    Error::InvalidKey {
        key: key.to_string(),
        reason,
    }
}
