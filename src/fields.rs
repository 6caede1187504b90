//! Journal field names and the conversion of arbitrary event data into
//! journal fields.
//!
//! User journal fields as documented in `systemd.journal-fields(7)`.

use serde_json::Value;
use std::collections::HashMap;

pub const MESSAGE: &str = "MESSAGE";
pub const PRIORITY: &str = "PRIORITY";

pub const MESSAGE_ID: &str = "MESSAGE_ID";
pub const CODE_FILE: &str = "CODE_FILE";
pub const CODE_LINE: &str = "CODE_LINE";
pub const CODE_FUNC: &str = "CODE_FUNC";
pub const ERRNO: &str = "ERRNO";
pub const INVOCATION_ID: &str = "INVOCATION_ID";
pub const USER_INVOCATION_ID: &str = "USER_INVOCATION_ID";
pub const DOCUMENTATION: &str = "DOCUMENTATION";
pub const THREAD_ID: &str = "TID";

/// Turn an arbitrary key into a journal-legal field name.
///
/// ASCII letters are upper-cased, ASCII digits kept, every other `char`
/// becomes `_`, and leading underscores are then stripped. The result
/// may be empty (e.g. for `"__"`); the journal rejects such a name at
/// submission time.
pub fn normalize_field_name(key: &str) -> String {
    let mapped: String = key
        .chars()
        .map(|c| match c {
            'A'..='Z' | '0'..='9' => c,
            'a'..='z' => c.to_ascii_uppercase(),
            _ => '_',
        })
        .collect();

    mapped.trim_start_matches('_').to_string()
}

/// Default textual form of a field value.
///
/// Strings are written without quotes; everything else uses its compact
/// JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize every key and stringify every value.
///
/// Keys that normalize to the same name overwrite each other in the
/// map's iteration order, which for a `HashMap` is unspecified.
pub fn convert_fields(data: &HashMap<String, Value>) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(data.len());
    for (key, value) in data {
        fields.insert(normalize_field_name(key), value_to_string(value));
    }
    fields
}
