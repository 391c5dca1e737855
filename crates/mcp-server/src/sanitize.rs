//! Recursive redaction of secret-looking keys in configuration-shaped data.

use serde_json::Value;

/// Key substrings that mark a value as sensitive, matched case-insensitively.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "key",
    "token",
    "api_key",
    "private_key",
    "auth_key",
    "access_token",
    "refresh_token",
    "client_secret",
];

const REDACTED: &str = "***REDACTED***";

/// Replace the value of any object key containing a sensitive substring with
/// a redaction marker, recursing through nested objects and arrays. Scalars
/// and array elements keep their values; only keyed lookups are redacted.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                if is_sensitive(key) {
                    out.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    out.insert(key.clone(), sanitize(val));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|marker| key.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn redacts_nested_sensitive_keys() {
        let input = json!({
            "password": "p@ss",
            "nested": { "api_key": "abc", "ok": "value" }
        });
        assert_eq!(
            sanitize(&input),
            json!({
                "password": "***REDACTED***",
                "nested": { "api_key": "***REDACTED***", "ok": "value" }
            })
        );
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        let input = json!({
            "DB_PASSWORD": "x",
            "authKey": "y",
            "cookieValidationKey": "z",
            "username": "admin"
        });
        let out = sanitize(&input);
        assert_eq!(out["DB_PASSWORD"], "***REDACTED***");
        assert_eq!(out["authKey"], "***REDACTED***");
        assert_eq!(out["cookieValidationKey"], "***REDACTED***");
        assert_eq!(out["username"], "admin");
    }

    #[test]
    fn recurses_into_arrays_of_objects() {
        let input = json!([{ "token": "t" }, { "plain": 1 }]);
        assert_eq!(
            sanitize(&input),
            json!([{ "token": "***REDACTED***" }, { "plain": 1 }])
        );
    }

    #[test]
    fn leaves_scalars_untouched() {
        assert_eq!(sanitize(&json!("password")), json!("password"));
        assert_eq!(sanitize(&json!(42)), json!(42));
        assert_eq!(sanitize(&json!(null)), json!(null));
    }

    #[test]
    fn redacted_value_replaces_whole_subtree() {
        let input = json!({ "db_credentials_key": { "user": "u", "pass": "p" } });
        assert_eq!(
            sanitize(&input),
            json!({ "db_credentials_key": "***REDACTED***" })
        );
    }
}
