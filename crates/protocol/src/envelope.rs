//! Inbound line decoding and outbound response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RpcError;
use crate::JSONRPC_VERSION;

/// A request that expects a response. The `id` is kept as a raw JSON value so
/// it echoes back losslessly whether the client sent a number, a string or an
/// explicit `null`.
#[derive(Debug, Clone)]
pub struct Call {
    pub id: Value,
    pub method: String,
    pub params: Value,
}

/// A request without an `id` member. Never answered, not even on failure.
#[derive(Debug, Clone)]
pub struct Notification {
    pub method: String,
    pub params: Value,
}

/// Outcome of decoding one wire line.
#[derive(Debug, Clone)]
pub enum Decoded {
    Call(Call),
    Notification(Notification),
    /// Undecodable line. `id` is whatever could be salvaged for the error
    /// envelope: `None` means the envelope carries no `id` member at all.
    Invalid { id: Option<Value>, error: RpcError },
}

/// Decode one line of input.
///
/// Presence of an `id` member, including an explicit `null`, makes the line a
/// [`Call`]; absence makes it a [`Notification`]. The `jsonrpc` member is not
/// validated, matching what clients get away with in practice.
pub fn decode_line(line: &str) -> Decoded {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => {
            return Decoded::Invalid {
                id: None,
                error: RpcError::Parse,
            }
        }
    };

    let Some(envelope) = value.as_object() else {
        return Decoded::Invalid {
            id: Some(Value::Null),
            error: RpcError::InvalidRequest,
        };
    };

    let method = match envelope.get("method").and_then(Value::as_str) {
        Some(method) => method.to_string(),
        None => {
            let id = envelope.get("id").cloned().unwrap_or(Value::Null);
            return Decoded::Invalid {
                id: Some(id),
                error: RpcError::InvalidRequest,
            };
        }
    };

    let params = envelope.get("params").cloned().unwrap_or_else(|| json!({}));

    match envelope.get("id") {
        Some(id) => Decoded::Call(Call {
            id: id.clone(),
            method,
            params,
        }),
        None => Decoded::Notification(Notification { method, params }),
    }
}

/// Outbound response envelope. Exactly one of `result`/`error` is set.
///
/// `id` is `Option` only so the parse-error envelope can omit the member
/// entirely; every other response carries it, echoed or `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: &RpcError) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(ErrorObject::from(error)),
        }
    }

    /// Serialize for the wire. Falls back to a hand-built internal-error
    /// envelope if serialization itself fails, so the caller always gets one
    /// well-formed line per request.
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":-32603,"message":"Internal error","data":{{"message":{}}}}}}}"#,
                json!(e.to_string())
            )
        })
    }
}

/// Error member of a response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&RpcError> for ErrorObject {
    fn from(error: &RpcError) -> Self {
        ErrorObject {
            code: error.code(),
            message: error.message().to_string(),
            data: error.data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_call_with_numeric_id() {
        let decoded = decode_line(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#);
        match decoded {
            Decoded::Call(call) => {
                assert_eq!(call.id, json!(7));
                assert_eq!(call.method, "tools/list");
                assert_eq!(call.params, json!({}));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn explicit_null_id_is_still_a_call() {
        let decoded = decode_line(r#"{"id":null,"method":"tools/list"}"#);
        match decoded {
            Decoded::Call(call) => assert_eq!(call.id, Value::Null),
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn missing_id_is_a_notification() {
        let decoded = decode_line(r#"{"method":"notifications/initialized","params":{}}"#);
        assert!(matches!(decoded, Decoded::Notification(n) if n.method == "notifications/initialized"));
    }

    #[test]
    fn garbage_is_a_parse_error_without_id() {
        let decoded = decode_line("{not json");
        match decoded {
            Decoded::Invalid { id, error } => {
                assert_eq!(id, None);
                assert_eq!(error, RpcError::Parse);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn non_object_is_invalid_request_with_null_id() {
        let decoded = decode_line("42");
        match decoded {
            Decoded::Invalid { id, error } => {
                assert_eq!(id, Some(Value::Null));
                assert_eq!(error, RpcError::InvalidRequest);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn missing_method_echoes_id() {
        let decoded = decode_line(r#"{"id":"abc","params":{}}"#);
        match decoded {
            Decoded::Invalid { id, error } => {
                assert_eq!(id, Some(json!("abc")));
                assert_eq!(error, RpcError::InvalidRequest);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn non_string_method_is_invalid_request() {
        let decoded = decode_line(r#"{"id":1,"method":42}"#);
        match decoded {
            Decoded::Invalid { id, error } => {
                assert_eq!(id, Some(json!(1)));
                assert_eq!(error, RpcError::InvalidRequest);
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn success_envelope_has_result_and_no_error() {
        let line = Response::success(json!(1), json!({"ok": true})).to_line();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert_eq!(value["result"], json!({"ok": true}));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn parse_error_envelope_omits_id_member() {
        let line = Response::failure(None, &RpcError::Parse).to_line();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["error"]["code"], -32700);
        assert_eq!(value["error"]["message"], "Parse error");
    }

    #[test]
    fn internal_error_envelope_carries_cause() {
        let err = RpcError::Internal("Unknown method: bogus".into());
        let line = Response::failure(Some(json!(3)), &err).to_line();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["error"]["code"], -32603);
        assert_eq!(value["error"]["message"], "Internal error");
        assert_eq!(value["error"]["data"]["message"], "Unknown method: bogus");
    }
}
