use serde_json::{json, Value};
use thiserror::Error;

/// The error codes this server actually emits.
///
/// Unknown methods, tools and resources are all reported as `Internal`
/// (-32603) rather than -32601. Clients in the field match on that code, so
/// the closed set here is deliberate.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RpcError {
    /// The line was not valid JSON.
    #[error("Parse error")]
    Parse,
    /// The line parsed but is not a usable request envelope.
    #[error("Invalid Request")]
    InvalidRequest,
    /// Any failure raised while handling an otherwise valid request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            RpcError::Parse => -32700,
            RpcError::InvalidRequest => -32600,
            RpcError::Internal(_) => -32603,
        }
    }

    /// Wire message. `Internal` keeps the generic string and carries the
    /// cause in [`RpcError::data`] so clients can match on a stable message.
    pub fn message(&self) -> &'static str {
        match self {
            RpcError::Parse => "Parse error",
            RpcError::InvalidRequest => "Invalid Request",
            RpcError::Internal(_) => "Internal error",
        }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            RpcError::Internal(message) => Some(json!({ "message": message })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_jsonrpc_spec() {
        assert_eq!(RpcError::Parse.code(), -32700);
        assert_eq!(RpcError::InvalidRequest.code(), -32600);
        assert_eq!(RpcError::Internal("x".into()).code(), -32603);
    }

    #[test]
    fn internal_error_keeps_cause_in_data() {
        let err = RpcError::Internal("Unknown tool: nope".into());
        assert_eq!(err.message(), "Internal error");
        assert_eq!(err.data(), Some(json!({ "message": "Unknown tool: nope" })));
    }

    #[test]
    fn envelope_errors_carry_no_data() {
        assert_eq!(RpcError::Parse.data(), None);
        assert_eq!(RpcError::InvalidRequest.data(), None);
    }
}
