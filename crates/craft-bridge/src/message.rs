//! The script to native message envelope.

use serde_json::Value;

/// Handler type reserved for script-side debug logging.
pub const DEBUG_TYPE: &str = "debug";

/// A decoded bridge message.
///
/// On the wire this is `{"type": string, "action": string, "data": any}`.
/// `data` is always carried as a string: non-string JSON values are
/// canonicalized to their JSON text during decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeMessage {
    /// Handler selector (`type` on the wire).
    pub kind: String,
    /// Behavior within the handler.
    pub action: String,
    /// Handler-defined payload.
    pub data: Option<String>,
}

impl BridgeMessage {
    /// Construct a message.
    pub fn new(kind: impl Into<String>, action: impl Into<String>, data: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            action: action.into(),
            data,
        }
    }

    /// Payload as a string slice.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Text to log for a `debug` message: the `message` field of a JSON
    /// payload, or the raw payload otherwise.
    pub fn debug_text(&self) -> String {
        let Some(data) = self.data() else {
            return String::new();
        };
        match serde_json::from_str::<Value>(data) {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => data.to_string(),
            },
            _ => data.to_string(),
        }
    }
}
