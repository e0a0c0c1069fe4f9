//! Decoders for raw bridge payloads.
//!
//! Payloads normally arrive as JSON. Some delivery paths instead hand us the
//! toolkit's generic object description (`{ action = show; type = window; }`),
//! so decoding is an ordered chain: each [`Decoder`] either produces a
//! message, declares the payload invalid, or passes it on.

use std::result::Result as StdResult;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    error::{Error, Result},
    message::BridgeMessage,
};

/// Outcome of a single decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The payload was understood.
    Message(BridgeMessage),
    /// The payload is in this decoder's format but unusable; stop the chain.
    Invalid(String),
    /// Not this decoder's format; try the next one.
    NotApplicable,
}

/// One decoding strategy.
pub trait Decoder {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Attempt to decode `raw`.
    fn decode(&self, raw: &str) -> Decoded;
}

/// Strict JSON envelope decoder.
pub struct JsonDecoder;

/// Canonical string form for a `data` value.
fn canonical_data(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Required string field of an envelope.
fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> StdResult<&'a str, String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("field {key:?} is not a string")),
        None => Err(format!("missing field {key:?}")),
    }
}

impl Decoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, raw: &str) -> Decoded {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Decoded::NotApplicable;
        };
        let Value::Object(obj) = value else {
            return Decoded::NotApplicable;
        };
        let kind = match required_str(&obj, "type") {
            Ok(s) => s,
            Err(e) => return Decoded::Invalid(e),
        };
        let action = match required_str(&obj, "action") {
            Ok(s) => s,
            Err(e) => return Decoded::Invalid(e),
        };
        let data = obj.get("data").and_then(canonical_data);
        Decoded::Message(BridgeMessage::new(kind, action, data))
    }
}

/// Best-effort decoder for `key = value;` object descriptions.
///
/// Handles bare and double-quoted values, with `\"`, `\\`, `\n`, `\t` and
/// `\UXXXX` escapes inside quotes. Only keys at the outermost level count;
/// a nested unquoted dictionary or array under `data` is skipped and `data`
/// comes out empty.
pub struct LegacyTextDecoder;

/// One `key = value;` entry. A quoted value is consumed whole, so `=` and `;`
/// inside it never start a new entry.
static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<key>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:"(?P<quoted>(?:[^"\\]|\\.)*)"|(?P<bare>[^;"\n{(]*?))\s*;"#,
    )
    .expect("valid legacy entry regex")
});

/// Undo description-style escaping.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('U') | Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\U");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Brace and parenthesis depth before each byte of `raw`, ignoring
/// delimiters inside quoted values. Has one extra entry for the end.
fn nesting_depths(raw: &str) -> Vec<u32> {
    let mut depths = Vec::with_capacity(raw.len() + 1);
    let mut depth = 0u32;
    let mut quoted = false;
    let mut escaped = false;
    for b in raw.bytes() {
        depths.push(depth);
        if quoted {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                quoted = false;
            }
            continue;
        }
        match b {
            b'"' => quoted = true,
            b'{' | b'(' => depth += 1,
            b'}' | b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depths.push(depth);
    depths
}

impl Decoder for LegacyTextDecoder {
    fn name(&self) -> &'static str {
        "legacy-text"
    }

    fn decode(&self, raw: &str) -> Decoded {
        let mut kind = None;
        let mut action = None;
        let mut data = None;
        let depths = nesting_depths(raw);
        let outer = u32::from(raw.trim_start().starts_with('{'));
        for caps in ENTRY_RE.captures_iter(raw) {
            // Keys inside nested dictionaries or arrays belong to `data`.
            if caps.name("key").is_some_and(|k| depths[k.start()] != outer) {
                continue;
            }
            let value = if let Some(q) = caps.name("quoted") {
                unescape(q.as_str())
            } else if let Some(b) = caps.name("bare") {
                b.as_str().trim().to_string()
            } else {
                continue;
            };
            let slot = match &caps["key"] {
                "type" => &mut kind,
                "action" => &mut action,
                "data" => &mut data,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        match (kind, action) {
            (Some(kind), Some(action)) => {
                Decoded::Message(BridgeMessage::new(kind, action, data))
            }
            _ => Decoded::NotApplicable,
        }
    }
}

/// Ordered list of decoders.
pub struct DecoderChain {
    /// Decoders in priority order.
    decoders: Vec<Box<dyn Decoder>>,
}

impl Default for DecoderChain {
    /// JSON first, then the legacy text fallback.
    fn default() -> Self {
        Self::new(vec![Box::new(JsonDecoder), Box::new(LegacyTextDecoder)])
    }
}

impl DecoderChain {
    /// Build a chain from decoders in priority order.
    pub fn new(decoders: Vec<Box<dyn Decoder>>) -> Self {
        Self { decoders }
    }

    /// Run the chain over `raw`.
    pub fn decode(&self, raw: &str) -> Result<BridgeMessage> {
        for d in &self.decoders {
            match d.decode(raw) {
                Decoded::Message(m) => {
                    trace!(decoder = d.name(), "decoded bridge message");
                    return Ok(m);
                }
                Decoded::Invalid(reason) => {
                    return Err(Error::Decode(format!("{}: {}", d.name(), reason)));
                }
                Decoded::NotApplicable => {}
            }
        }
        Err(Error::Decode("no decoder accepted the payload".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn decode(raw: &str) -> Result<BridgeMessage> {
        DecoderChain::default().decode(raw)
    }

    #[test]
    fn json_string_data_is_verbatim() {
        let m = decode(r#"{"type":"fs","action":"readFile","data":"{\"path\":\"/tmp/x\"}"}"#)
            .unwrap();
        assert_eq!(m.kind, "fs");
        assert_eq!(m.action, "readFile");
        assert_eq!(m.data(), Some(r#"{"path":"/tmp/x"}"#));
    }

    #[test]
    fn json_object_data_is_canonicalized() {
        let m = decode(r#"{"type":"window","action":"setSize","data": { "width" : 10 }}"#).unwrap();
        assert_eq!(m.data(), Some(r#"{"width":10}"#));
        let m = decode(r#"{"type":"a","action":"b","data":[1, true]}"#).unwrap();
        assert_eq!(m.data(), Some("[1,true]"));
        let m = decode(r#"{"type":"a","action":"b","data":null}"#).unwrap();
        assert_eq!(m.data(), None);
    }

    #[test]
    fn json_missing_fields_is_invalid_without_fallback() {
        assert!(decode(r#"{"type":"window"}"#).is_err());
        assert!(decode(r#"{"action":"show"}"#).is_err());
        assert!(decode(r#"{"type":1,"action":"show"}"#).is_err());
        // Legacy text hidden in a JSON value must not be picked up.
        assert!(decode(r#"{"data":"type = window; action = show;"}"#).is_err());
    }

    #[test]
    fn legacy_bare_and_quoted() {
        let m = decode(r#"type = "window"; action = "show";"#).unwrap();
        assert_eq!(m, BridgeMessage::new("window", "show", None));
        let m = decode("{\n    action = hide;\n    type = window;\n}").unwrap();
        assert_eq!(m, BridgeMessage::new("window", "hide", None));
    }

    #[test]
    fn legacy_data_with_escaped_quotes() {
        let raw = r#"{
    action = writeFile;
    data = "{\"path\":\"/tmp/a; b\",\"type\":\"x\"}";
    type = fs;
}"#;
        let m = decode(raw).unwrap();
        assert_eq!(m.kind, "fs");
        assert_eq!(m.data(), Some(r#"{"path":"/tmp/a; b","type":"x"}"#));
    }

    #[test]
    fn legacy_nested_keys_do_not_route() {
        let raw = "{\n    action = show;\n    data =     {\n        type = foo;\n    };\n    type = window;\n}";
        let m = decode(raw).unwrap();
        assert_eq!(m.kind, "window");
        assert_eq!(m.action, "show");
        assert_eq!(m.data(), None);

        let raw = "type = window; data = { action = close; type = app; }; action = hide;";
        let m = decode(raw).unwrap();
        assert_eq!(m, BridgeMessage::new("window", "hide", None));

        // Braces inside quoted values do not change the depth.
        let raw = r#"{ data = "{ type = x;"; type = fs; action = exists; }"#;
        let m = decode(raw).unwrap();
        assert_eq!(m.kind, "fs");
        assert_eq!(m.data(), Some("{ type = x;"));

        assert!(decode("{ data = { type = app; action = quit; }; }").is_err());
    }

    #[test]
    fn legacy_unicode_escape() {
        let m = decode(r#"type = dialog; action = alert; data = "caf\U00e9";"#).unwrap();
        assert_eq!(m.data(), Some("café"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode("").is_err());
        assert!(decode("hello world").is_err());
        assert!(decode("type = window;").is_err());
    }

    proptest! {
        #[test]
        fn json_envelope_round_trips(
            kind in "[a-z]{1,8}",
            action in "[a-zA-Z]{1,12}",
            data in proptest::option::of(".{0,40}"),
        ) {
            let mut obj = serde_json::json!({"type": kind, "action": action});
            if let Some(d) = &data {
                obj["data"] = Value::String(d.clone());
            }
            let m = decode(&obj.to_string()).unwrap();
            prop_assert_eq!(m, BridgeMessage::new(kind, action, data));
        }

        #[test]
        fn legacy_quoted_data_round_trips(data in "[ -~]{0,40}") {
            let escaped = data.replace('\\', "\\\\").replace('"', "\\\"");
            let raw = format!("type = fs; action = writeFile; data = \"{escaped}\";");
            let m = decode(&raw).unwrap();
            prop_assert_eq!(m.data(), Some(data.as_str()));
        }
    }
}
