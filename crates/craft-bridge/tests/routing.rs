use std::{cell::RefCell, rc::Rc};

use craft_bridge::{
    Bridge, BridgeConfig, Context, Decision, Error, Handler, HandlerRegistry, MainOp, MemorySink,
    RouteOutcome, WindowOp,
};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Calls seen by a recording handler.
type Calls = Rc<RefCell<Vec<(String, Option<String>)>>>;

/// Records every call; fails `boom`, which replies.
struct Recorder {
    calls: Calls,
}

impl Handler for Recorder {
    fn handle_message(
        &self,
        action: &str,
        data: Option<&str>,
        cx: &Context<'_>,
    ) -> craft_bridge::Result<()> {
        self.calls
            .borrow_mut()
            .push((action.to_string(), data.map(str::to_string)));
        match action {
            "boom" => Err(Error::Handler("boom failed".into())),
            "silent" => Err(Error::Handler("silent failed".into())),
            "show" => {
                cx.main_ops.push(MainOp::Window { op: WindowOp::Show });
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn replies_to(&self, action: &str) -> bool {
        action == "boom"
    }
}

fn bridge_with(kinds: &[&str]) -> (Bridge, Calls, Rc<MemorySink>) {
    let calls: Calls = Rc::default();
    let mut handlers = HandlerRegistry::new();
    for kind in kinds {
        let calls = calls.clone();
        handlers.register(kind, move || {
            Box::new(Recorder {
                calls: calls.clone(),
            })
        });
    }
    let sink = Rc::new(MemorySink::new());
    let bridge = Bridge::new(BridgeConfig::default(), handlers, Box::new(sink.clone()));
    (bridge, calls, sink)
}

#[test]
fn string_data_reaches_handler_unchanged() {
    let (bridge, calls, _) = bridge_with(&["fs"]);
    let out = bridge.route(r#"{"type":"fs","action":"readFile","data":"{\"path\": \"/tmp/x\"}"}"#);
    assert!(matches!(out, RouteOutcome::Handled));
    assert_eq!(
        calls.borrow().as_slice(),
        &[("readFile".to_string(), Some(r#"{"path": "/tmp/x"}"#.to_string()))]
    );
}

#[test]
fn object_data_is_canonicalized() {
    let (bridge, calls, _) = bridge_with(&["window"]);
    bridge.route(r#"{"type":"window","action":"setSize","data":{"width":800,"height":600}}"#);
    let (_, data) = calls.borrow()[0].clone();
    assert_eq!(data.as_deref(), Some(r#"{"height":600,"width":800}"#));
}

#[test]
fn missing_type_or_action_invokes_nothing() {
    let (bridge, calls, sink) = bridge_with(&["window"]);
    for raw in [
        r#"{"action":"show"}"#,
        r#"{"type":"window"}"#,
        r#"{"type":"window","action":3}"#,
        r#"{}"#,
        "",
        "not a message",
        "[1, 2, 3]",
    ] {
        assert!(
            matches!(bridge.route(raw), RouteOutcome::Dropped(_)),
            "{raw:?} should be dropped"
        );
    }
    assert!(calls.borrow().is_empty());
    assert!(sink.scripts().is_empty());
}

#[test]
fn unknown_type_is_dropped_and_bridge_stays_live() {
    let (bridge, calls, _) = bridge_with(&["window"]);
    assert!(matches!(
        bridge.route(r#"{"type":"bluetooth","action":"scan"}"#),
        RouteOutcome::Dropped(Error::UnknownType(t)) if t == "bluetooth"
    ));
    assert!(bridge.route(r#"{"type":"window","action":"show"}"#).dispatched());
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn debug_messages_are_logged_not_dispatched() {
    let (bridge, calls, _) = bridge_with(&["debug", "window"]);
    let out = bridge.route(r#"{"type":"debug","action":"log","data":{"message":"hi"}}"#);
    assert!(matches!(out, RouteOutcome::Logged));
    assert!(calls.borrow().is_empty());
}

#[test]
fn failures_reply_only_for_awaited_actions() {
    let (bridge, _, sink) = bridge_with(&["fs"]);
    assert!(matches!(
        bridge.route(r#"{"type":"fs","action":"silent"}"#),
        RouteOutcome::Failed(_)
    ));
    assert!(sink.take().is_empty());
    assert!(matches!(
        bridge.route(r#"{"type":"fs","action":"boom"}"#),
        RouteOutcome::Failed(_)
    ));
    assert_eq!(
        sink.take(),
        vec![r#"window.__craftBridgeError("boom failed");"#.to_string()]
    );
    assert!(bridge.route(r#"{"type":"fs","action":"ok"}"#).dispatched());
}

#[test]
fn legacy_text_routes_like_json() {
    let (json_bridge, json_calls, _) = bridge_with(&["window"]);
    let (text_bridge, text_calls, _) = bridge_with(&["window"]);
    let a = json_bridge.route(r#"{"type":"window","action":"show"}"#);
    let b = text_bridge.route(r#"type = "window"; action = "show";"#);
    assert!(matches!(a, RouteOutcome::Handled));
    assert!(matches!(b, RouteOutcome::Handled));
    assert_eq!(*json_calls.borrow(), *text_calls.borrow());
    assert_eq!(json_bridge.main_ops().drain(), text_bridge.main_ops().drain());
}

#[test]
fn legacy_description_with_escaped_data() {
    let (bridge, calls, _) = bridge_with(&["fs"]);
    let raw = "{\n    action = writeFile;\n    data = \"{\\\"path\\\":\\\"/tmp/a\\\"}\";\n    type = fs;\n}";
    assert!(bridge.route(raw).dispatched());
    assert_eq!(
        calls.borrow()[0],
        (
            "writeFile".to_string(),
            Some(r#"{"path":"/tmp/a"}"#.to_string())
        )
    );
}

#[test]
fn handlers_are_built_once_at_setup() {
    let built = Rc::new(RefCell::new(0));
    let mut handlers = HandlerRegistry::new();
    let counter = built.clone();
    handlers.register("app", move || {
        *counter.borrow_mut() += 1;
        Box::new(Recorder {
            calls: Rc::default(),
        })
    });
    let bridge = Bridge::new(
        BridgeConfig::default(),
        handlers,
        Box::new(MemorySink::new()),
    );
    assert!(bridge.router().handlers().is_constructed("app"));
    for _ in 0..3 {
        bridge.route(r#"{"type":"app","action":"ping"}"#);
    }
    assert_eq!(*built.borrow(), 1);
}

/// JSON values whose canonical form is stable across a parse round trip.
fn data_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn routed_data_matches_canonical_form(
        action in "[a-zA-Z]{1,12}",
        data in data_value(),
    ) {
        let (bridge, calls, _) = bridge_with(&["fs"]);
        let raw = json!({"type": "fs", "action": action, "data": data}).to_string();
        prop_assert!(bridge.route(&raw).dispatched());
        let expected = match &data {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        prop_assert_eq!(calls.borrow().clone(), vec![(action, expected)]);
    }
}

#[test]
fn media_decisions_follow_configured_policy() {
    let config = BridgeConfig::from_json(
        r#"{"permissions":{"camera":"grant","microphone":"deny"}}"#,
    )
    .unwrap();
    let bridge = Bridge::new(config, HandlerRegistry::new(), Box::new(MemorySink::new()));
    assert_eq!(bridge.media_decision(0), Decision::Grant);
    assert_eq!(bridge.media_decision(1), Decision::Deny);
    assert_eq!(bridge.media_decision(2), Decision::Prompt);
    assert_eq!(bridge.media_decision(42), Decision::Deny);
}

#[test]
fn quiet_actions_come_from_config() {
    let (bridge, calls, _) = bridge_with(&["tray"]);
    assert!(bridge.router().is_quiet("pollActions"));
    assert!(!bridge.router().is_quiet("setMenu"));

    let config = BridgeConfig::from_json(r#"{"quietActions":["tick"]}"#).unwrap();
    let quiet = Bridge::new(config, HandlerRegistry::new(), Box::new(MemorySink::new()));
    assert!(quiet.router().is_quiet("tick"));
    assert!(!quiet.router().is_quiet("pollActions"));

    // Quiet actions are still dispatched.
    assert!(bridge.route(r#"{"type":"tray","action":"pollActions"}"#).dispatched());
    assert_eq!(calls.borrow().len(), 1);
}
