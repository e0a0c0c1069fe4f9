use std::{rc::Rc, thread, time::Duration};

use craft_bridge::{
    AppOp, Bridge, BridgeConfig, ClipboardOp, DialogKind, DialogRequest, Error, MainOp,
    MemorySink, RouteOutcome, TrayMenuItem, TrayOp, WindowOp,
};
use craft_handlers::{HandlerDeps, default_registry};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

/// A bridge wired to the default handlers and an in-memory sink.
struct Harness {
    /// Keeps worker tasks alive for the test.
    _rt: Runtime,
    deps: HandlerDeps,
    bridge: Bridge,
    sink: Rc<MemorySink>,
}

impl Harness {
    fn new() -> Self {
        let rt = Runtime::new().unwrap();
        let config = BridgeConfig::default();
        let deps = HandlerDeps::new(rt.handle().clone(), &config);
        let sink = Rc::new(MemorySink::new());
        let bridge = Bridge::new(config, default_registry(&deps), Box::new(sink.clone()));
        Self {
            _rt: rt,
            deps,
            bridge,
            sink,
        }
    }

    fn send(&self, kind: &str, action: &str, data: Value) -> RouteOutcome {
        let msg = json!({"type": kind, "action": action, "data": data});
        self.bridge.route(&msg.to_string())
    }

    /// Pump until `n` scripts have been delivered or a timeout passes.
    fn wait_scripts(&self, n: usize) -> Vec<String> {
        for _ in 0..500 {
            self.bridge.pump();
            if self.sink.scripts().len() >= n {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        self.sink.take()
    }
}

/// Payload of a rendered `__craftBridgeResult(action, payload);` call.
fn result_payload(script: &str, action: &str) -> Value {
    let prefix = format!("window.__craftBridgeResult({}, ", json!(action));
    let body = script
        .strip_prefix(&prefix)
        .and_then(|s| s.strip_suffix(");"))
        .unwrap_or_else(|| panic!("not a result for {action}: {script}"));
    serde_json::from_str(body).unwrap()
}

#[test]
fn registers_every_capability() {
    let h = Harness::new();
    assert_eq!(
        h.bridge.router().handlers().kinds(),
        vec![
            "app",
            "clipboard",
            "dialog",
            "fs",
            "notification",
            "shell",
            "tray",
            "window"
        ]
    );
}

#[test]
fn app_ping_and_info_reply() {
    let h = Harness::new();
    assert!(matches!(h.send("app", "ping", Value::Null), RouteOutcome::Handled));
    assert!(matches!(h.send("app", "getInfo", Value::Null), RouteOutcome::Handled));
    let scripts = h.sink.take();
    assert_eq!(scripts[0], r#"window.__craftBridgeResult("ping", "pong");"#);
    let info = result_payload(&scripts[1], "getInfo");
    assert_eq!(info["name"], "Craft");
    assert_eq!(info["platform"], std::env::consts::OS);
}

#[test]
fn app_and_window_ops_are_queued() {
    let h = Harness::new();
    h.send("app", "hide", Value::Null);
    h.send("window", "center", Value::Null);
    h.send("window", "setTitle", json!({"title": "Docs"}));
    h.send("window", "setSize", json!({"width": 640, "height": 480}));
    assert_eq!(
        h.bridge.main_ops().drain(),
        vec![
            MainOp::App { op: AppOp::Hide },
            MainOp::Window {
                op: WindowOp::Center
            },
            MainOp::Window {
                op: WindowOp::SetTitle {
                    title: "Docs".into()
                }
            },
            MainOp::Window {
                op: WindowOp::SetSize {
                    width: 640.0,
                    height: 480.0
                }
            },
        ]
    );
}

#[test]
fn invalid_window_size_fails_without_queueing() {
    let h = Harness::new();
    let out = h.send("window", "setSize", json!({"width": 0, "height": 480}));
    assert!(matches!(out, RouteOutcome::Failed(Error::InvalidData { .. })));
    assert!(h.bridge.main_ops().is_empty());
    assert!(h.sink.take().is_empty());
}

#[test]
fn unknown_action_is_reported() {
    let h = Harness::new();
    assert!(matches!(
        h.send("window", "explode", Value::Null),
        RouteOutcome::Failed(Error::UnknownAction { .. })
    ));
    assert!(h.bridge.route(r#"{"type":"app","action":"ping"}"#).dispatched());
}

#[test]
fn tray_menu_and_polling() {
    let h = Harness::new();
    h.send(
        "tray",
        "setMenu",
        json!({"items": [{"id": "open", "label": "Open"}, {"id": "quit", "label": "Quit", "enabled": false}]}),
    );
    assert_eq!(
        h.bridge.main_ops().drain(),
        vec![MainOp::Tray {
            op: TrayOp::SetMenu {
                items: vec![
                    TrayMenuItem {
                        id: "open".into(),
                        label: "Open".into(),
                        enabled: true
                    },
                    TrayMenuItem {
                        id: "quit".into(),
                        label: "Quit".into(),
                        enabled: false
                    },
                ]
            }
        }]
    );
    h.deps.tray_actions.push("open");
    h.send("tray", "pollActions", Value::Null);
    h.send("tray", "pollActions", Value::Null);
    let scripts = h.sink.take();
    assert_eq!(result_payload(&scripts[0], "pollActions"), json!(["open"]));
    assert_eq!(result_payload(&scripts[1], "pollActions"), json!([]));
}

#[test]
fn duplicate_tray_ids_are_rejected() {
    let h = Harness::new();
    let out = h.send(
        "tray",
        "setMenu",
        json!({"items": [{"id": "a", "label": "A"}, {"id": "a", "label": "B"}]}),
    );
    assert!(matches!(out, RouteOutcome::Failed(Error::InvalidData { .. })));
}

#[test]
fn dialogs_and_clipboard_queue_reply_actions() {
    let h = Harness::new();
    h.send("dialog", "confirm", json!({"title": "Delete?", "message": "Gone for good"}));
    h.send("dialog", "alert", Value::Null);
    h.send("clipboard", "readText", Value::Null);
    h.send("clipboard", "writeText", json!({"text": "hi"}));
    assert_eq!(
        h.bridge.main_ops().drain(),
        vec![
            MainOp::Dialog(DialogRequest {
                kind: DialogKind::Confirm,
                title: "Delete?".into(),
                message: "Gone for good".into(),
                reply_action: "confirm".into(),
            }),
            MainOp::Dialog(DialogRequest {
                kind: DialogKind::Alert,
                title: String::new(),
                message: String::new(),
                reply_action: "alert".into(),
            }),
            MainOp::Clipboard {
                op: ClipboardOp::ReadText {
                    reply_action: "readText".into()
                }
            },
            MainOp::Clipboard {
                op: ClipboardOp::WriteText { text: "hi".into() }
            },
        ]
    );
}

#[test]
fn notification_requires_title() {
    let h = Harness::new();
    assert!(h.send("notification", "show", json!({"title": "Done"})).dispatched());
    assert!(matches!(
        h.send("notification", "show", json!({"body": "no title"})),
        RouteOutcome::Failed(Error::InvalidData { .. })
    ));
    assert_eq!(h.bridge.main_ops().len(), 1);
}

#[test]
fn fs_round_trip_replies_asynchronously() {
    let h = Harness::new();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("note.txt");
    let path = file.to_string_lossy().to_string();

    h.send("fs", "writeFile", json!({"path": path, "content": "hello"}));
    let scripts = h.wait_scripts(1);
    assert_eq!(result_payload(&scripts[0], "writeFile"), json!(true));

    h.send("fs", "readFile", json!({"path": path}));
    let scripts = h.wait_scripts(1);
    assert_eq!(result_payload(&scripts[0], "readFile"), json!("hello"));

    h.send("fs", "mkdir", json!({"path": dir.path().join("sub/inner"), "recursive": true}));
    h.wait_scripts(1);
    h.send("fs", "readDir", json!({"path": dir.path()}));
    let scripts = h.wait_scripts(1);
    assert_eq!(
        result_payload(&scripts[0], "readDir"),
        json!([{"name": "note.txt", "isDir": false}, {"name": "sub", "isDir": true}])
    );

    h.send("fs", "remove", json!({"path": path}));
    h.wait_scripts(1);
    h.send("fs", "exists", json!({"path": path}));
    let scripts = h.wait_scripts(1);
    assert_eq!(result_payload(&scripts[0], "exists"), json!(false));
}

#[test]
fn fs_errors_reach_script() {
    let h = Harness::new();
    let dir = tempfile::tempdir().unwrap();
    h.send("fs", "readFile", json!({"path": dir.path().join("missing")}));
    let scripts = h.wait_scripts(1);
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].starts_with("window.__craftBridgeError(\"readFile: "));

    // Payload errors are reported synchronously because fs actions reply.
    let out = h.send("fs", "writeFile", json!({"path": "/tmp/x"}));
    assert!(matches!(out, RouteOutcome::Failed(Error::InvalidData { .. })));
    assert!(h.sink.take()[0].starts_with("window.__craftBridgeError("));
}

#[cfg(unix)]
#[test]
fn shell_exec_captures_output() {
    let h = Harness::new();
    h.send("shell", "exec", json!({"command": "sh", "args": ["-c", "echo out; echo err >&2; exit 3"]}));
    let scripts = h.wait_scripts(1);
    assert_eq!(
        result_payload(&scripts[0], "exec"),
        json!({"code": 3, "stdout": "out\n", "stderr": "err\n"})
    );
}

#[test]
fn shell_exec_rejects_empty_command() {
    let h = Harness::new();
    assert!(matches!(
        h.send("shell", "exec", json!({"command": " "})),
        RouteOutcome::Failed(Error::InvalidData { .. })
    ));
}
