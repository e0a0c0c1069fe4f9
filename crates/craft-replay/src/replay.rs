//! Headless replay of raw bridge messages.
//!
//! Each input line is routed through a [`Bridge`] with the default handlers
//! and an in-memory sink. The transcript shows the routing outcome, every
//! script evaluation and every op that would have run on the UI thread.

use std::{
    io::Write,
    rc::Rc,
    thread,
    time::{Duration, Instant},
};

use craft_bridge::{Bridge, BridgeConfig, MainOp, MemorySink, RouteOutcome};
use craft_handlers::{HandlerDeps, default_registry};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::error::Result;

/// Interval between pumps while settling.
const SETTLE_TICK: Duration = Duration::from_millis(10);

/// What one routed line produced.
#[derive(Debug)]
pub struct Step {
    /// Short outcome label.
    pub outcome: String,
    /// Scripts evaluated synchronously.
    pub scripts: Vec<String>,
    /// UI-thread ops queued by the handler.
    pub ops: Vec<MainOp>,
}

/// A bridge wired for replay.
pub struct Replay {
    /// Bridge under test.
    bridge: Bridge,
    /// Where the bridge writes script.
    sink: Rc<MemorySink>,
}

impl Replay {
    /// Bridge over the default handlers, spawning async work on `runtime`.
    pub fn new(config: BridgeConfig, runtime: Handle) -> Self {
        let deps = HandlerDeps::new(runtime, &config);
        let sink = Rc::new(MemorySink::new());
        let bridge = Bridge::new(config, default_registry(&deps), Box::new(sink.clone()));
        Self { bridge, sink }
    }

    /// The bridge being driven.
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Route `raw`, pump queued replies and collect what it produced.
    pub fn step(&self, raw: &str) -> Step {
        let outcome = match self.bridge.route(raw) {
            RouteOutcome::Handled => "handled".to_string(),
            RouteOutcome::Logged => "logged".to_string(),
            RouteOutcome::Dropped(e) => format!("dropped: {e}"),
            RouteOutcome::Failed(e) => format!("failed: {e}"),
        };
        self.bridge.pump();
        Step {
            outcome,
            scripts: self.sink.take(),
            ops: self.bridge.main_ops().drain(),
        }
    }

    /// Keep pumping for `window` so asynchronous replies land.
    pub fn settle(&self, window: Duration) -> Vec<String> {
        let deadline = Instant::now() + window;
        loop {
            self.bridge.pump();
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(SETTLE_TICK);
        }
        let late = self.sink.take();
        debug!(count = late.len(), "settled");
        late
    }

    /// Replay every message in `input`, writing a transcript to `out`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn run(&self, input: &str, settle: Duration, out: &mut impl Write) -> Result<usize> {
        let mut routed = 0;
        for (n, line) in input.lines().enumerate() {
            let raw = line.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            routed += 1;
            let step = self.step(raw);
            writeln!(out, "{}> {raw}", n + 1)?;
            writeln!(out, "  {}", step.outcome)?;
            for script in &step.scripts {
                writeln!(out, "  script: {script}")?;
            }
            for op in &step.ops {
                match serde_json::to_string(op) {
                    Ok(json) => writeln!(out, "  op: {json}")?,
                    Err(e) => warn!("op not serialized: {}", e),
                }
            }
        }
        let late = self.settle(settle);
        if !late.is_empty() {
            writeln!(out, "late:")?;
            for script in &late {
                writeln!(out, "  script: {script}")?;
            }
        }
        Ok(routed)
    }
}
