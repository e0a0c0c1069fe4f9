//! Capability handlers and their registry.
//!
//! Each message `type` maps to one [`Handler`]. Handlers are built lazily,
//! once per registry, and live for the lifetime of the bridge. A failing
//! action never takes its handler down: the error is reported for that
//! message only.

use std::collections::{BTreeMap, HashMap};

use once_cell::unsync::OnceCell;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{Error, Result},
    main_ops::MainOps,
    script::Replier,
};

/// What a handler may touch while running an action.
pub struct Context<'a> {
    /// Reply path back into script. Clone it to reply from another thread.
    pub replier: &'a Replier,
    /// Queue for work that must happen on the UI thread.
    pub main_ops: &'a MainOps,
}

/// A capability handler.
pub trait Handler {
    /// Run `action` with its (already canonicalized) `data`.
    ///
    /// Must not block for unbounded time: long work goes to a worker and
    /// replies through `cx.replier`.
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()>;

    /// Whether script awaits a reply for `action`. Failures of such actions
    /// are delivered to script as errors; others are only logged.
    fn replies_to(&self, _action: &str) -> bool {
        false
    }
}

/// Decode a JSON `data` payload into `T`.
pub fn parse_data<T: DeserializeOwned>(action: &str, data: Option<&str>) -> Result<T> {
    let raw = data.ok_or_else(|| Error::invalid_data(action, "missing data"))?;
    serde_json::from_str(raw).map_err(|e| Error::invalid_data(action, e.to_string()))
}

/// Constructor for a handler.
type Factory = Box<dyn Fn() -> Box<dyn Handler>>;

/// A lazily constructed handler.
struct Slot {
    /// Builds the handler on first use.
    factory: Factory,
    /// The single instance.
    instance: OnceCell<Box<dyn Handler>>,
}

/// Table of handlers keyed by message type.
#[derive(Default)]
pub struct HandlerRegistry {
    /// Handler slots.
    slots: HashMap<String, Slot>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `kind`. Replaces a previous registration that
    /// has not been constructed yet; returns false (and keeps the existing
    /// handler) if one is already live.
    pub fn register<F>(&mut self, kind: &str, factory: F) -> bool
    where
        F: Fn() -> Box<dyn Handler> + 'static,
    {
        if self
            .slots
            .get(kind)
            .is_some_and(|s| s.instance.get().is_some())
        {
            return false;
        }
        self.slots.insert(
            kind.to_string(),
            Slot {
                factory: Box::new(factory),
                instance: OnceCell::new(),
            },
        );
        true
    }

    /// Look up the handler for `kind`, constructing it on first use.
    pub fn get(&self, kind: &str) -> Option<&dyn Handler> {
        let slot = self.slots.get(kind)?;
        let h = slot.instance.get_or_init(|| {
            debug!(kind, "constructing handler");
            (slot.factory)()
        });
        Some(h.as_ref())
    }

    /// True if a handler is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.slots.contains_key(kind)
    }

    /// True if the handler for `kind` has been built.
    pub fn is_constructed(&self, kind: &str) -> bool {
        self.slots
            .get(kind)
            .is_some_and(|s| s.instance.get().is_some())
    }

    /// Build every registered handler now.
    pub fn init_all(&self) {
        for kind in self.slots.keys() {
            let _ = self.get(kind);
        }
    }

    /// Registered types, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let sorted: BTreeMap<&str, ()> = self.slots.keys().map(|k| (k.as_str(), ())).collect();
        sorted.into_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use serde::Deserialize;

    use super::*;

    struct Nop;
    impl Handler for Nop {
        fn handle_message(&self, _: &str, _: Option<&str>, _: &Context<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn constructs_once_and_lazily() {
        let built = Rc::new(Cell::new(0));
        let b = built.clone();
        let mut reg = HandlerRegistry::new();
        reg.register("tray", move || {
            b.set(b.get() + 1);
            Box::new(Nop)
        });
        assert!(!reg.is_constructed("tray"));
        assert!(reg.get("tray").is_some());
        assert!(reg.get("tray").is_some());
        assert_eq!(built.get(), 1);
        assert!(reg.is_constructed("tray"));
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn live_handler_is_not_replaced() {
        let mut reg = HandlerRegistry::new();
        assert!(reg.register("app", || Box::new(Nop)));
        assert!(reg.register("app", || Box::new(Nop)));
        reg.init_all();
        assert!(!reg.register("app", || Box::new(Nop)));
        assert_eq!(reg.kinds(), vec!["app"]);
    }

    #[test]
    fn parse_data_reports_action() {
        #[derive(Deserialize)]
        struct P {
            #[allow(dead_code)]
            path: String,
        }
        let e = parse_data::<P>("readFile", None).err().unwrap();
        assert!(e.to_string().contains("readFile"));
        assert!(parse_data::<P>("readFile", Some("{}")).is_err());
        assert!(parse_data::<P>("readFile", Some(r#"{"path":"/"}"#)).is_ok());
    }
}
