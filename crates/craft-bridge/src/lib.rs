//! Native side of the Craft script bridge.
//!
//! A web view sends messages to the native process; this crate decodes them,
//! routes them to capability handlers and delivers replies back into script.
//! It also carries the pieces needed to extend the UI toolkit at runtime.
//!
//! Public API
//! - [`Bridge`]: owner of all bridge state, created once per web view on the
//!   UI thread. `route` takes raw payloads, `pump` delivers replies.
//! - [`Router`], [`DecoderChain`]: JSON decoding with a best-effort fallback
//!   for toolkit object descriptions, dispatch by message `type`.
//! - [`HandlerRegistry`], [`Handler`]: lazily constructed capability handlers.
//! - [`SidebarProxy`]: outline data source over a JSON-configured tree.
//! - [`TypeRegistry`]: memoized runtime type synthesis.
//! - [`DecisionInvoker`]: calls OS permission decision callbacks.
//!
//! Threading
//! - Everything except [`Replier`] and [`MainOps`] is UI-thread only. Work
//!   that takes time runs elsewhere and replies through a `Replier`; the
//!   platform layer wakes the UI thread to pump replies and drain main ops.
//!
//! macOS
//! - The [`macos`] module provides the objc2-backed type runtime, the script
//!   message relay, the outline data source class, the focusable window
//!   class, the media permission UI delegate and the web view script sink.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

mod bridge;
mod config;
mod decision;
mod decode;
mod error;
mod handle;
mod handler;
mod main_ops;
mod message;
mod permission;
mod router;
mod script;
pub mod sidebar;
mod types;

#[cfg(target_os = "macos")]
pub mod macos;

pub use bridge::Bridge;
pub use config::{BridgeConfig, DEFAULT_QUIET_ACTIONS};
pub use decision::{BlockLayout, Decision, DecisionHandle, DecisionInvoker, InvokeFn};
pub use decode::{Decoded, Decoder, DecoderChain, JsonDecoder, LegacyTextDecoder};
pub use error::{Error, Result};
pub use handle::{HandleId, HandleStore, NodeIndex};
pub use handler::{Context, Handler, HandlerRegistry, parse_data};
pub use main_ops::{
    AppOp, ClipboardOp, DialogKind, DialogRequest, MainOp, MainOps, Notification, TrayMenuItem,
    TrayOp, WindowOp,
};
pub use message::{BridgeMessage, DEBUG_TYPE};
pub use permission::{MediaKind, PermissionPolicy, PermissionRule};
pub use router::{RouteOutcome, Router};
pub use script::{
    ERROR_FN, MemorySink, RESULT_FN, Replier, ReplyQueue, ScriptCall, ScriptSink, Waker,
};
pub use sidebar::SidebarProxy;
pub use types::{Imp, MethodSpec, TypeRegistry, TypeRuntime};
