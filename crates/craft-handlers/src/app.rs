//! `app` handler: identity, liveness and application-level UI ops.

use std::env::consts;

use craft_bridge::{AppOp, Context, Error, Handler, MainOp, Result};
use serde::Serialize;

use crate::HandlerDeps;

/// Payload of `app/getInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Operating system (`macos`, `linux`, ...).
    pub platform: &'static str,
    /// CPU architecture.
    pub arch: &'static str,
}

/// Handles `type: "app"`.
pub struct AppHandler {
    /// Reported by `getInfo`.
    info: AppInfo,
}

impl AppHandler {
    /// Handler reporting the app identity in `deps`.
    pub fn new(deps: &HandlerDeps) -> Self {
        Self {
            info: AppInfo {
                name: deps.app_name.clone(),
                version: deps.app_version.clone(),
                platform: consts::OS,
                arch: consts::ARCH,
            },
        }
    }
}

impl Handler for AppHandler {
    fn handle_message(&self, action: &str, _data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let op = match action {
            "getInfo" => {
                cx.replier.result(action, &self.info);
                return Ok(());
            }
            "ping" => {
                cx.replier.result(action, "pong");
                return Ok(());
            }
            "quit" => AppOp::Quit,
            "hide" => AppOp::Hide,
            "show" => AppOp::Show,
            _ => return Err(Error::unknown_action("app", action)),
        };
        cx.main_ops.push(MainOp::App { op });
        Ok(())
    }

    fn replies_to(&self, action: &str) -> bool {
        matches!(action, "getInfo" | "ping")
    }
}
