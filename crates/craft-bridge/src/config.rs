//! Bridge configuration.
//!
//! Loaded from a JSON document; every field is optional:
//!
//! ```json
//! {
//!   "appName": "Craft",
//!   "appVersion": "1.0.0",
//!   "quietActions": ["pollActions", "ping"],
//!   "sidebar": { "sections": [] },
//!   "permissions": { "camera": "prompt", "microphone": "grant" }
//! }
//! ```

use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Error, Result},
    permission::PermissionPolicy,
};

/// Actions that are polled at high frequency and logged at trace level.
pub const DEFAULT_QUIET_ACTIONS: &[&str] = &["pollActions", "ping"];

/// Top-level bridge configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Application name reported by `app/getInfo`.
    pub app_name: String,
    /// Application version reported by `app/getInfo`.
    pub app_version: String,
    /// Actions exempt from per-message debug logging.
    pub quiet_actions: Vec<String>,
    /// Initial sidebar document, in the sidebar configuration format.
    pub sidebar: Option<Value>,
    /// Media capture permission rules.
    pub permissions: PermissionPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            app_name: "Craft".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            quiet_actions: DEFAULT_QUIET_ACTIONS.iter().map(|s| s.to_string()).collect(),
            sidebar: None,
            permissions: PermissionPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionRule;

    #[test]
    fn empty_document_uses_defaults() {
        let c = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(c, BridgeConfig::default());
        assert_eq!(c.quiet_actions, DEFAULT_QUIET_ACTIONS);
    }

    #[test]
    fn overrides_fields() {
        let c = BridgeConfig::from_json(
            r#"{"appName":"Demo","quietActions":[],"permissions":{"camera":"deny"},"sidebar":{"sections":[]}}"#,
        )
        .unwrap();
        assert_eq!(c.app_name, "Demo");
        assert!(c.quiet_actions.is_empty());
        assert_eq!(c.permissions.camera, PermissionRule::Deny);
        assert!(c.sidebar.is_some());
    }

    #[test]
    fn bad_document_is_config_error() {
        assert!(matches!(
            BridgeConfig::from_json("{\"quietActions\": 3}"),
            Err(Error::Config(_))
        ));
    }
}
