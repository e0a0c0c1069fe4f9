//! `window` handler.

use craft_bridge::{Context, Error, Handler, MainOp, Result, WindowOp, parse_data};
use serde::Deserialize;

/// `setTitle` payload.
#[derive(Deserialize)]
struct TitleData {
    /// New title.
    title: String,
}

/// `setSize` payload.
#[derive(Deserialize)]
struct SizeData {
    /// Width in points.
    width: f64,
    /// Height in points.
    height: f64,
}

/// Handles `type: "window"` by queueing [`WindowOp`]s.
pub struct WindowHandler;

impl Handler for WindowHandler {
    fn handle_message(&self, action: &str, data: Option<&str>, cx: &Context<'_>) -> Result<()> {
        let op = match action {
            "show" => WindowOp::Show,
            "hide" => WindowOp::Hide,
            "close" => WindowOp::Close,
            "minimize" => WindowOp::Minimize,
            "center" => WindowOp::Center,
            "toggleFullscreen" => WindowOp::ToggleFullscreen,
            "setTitle" => {
                let TitleData { title } = parse_data(action, data)?;
                WindowOp::SetTitle { title }
            }
            "setSize" => {
                let SizeData { width, height } = parse_data(action, data)?;
                let valid = |v: f64| v.is_finite() && v > 0.0;
                if !valid(width) || !valid(height) {
                    return Err(Error::invalid_data(
                        action,
                        format!("size must be positive, got {width}x{height}"),
                    ));
                }
                WindowOp::SetSize { width, height }
            }
            _ => return Err(Error::unknown_action("window", action)),
        };
        cx.main_ops.push(MainOp::Window { op });
        Ok(())
    }
}
