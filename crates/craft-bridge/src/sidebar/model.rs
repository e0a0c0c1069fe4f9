//! Sidebar tree model and its JSON configuration format.
//!
//! Parsing is lenient below the top level: fields that are missing or have
//! the wrong JSON type fall back to fixed defaults. Only a document that is
//! not valid JSON at all is rejected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Fallback section id.
const DEFAULT_SECTION_ID: &str = "section";
/// Fallback section title.
const DEFAULT_SECTION_TITLE: &str = "Section";
/// Fallback item id.
const DEFAULT_ITEM_ID: &str = "item";
/// Fallback item label.
const DEFAULT_ITEM_LABEL: &str = "Item";
/// Fallback item icon (SF Symbol name).
const DEFAULT_ITEM_ICON: &str = "doc";

/// A leaf row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarItem {
    /// Stable identifier reported back to script on selection.
    pub id: String,
    /// Display text.
    pub label: String,
    /// Symbol name for the row image.
    pub icon: String,
    /// Optional trailing badge text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Optional tint color for the icon (CSS-style string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,
}

/// A group header with its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarSection {
    /// Stable identifier reported back to script on selection.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Rows in display order.
    pub items: Vec<SidebarItem>,
    /// Whether the section starts collapsed.
    pub collapsed: bool,
}

/// Tree shown before any configuration has been loaded.
pub fn default_sections() -> Vec<SidebarSection> {
    vec![SidebarSection {
        id: "favorites".into(),
        title: "Favorites".into(),
        items: vec![SidebarItem {
            id: "home".into(),
            label: "Home".into(),
            icon: "house".into(),
            badge: None,
            tint_color: None,
        }],
        collapsed: false,
    }]
}

/// Parse a sidebar configuration document.
///
/// The document shape is
/// `{"sections":[{"id","title","collapsed"?,"items":[{"id","label","icon","badge"?,"tintColor"?}]}]}`.
/// A missing or non-array `sections` yields an empty tree.
pub fn parse_sections(json: &str) -> Result<Vec<SidebarSection>> {
    let doc: Value = serde_json::from_str(json)?;
    let Some(root) = doc.as_object() else {
        return Err(Error::Config(
            "sidebar config must be a JSON object".to_string(),
        ));
    };
    Ok(sections_from_value(root))
}

/// Extract sections from an already parsed configuration object.
fn sections_from_value(root: &Map<String, Value>) -> Vec<SidebarSection> {
    root.get("sections")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(section_from_value).collect())
        .unwrap_or_default()
}

/// String field or fallback.
fn str_or(obj: Option<&Map<String, Value>>, key: &str, default: &str) -> String {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Optional string field.
fn opt_str(obj: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Build one section, defaulting anything unusable.
fn section_from_value(v: &Value) -> SidebarSection {
    let obj = v.as_object();
    let items = obj
        .and_then(|o| o.get("items"))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(item_from_value).collect())
        .unwrap_or_default();
    SidebarSection {
        id: str_or(obj, "id", DEFAULT_SECTION_ID),
        title: str_or(obj, "title", DEFAULT_SECTION_TITLE),
        items,
        collapsed: obj
            .and_then(|o| o.get("collapsed"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

/// Build one item, defaulting anything unusable.
fn item_from_value(v: &Value) -> SidebarItem {
    let obj = v.as_object();
    SidebarItem {
        id: str_or(obj, "id", DEFAULT_ITEM_ID),
        label: str_or(obj, "label", DEFAULT_ITEM_LABEL),
        icon: str_or(obj, "icon", DEFAULT_ITEM_ICON),
        badge: opt_str(obj, "badge"),
        tint_color: opt_str(obj, "tintColor"),
    }
}

/// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` tint into sRGB components in
/// `0.0..=1.0`. Anything else is `None` and the icon keeps its default tint.
pub fn parse_tint(s: &str) -> Option<[f64; 4]> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize, w: usize| -> Option<f64> {
        let v = u8::from_str_radix(&hex[i * w..i * w + w], 16).ok()?;
        let v = if w == 1 { v * 17 } else { v };
        Some(f64::from(v) / 255.0)
    };
    match hex.len() {
        3 => Some([channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 1.0]),
        6 => Some([channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, 1.0]),
        8 => Some([channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, channel(3, 2)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let json = r##"{"sections":[
            {"id":"lib","title":"Library","collapsed":true,"items":[
                {"id":"a","label":"Alpha","icon":"star","badge":"3","tintColor":"#f00"}
            ]}
        ]}"##;
        let s = parse_sections(json).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s[0].collapsed);
        assert_eq!(s[0].items[0].badge.as_deref(), Some("3"));
        assert_eq!(s[0].items[0].tint_color.as_deref(), Some("#f00"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let s = parse_sections(r#"{"sections":[{"items":[{}, {"id": 5}]}]}"#).unwrap();
        assert_eq!(s[0].id, "section");
        assert_eq!(s[0].title, "Section");
        assert!(!s[0].collapsed);
        for item in &s[0].items {
            assert_eq!(item.id, "item");
            assert_eq!(item.label, "Item");
            assert_eq!(item.icon, "doc");
            assert!(item.badge.is_none());
        }
    }

    #[test]
    fn missing_sections_is_empty_tree() {
        assert!(parse_sections("{}").unwrap().is_empty());
        assert!(parse_sections(r#"{"sections": 3}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_sections(r#"{"sections":[{"id":"s1""#).is_err());
        assert!(parse_sections("[1,2]").is_err());
    }

    #[test]
    fn item_serializes_without_absent_optionals() {
        let item = &default_sections()[0].items[0];
        let v = serde_json::to_value(item).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"id": "home", "label": "Home", "icon": "house"})
        );
    }

    #[test]
    fn tints_parse_hex_forms() {
        assert_eq!(parse_tint("#fff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_tint("#FF0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_tint(" #00000000 "), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(parse_tint("red"), None);
        assert_eq!(parse_tint("#12345"), None);
        assert_eq!(parse_tint("#gg0000"), None);
    }
}
