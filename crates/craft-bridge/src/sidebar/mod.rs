//! Sidebar outline: configuration model and the widget data source proxy.

mod model;
mod proxy;

pub use model::{SidebarItem, SidebarSection, default_sections, parse_sections, parse_tint};
pub use proxy::{CellContent, Node, SELECT_EVENT, SidebarProxy};
