//! `NSOutlineView` data source and delegate over the bridge's sidebar.
//!
//! Items handed to the outline are `NSNumber`s carrying a [`HandleId`]; the
//! platform keeps them alive so the outline can compare them by identity.

use std::{ffi::CStr, mem::transmute, ptr};

use objc2::{
    msg_send,
    rc::Retained,
    runtime::{AnyObject, Bool, Sel},
};
use objc2_app_kit::{NSColor, NSImage, NSImageView, NSStackView, NSTextField, NSView};
use objc2_foundation::{MainThreadMarker, NSArray, NSNumber, NSString};
use tracing::{debug, trace};

use super::{Platform, runtime::ObjcRuntime, with_platform};
use crate::{
    error::{Error, Result},
    handle::HandleId,
    sidebar::{CellContent, Node, parse_tint},
    types::{Imp, MethodSpec},
};

/// Runtime name of the data source class.
pub const SIDEBAR_DATA_SOURCE: &CStr = c"CraftSidebarDataSource";

/// `outlineView:numberOfChildrenOfItem:`
type CountFn = unsafe extern "C" fn(*mut AnyObject, Sel, *mut AnyObject, *mut AnyObject) -> isize;
/// `outlineView:child:ofItem:`
type ChildFn =
    unsafe extern "C" fn(*mut AnyObject, Sel, *mut AnyObject, isize, *mut AnyObject) -> *mut AnyObject;
/// Per-item predicates.
type PredicateFn = unsafe extern "C" fn(*mut AnyObject, Sel, *mut AnyObject, *mut AnyObject) -> Bool;
/// `outlineViewSelectionDidChange:`
type NotifyFn = unsafe extern "C" fn(*mut AnyObject, Sel, *mut AnyObject);
/// `outlineView:viewForTableColumn:item:`
type ViewFn = unsafe extern "C" fn(
    *mut AnyObject,
    Sel,
    *mut AnyObject,
    *mut AnyObject,
    *mut AnyObject,
) -> *mut AnyObject;

/// Node for an outline item; `None` for objects this data source never issued.
fn node_of(item: *mut AnyObject) -> Option<Node> {
    // SAFETY: the outline passes nil or an item we returned earlier.
    let Some(obj) = (unsafe { item.as_ref() }) else {
        return Some(Node::Root);
    };
    let n = obj.downcast_ref::<NSNumber>()?;
    Some(Node::Handle(HandleId::from_raw(n.as_u64())))
}

unsafe extern "C" fn child_count(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    item: *mut AnyObject,
) -> isize {
    let Some(node) = node_of(item) else { return 0 };
    with_platform(|p| p.bridge().sidebar().child_count(node))
        .and_then(|n| isize::try_from(n).ok())
        .unwrap_or(0)
}

unsafe extern "C" fn child(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    index: isize,
    item: *mut AnyObject,
) -> *mut AnyObject {
    let (Some(node), Ok(index)) = (node_of(item), usize::try_from(index)) else {
        return ptr::null_mut();
    };
    with_platform(|p| {
        let handle = p.bridge().sidebar_mut().child_at(index, node)?;
        Some(Retained::as_ptr(&p.item_object(handle)) as *mut AnyObject)
    })
    .flatten()
    .unwrap_or(ptr::null_mut())
}

/// Evaluate a sidebar predicate for `item`, false for unknown items.
fn predicate(item: *mut AnyObject, f: impl FnOnce(&Platform, Node) -> bool) -> Bool {
    let Some(node) = node_of(item) else {
        return Bool::NO;
    };
    Bool::new(with_platform(|p| f(p, node)).unwrap_or(false))
}

unsafe extern "C" fn is_expandable(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    item: *mut AnyObject,
) -> Bool {
    predicate(item, |p, n| p.bridge().sidebar().is_expandable(n))
}

unsafe extern "C" fn is_group(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    item: *mut AnyObject,
) -> Bool {
    predicate(item, |p, n| p.bridge().sidebar().is_group_header(n))
}

unsafe extern "C" fn should_select(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    item: *mut AnyObject,
) -> Bool {
    predicate(item, |p, n| p.bridge().sidebar().should_select(n))
}

unsafe extern "C" fn selection_did_change(
    _this: *mut AnyObject,
    _cmd: Sel,
    notification: *mut AnyObject,
) {
    // SAFETY: AppKit passes an NSNotification whose object is the outline.
    let Some(notification) = (unsafe { notification.as_ref() }) else {
        return;
    };
    // SAFETY: see above; `itemAtRow:` returns nil for -1.
    let item: *mut AnyObject = unsafe {
        let outline: Option<Retained<AnyObject>> = msg_send![notification, object];
        let Some(outline) = outline else { return };
        let row: isize = msg_send![&*outline, selectedRow];
        msg_send![&*outline, itemAtRow: row]
    };
    if item.is_null() {
        return;
    }
    let Some(node) = node_of(item) else { return };
    with_platform(|p| {
        if p.bridge().sidebar().selection_changed(node) {
            p.bridge().pump();
        }
    });
}

unsafe extern "C" fn view_for_item(
    _this: *mut AnyObject,
    _cmd: Sel,
    _outline: *mut AnyObject,
    _column: *mut AnyObject,
    item: *mut AnyObject,
) -> *mut AnyObject {
    let Some(mtm) = MainThreadMarker::new() else {
        return ptr::null_mut();
    };
    let Some(node) = node_of(item) else {
        return ptr::null_mut();
    };
    let Some(content) = with_platform(|p| p.bridge().sidebar().cell(node)).flatten() else {
        return ptr::null_mut();
    };
    Retained::autorelease_return(cell_view(&content, mtm)) as *mut AnyObject
}

/// Build the row view for `content`.
fn cell_view(content: &CellContent, mtm: MainThreadMarker) -> Retained<NSView> {
    match content {
        CellContent::Header { title } => label(title, mtm),
        CellContent::Row {
            label: text,
            icon,
            badge,
            tint_color,
        } => {
            let mut views = Vec::with_capacity(3);
            // SAFETY: plain AppKit constructors on the main thread.
            unsafe {
                if let Some(image) = NSImage::imageWithSystemSymbolName_accessibilityDescription(
                    &NSString::from_str(icon),
                    None,
                ) {
                    let image_view = NSImageView::imageViewWithImage(&image, mtm);
                    if let Some([r, g, b, a]) = tint_color.as_deref().and_then(parse_tint) {
                        let color = NSColor::colorWithSRGBRed_green_blue_alpha(r, g, b, a);
                        image_view.setContentTintColor(Some(&color));
                    }
                    views.push(Retained::into_super(Retained::into_super(image_view)));
                }
            }
            views.push(label(text, mtm));
            if let Some(badge) = badge {
                views.push(label(badge, mtm));
            }
            let stack = NSStackView::stackViewWithViews(&NSArray::from_retained_slice(&views), mtm);
            Retained::into_super(stack)
        }
    }
}

/// Non-editable text label.
fn label(text: &str, mtm: MainThreadMarker) -> Retained<NSView> {
    let field = NSTextField::labelWithString(&NSString::from_str(text), mtm);
    Retained::into_super(Retained::into_super(field))
}

/// Method table of the data source class.
fn methods() -> [MethodSpec; 7] {
    // SAFETY: each signature string matches the transmuted function type.
    unsafe {
        [
            MethodSpec::new(
                c"outlineView:numberOfChildrenOfItem:",
                transmute::<CountFn, Imp>(child_count),
                c"q@:@@",
            ),
            MethodSpec::new(
                c"outlineView:child:ofItem:",
                transmute::<ChildFn, Imp>(child),
                c"@@:@q@",
            ),
            MethodSpec::new(
                c"outlineView:isItemExpandable:",
                transmute::<PredicateFn, Imp>(is_expandable),
                c"B@:@@",
            ),
            MethodSpec::new(
                c"outlineView:isGroupItem:",
                transmute::<PredicateFn, Imp>(is_group),
                c"B@:@@",
            ),
            MethodSpec::new(
                c"outlineView:shouldSelectItem:",
                transmute::<PredicateFn, Imp>(should_select),
                c"B@:@@",
            ),
            MethodSpec::new(
                c"outlineViewSelectionDidChange:",
                transmute::<NotifyFn, Imp>(selection_did_change),
                c"v@:@",
            ),
            MethodSpec::new(
                c"outlineView:viewForTableColumn:item:",
                transmute::<ViewFn, Imp>(view_for_item),
                c"@@:@@@",
            ),
        ]
    }
}

/// Install a data source and delegate on `outline` and load its rows.
///
/// The outline does not retain its data source; keep the returned object
/// alive for as long as the outline.
///
/// # Safety
/// `outline` must be an `NSOutlineView`; call on the main thread.
pub unsafe fn attach_sidebar(platform: &Platform, outline: &AnyObject) -> Result<Retained<AnyObject>> {
    let base = ObjcRuntime::class(c"NSObject").ok_or_else(|| Error::Registration {
        name: SIDEBAR_DATA_SOURCE.to_string_lossy().into_owned(),
        reason: "NSObject not found".into(),
    })?;
    let cls = platform
        .types()
        .get_or_create(SIDEBAR_DATA_SOURCE, base, &methods());
    if ptr::eq(cls, base) {
        return Err(Error::Registration {
            name: SIDEBAR_DATA_SOURCE.to_string_lossy().into_owned(),
            reason: "data source class unavailable".into(),
        });
    }
    let _ = ObjcRuntime::adopt_protocol(cls, c"NSOutlineViewDataSource");
    let _ = ObjcRuntime::adopt_protocol(cls, c"NSOutlineViewDelegate");
    // SAFETY: `cls` is a plain NSObject subclass; the caller guarantees an
    // NSOutlineView.
    let source = unsafe {
        let source: Retained<AnyObject> = msg_send![cls, new];
        let _: () = msg_send![outline, setDataSource: &*source];
        let _: () = msg_send![outline, setDelegate: &*source];
        source
    };
    // SAFETY: forwarded from the caller.
    unsafe { reload_sidebar(platform, outline) };
    debug!("sidebar data source attached");
    Ok(source)
}

/// Reload `outline` after the sidebar tree changed and expand every section
/// that is not configured as collapsed.
///
/// # Safety
/// `outline` must be an `NSOutlineView` whose data source came from
/// [`attach_sidebar`]; call on the main thread.
pub unsafe fn reload_sidebar(platform: &Platform, outline: &AnyObject) {
    // SAFETY: guaranteed by the caller.
    unsafe {
        let _: () = msg_send![outline, reloadData];
    }
    platform.prune_items();
    let sections = platform.bridge().sidebar().sections().len();
    for index in 0..sections {
        let handle = platform.bridge().sidebar_mut().child_at(index, Node::Root);
        let Some(handle) = handle else { continue };
        if platform.bridge().sidebar().is_collapsed(Node::Handle(handle)) {
            continue;
        }
        let item = platform.item_object(handle);
        // SAFETY: `item` is one of our wrappers.
        unsafe {
            let _: () = msg_send![outline, expandItem: &*item];
        }
    }
    trace!(sections, "sidebar reloaded");
}
