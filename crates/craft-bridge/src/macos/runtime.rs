//! Objective-C runtime backend for [`TypeRegistry`](crate::TypeRegistry).
//!
//! Classes are built with the raw runtime calls so that method tables can be
//! supplied as untyped `IMP`s plus type-encoding strings.

use std::ffi::{CStr, c_char};

use objc2::runtime::{AnyClass, AnyObject, Bool, Sel};
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::{Imp, MethodSpec, TypeRuntime},
};

/// Opaque `Protocol *`.
#[repr(C)]
struct RawProtocol {
    /// Zero-sized; never constructed.
    _private: [u8; 0],
}

#[link(name = "objc", kind = "dylib")]
unsafe extern "C" {
    fn objc_allocateClassPair(
        superclass: *const AnyClass,
        name: *const c_char,
        extra_bytes: usize,
    ) -> *mut AnyClass;
    fn objc_registerClassPair(cls: *mut AnyClass);
    fn objc_disposeClassPair(cls: *mut AnyClass);
    fn class_addMethod(cls: *mut AnyClass, name: Sel, imp: Imp, types: *const c_char) -> Bool;
    fn class_addProtocol(cls: *mut AnyClass, protocol: *const RawProtocol) -> Bool;
    fn objc_getProtocol(name: *const c_char) -> *const RawProtocol;
    fn object_setClass(obj: *mut AnyObject, cls: *const AnyClass) -> *const AnyClass;
}

/// Builds classes through `objc_allocateClassPair` and friends.
#[derive(Debug, Default)]
pub struct ObjcRuntime;

impl ObjcRuntime {
    /// Class named `name`, if loaded.
    pub fn class(name: &CStr) -> Option<&'static AnyClass> {
        AnyClass::get(name)
    }

    /// Declare conformance to the protocol `name` on `cls`.
    ///
    /// Returns false if the protocol is unknown or already adopted.
    pub fn adopt_protocol(cls: &'static AnyClass, name: &CStr) -> bool {
        // SAFETY: both pointers come from the runtime; adding a protocol to a
        // registered class is permitted.
        unsafe {
            let proto = objc_getProtocol(name.as_ptr());
            if proto.is_null() {
                return false;
            }
            class_addProtocol(cls as *const AnyClass as *mut AnyClass, proto).as_bool()
        }
    }

    /// Change the class of a live object (isa swizzle).
    ///
    /// # Safety
    /// `cls` must be layout compatible with the object's current class,
    /// typically a subclass of it that adds no instance variables.
    pub unsafe fn set_class(obj: &AnyObject, cls: &'static AnyClass) {
        // SAFETY: guaranteed by the caller.
        unsafe {
            object_setClass(obj as *const AnyObject as *mut AnyObject, cls);
        }
    }
}

impl TypeRuntime for ObjcRuntime {
    type Type = &'static AnyClass;

    fn lookup(&self, name: &CStr) -> Option<Self::Type> {
        AnyClass::get(name)
    }

    fn synthesize(
        &mut self,
        name: &CStr,
        base: Self::Type,
        methods: &[MethodSpec],
    ) -> Result<Self::Type> {
        let err = |reason: &str| Error::Registration {
            name: name.to_string_lossy().into_owned(),
            reason: reason.to_string(),
        };
        // SAFETY: `base` is a registered class and `name` was checked to be
        // unregistered by the caller; the pair is either registered or
        // disposed before returning.
        unsafe {
            let cls = objc_allocateClassPair(base, name.as_ptr(), 0);
            if cls.is_null() {
                return Err(err("objc_allocateClassPair returned nil"));
            }
            for m in methods {
                let sel = Sel::register(m.selector);
                if !class_addMethod(cls, sel, m.imp, m.signature.as_ptr()).as_bool() {
                    objc_disposeClassPair(cls);
                    return Err(err(&format!(
                        "class_addMethod failed for {}",
                        m.selector.to_string_lossy()
                    )));
                }
            }
            objc_registerClassPair(cls);
            debug!(name = ?name, base = %base.name().to_string_lossy(), "registered class");
            Ok(&*cls)
        }
    }
}
