//! Runtime synthesis of native object types.
//!
//! The host toolkit only lets us override behavior (window focusability,
//! outline data sources, script message relays) by creating new classes at
//! runtime. [`TypeRegistry`] memoizes that work per type name: the first
//! request allocates a type derived from a base, attaches the method table
//! and publishes it; every later request returns the cached type untouched.
//!
//! Registering the same name twice is unsafe in the underlying runtime, so the
//! registry checks for presence before it ever asks the runtime to allocate.

use std::{
    collections::HashMap,
    ffi::{CStr, CString},
    fmt::Debug,
};

use tracing::{debug, warn};

use crate::error::Result;

/// Untyped native function pointer attached to a synthesized type.
///
/// The concrete signature is described by [`MethodSpec::signature`]; callers
/// transmute their typed `extern "C"` functions into this shape.
pub type Imp = unsafe extern "C" fn();

/// One method to attach to a synthesized type.
#[derive(Clone, Copy, Debug)]
pub struct MethodSpec {
    /// Selector name, e.g. `c"canBecomeKeyWindow"`.
    pub selector: &'static CStr,
    /// Implementation pointer.
    pub imp: Imp,
    /// Runtime type encoding of the implementation, e.g. `c"B@:"`.
    pub signature: &'static CStr,
}

impl MethodSpec {
    /// Build a method entry.
    #[must_use]
    pub const fn new(selector: &'static CStr, imp: Imp, signature: &'static CStr) -> Self {
        Self {
            selector,
            imp,
            signature,
        }
    }
}

/// The object runtime that actually creates types.
pub trait TypeRuntime {
    /// Reference to a type known to the runtime.
    type Type: Copy + Debug;

    /// Return the type registered under `name`, if any.
    fn lookup(&self, name: &CStr) -> Option<Self::Type>;

    /// Allocate `name` derived from `base`, attach `methods` and publish it.
    ///
    /// Only called after [`Self::lookup`] returned `None` for `name`.
    fn synthesize(
        &mut self,
        name: &CStr,
        base: Self::Type,
        methods: &[MethodSpec],
    ) -> Result<Self::Type>;
}

/// Memoizing front end over a [`TypeRuntime`].
pub struct TypeRegistry<R: TypeRuntime> {
    /// Runtime used for lookups and synthesis.
    runtime: R,
    /// Types this registry synthesized or adopted, keyed by name.
    cache: HashMap<CString, R::Type>,
}

impl<R: TypeRuntime> TypeRegistry<R> {
    /// Wrap a runtime with an empty cache.
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            cache: HashMap::new(),
        }
    }

    /// Return the type registered as `name`, creating it from `base` and
    /// `methods` on first use.
    ///
    /// When synthesis fails this logs a degraded-mode warning and returns
    /// `base` unchanged; overridden methods will not run in that case. A
    /// failed attempt is not cached, so a later call may try again.
    pub fn get_or_create(&mut self, name: &CStr, base: R::Type, methods: &[MethodSpec]) -> R::Type {
        if let Some(ty) = self.cache.get(name) {
            return *ty;
        }
        if let Some(existing) = self.runtime.lookup(name) {
            debug!(name = ?name, "adopting already registered type");
            self.cache.insert(name.to_owned(), existing);
            return existing;
        }
        match self.runtime.synthesize(name, base, methods) {
            Ok(ty) => {
                debug!(name = ?name, methods = methods.len(), "synthesized type");
                self.cache.insert(name.to_owned(), ty);
                ty
            }
            Err(e) => {
                warn!(
                    name = ?name,
                    "type synthesis failed, enhanced behavior unavailable: {}",
                    e
                );
                base
            }
        }
    }

    /// Cached type for `name`, if this registry produced one.
    pub fn get(&self, name: &CStr) -> Option<R::Type> {
        self.cache.get(name).copied()
    }

    /// True when `name` resolved to a synthesized (or adopted) type rather
    /// than falling back to its base.
    pub fn is_enhanced(&self, name: &CStr) -> bool {
        self.cache.contains_key(name)
    }

    /// Borrow the underlying runtime.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Error;

    /// In-memory runtime: types are integers, names map to ids.
    #[derive(Default)]
    struct FakeRuntime {
        registered: HashMap<CString, (u32, usize)>,
        synth_calls: usize,
        fail: bool,
    }

    impl TypeRuntime for FakeRuntime {
        type Type = u32;

        fn lookup(&self, name: &CStr) -> Option<u32> {
            self.registered.get(name).map(|(id, _)| *id)
        }

        fn synthesize(&mut self, name: &CStr, base: u32, methods: &[MethodSpec]) -> Result<u32> {
            self.synth_calls += 1;
            if self.fail {
                return Err(Error::Registration {
                    name: name.to_string_lossy().into_owned(),
                    reason: "allocation failed".into(),
                });
            }
            assert!(
                !self.registered.contains_key(name),
                "double registration of {name:?}"
            );
            let id = base + 100 + self.registered.len() as u32;
            self.registered.insert(name.to_owned(), (id, methods.len()));
            Ok(id)
        }
    }

    unsafe extern "C" fn noop() {}

    fn methods(n: usize) -> Vec<MethodSpec> {
        (0..n)
            .map(|_| MethodSpec::new(c"doThing", noop, c"v@:"))
            .collect()
    }

    #[test]
    fn repeat_requests_return_first_type() {
        let mut reg = TypeRegistry::new(FakeRuntime::default());
        let a = reg.get_or_create(c"CraftWindow", 1, &methods(2));
        let b = reg.get_or_create(c"CraftWindow", 1, &methods(5));
        assert_eq!(a, b);
        assert_ne!(a, 1);
        assert_eq!(reg.runtime().synth_calls, 1);
        assert_eq!(reg.runtime().registered[c"CraftWindow"].1, 2);
        assert!(reg.is_enhanced(c"CraftWindow"));
    }

    #[test]
    fn distinct_names_get_distinct_types() {
        let mut reg = TypeRegistry::new(FakeRuntime::default());
        let a = reg.get_or_create(c"A", 1, &methods(1));
        let b = reg.get_or_create(c"B", 1, &methods(1));
        assert_ne!(a, b);
        assert_eq!(reg.get(c"A"), Some(a));
    }

    #[test]
    fn existing_runtime_type_is_adopted_not_registered() {
        let mut rt = FakeRuntime::default();
        rt.registered.insert(c"Preexisting".to_owned(), (42, 0));
        let mut reg = TypeRegistry::new(rt);
        assert_eq!(reg.get_or_create(c"Preexisting", 1, &methods(3)), 42);
        assert_eq!(reg.runtime().synth_calls, 0);
    }

    #[test]
    fn failure_falls_back_to_base() {
        let rt = FakeRuntime {
            fail: true,
            ..Default::default()
        };
        let mut reg = TypeRegistry::new(rt);
        assert_eq!(reg.get_or_create(c"Broken", 7, &methods(1)), 7);
        assert!(!reg.is_enhanced(c"Broken"));
        assert_eq!(reg.get(c"Broken"), None);
    }
}
