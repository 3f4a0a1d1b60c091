//! Hook adapters for virtual slots.
//!
//! A virtual slot stores no value. Every read invokes a user-supplied
//! getter and every write invokes a user-supplied setter; omitting the
//! setter makes the slot read-only. The callbacks run synchronously on the
//! calling thread, and the registry guarantees no internal lock is held
//! while they run, so a callback may re-enter the registry freely.
//!
//! # Design principles
//!
//! - Callbacks fail by returning [`GvarError`] (typically
//!   [`GvarError::Hook`]); failures reach the original caller unchanged.
//! - `Send + Sync + 'static` bounds so hooks can be installed once and
//!   invoked from any thread.
//! - Blanket impls let plain closures serve as hooks.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{GvarError, Result};
use crate::name::Name;

/// Read callback for a virtual slot.
///
/// Invoked with the slot's name so one getter can serve several virtual
/// slots. The return value is the read result.
pub trait Getter: Send + Sync + 'static {
    fn call(&self, name: &Name) -> Result<Value>;
}

impl<F> Getter for F
where
    F: Fn(&Name) -> Result<Value> + Send + Sync + 'static,
{
    fn call(&self, name: &Name) -> Result<Value> {
        self(name)
    }
}

/// Write callback for a virtual slot.
///
/// Invoked with the slot's name and the value being written. Any return
/// value is discarded — the caller-visible effect is whatever external
/// state the setter manages.
pub trait Setter: Send + Sync + 'static {
    fn call(&self, name: &Name, value: Value) -> Result<()>;
}

impl<F> Setter for F
where
    F: Fn(&Name, Value) -> Result<()> + Send + Sync + 'static,
{
    fn call(&self, name: &Name, value: Value) -> Result<()> {
        self(name, value)
    }
}

/// The getter/setter pair backing a virtual slot.
///
/// Owned exclusively by the slot it was created for and dropped with it.
///
/// # Example
///
/// ```
/// use gvars::{Name, Registry, VirtualHooks};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry
///     .define_virtual("$now", VirtualHooks::getter(|_name: &Name| Ok(json!(1234))))
///     .unwrap();
/// assert_eq!(registry.get("$now").unwrap(), json!(1234));
/// ```
pub struct VirtualHooks {
    getter: Arc<dyn Getter>,
    setter: Option<Arc<dyn Setter>>,
}

impl VirtualHooks {
    /// Build a read-only hook pair from a getter.
    pub fn getter(getter: impl Getter) -> Self {
        Self {
            getter: Arc::new(getter),
            setter: None,
        }
    }

    /// Build a hook pair from pre-shared callback handles.
    pub fn from_parts(getter: Arc<dyn Getter>, setter: Option<Arc<dyn Setter>>) -> Self {
        Self { getter, setter }
    }

    /// Attach a setter, making the slot writable.
    pub fn with_setter(mut self, setter: impl Setter) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Whether a setter was supplied.
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Invoke the getter. Called exactly once per read.
    pub(crate) fn read(&self, name: &Name) -> Result<Value> {
        self.getter.call(name)
    }

    /// Invoke the setter, or fail with [`GvarError::ReadOnly`] before any
    /// invocation if none was supplied.
    pub(crate) fn write(&self, name: &Name, value: Value) -> Result<()> {
        let setter = self.setter.as_ref().ok_or_else(|| GvarError::ReadOnly {
            name: name.as_str().to_string(),
        })?;
        setter.call(name, value)
    }
}

impl fmt::Debug for VirtualHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualHooks")
            .field("writable", &self.is_writable())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
