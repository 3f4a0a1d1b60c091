//! A single named slot — plain storage cell or virtual hook pair.

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Result;
use crate::hooks::VirtualHooks;
use crate::name::Name;

/// A storage location bound to one or more names.
///
/// The kind is fixed at creation and never changes in place; redefining a
/// name replaces its slot wholesale, so other names aliased to the old slot
/// keep observing the old slot's state.
#[derive(Debug)]
pub enum Slot {
    /// Directly readable/writable value cell.
    Plain(RwLock<Value>),
    /// Hook-backed slot; every read/write is a callback invocation.
    Virtual(VirtualHooks),
}

impl Slot {
    /// Create a plain slot holding `initial`.
    pub fn plain(initial: Value) -> Self {
        Slot::Plain(RwLock::new(initial))
    }

    /// Create a virtual slot backed by `hooks`.
    pub fn hooked(hooks: VirtualHooks) -> Self {
        Slot::Virtual(hooks)
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Slot::Virtual(_))
    }

    /// Read the slot's current value.
    ///
    /// For a virtual slot this invokes the getter with `name` — callers
    /// must not hold any registry lock here.
    pub fn read(&self, name: &Name) -> Result<Value> {
        match self {
            Slot::Plain(cell) => Ok(cell.read().clone()),
            Slot::Virtual(hooks) => hooks.read(name),
        }
    }

    /// Write `value` into the slot.
    ///
    /// A setterless virtual slot fails read-only before anything runs.
    pub fn write(&self, name: &Name, value: Value) -> Result<()> {
        match self {
            Slot::Plain(cell) => {
                *cell.write() = value;
                Ok(())
            }
            Slot::Virtual(hooks) => hooks.write(name, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
