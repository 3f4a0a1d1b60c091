//! The registry façade — the public operation surface over the slot table.
//!
//! Every name argument passes through the validator before the table is
//! touched, so the core only ever sees interned [`Name`] handles. Each
//! `Registry` value is an isolated context; construct a fresh one per test,
//! or use [`Registry::global`] for the process-wide instance.

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::Result;
use crate::hooks::VirtualHooks;
use crate::name::Name;
use crate::table::SlotTable;

/// Process-wide default registry.
static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// A named mutable-slot registry.
///
/// # Example
///
/// ```
/// use gvars::Registry;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry.set("$answer", json!(42)).unwrap();
/// assert_eq!(registry.get("$answer").unwrap(), json!(42));
///
/// registry.alias("$result", "$answer").unwrap();
/// registry.set("$result", json!(43)).unwrap();
/// assert_eq!(registry.get("$answer").unwrap(), json!(43));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    table: SlotTable,
}

impl Registry {
    /// Create an empty, isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Initialized on first use; lives for the
    /// duration of the process.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Read the value bound to `name`.
    ///
    /// Fails with `InvalidName` on malformed names and `NotFound` on
    /// unbound ones; a virtual slot's getter failure propagates unchanged.
    pub fn get(&self, name: impl AsRef<str>) -> Result<Value> {
        let name = Name::intern(name.as_ref())?;
        self.table.get(&name)
    }

    /// Write `value` to the slot bound to `name`.
    ///
    /// An unbound name is bound to a fresh plain slot. A setterless
    /// virtual slot fails `ReadOnly` without invoking anything.
    pub fn set(&self, name: impl AsRef<str>, value: Value) -> Result<()> {
        let name = Name::intern(name.as_ref())?;
        self.table.set(&name, value)
    }

    /// True iff a slot is bound to `name`.
    ///
    /// Deliberately permissive: malformed and never-seen names yield
    /// `false`, never an error, and probing does not intern.
    pub fn defined(&self, name: impl AsRef<str>) -> bool {
        match Name::lookup(name.as_ref()) {
            Some(name) => self.table.defined(&name),
            None => false,
        }
    }

    /// Every bound name, in unspecified order.
    pub fn list(&self) -> Vec<Name> {
        self.table.all_names()
    }

    /// Make `new_name` resolve to the same slot as `old_name`; returns the
    /// interned new name.
    ///
    /// Fails with `NotFound` (creating no binding) if `old_name` is
    /// unbound. Subsequent get/set through either name observe and mutate
    /// identical state.
    pub fn alias(&self, new_name: impl AsRef<str>, old_name: impl AsRef<str>) -> Result<Name> {
        let new_name = Name::intern(new_name.as_ref())?;
        let old_name = Name::intern(old_name.as_ref())?;
        self.table.bind_alias(new_name.clone(), &old_name)?;
        Ok(new_name)
    }

    /// Bind `name` to a virtual slot backed by `hooks`, replacing any
    /// existing binding; returns the interned name.
    ///
    /// Installs nothing on failure. Omitting the setter makes every write
    /// fail `ReadOnly`.
    pub fn define_virtual(&self, name: impl AsRef<str>, hooks: VirtualHooks) -> Result<Name> {
        let name = Name::intern(name.as_ref())?;
        self.table.insert_virtual(name.clone(), hooks);
        Ok(name)
    }

    /// The underlying slot table, for host binding layers that need the
    /// lower-level contract.
    pub fn table(&self) -> &SlotTable {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
