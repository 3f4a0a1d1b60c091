//! The slot table — name → slot mapping with aliasing.
//!
//! Structural operations (insert, alias) synchronize on a single table
//! lock. Reads and writes of slot contents do not: the table lock is only
//! held long enough to clone out the `Arc<Slot>`, so operations against
//! different slots never block each other and a getter/setter callback runs
//! with no registry lock held. A callback that re-enters the table (a
//! getter reading another global) is an ordinary nested call.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{GvarError, Result};
use crate::hooks::VirtualHooks;
use crate::name::Name;
use crate::slot::Slot;

/// Name → slot mapping. Many names may reference one slot (aliasing); a
/// slot is dropped when the last name referencing it is replaced.
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: RwLock<HashMap<Name, Arc<Slot>>>,
}

impl SlotTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the slot bound to `name`. No side effects.
    pub fn lookup(&self, name: &Name) -> Option<Arc<Slot>> {
        self.slots.read().get(name).cloned()
    }

    /// Bind `name` to a fresh plain slot, replacing any existing binding.
    ///
    /// Names aliased to the replaced slot keep resolving to it.
    pub fn insert_plain(&self, name: Name, initial: Value) -> Arc<Slot> {
        let slot = Arc::new(Slot::plain(initial));
        log::trace!("insert plain slot {name}");
        self.slots.write().insert(name, slot.clone());
        slot
    }

    /// Bind `name` to a fresh virtual slot, replacing any existing binding.
    pub fn insert_virtual(&self, name: Name, hooks: VirtualHooks) -> Arc<Slot> {
        let slot = Arc::new(Slot::hooked(hooks));
        log::trace!("insert virtual slot {name}");
        self.slots.write().insert(name, slot.clone());
        slot
    }

    /// Make `new` resolve to the exact same slot as `old`.
    ///
    /// Fails with [`GvarError::NotFound`] (creating no binding) if `old` is
    /// unbound. An existing binding for `new` is overwritten.
    pub fn bind_alias(&self, new: Name, old: &Name) -> Result<()> {
        let mut slots = self.slots.write();
        let slot = slots.get(old).cloned().ok_or_else(|| GvarError::NotFound {
            name: old.as_str().to_string(),
        })?;
        log::trace!("alias {new} -> {old}");
        slots.insert(new, slot);
        Ok(())
    }

    /// Every currently bound name, in unspecified order.
    pub fn all_names(&self) -> Vec<Name> {
        self.slots.read().keys().cloned().collect()
    }

    /// True iff a slot is bound to `name`.
    pub fn defined(&self, name: &Name) -> bool {
        self.slots.read().contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Read the value bound to `name`, dispatching per slot kind.
    ///
    /// Fails with [`GvarError::NotFound`] on unbound names.
    pub fn get(&self, name: &Name) -> Result<Value> {
        let slot = self.lookup(name).ok_or_else(|| GvarError::NotFound {
            name: name.as_str().to_string(),
        })?;
        slot.read(name)
    }

    /// Write `value` to the slot bound to `name`, dispatching per kind.
    ///
    /// An unbound name is bound to a fresh plain slot holding `value`.
    pub fn set(&self, name: &Name, value: Value) -> Result<()> {
        if let Some(slot) = self.lookup(name) {
            return slot.write(name, value);
        }
        // Unbound: create the plain slot under the write lock, re-checking
        // in case another thread bound the name since the lookup.
        let slot = {
            let mut slots = self.slots.write();
            match slots.get(name) {
                Some(slot) => slot.clone(),
                None => {
                    log::trace!("auto-create plain slot {name}");
                    slots.insert(name.clone(), Arc::new(Slot::plain(value)));
                    return Ok(());
                }
            }
        };
        slot.write(name, value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn name(raw: &str) -> Name {
        Name::intern(raw).unwrap()
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let table = SlotTable::new();
        let n = name("$test_table_rt");
        table.set(&n, json!(41)).unwrap();
        table.set(&n, json!(42)).unwrap();
        assert_eq!(table.get(&n).unwrap(), json!(42));
    }

    #[test]
    fn test_get_unbound_is_not_found() {
        let table = SlotTable::new();
        let err = table.get(&name("$test_table_missing")).unwrap_err();
        assert!(matches!(err, GvarError::NotFound { .. }));
    }

    #[test]
    fn test_set_auto_creates_plain_slot() {
        let table = SlotTable::new();
        let n = name("$test_table_auto");
        assert!(!table.defined(&n));
        table.set(&n, json!("created")).unwrap();
        assert!(table.defined(&n));
        assert_eq!(table.get(&n).unwrap(), json!("created"));
    }

    #[test]
    fn test_alias_shares_one_slot_both_ways() {
        let table = SlotTable::new();
        let a = name("$test_table_alias_a");
        let b = name("$test_table_alias_b");
        table.insert_plain(a.clone(), json!(0));
        table.bind_alias(b.clone(), &a).unwrap();

        table.set(&a, json!(5)).unwrap();
        assert_eq!(table.get(&b).unwrap(), json!(5));

        table.set(&b, json!(6)).unwrap();
        assert_eq!(table.get(&a).unwrap(), json!(6));

        let slot_a = table.lookup(&a).unwrap();
        let slot_b = table.lookup(&b).unwrap();
        assert!(Arc::ptr_eq(&slot_a, &slot_b));
    }

    #[test]
    fn test_alias_unbound_old_fails_without_binding() {
        let table = SlotTable::new();
        let x = name("$test_table_alias_x");
        let missing = name("$test_table_alias_missing");
        let err = table.bind_alias(x.clone(), &missing).unwrap_err();
        assert!(matches!(err, GvarError::NotFound { .. }));
        assert!(!table.defined(&x));
    }

    #[test]
    fn test_alias_overwrites_existing_binding() {
        let table = SlotTable::new();
        let a = name("$test_table_ow_a");
        let b = name("$test_table_ow_b");
        table.insert_plain(a.clone(), json!("a"));
        table.insert_plain(b.clone(), json!("b"));

        table.bind_alias(b.clone(), &a).unwrap();
        assert_eq!(table.get(&b).unwrap(), json!("a"));
    }

    #[test]
    fn test_redefine_replaces_slot_but_aliases_keep_old_one() {
        let table = SlotTable::new();
        let v = name("$test_table_redef");
        let old = name("$test_table_redef_old");
        table.insert_plain(v.clone(), json!("original"));
        table.bind_alias(old.clone(), &v).unwrap();

        table.insert_virtual(v.clone(), VirtualHooks::getter(|_n: &Name| Ok(json!("hooked"))));

        assert_eq!(table.get(&v).unwrap(), json!("hooked"));
        // The alias still observes the replaced plain slot.
        assert_eq!(table.get(&old).unwrap(), json!("original"));
        table.set(&old, json!("still plain")).unwrap();
        assert_eq!(table.get(&old).unwrap(), json!("still plain"));
    }

    #[test]
    fn test_replaced_slot_hooks_are_dropped() {
        struct DropProbe(Arc<std::sync::atomic::AtomicBool>);
        impl Drop for DropProbe {
            fn drop(&mut self) {
                self.0.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let probe = DropProbe(dropped.clone());

        let table = SlotTable::new();
        let n = name("$test_table_drop");
        table.insert_virtual(
            n.clone(),
            VirtualHooks::getter(move |_n: &Name| {
                let _ = &probe;
                Ok(Value::Null)
            }),
        );
        assert!(!dropped.load(std::sync::atomic::Ordering::SeqCst));

        // No alias references the old slot, so replacing it drops the hooks.
        table.insert_plain(n.clone(), json!(1));
        assert!(dropped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_all_names_is_a_set_of_bound_names() {
        let table = SlotTable::new();
        for raw in ["$test_table_list_a", "$test_table_list_b", "$test_table_list_c"] {
            table.set(&name(raw), json!(1)).unwrap();
        }
        let names: HashSet<String> = table
            .all_names()
            .iter()
            .map(|n| n.as_str().to_string())
            .collect();
        assert!(names.contains("$test_table_list_a"));
        assert!(names.contains("$test_table_list_b"));
        assert!(names.contains("$test_table_list_c"));
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_concurrent_structural_inserts() {
        let table = Arc::new(SlotTable::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let table = table.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    let n = name(&format!("$test_table_thread_{i}_{j}"));
                    table.set(&n, json!(i)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(table.len(), 8 * 50);
    }

    #[test]
    fn test_concurrent_set_on_same_unbound_name_converges() {
        let table = Arc::new(SlotTable::new());
        let n = name("$test_table_race");
        let mut handles = Vec::new();
        for i in 0..8 {
            let table = table.clone();
            let n = n.clone();
            handles.push(std::thread::spawn(move || {
                table.set(&n, json!(i)).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // Exactly one binding, holding one of the written values.
        assert_eq!(
            table.all_names().iter().filter(|bound| **bound == n).count(),
            1
        );
        let got = table.get(&n).unwrap();
        assert!(got.as_i64().is_some_and(|v| (0..8).contains(&v)));
    }
}
