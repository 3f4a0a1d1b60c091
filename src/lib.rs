//! # GVars - Rust Port
//!
//! A Rust port of the GVars global-variable registry: a process-wide table
//! mapping `$`-sigiled names to values, where each slot is either a plain
//! storage cell or a *virtual* slot whose reads and writes are redirected
//! through user-supplied getter/setter callbacks, and where aliasing makes
//! two names resolve to the identical slot.
//!
//! The core is a passive, synchronously-invoked data structure: no
//! scheduling, no persistence, no wire format. Callbacks run on the calling
//! thread with no registry lock held, so a getter may freely read other
//! globals through the same registry.
//!
//! Construct a fresh [`Registry`] per context (tests included), or use
//! [`Registry::global`] for the process-wide instance. Hosts that dispatch
//! by operation name go through [`bindings::GvarsModule`].

pub mod bindings;
pub mod error;
pub mod hooks;
pub mod name;
pub mod registry;
pub mod slot;
pub mod table;

pub use error::{GvarError, Result};
pub use hooks::{Getter, Setter, VirtualHooks};
pub use name::Name;
pub use registry::Registry;
pub use slot::Slot;
pub use table::SlotTable;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
