//! Registry errors.

use thiserror::Error;

/// Errors that can occur while validating names, resolving slots, or
/// dispatching through the host binding layer.
#[derive(Debug, Error)]
pub enum GvarError {
    /// A name argument failed validation (empty, missing `$` sigil, bare
    /// sigil, or not representable as a name string).
    #[error("'{name}' is not allowed as a global variable name")]
    InvalidName { name: String },

    /// An operation required an existing binding that is absent.
    #[error("undefined global variable {name}")]
    NotFound { name: String },

    /// A write was attempted on a virtual slot that has no setter.
    #[error("{name} is a read-only variable")]
    ReadOnly { name: String },

    /// The getter argument of a virtual definition is not a callable.
    #[error("wrong getter type {kind} (expected callable)")]
    WrongGetterType { kind: &'static str },

    /// The setter argument of a virtual definition is not a callable.
    #[error("wrong setter type {kind} (expected callable)")]
    WrongSetterType { kind: &'static str },

    /// A binding-layer call carried the wrong number of arguments.
    #[error("wrong number of arguments (given {given}, expected {expected})")]
    WrongArity { given: usize, expected: &'static str },

    /// `virtual` was called with a name only and no trailing closure.
    #[error("no block given")]
    NoBlock,

    /// The binding layer was asked to dispatch an op it does not register.
    #[error("unknown operation '{op}'")]
    UnknownOp { op: String },

    /// A failure raised inside a user getter/setter callback.
    ///
    /// Constructed by the callback itself and propagated to the caller
    /// unchanged; the registry never wraps or swallows it.
    #[error("{message}")]
    Hook { message: String },
}

impl GvarError {
    /// Build a callback-originated error. Intended for use inside
    /// getter/setter bodies.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook {
            message: message.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GvarError>;
