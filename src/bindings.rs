//! Host binding layer — the loosely-typed call surface.
//!
//! An embedding host does not call [`Registry`] methods directly; it
//! produces op names and argument lists in whatever call syntax it has and
//! routes them through [`GvarsModule::call`]. This layer owns everything
//! that is "thin glue" around the core: op-name aliasing (`get`, `[]` and
//! `global_variable_get` are pure renamings), argument-count scanning,
//! callable coercion for virtual definitions, and the trailing-closure
//! convention where a block at the call site stands in for the getter.
//!
//! All checks here run before the registry is touched, so a call that
//! fails arity or coercion installs nothing.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{GvarError, Result};
use crate::hooks::{Getter, Setter, VirtualHooks};
use crate::name::Name;
use crate::registry::Registry;

// ---------------------------------------------------------------------------
// Callable — the narrow host-callable capability
// ---------------------------------------------------------------------------

/// A host callable handle: invoke with N arguments, get a value or fail.
///
/// This is the only capability the registry requires of host callbacks.
/// Anything that does not implement it is rejected at definition time.
pub trait Callable: Send + Sync + 'static {
    fn call(&self, args: &[Value]) -> Result<Value>;
}

impl<F> Callable for F
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
{
    fn call(&self, args: &[Value]) -> Result<Value> {
        self(args)
    }
}

/// Getter adapter over a host callable: invoked with `[name]`.
struct CallableGetter(Arc<dyn Callable>);

impl Getter for CallableGetter {
    fn call(&self, name: &Name) -> Result<Value> {
        self.0.call(&[Value::String(name.as_str().to_string())])
    }
}

/// Setter adapter over a host callable: invoked with `[name, value]`,
/// return value discarded.
struct CallableSetter(Arc<dyn Callable>);

impl Setter for CallableSetter {
    fn call(&self, name: &Name, value: Value) -> Result<()> {
        self.0
            .call(&[Value::String(name.as_str().to_string()), value])
            .map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Arg — loosely-typed call-site argument
// ---------------------------------------------------------------------------

/// An argument as it arrives from a host call site.
///
/// Names reach this layer as strings — a host with a symbol type converts
/// symbols to their string form before building the `Arg`, so the core
/// never carries a two-kind name representation.
#[derive(Clone)]
pub enum Arg {
    /// A name or other string argument.
    Str(String),
    /// A plain host value.
    Value(Value),
    /// A host callable handle.
    Callable(Arc<dyn Callable>),
}

impl Arg {
    /// Convenience constructor for name arguments.
    pub fn name(raw: impl Into<String>) -> Self {
        Arg::Str(raw.into())
    }

    /// Host-level kind label, used in coercion error messages.
    fn kind(&self) -> &'static str {
        match self {
            Arg::Str(_) => "String",
            Arg::Callable(_) => "Callable",
            Arg::Value(Value::Null) => "Null",
            Arg::Value(Value::Bool(_)) => "Bool",
            Arg::Value(Value::Number(_)) => "Number",
            Arg::Value(Value::String(_)) => "String",
            Arg::Value(Value::Array(_)) => "Array",
            Arg::Value(Value::Object(_)) => "Object",
        }
    }

    /// The string form of a name argument.
    fn as_name(&self) -> Result<&str> {
        match self {
            Arg::Str(raw) => Ok(raw),
            Arg::Value(Value::String(raw)) => Ok(raw),
            other => Err(GvarError::InvalidName {
                name: format!("<{}>", other.kind()),
            }),
        }
    }

    /// The plain value form of a value argument.
    ///
    /// A callable has no value form; its printable representation is
    /// stored instead.
    fn into_value(self) -> Value {
        match self {
            Arg::Str(raw) => Value::String(raw),
            Arg::Value(value) => value,
            Arg::Callable(_) => Value::String("#<Callable>".to_string()),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(raw) => f.debug_tuple("Str").field(raw).finish(),
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Op — operation names and their aliases
// ---------------------------------------------------------------------------

/// The six registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Set,
    Defined,
    List,
    Alias,
    DefineVirtual,
}

impl Op {
    /// Resolve an op name, including every registered renaming, to its
    /// operation. The aliases are pure renamings with identical contracts.
    pub fn resolve(op: &str) -> Result<Op> {
        Ok(match op {
            "global_variable_get" | "get" | "[]" => Op::Get,
            "global_variable_set" | "set" | "[]=" => Op::Set,
            "global_variable_defined?" | "defined?" => Op::Defined,
            "global_variables" | "list" => Op::List,
            "alias_global_variable" | "alias" => Op::Alias,
            "virtual" => Op::DefineVirtual,
            _ => {
                return Err(GvarError::UnknownOp {
                    op: op.to_string(),
                })
            }
        })
    }
}

// ---------------------------------------------------------------------------
// GvarsModule — the registered module surface
// ---------------------------------------------------------------------------

/// The registry exposed as a host module.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use gvars::bindings::{Arg, GvarsModule};
/// use gvars::Registry;
/// use serde_json::json;
///
/// let module = GvarsModule::new(Arc::new(Registry::new()));
/// module
///     .call("set", &[Arg::name("$debug"), Arg::Value(json!(true))], None)
///     .unwrap();
/// assert_eq!(
///     module.call("[]", &[Arg::name("$debug")], None).unwrap(),
///     json!(true)
/// );
/// ```
pub struct GvarsModule {
    registry: Arc<Registry>,
}

impl GvarsModule {
    /// Bind a module surface to `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this module dispatches to.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Dispatch one host call.
    ///
    /// `block` carries the trailing closure, if the call site had one; only
    /// `virtual` consumes it.
    pub fn call(&self, op: &str, args: &[Arg], block: Option<Arc<dyn Callable>>) -> Result<Value> {
        match Op::resolve(op)? {
            Op::Get => {
                expect_arity(args, 1, "1")?;
                self.registry.get(args[0].as_name()?)
            }
            Op::Set => {
                expect_arity(args, 2, "2")?;
                let name = args[0].as_name()?;
                let value = args[1].clone().into_value();
                self.registry.set(name, value.clone())?;
                // Assignment expressions evaluate to the written value.
                Ok(value)
            }
            Op::Defined => {
                expect_arity(args, 1, "1")?;
                // Permissive: a non-string name argument is simply "not
                // defined", same as a malformed string.
                let defined = args[0]
                    .as_name()
                    .map(|raw| self.registry.defined(raw))
                    .unwrap_or(false);
                Ok(Value::Bool(defined))
            }
            Op::List => {
                expect_arity(args, 0, "0")?;
                Ok(Value::Array(
                    self.registry
                        .list()
                        .iter()
                        .map(|name| Value::String(name.as_str().to_string()))
                        .collect(),
                ))
            }
            Op::Alias => {
                expect_arity(args, 2, "2")?;
                let new_name = self
                    .registry
                    .alias(args[0].as_name()?, args[1].as_name()?)?;
                Ok(Value::String(new_name.as_str().to_string()))
            }
            Op::DefineVirtual => self.define_virtual(args, block),
        }
    }

    /// `virtual(name, getter = <block>, setter = nil)`.
    ///
    /// One required argument plus two optional. With a single argument the
    /// trailing block is the getter; a block alongside an explicit getter
    /// is ignored with a warning. All coercion happens before the slot is
    /// installed.
    fn define_virtual(
        &self,
        args: &[Arg],
        block: Option<Arc<dyn Callable>>,
    ) -> Result<Value> {
        if args.is_empty() || args.len() > 3 {
            return Err(GvarError::WrongArity {
                given: args.len(),
                expected: "1..3",
            });
        }

        // Getter source: explicit second argument, else the trailing block.
        let use_block = args.len() == 1;
        if !use_block && block.is_some() {
            log::warn!("given block not used");
        }
        let block_getter = if use_block {
            Some(block.ok_or(GvarError::NoBlock)?)
        } else {
            None
        };

        let name = Name::intern(args[0].as_name()?)?;

        let getter: Arc<dyn Callable> = match block_getter {
            Some(block) => block,
            None => match &args[1] {
                Arg::Callable(callable) => callable.clone(),
                other => {
                    return Err(GvarError::WrongGetterType {
                        kind: other.kind(),
                    })
                }
            },
        };

        let setter: Option<Arc<dyn Callable>> = match args.get(2) {
            None => None,
            // An explicit nil setter means read-only, same as omission.
            Some(Arg::Value(Value::Null)) => None,
            Some(Arg::Callable(callable)) => Some(callable.clone()),
            Some(other) => {
                return Err(GvarError::WrongSetterType {
                    kind: other.kind(),
                })
            }
        };

        let hooks = VirtualHooks::from_parts(
            Arc::new(CallableGetter(getter)),
            setter.map(|callable| Arc::new(CallableSetter(callable)) as Arc<dyn Setter>),
        );
        let name = self.registry.define_virtual(name.as_str(), hooks)?;
        Ok(Value::String(name.as_str().to_string()))
    }
}

impl fmt::Debug for GvarsModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GvarsModule").finish_non_exhaustive()
    }
}

fn expect_arity(args: &[Arg], want: usize, expected: &'static str) -> Result<()> {
    if args.len() != want {
        return Err(GvarError::WrongArity {
            given: args.len(),
            expected,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
