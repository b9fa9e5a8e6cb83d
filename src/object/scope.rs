use colored::*;
use log::trace;

use super::method::resolve_super;
use super::{Class, Instance, ObjectError, Result};
use crate::value::Value;

/// The receiver as seen from inside a running method.
///
/// A scope grants full read/write access to both partitions of the
/// instance's store and may call private methods. It is only ever created
/// by the runtime when it invokes a method, so holding an [`Instance`]
/// alone never reaches private state.
pub struct Scope<'a> {
    /// The receiving instance.
    instance: &'a Instance,

    /// The class that declared the running method.
    owner: &'a Class,

    /// Name of the running method, used for delegation.
    method: &'a str,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(instance: &'a Instance, owner: &'a Class, method: &'a str) -> Self {
        Self {
            instance,
            owner,
            method,
        }
    }

    /// The receiver's public handle, as an outside caller would hold it.
    pub fn this(&self) -> &Instance {
        self.instance
    }

    /// The receiver wrapped as a value. Mutators return this so callers
    /// keep chaining on the same identity.
    pub fn receiver(&self) -> Value {
        Value::Instance(self.instance.clone())
    }

    /// The class that declared the running method, which is not
    /// necessarily the runtime class of the receiver.
    pub fn owner(&self) -> &Class {
        self.owner
    }

    pub fn method_name(&self) -> &str {
        self.method
    }

    /// Reads a field from either partition.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.instance.read_field(name)
    }

    /// Writes a field in either partition.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.instance.write_field(name, value.into())
    }

    /// Reads a field that must have been set, failing with
    /// [`ObjectError::Precondition`] while it still holds nil.
    pub fn require(&self, name: &str) -> Result<Value> {
        let value = self.get(name)?;
        if value.is_nil() {
            return Err(ObjectError::Precondition {
                field: name.to_owned(),
            });
        }
        Ok(value)
    }

    /// Calls a method of either visibility on the receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.instance.call_any(name, args)
    }

    /// Runs the nearest ancestor's version of the running method on the
    /// same receiver.
    pub fn call_super(&self, args: &[Value]) -> Result<Value> {
        self.call_super_named(self.method, args)
    }

    /// Runs the nearest ancestor definition of `name`, skipping whatever
    /// the owner of the running method declares itself.
    pub fn call_super_named(&self, name: &str, args: &[Value]) -> Result<Value> {
        let entry = resolve_super(self.owner, name)?;
        trace!(
            "{}\t{}.{} -> super {}",
            "[CALL]".green(),
            self.owner.name(),
            self.method,
            entry
        );
        self.instance.invoke(&entry, args)
    }

    /// Positional argument `index`, or [`ObjectError::MissingArgument`].
    pub fn arg<'v>(&self, args: &'v [Value], index: usize) -> Result<&'v Value> {
        args.get(index).ok_or_else(|| ObjectError::MissingArgument {
            method: self.method.to_owned(),
            index,
        })
    }
}
