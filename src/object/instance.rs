use colored::*;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{
    Class, FieldStore, MethodEntry, MethodTable, ObjectError, Result, Scope, Visibility, INITIALIZE,
};
use crate::value::Value;

/// Global counter handing out instance identities.
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque token distinguishing one instance from every other, regardless of
/// field contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct InstanceData {
    /// Identity of this instance.
    id: ObjectId,

    /// The class this instance is created from.
    class: Class,

    /// Methods resolved when the instance was constructed. Clones share it.
    methods: Rc<MethodTable>,

    /// Values for all the fields.
    store: RefCell<FieldStore>,
}

/// A shared handle to an instance of a class.
///
/// Cloning the handle is plain assignment: both handles reach the same
/// store and observe each other's writes. Use [`Instance::duplicate`] for a
/// copy with its own identity.
///
/// Through this handle only public fields and public methods are
/// reachable. Private state is reached from method bodies via [`Scope`].
///
/// Handles are reference counted, so instances that reach each other
/// through their fields form a cycle that is never freed. Set one of the
/// fields to nil to break the cycle before dropping the last handle.
#[derive(Clone)]
pub struct Instance(Rc<InstanceData>);

impl Instance {
    fn allocate(class: &Class, methods: Rc<MethodTable>, store: FieldStore) -> Self {
        let instance = Instance(Rc::new(InstanceData {
            id: ObjectId::next(),
            class: class.clone(),
            methods,
            store: RefCell::new(store),
        }));
        trace!(
            "{}\tallocate {} {}",
            "[OBJECT]".purple(),
            class.name(),
            instance.id()
        );
        instance
    }

    pub(crate) fn construct(class: &Class, args: &[Value]) -> Result<Self> {
        let methods = Rc::new(MethodTable::resolve(class)?);
        let instance = Self::allocate(class, methods, class.seed_store());

        // The initializer only fills in fields, what it returns is dropped.
        if let Some(entry) = instance.0.methods.get(INITIALIZE).cloned() {
            instance.invoke(&entry, args)?;
        }
        Ok(instance)
    }

    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Runtime class name followed by every ancestor's.
    pub fn class_names(&self) -> Vec<&str> {
        self.class().ancestry().map(Class::name).collect()
    }

    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.class().inherits_from(class)
    }

    /// Reads a public field.
    pub fn get(&self, name: &str) -> Result<Value> {
        let store = self.0.store.borrow();
        match store.visibility_of(name) {
            Some(Visibility::Public) => Ok(store.get(name).cloned().unwrap_or_default()),
            Some(Visibility::Private) => Err(self.access_violation(name)),
            None => Err(self.no_such_field(name)),
        }
    }

    /// Writes a public field. On an unlocked instance an undeclared name is
    /// added as a new public field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.0.store.borrow().visibility_of(name) == Some(Visibility::Private) {
            return Err(self.access_violation(name));
        }
        self.write_field(name, value.into())
    }

    /// Calls a public method.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let entry = self.lookup(name)?;
        if entry.method.visibility == Visibility::Private {
            return Err(self.access_violation(name));
        }
        self.invoke(&entry, args)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.0
            .methods
            .get(name)
            .map_or(false, |entry| entry.method.visibility == Visibility::Public)
    }

    /// Names of all public fields and methods, sorted.
    pub fn public_names(&self) -> Vec<String> {
        let (fields, methods) = self.members(Visibility::Public);
        let mut names: Vec<String> = fields.into_iter().map(|(name, _)| name).collect();
        names.extend(methods);
        names.sort_unstable();
        names
    }

    /// Copies this instance into a new identity.
    ///
    /// A shallow copy shares any nested instance with the original. A deep
    /// copy clones nested instances as well, including those held inside
    /// lists; an instance reachable more than once is cloned once, so
    /// aliasing and cycles carry over to the copy.
    pub fn duplicate(&self, deep: bool) -> Result<Instance> {
        let mut cloned = HashMap::new();
        self.duplicate_into(deep, &mut cloned)
    }

    fn duplicate_into(&self, deep: bool, cloned: &mut HashMap<ObjectId, Instance>) -> Result<Instance> {
        if let Some(copy) = cloned.get(&self.id()) {
            return Ok(copy.clone());
        }
        if !self.class().is_cloneable() {
            return Err(ObjectError::NotCloneable {
                class: self.class().name().to_owned(),
            });
        }

        let copy = Self::allocate(self.class(), Rc::clone(&self.0.methods), FieldStore::new());
        cloned.insert(self.id(), copy.clone());

        let store = if deep {
            self.0.store.borrow().try_map(|value| deep_copy(value, cloned))?
        } else {
            self.0.store.borrow().clone()
        };
        *copy.0.store.borrow_mut() = store;

        trace!(
            "{}\t{} {} -> {} ({})",
            "[CLONE]".yellow(),
            self.class().name(),
            self.id(),
            copy.id(),
            if deep { "deep" } else { "shallow" }
        );
        Ok(copy)
    }

    pub(crate) fn read_field(&self, name: &str) -> Result<Value> {
        self.0
            .store
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| self.no_such_field(name))
    }

    pub(crate) fn write_field(&self, name: &str, value: Value) -> Result<()> {
        let mut store = self.0.store.borrow_mut();
        if store.visibility_of(name).is_some() {
            store.set(name, value);
            return Ok(());
        }
        if self.0.methods.contains(name) || self.class().lock_objects() {
            return Err(ObjectError::LockedObject {
                class: self.class().name().to_owned(),
                member: name.to_owned(),
            });
        }
        store.declare(name, Visibility::Public, value);
        Ok(())
    }

    pub(crate) fn call_any(&self, name: &str, args: &[Value]) -> Result<Value> {
        let entry = self.lookup(name)?;
        self.invoke(&entry, args)
    }

    pub(crate) fn invoke(&self, entry: &MethodEntry, args: &[Value]) -> Result<Value> {
        trace!(
            "{}\t{} {} <- {} ({} args)",
            "[CALL]".green(),
            self.class().name(),
            self.id(),
            entry,
            args.len()
        );
        let scope = Scope::new(self, &entry.owner, &entry.method.name);
        entry.method.invoke(&scope, args)
    }

    /// Fields and method names of one partition, each sorted by name.
    pub(crate) fn members(&self, visibility: Visibility) -> (Vec<(String, Value)>, Vec<String>) {
        let store = self.0.store.borrow();
        let fields = store
            .names(visibility)
            .into_iter()
            .map(|name| {
                let value = store.get(name).cloned().unwrap_or_default();
                (name.to_owned(), value)
            })
            .collect();
        let methods = self
            .0
            .methods
            .names(visibility)
            .into_iter()
            .map(str::to_owned)
            .collect();
        (fields, methods)
    }

    fn lookup(&self, name: &str) -> Result<MethodEntry> {
        self.0
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| ObjectError::NoSuchMethod {
                class: self.class().name().to_owned(),
                method: name.to_owned(),
            })
    }

    fn access_violation(&self, member: &str) -> ObjectError {
        ObjectError::AccessViolation {
            class: self.class().name().to_owned(),
            member: member.to_owned(),
        }
    }

    fn no_such_field(&self, field: &str) -> ObjectError {
        ObjectError::NoSuchField {
            class: self.class().name().to_owned(),
            field: field.to_owned(),
        }
    }
}

fn deep_copy(value: &Value, cloned: &mut HashMap<ObjectId, Instance>) -> Result<Value> {
    match value {
        Value::Instance(instance) => Ok(Value::Instance(instance.duplicate_into(true, cloned)?)),
        Value::List(items) => items
            .iter()
            .map(|item| deep_copy(item, cloned))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        other => Ok(other.clone()),
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance of {}>", self.class().name())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance of {} {}>", self.class().name(), self.id())
    }
}
