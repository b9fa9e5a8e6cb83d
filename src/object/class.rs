use colored::*;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{FieldStore, Instance, Method, MethodEntry, ObjectError, Result, Scope, Visibility};
use crate::value::Value;

/// A class declaration containing the name, fields and methods.
struct ClassData {
    /// Name of the class.
    name: String,

    /// The class this one inherits from.
    parent: Option<Class>,

    /// Public fields and their defaults.
    public_fields: HashMap<String, Value>,

    /// Private fields and their defaults.
    private_fields: HashMap<String, Value>,

    /// Methods this class declares itself, of either visibility. Only
    /// mutated through [`Class::set_method`].
    methods: RefCell<HashMap<String, Method>>,

    /// Whether instances reject assignment to undeclared fields.
    lock_objects: bool,

    /// Whether instances may be cloned.
    cloneable: bool,
}

/// A shared handle to a class declaration.
#[derive(Clone)]
pub struct Class(Rc<ClassData>);

impl Class {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// This class followed by each of its ancestors, nearest first.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    pub fn ptr_eq(&self, other: &Class) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn inherits_from(&self, other: &Class) -> bool {
        self.ancestry().any(|class| class.ptr_eq(other))
    }

    pub fn lock_objects(&self) -> bool {
        self.0.lock_objects
    }

    /// A class is cloneable only if every class in its chain is.
    pub fn is_cloneable(&self) -> bool {
        self.ancestry().all(|class| class.0.cloneable)
    }

    /// A method declared by this class itself, ignoring ancestors.
    pub fn own_method(&self, name: &str) -> Option<Method> {
        self.0.methods.borrow().get(name).cloned()
    }

    pub fn own_methods(&self) -> Vec<Method> {
        self.0.methods.borrow().values().cloned().collect()
    }

    /// The nearest definition of `name`, starting at this class.
    pub fn find_method(&self, name: &str) -> Option<MethodEntry> {
        self.ancestry().find_map(|class| {
            class.own_method(name).map(|method| MethodEntry {
                owner: class.clone(),
                method,
            })
        })
    }

    /// Visibility of a field declared by this class itself.
    pub fn own_field(&self, name: &str) -> Option<Visibility> {
        if self.0.public_fields.contains_key(name) {
            Some(Visibility::Public)
        } else if self.0.private_fields.contains_key(name) {
            Some(Visibility::Private)
        } else {
            None
        }
    }

    /// Visibility of the nearest declaration of field `name` in the chain.
    pub fn find_field(&self, name: &str) -> Option<Visibility> {
        self.ancestry().find_map(|class| class.own_field(name))
    }

    /// Adds or overrides a method after the class has been defined.
    ///
    /// Instances constructed from now on see the new method, instances that
    /// already exist keep the table they were built with.
    pub fn set_method(&self, method: Method) -> Result<()> {
        if self.find_field(&method.name).is_some() {
            return Err(self.duplicate_member(&method.name, "a method cannot replace a field"));
        }
        if let Some(existing) = self.find_method(&method.name) {
            if existing.method.visibility != method.visibility {
                return Err(self.duplicate_member(&method.name, "redeclared with a different visibility"));
            }
        }
        debug!(
            "{}\t{} set {} method {}",
            "[CLASS]".blue(),
            self.name(),
            method.visibility,
            method.name
        );
        self.0
            .methods
            .borrow_mut()
            .insert(method.name.clone(), method);
        Ok(())
    }

    /// Creates a new instance and runs the nearest `initialize` with `args`.
    pub fn construct(&self, args: &[Value]) -> Result<Instance> {
        Instance::construct(self, args)
    }

    /// A store holding the defaults of the whole chain, the nearest
    /// declaration winning.
    pub(crate) fn seed_store(&self) -> FieldStore {
        let chain: Vec<&Class> = self.ancestry().collect();
        let mut store = FieldStore::new();
        for class in chain.into_iter().rev() {
            for (name, value) in &class.0.public_fields {
                store.declare(name, Visibility::Public, value.clone());
            }
            for (name, value) in &class.0.private_fields {
                store.declare(name, Visibility::Private, value.clone());
            }
        }
        store
    }

    fn duplicate_member(&self, member: &str, reason: &'static str) -> ObjectError {
        ObjectError::DuplicateField {
            class: self.name().to_owned(),
            member: member.to_owned(),
            reason,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent() {
            Some(parent) => write!(f, "<class {} < {}>", self.name(), parent.name()),
            None => write!(f, "<class {}>", self.name()),
        }
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestry<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let class = self.next?;
        self.next = class.parent();
        Some(class)
    }
}

/// Collects the declarations of a class and validates them on `build`.
pub struct ClassBuilder {
    name: String,
    parent: Option<Class>,
    fields: Vec<(String, Visibility, Value)>,
    methods: Vec<Method>,
    lock_objects: bool,
    cloneable: bool,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            lock_objects: true,
            cloneable: true,
        }
    }

    pub fn inherit(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn public_field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.fields
            .push((name.into(), Visibility::Public, default.into()));
        self
    }

    pub fn private_field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.fields
            .push((name.into(), Visibility::Private, default.into()));
        self
    }

    pub fn method<F>(self, name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&Scope<'_>, &[Value]) -> Result<Value> + 'static,
    {
        self.with_method(Method::public(name, fun))
    }

    pub fn private_method<F>(self, name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&Scope<'_>, &[Value]) -> Result<Value> + 'static,
    {
        self.with_method(Method::private(name, fun))
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// When `false`, assigning an undeclared field adds it as public
    /// instead of failing. Defaults to `true`.
    pub fn lock_objects(mut self, lock: bool) -> Self {
        self.lock_objects = lock;
        self
    }

    /// Defaults to `true`.
    pub fn cloneable(mut self, cloneable: bool) -> Self {
        self.cloneable = cloneable;
        self
    }

    pub fn build(self) -> Result<Class> {
        let duplicate = |member: &str, reason: &'static str| ObjectError::DuplicateField {
            class: self.name.clone(),
            member: member.to_owned(),
            reason,
        };

        let mut public_fields = HashMap::new();
        let mut private_fields = HashMap::new();
        for (name, visibility, default) in &self.fields {
            if public_fields.contains_key(name) || private_fields.contains_key(name) {
                return Err(duplicate(name, "field declared more than once"));
            }
            if let Some(parent) = &self.parent {
                if let Some(inherited) = parent.find_field(name) {
                    if inherited != *visibility {
                        return Err(duplicate(name, "redeclared with a different visibility"));
                    }
                }
                if parent.find_method(name).is_some() {
                    return Err(duplicate(name, "a field cannot shadow an inherited method"));
                }
            }
            match visibility {
                Visibility::Public => public_fields.insert(name.clone(), default.clone()),
                Visibility::Private => private_fields.insert(name.clone(), default.clone()),
            };
        }

        let mut methods: HashMap<String, Method> = HashMap::new();
        for method in &self.methods {
            let name = method.name.as_str();
            if methods.contains_key(name) {
                return Err(duplicate(name, "method declared more than once"));
            }
            if public_fields.contains_key(name) || private_fields.contains_key(name) {
                return Err(duplicate(name, "declared as both a field and a method"));
            }
            if let Some(parent) = &self.parent {
                if parent.find_field(name).is_some() {
                    return Err(duplicate(name, "a method cannot shadow an inherited field"));
                }
                if let Some(inherited) = parent.find_method(name) {
                    if inherited.method.visibility != method.visibility {
                        return Err(duplicate(name, "redeclared with a different visibility"));
                    }
                }
            }
            methods.insert(name.to_owned(), method.clone());
        }

        debug!(
            "{}\tdefine {} ({} fields, {} methods){}",
            "[CLASS]".blue(),
            self.name,
            public_fields.len() + private_fields.len(),
            methods.len(),
            self.parent
                .as_ref()
                .map(|parent| format!(" inheriting {}", parent.name()))
                .unwrap_or_default()
        );

        Ok(Class(Rc::new(ClassData {
            name: self.name,
            parent: self.parent,
            public_fields,
            private_fields,
            methods: RefCell::new(methods),
            lock_objects: self.lock_objects,
            cloneable: self.cloneable,
        })))
    }
}
