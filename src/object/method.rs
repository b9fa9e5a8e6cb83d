use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{Class, ObjectError, Result, Scope, Visibility};
use crate::value::Value;

/// Type all method bodies are expected to have. The scope is the receiver,
/// the slice holds the explicit arguments.
pub type MethodFn = Rc<dyn Fn(&Scope<'_>, &[Value]) -> Result<Value>>;

/// A named method as declared on a class.
#[derive(Clone)]
pub struct Method {
    /// Name the method is invoked by.
    pub name: String,

    /// Whether outside callers may invoke it.
    pub visibility: Visibility,

    /// The actual function to run.
    fun: MethodFn,
}

impl Method {
    pub fn new<F>(name: impl Into<String>, visibility: Visibility, fun: F) -> Self
    where
        F: Fn(&Scope<'_>, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            name: name.into(),
            visibility,
            fun: Rc::new(fun),
        }
    }

    pub fn public<F>(name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&Scope<'_>, &[Value]) -> Result<Value> + 'static,
    {
        Self::new(name, Visibility::Public, fun)
    }

    pub fn private<F>(name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&Scope<'_>, &[Value]) -> Result<Value> + 'static,
    {
        Self::new(name, Visibility::Private, fun)
    }

    pub(crate) fn invoke(&self, scope: &Scope<'_>, args: &[Value]) -> Result<Value> {
        (self.fun)(scope, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} method {}>", self.visibility, self.name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<method {}>", self.name)
    }
}

/// A method together with the class that declared it. Delegation from
/// inside the method starts at the owner's parent.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub owner: Class,
    pub method: Method,
}

impl fmt::Display for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.name(), self.method.name)
    }
}

/// The effective methods of a class, with overrides applied.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: HashMap<String, MethodEntry>,
}

impl MethodTable {
    /// Walks the chain from the root ancestor down to `class`, letting
    /// every class override what its ancestors declared.
    ///
    /// Methods added to an ancestor after a subclass was built are only
    /// checked here, so a method named like a field anywhere in the chain,
    /// or an override that changes visibility, fails with `DuplicateField`.
    pub fn resolve(class: &Class) -> Result<Self> {
        let chain: Vec<&Class> = class.ancestry().collect();
        let conflict = |member: &str, reason: &'static str| ObjectError::DuplicateField {
            class: class.name().to_owned(),
            member: member.to_owned(),
            reason,
        };

        let mut entries: HashMap<String, MethodEntry> = HashMap::new();
        for owner in chain.iter().rev() {
            for method in owner.own_methods() {
                if chain.iter().any(|c| c.own_field(&method.name).is_some()) {
                    return Err(conflict(&method.name, "declared as both a field and a method"));
                }
                if let Some(existing) = entries.get(&method.name) {
                    if existing.method.visibility != method.visibility {
                        return Err(conflict(&method.name, "redeclared with a different visibility"));
                    }
                }
                entries.insert(
                    method.name.clone(),
                    MethodEntry {
                        owner: (*owner).clone(),
                        method,
                    },
                );
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Method names of one visibility in sorted order.
    pub fn names(&self, visibility: Visibility) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .values()
            .filter(|entry| entry.method.visibility == visibility)
            .map(|entry| entry.method.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds the nearest definition of `name` strictly above `owner`.
///
/// Lookup is keyed on the class that declared the calling method, never on
/// the runtime class of the receiver, so a method inherited two levels down
/// still reaches its own parent.
pub fn resolve_super(owner: &Class, name: &str) -> Result<MethodEntry> {
    owner
        .parent()
        .and_then(|parent| parent.find_method(name))
        .ok_or_else(|| ObjectError::NoSuchAncestorMethod {
            class: owner.name().to_owned(),
            method: name.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ClassBuilder;

    fn constant(value: &'static str) -> impl Fn(&Scope<'_>, &[Value]) -> Result<Value> {
        move |_, _| Ok(Value::from(value))
    }

    #[test]
    fn table_override_keeps_owner() {
        let base = ClassBuilder::new("Base")
            .method("speak", constant("base"))
            .method("walk", constant("walk"))
            .private_method("secret", constant("secret"))
            .build()
            .unwrap();
        let derived = ClassBuilder::new("Derived")
            .inherit(&base)
            .method("speak", constant("derived"))
            .build()
            .unwrap();

        let table = MethodTable::resolve(&derived).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("speak").unwrap().owner.name(), "Derived");
        assert_eq!(table.get("walk").unwrap().owner.name(), "Base");
        assert_eq!(table.names(Visibility::Public), vec!["speak", "walk"]);
        assert_eq!(table.names(Visibility::Private), vec!["secret"]);
    }

    #[test]
    fn resolve_super_skips_own_definition() {
        let base = ClassBuilder::new("Base")
            .method("speak", constant("base"))
            .build()
            .unwrap();
        let middle = ClassBuilder::new("Middle").inherit(&base).build().unwrap();
        let leaf = ClassBuilder::new("Leaf")
            .inherit(&middle)
            .method("speak", constant("leaf"))
            .build()
            .unwrap();

        let entry = resolve_super(&leaf, "speak").unwrap();
        assert_eq!(entry.to_string(), "Base.speak");

        let err = resolve_super(&base, "speak").unwrap_err();
        assert_eq!(
            err,
            ObjectError::NoSuchAncestorMethod {
                class: "Base".to_owned(),
                method: "speak".to_owned(),
            }
        );
    }
}
