//! The object model: classes, instances, their field stores and method tables.

use thiserror::Error;

use crate::value::Value;

mod class;
mod instance;
mod method;
mod scope;
mod store;

pub use class::{Ancestry, Class, ClassBuilder};
pub use instance::{Instance, ObjectId};
pub use method::{Method, MethodEntry, MethodFn, MethodTable};
pub use scope::Scope;
pub use store::FieldStore;

/// Name of the method run by [`Class::construct`] on a fresh instance.
pub const INITIALIZE: &str = "initialize";

pub type Result<T> = std::result::Result<T, ObjectError>;

/// Which partition of an instance a member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Reachable by any caller holding the instance.
    Public,

    /// Reachable only from methods running on the instance.
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    #[error("Duplicate member `{member}` in class `{class}`: {reason}")]
    DuplicateField {
        class: String,
        member: String,
        reason: &'static str,
    },

    #[error("Cannot access private member `{member}` of `{class}` from outside its methods")]
    AccessViolation { class: String, member: String },

    #[error("No ancestor of `{class}` defines method `{method}`")]
    NoSuchAncestorMethod { class: String, method: String },

    #[error("Precondition failed: `{field}` is not set")]
    Precondition { field: String },

    #[error("Undefined field `{field}` on instance of `{class}`")]
    NoSuchField { class: String, field: String },

    #[error("Undefined method `{method}` on instance of `{class}`")]
    NoSuchMethod { class: String, method: String },

    #[error("Cannot assign `{member}` on locked instance of `{class}`")]
    LockedObject { class: String, member: String },

    #[error("Instances of `{class}` are not cloneable")]
    NotCloneable { class: String },

    #[error("Method `{method}` expected an argument at position {index}")]
    MissingArgument { method: String, index: usize },

    #[error("Type mismatch: {}", .0)]
    TypeError(String),
}

/// Defines a class from its field and method declarations.
///
/// A thin wrapper over [`ClassBuilder`] for callers that already hold the
/// declarations as collections.
pub fn define_class(
    name: &str,
    public_fields: Vec<(String, Value)>,
    private_fields: Vec<(String, Value)>,
    methods: Vec<Method>,
    parent: Option<&Class>,
) -> Result<Class> {
    let mut builder = ClassBuilder::new(name);
    if let Some(parent) = parent {
        builder = builder.inherit(parent);
    }
    for (field, default) in public_fields {
        builder = builder.public_field(field, default);
    }
    for (field, default) in private_fields {
        builder = builder.private_field(field, default);
    }
    for method in methods {
        builder = builder.with_method(method);
    }
    builder.build()
}

/// Creates an instance of `class`, running its initializer with `args`.
pub fn construct(class: &Class, args: &[Value]) -> Result<Instance> {
    class.construct(args)
}

/// Copies `instance` into a new identity. See [`Instance::duplicate`].
pub fn clone(instance: &Instance, deep: bool) -> Result<Instance> {
    instance.duplicate(deep)
}
