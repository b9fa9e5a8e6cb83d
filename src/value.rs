use std::fmt;

use crate::object::{Instance, ObjectError, Result};

/// A dynamically typed value held by a field or passed to a method.
///
/// Everything except [`Value::Instance`] is copied by value. An instance
/// value is a handle: cloning it shares the instance rather than copying it.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Instance(Instance),
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Number(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Value::String(s) => write!(f, "{:?}", s)?,
                        _ => write!(f, "{}", item)?,
                    }
                }
                write!(f, "]")
            }
            Value::Instance(v) => write!(f, "{}", v),
        }
    }
}

/// Scalars and lists compare structurally, instances by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Number(lhs), Value::Number(rhs)) => lhs == rhs,
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::List(lhs), Value::List(rhs)) => lhs == rhs,
            (Value::Instance(lhs), Value::Instance(rhs)) => lhs.ptr_eq(rhs),
            _ => false,
        }
    }
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Instance(_) => "instance",
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Number(v) => Ok(*v),
            _ => Err(self.mismatch("number")),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v.as_str()),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items.as_slice()),
            _ => Err(self.mismatch("list")),
        }
    }

    pub fn as_instance(&self) -> Result<&Instance> {
        match self {
            Value::Instance(instance) => Ok(instance),
            _ => Err(self.mismatch("instance")),
        }
    }

    /// Unwraps the handle returned by a mutator so calls can be chained.
    pub fn into_instance(self) -> Result<Instance> {
        match self {
            Value::Instance(instance) => Ok(instance),
            other => Err(other.mismatch("instance")),
        }
    }

    fn mismatch(&self, expected: &str) -> ObjectError {
        ObjectError::TypeError(format!(
            "expected {} but found {} `{}`",
            expected,
            self.type_name(),
            self
        ))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Instance(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_display_list() {
        let value = Value::from(vec![
            Value::from("setosa"),
            Value::from(0.5),
            Value::Nil,
            Value::from(true),
        ]);
        assert_eq!(value.to_string(), r#"["setosa", 0.5, nil, true]"#);
    }

    #[test]
    fn value_equality_structural() {
        let lhs = Value::from(vec![Value::from("a"), Value::from(1)]);
        let rhs = Value::from(vec![Value::from("a"), Value::from(1.0)]);
        assert_eq!(lhs, rhs);
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Nil, Value::from(false));
    }

    #[test]
    fn value_type_mismatch() {
        let err = Value::from("abc").as_number().unwrap_err();
        assert!(matches!(err, ObjectError::TypeError(_)));
        assert!(err.to_string().contains("expected number but found string"));
    }

    #[test]
    fn value_from_option() {
        assert!(Value::from(None::<f64>).is_nil());
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
