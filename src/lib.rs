#![warn(rust_2018_idioms)]

//! A mutable, reference-semantics object model.
//!
//! Classes are declared once with [`ClassBuilder`], instances are built with
//! [`Class::construct`] and mutated in place through their methods. Handles
//! share identity; [`Instance::duplicate`] makes a copy with a new one.

pub mod debug;
pub mod notebook;
pub mod object;
pub mod value;

pub use object::{
    clone, construct, define_class, Class, ClassBuilder, Instance, Method, ObjectError, ObjectId,
    Result, Scope, Visibility,
};
pub use value::Value;

/// Routes `log` output through the test harness. Safe to call from every test.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
