use colored::*;
use std::fmt::Write;

use crate::object::{Instance, Visibility};
use crate::value::Value;

/// Lists the members of an instance, public first, the way an interactive
/// session prints an object.
///
/// ```text
/// <Anova>
///   Inherits from: <Stat>
///   Public:
///     groups: ["setosa", "virginica"]
///     get_significant_results: method
///   Private:
///     threshold: 0.02
/// ```
pub fn describe(instance: &Instance) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", format!("<{}>", instance.class().name()).bold());
    if let Some(parent) = instance.class().parent() {
        let _ = writeln!(out, "  Inherits from: <{}>", parent.name());
    }

    for visibility in [Visibility::Public, Visibility::Private].iter().copied() {
        let (fields, methods) = instance.members(visibility);
        if fields.is_empty() && methods.is_empty() {
            continue;
        }
        let heading = match visibility {
            Visibility::Public => "Public:".green(),
            Visibility::Private => "Private:".red(),
        };
        let _ = writeln!(out, "  {}", heading);
        for (name, value) in &fields {
            let _ = writeln!(out, "    {}: {}", name, summarize(value));
        }
        for name in &methods {
            let _ = writeln!(out, "    {}: {}", name, "method".dimmed());
        }
    }
    out
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Nil => "NULL".to_owned(),
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}
