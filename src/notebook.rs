//! The `Stat` and `Anova` classes walked through in the notebook.
//!
//! `Stat` keeps a list of `(group, pvalue)` pairs in public `statistics` and
//! a private `threshold` that must be set before significant results can be
//! asked for. `Anova` adds the tested `groups` and delegates the rest of
//! its construction to `Stat`.

use crate::object::{Class, ClassBuilder, ObjectError, Result, Scope, INITIALIZE};
use crate::value::Value;

/// A `(group, pvalue)` entry as stored in `statistics`.
pub fn pair(group: &str, pvalue: f64) -> Value {
    Value::List(vec![Value::from(group), Value::from(pvalue)])
}

fn parse_pair(value: &Value) -> Result<(String, f64)> {
    match value.as_list()? {
        [group, pvalue] => Ok((group.as_str()?.to_owned(), pvalue.as_number()?)),
        _ => Err(ObjectError::TypeError(format!(
            "expected a (group, pvalue) pair but found `{}`",
            value
        ))),
    }
}

/// Checks that `statistics` is a list of `(group, pvalue)` pairs.
fn validate_statistics(statistics: &Value) -> Result<()> {
    for entry in statistics.as_list()? {
        parse_pair(entry)?;
    }
    Ok(())
}

fn statistics(scope: &Scope<'_>) -> Result<Vec<(String, f64)>> {
    let statistics = scope.get("statistics")?;
    if statistics.is_nil() {
        return Ok(Vec::new());
    }
    statistics.as_list()?.iter().map(parse_pair).collect()
}

pub fn stat_class() -> Result<Class> {
    ClassBuilder::new("Stat")
        .public_field("data", Value::Nil)
        .public_field("statistics", Value::Nil)
        .private_field("threshold", Value::Nil)
        .method(INITIALIZE, |scope, args| {
            let data = scope.arg(args, 0)?.clone();
            let statistics = scope.arg(args, 1)?.clone();
            validate_statistics(&statistics)?;

            scope.set("data", data)?;
            scope.set("statistics", statistics)?;
            Ok(Value::Nil)
        })
        // Mutator, returns the receiver.
        .method("set_threshold", |scope, args| {
            let threshold = scope.arg(args, 0)?.as_number()?;
            scope.set("threshold", threshold)?;
            Ok(scope.receiver())
        })
        .method("get_threshold", |scope, _| scope.require("threshold"))
        // Mutator, returns the receiver.
        .method("add_statistic", |scope, args| {
            let group = scope.arg(args, 0)?.as_str()?.to_owned();
            let pvalue = scope.arg(args, 1)?.as_number()?;
            let mut entries: Vec<Value> = statistics(scope)?
                .into_iter()
                .map(|(group, pvalue)| pair(&group, pvalue))
                .collect();
            entries.push(pair(&group, pvalue));
            scope.set("statistics", entries)?;
            Ok(scope.receiver())
        })
        .method("get_significant_results", |scope, _| {
            let threshold = scope.require("threshold")?.as_number()?;
            let significant = statistics(scope)?
                .into_iter()
                .filter(|(_, pvalue)| *pvalue < threshold)
                .map(|(group, pvalue)| pair(&group, pvalue))
                .collect::<Vec<_>>();
            Ok(Value::List(significant))
        })
        .build()
}

pub fn anova_class(stat: &Class) -> Result<Class> {
    ClassBuilder::new("Anova")
        .inherit(stat)
        .public_field("groups", Value::Nil)
        .method(INITIALIZE, |scope, args| {
            let data = scope.arg(args, 0)?.clone();
            let statistics = scope.arg(args, 1)?.clone();
            let groups = scope.arg(args, 2)?.clone();
            groups.as_list()?;
            validate_statistics(&statistics)?;

            scope.set("groups", groups)?;
            scope.call_super(&[data, statistics])
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{clone, construct};

    fn iris_statistics() -> Value {
        Value::List(vec![
            pair("setosa", 0.5),
            pair("virginica", 0.2),
            pair("versicolor", 0.001),
        ])
    }

    fn groups() -> Value {
        Value::List(vec![
            Value::from("setosa"),
            Value::from("virginica"),
            Value::from("versicolor"),
        ])
    }

    #[test]
    fn stat_significant_results() {
        crate::init_test_logger();

        let stat = stat_class().unwrap();
        let model = construct(&stat, &[Value::from("iris"), iris_statistics()]).unwrap();

        let err = model.call("get_significant_results", &[]).unwrap_err();
        assert_eq!(
            err,
            ObjectError::Precondition {
                field: "threshold".to_owned(),
            }
        );
        assert!(err.to_string().contains("threshold"));

        let returned = model
            .call("set_threshold", &[Value::from(0.02)])
            .unwrap()
            .into_instance()
            .unwrap();
        assert!(returned.ptr_eq(&model));
        assert_eq!(model.call("get_threshold", &[]).unwrap(), Value::from(0.02));
        assert_eq!(
            model.call("get_significant_results", &[]).unwrap(),
            Value::List(vec![pair("versicolor", 0.001)])
        );
    }

    #[test]
    fn stat_threshold_is_private() {
        let stat = stat_class().unwrap();
        let model = construct(&stat, &[Value::from("iris"), iris_statistics()]).unwrap();
        assert!(matches!(
            model.get("threshold"),
            Err(ObjectError::AccessViolation { .. })
        ));
        assert!(matches!(
            model.set("threshold", 0.5),
            Err(ObjectError::AccessViolation { .. })
        ));
        assert!(matches!(
            model.call("get_threshold", &[]),
            Err(ObjectError::Precondition { .. })
        ));
    }

    #[test]
    fn stat_add_statistic_chains() {
        let stat = stat_class().unwrap();
        let model = construct(&stat, &[Value::Nil, Value::List(Vec::new())]).unwrap();
        model
            .call("add_statistic", &[Value::from("a"), Value::from(0.01)])
            .unwrap()
            .into_instance()
            .unwrap()
            .call("add_statistic", &[Value::from("b"), Value::from(0.3)])
            .unwrap()
            .into_instance()
            .unwrap()
            .call("set_threshold", &[Value::from(0.05)])
            .unwrap();
        assert_eq!(
            model.call("get_significant_results", &[]).unwrap(),
            Value::List(vec![pair("a", 0.01)])
        );
    }

    #[test]
    fn stat_rejects_malformed_statistics() {
        let stat = stat_class().unwrap();
        let err = construct(
            &stat,
            &[Value::Nil, Value::List(vec![Value::from("setosa")])],
        )
        .unwrap_err();
        assert!(matches!(err, ObjectError::TypeError(_)));
    }

    #[test]
    fn anova_delegates_initialize() {
        crate::init_test_logger();

        let stat = stat_class().unwrap();
        let anova = anova_class(&stat).unwrap();
        let model = construct(
            &anova,
            &[Value::from("iris"), iris_statistics(), groups()],
        )
        .unwrap();

        assert_eq!(model.get("groups").unwrap(), groups());
        assert_eq!(model.get("data").unwrap(), Value::from("iris"));
        assert_eq!(model.get("statistics").unwrap(), iris_statistics());
        assert_eq!(model.class_names(), vec!["Anova", "Stat"]);
        assert!(model.is_instance_of(&stat));

        model.call("set_threshold", &[Value::from(0.02)]).unwrap();
        assert_eq!(
            model.call("get_significant_results", &[]).unwrap(),
            Value::List(vec![pair("versicolor", 0.001)])
        );
    }

    #[test]
    fn anova_failed_initialize_leaves_groups() {
        crate::init_test_logger();

        let stat = stat_class().unwrap();
        let anova = anova_class(&stat).unwrap();
        let model = construct(
            &anova,
            &[Value::from("iris"), iris_statistics(), groups()],
        )
        .unwrap();

        let err = model
            .call(
                INITIALIZE,
                &[
                    Value::from("other"),
                    Value::List(vec![Value::from("broken")]),
                    Value::List(vec![Value::from("NEW")]),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, ObjectError::TypeError(_)));
        assert_eq!(model.get("groups").unwrap(), groups());
        assert_eq!(model.get("data").unwrap(), Value::from("iris"));
        assert_eq!(model.get("statistics").unwrap(), iris_statistics());
    }

    #[test]
    fn anova_missing_groups() {
        let stat = stat_class().unwrap();
        let anova = anova_class(&stat).unwrap();
        let err = construct(&anova, &[Value::from("iris"), iris_statistics()]).unwrap_err();
        assert_eq!(
            err,
            ObjectError::MissingArgument {
                method: INITIALIZE.to_owned(),
                index: 2,
            }
        );
    }

    #[test]
    fn anova_clone_keeps_threshold() {
        let stat = stat_class().unwrap();
        let anova = anova_class(&stat).unwrap();
        let model = construct(
            &anova,
            &[Value::from("iris"), iris_statistics(), groups()],
        )
        .unwrap();
        model.call("set_threshold", &[Value::from(0.3)]).unwrap();

        let copy = clone(&model, false).unwrap();
        copy.call("set_threshold", &[Value::from(0.0001)]).unwrap();

        assert_eq!(model.call("get_threshold", &[]).unwrap(), Value::from(0.3));
        assert_eq!(
            copy.call("get_significant_results", &[]).unwrap(),
            Value::List(Vec::new())
        );
        assert_eq!(
            model.call("get_significant_results", &[]).unwrap(),
            Value::List(vec![pair("virginica", 0.2), pair("versicolor", 0.001)])
        );
    }
}
