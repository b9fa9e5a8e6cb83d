#![warn(rust_2018_idioms)]

use std::error::Error;

use refclass::notebook::{anova_class, pair, stat_class};
use refclass::{debug, Value};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let stat = stat_class()?;
    let anova = anova_class(&stat)?;

    let statistics = Value::List(vec![
        pair("setosa", 0.5),
        pair("virginica", 0.2),
        pair("versicolor", 0.001),
    ]);
    let groups = Value::List(vec![
        Value::from("setosa"),
        Value::from("virginica"),
        Value::from("versicolor"),
    ]);

    let model = anova.construct(&[Value::from("iris"), statistics, groups])?;
    model.call("set_threshold", &[Value::from(0.02)])?;
    print!("{}", debug::describe(&model));
    println!(
        "significant: {}",
        model.call("get_significant_results", &[])?
    );

    // A handle copy sees the write, a clone does not.
    let alias = model.clone();
    let copy = model.duplicate(false)?;
    alias.call("set_threshold", &[Value::from(0.3)])?;
    println!(
        "model: {}  alias: {}  copy: {}",
        model.call("get_threshold", &[])?,
        alias.call("get_threshold", &[])?,
        copy.call("get_threshold", &[])?
    );

    Ok(())
}
