//! `cabest eval` command - evaluate a dimension formula

use console::style;
use miette::Result;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::helpers::print_structured;
use crate::cli::GlobalOpts;
use crate::core::formula::{evaluate, Formula};
use crate::core::resolver::bindings;
use crate::entities::cabinet::Dimensions;

#[derive(clap::Args, Debug)]
pub struct EvalArgs {
    /// Formula, e.g. "width / 2 - 3"
    pub formula: String,

    /// Cabinet width in mm
    #[arg(long, short = 'W', default_value = "600")]
    pub width: f64,

    /// Cabinet height in mm
    #[arg(long, short = 'H', default_value = "720")]
    pub height: f64,

    /// Cabinet depth in mm
    #[arg(long, short = 'D', default_value = "560")]
    pub depth: f64,

    /// Cabinet quantity (bound as `qty`)
    #[arg(long, short = 'n', default_value = "1")]
    pub qty: u32,

    /// Extra variable binding, NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub vars: Vec<(String, f64)>,

    /// Print 0 for invalid formulas instead of failing
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    formula: &'a str,
    value: f64,
    variables: Vec<&'a str>,
}

fn parse_binding(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}

pub fn run(args: EvalArgs, global: &GlobalOpts) -> Result<()> {
    let dims = Dimensions::new(args.width, args.height, args.depth);
    let mut vars = bindings(&dims, args.qty);
    vars.extend(args.vars.iter().cloned());

    let (value, variables) = if args.lenient {
        let variables: Vec<String> = Formula::parse(&args.formula)
            .map(|f| f.variables().into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        (evaluate(&args.formula, &vars), variables)
    } else {
        let formula = Formula::parse(&args.formula)
            .map_err(|e| miette::miette!("invalid formula '{}': {}", args.formula, e))?;
        let value = formula
            .eval(&vars)
            .map_err(|e| miette::miette!("cannot evaluate '{}': {}", args.formula, e))?;
        let variables: Vec<String> = formula.variables().into_iter().map(str::to_string).collect();
        (value, variables)
    };

    let output = EvalOutput {
        formula: &args.formula,
        value,
        variables: variables.iter().map(String::as_str).collect(),
    };
    if print_structured(&output, global.format)? {
        return Ok(());
    }

    if global.quiet {
        println!("{}", value);
        return Ok(());
    }

    let used: BTreeMap<&str, f64> = output
        .variables
        .iter()
        .filter_map(|v| vars.get(*v).map(|val| (*v, *val)))
        .collect();
    println!("{} = {}", style(&args.formula).cyan(), style(value).bold());
    for (name, val) in used {
        println!("   {} = {}", style(name).dim(), val);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("gap=3").unwrap(), ("gap".to_string(), 3.0));
        assert_eq!(parse_binding(" gap = 2.5 ").unwrap(), ("gap".to_string(), 2.5));
        assert!(parse_binding("gap").is_err());
        assert!(parse_binding("gap=wide").is_err());
    }
}
