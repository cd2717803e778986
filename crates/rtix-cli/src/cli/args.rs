//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Type recipe (positional).
pub fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .value_name("RECIPE")
        .required(true)
        .help("Type recipe, e.g. 'List<int>' or '@(int,[String])'")
}

/// Candidate subtype (positional).
pub fn sub_arg() -> Arg {
    Arg::new("sub")
        .value_name("S")
        .required(true)
        .help("Recipe of the candidate subtype")
}

/// Candidate supertype (positional).
pub fn super_arg() -> Arg {
    Arg::new("super")
        .value_name("T")
        .required(true)
        .help("Recipe of the candidate supertype")
}

/// Value to test, as JSON (positional).
pub fn value_arg() -> Arg {
    Arg::new("value")
        .value_name("JSON")
        .required(true)
        .help("Value as JSON; arrays become List<dynamic>, objects become records")
}

/// Type rule table (--rules).
pub fn rules_arg() -> Arg {
    Arg::new("rules")
        .long("rules")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON type-rule table to load")
}

/// Variance table (--variances).
pub fn variances_arg() -> Arg {
    Arg::new("variances")
        .long("variances")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON table of class names to variance codes")
}

/// Disable recipe normalization (--no-normalize).
pub fn no_normalize_arg() -> Arg {
    Arg::new("no_normalize")
        .long("no-normalize")
        .action(ArgAction::SetTrue)
        .help("Keep types exactly as written (no T?? or Never? folding)")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print a JSON report instead of text")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Verbosity level (-v for debug logs, -vv for trace logs)")
}
