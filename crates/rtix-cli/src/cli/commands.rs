//! Command builders for the CLI.
//!
//! Every command loads the same universe options, so those args are shared.

use clap::Command;

use super::args::*;

fn with_universe_args(cmd: Command) -> Command {
    cmd.arg(rules_arg())
        .arg(variances_arg())
        .arg(no_normalize_arg())
        .arg(json_arg())
        .arg(color_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("rtix")
        .about("Runtime type recipes: parsing, subtyping and instance checks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(parse_command())
        .subcommand(subtype_command())
        .subcommand(is_command())
}

/// Parse a recipe and show the canonical type.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Parse a type recipe and show its canonical form")
        .after_help(
            r#"EXAMPLES:
  rtix parse 'List<int>'
  rtix parse '1^(0^,List<1^>)<num,@>'
  rtix parse 'int??' --no-normalize
  rtix parse 'Ab<int>' --json"#,
        )
        .arg(recipe_arg());

    with_universe_args(cmd)
}

/// Decide `S <: T`.
pub fn subtype_command() -> Command {
    let cmd = Command::new("subtype")
        .about("Check whether S is a subtype of T")
        .after_help(
            r#"EXAMPLES:
  rtix subtype int num
  rtix subtype 'List<int>' 'Iterable<num>'
  rtix subtype 'JSArray<int>' 'List<int>' --rules rules.json"#,
        )
        .arg(sub_arg())
        .arg(super_arg());

    with_universe_args(cmd)
}

/// Test a JSON value against a type.
pub fn is_command() -> Command {
    let cmd = Command::new("is")
        .about("Check whether a JSON value is an instance of a type")
        .after_help(
            r#"EXAMPLES:
  rtix is int 3
  rtix is 'String?' null
  rtix is '+a,b(int,String)' '{"a": 1, "b": "x"}'"#,
        )
        .arg(recipe_arg())
        .arg(value_arg());

    with_universe_args(cmd)
}
