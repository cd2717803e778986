//! Tests for CLI dispatch logic.

use std::path::PathBuf;

use super::*;
use crate::cli::commands::{is_command, parse_command, subtype_command};

#[test]
fn parse_extracts_recipe_and_universe_flags() {
    let m = parse_command()
        .try_get_matches_from([
            "parse",
            "List<int>",
            "--rules",
            "rules.json",
            "--no-normalize",
            "--json",
        ])
        .unwrap();
    let params = ParseParams::from_matches(&m);

    assert_eq!(params.recipe, "List<int>");
    assert_eq!(params.universe.rules, Some(PathBuf::from("rules.json")));
    assert_eq!(params.universe.variances, None);
    assert!(!params.universe.normalize);
    assert!(params.json);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn subtype_takes_two_positionals() {
    let m = subtype_command()
        .try_get_matches_from(["subtype", "int", "num", "--color", "never"])
        .unwrap();
    let params = SubtypeParams::from_matches(&m);

    assert_eq!(params.sub, "int");
    assert_eq!(params.sup, "num");
    assert!(params.universe.normalize);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn subtype_requires_both_types() {
    let result = subtype_command().try_get_matches_from(["subtype", "int"]);
    assert!(result.is_err());
}

#[test]
fn is_extracts_value_text() {
    let m = is_command()
        .try_get_matches_from([
            "is",
            "+a(int)",
            r#"{"a": 1}"#,
            "--variances",
            "v.json",
            "--color",
            "always",
        ])
        .unwrap();
    let params = IsParams::from_matches(&m);

    assert_eq!(params.recipe, "+a(int)");
    assert_eq!(params.value, r#"{"a": 1}"#);
    assert_eq!(params.universe.variances, Some(PathBuf::from("v.json")));
    assert_eq!(params.color, ColorChoice::Always);
    assert!(params.color.should_colorize());
}

#[test]
fn color_rejects_unknown_mode() {
    let result = parse_command().try_get_matches_from(["parse", "int", "--color", "sometimes"]);
    assert!(result.is_err());
}

#[test]
fn verbose_is_global() {
    let m = build_cli()
        .try_get_matches_from(["rtix", "parse", "int", "-vv"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();

    assert_eq!(name, "parse");
    assert_eq!(sub.get_count("verbose"), 2);
    assert_eq!(m.get_count("verbose"), 2);
}

#[test]
fn cli_requires_subcommand() {
    let result = build_cli().try_get_matches_from(["rtix"]);
    assert!(result.is_err());
}
