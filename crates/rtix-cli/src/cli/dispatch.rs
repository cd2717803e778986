//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! Every command shares the universe flags (`--rules`, `--variances`,
//! `--no-normalize`), which are pulled into one `UniverseOptions`.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::is::IsArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::subtype::SubtypeArgs;
use crate::commands::universe_loader::UniverseOptions;

pub struct ParseParams {
    pub recipe: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: ColorChoice,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            recipe: required_string(m, "recipe"),
            universe: parse_universe(m),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            recipe: p.recipe,
            universe: p.universe,
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

pub struct SubtypeParams {
    pub sub: String,
    pub sup: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: ColorChoice,
}

impl SubtypeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            sub: required_string(m, "sub"),
            sup: required_string(m, "super"),
            universe: parse_universe(m),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<SubtypeParams> for SubtypeArgs {
    fn from(p: SubtypeParams) -> Self {
        Self {
            sub: p.sub,
            sup: p.sup,
            universe: p.universe,
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

pub struct IsParams {
    pub recipe: String,
    pub value: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: ColorChoice,
}

impl IsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            recipe: required_string(m, "recipe"),
            value: required_string(m, "value"),
            universe: parse_universe(m),
            json: m.get_flag("json"),
            color: parse_color(m),
        }
    }
}

impl From<IsParams> for IsArgs {
    fn from(p: IsParams) -> Self {
        Self {
            recipe: p.recipe,
            value: p.value,
            universe: p.universe,
            json: p.json,
            color: p.color.should_colorize(),
        }
    }
}

/// Required positionals are enforced by clap, so a miss only happens in tests
/// that build params from a different command.
fn required_string(m: &ArgMatches, id: &str) -> String {
    m.get_one::<String>(id).cloned().unwrap_or_default()
}

fn parse_universe(m: &ArgMatches) -> UniverseOptions {
    UniverseOptions {
        rules: m.get_one::<PathBuf>("rules").cloned(),
        variances: m.get_one::<PathBuf>("variances").cloned(),
        normalize: !m.get_flag("no_normalize"),
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
