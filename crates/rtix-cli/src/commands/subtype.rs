use rtix_core::Colors;
use serde::Serialize;

use super::universe_loader::{UniverseOptions, load_universe};
use super::{CliError, finish};

pub struct SubtypeArgs {
    pub sub: String,
    pub sup: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: bool,
}

#[derive(Serialize)]
struct SubtypeReport {
    sub: String,
    sup: String,
    subtype: bool,
}

pub fn run(args: SubtypeArgs) {
    finish(render(&args));
}

pub fn render(args: &SubtypeArgs) -> Result<String, CliError> {
    let mut universe = load_universe(&args.universe)?;
    let s = universe.parse(&args.sub)?;
    let t = universe.parse(&args.sup)?;
    let subtype = universe.is_subtype(s, t);
    tracing::debug!(s = %args.sub, t = %args.sup, subtype, "subtype check");

    let report = SubtypeReport {
        sub: universe.display(s),
        sup: universe.display(t),
        subtype,
    };
    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let c = Colors::new(args.color);
    Ok(format!(
        "{blue}{}{reset} {dim}<:{reset} {blue}{}{reset}  {}",
        report.sub,
        report.sup,
        c.verdict(subtype),
        blue = c.blue,
        dim = c.dim,
        reset = c.reset,
    ))
}
