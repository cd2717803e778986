use rtix_core::Colors;
use rtix_types::TypeKind;
use serde::Serialize;

use super::universe_loader::{UniverseOptions, load_universe};
use super::{CliError, finish};

pub struct ParseArgs {
    pub recipe: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: bool,
}

#[derive(Serialize)]
struct ParseReport<'a> {
    input: &'a str,
    recipe: &'a str,
    display: String,
    kind: &'static str,
}

pub fn run(args: ParseArgs) {
    finish(render(&args));
}

pub fn render(args: &ParseArgs) -> Result<String, CliError> {
    let mut universe = load_universe(&args.universe)?;
    let ty = universe.parse(&args.recipe)?;
    let report = ParseReport {
        input: &args.recipe,
        recipe: universe.recipe(ty),
        display: universe.display(ty),
        kind: kind_name(universe.kind(ty)),
    };

    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let c = Colors::new(args.color);
    Ok(format!(
        "{dim}recipe{reset}   {}\n{dim}display{reset}  {blue}{}{reset}\n{dim}kind{reset}     {}",
        report.recipe,
        report.display,
        report.kind,
        dim = c.dim,
        blue = c.blue,
        reset = c.reset,
    ))
}

fn kind_name(kind: &TypeKind) -> &'static str {
    match kind {
        TypeKind::Never => "never",
        TypeKind::Dynamic => "dynamic",
        TypeKind::Void => "void",
        TypeKind::Any => "any",
        TypeKind::Erased => "erased",
        TypeKind::Legacy(_) => "legacy",
        TypeKind::Nullable(_) => "nullable",
        TypeKind::FutureOr(_) => "future-or",
        TypeKind::Interface { .. } => "interface",
        TypeKind::Binding { .. } => "binding",
        TypeKind::Record { .. } => "record",
        TypeKind::Function { .. } => "function",
        TypeKind::GenericFunction { .. } => "generic-function",
        TypeKind::GenericParameter(_) => "generic-parameter",
    }
}
