use rtix_core::Colors;
use rtix_types::Value;
use serde::Serialize;

use super::universe_loader::{UniverseOptions, load_universe};
use super::{CliError, finish};

pub struct IsArgs {
    pub recipe: String,
    /// JSON text of the value under test.
    pub value: String,
    pub universe: UniverseOptions,
    pub json: bool,
    pub color: bool,
}

#[derive(Serialize)]
struct IsReport {
    value: String,
    runtime_type: String,
    expected: String,
    is: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: IsArgs) {
    finish(render(&args));
}

pub fn render(args: &IsArgs) -> Result<String, CliError> {
    let mut universe = load_universe(&args.universe)?;
    let ty = universe.parse(&args.recipe)?;
    let json: serde_json::Value = serde_json::from_str(&args.value)?;
    let value = Value::from_json(&universe, &json);

    let observed = universe.runtime_type(&value);
    let error = universe.cast(value.clone(), ty).err().map(|e| e.to_string());
    let report = IsReport {
        value: universe.describe_value(&value),
        runtime_type: universe.display(observed),
        expected: universe.display(ty),
        is: error.is_none(),
        error,
    };

    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let c = Colors::new(args.color);
    let mut out = format!(
        "{} {dim}is{reset} {blue}{}{reset}  {}",
        report.value,
        report.expected,
        c.verdict(report.is),
        dim = c.dim,
        blue = c.blue,
        reset = c.reset,
    );
    if let Some(error) = &report.error {
        out.push_str(&format!("\n{red}{error}{reset}", red = c.red, reset = c.reset));
    }
    Ok(out)
}
