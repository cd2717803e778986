//! Builds the universe a command runs against.

use std::path::{Path, PathBuf};

use rtix_types::{RulesError, Universe, UniverseConfig};

use super::CliError;

/// Universe flags shared by every command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniverseOptions {
    pub rules: Option<PathBuf>,
    pub variances: Option<PathBuf>,
    pub normalize: bool,
}

impl Default for UniverseOptions {
    fn default() -> Self {
        Self {
            rules: None,
            variances: None,
            normalize: true,
        }
    }
}

pub fn load_universe(options: &UniverseOptions) -> Result<Universe, CliError> {
    let mut universe = Universe::with_config(UniverseConfig::new().normalize(options.normalize));

    if let Some(path) = &options.rules {
        let json = read_table(path)?;
        let count = universe
            .add_rules_json(&json)
            .map_err(|source| table_error(path, source))?;
        tracing::debug!(path = %path.display(), count, "rules file loaded");
    }
    if let Some(path) = &options.variances {
        let json = read_table(path)?;
        let count = universe
            .add_variances_json(&json)
            .map_err(|source| table_error(path, source))?;
        tracing::debug!(path = %path.display(), count, "variances file loaded");
    }

    Ok(universe)
}

fn read_table(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn table_error(path: &Path, source: RulesError) -> CliError {
    CliError::Table {
        path: path.display().to_string(),
        source,
    }
}
