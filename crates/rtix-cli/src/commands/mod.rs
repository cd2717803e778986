pub mod is;
pub mod parse;
pub mod subtype;
pub mod universe_loader;

#[cfg(test)]
mod is_tests;

use rtix_types::{InternalError, RulesError};

/// Anything a command can fail with before it has an answer to print.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Table { path: String, source: RulesError },

    #[error("invalid recipe: {0}")]
    Recipe(#[from] InternalError),

    #[error("invalid JSON value: {0}")]
    Value(#[from] serde_json::Error),
}

/// Print a command's output, or its error and exit with status 1.
pub fn finish(result: Result<String, CliError>) {
    match result {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
