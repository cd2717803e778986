//! Error types for the type universe.

/// Codegen contract violation while decoding or evaluating a recipe.
///
/// These never describe bad user input: a compiled module only ever feeds
/// recipes and rule tables produced by its own build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("bad character {ch:?} at offset {offset} in recipe {recipe:?}")]
    BadCharacter {
        recipe: String,
        ch: char,
        offset: usize,
    },

    #[error("malformed recipe {0:?}")]
    Malformed(String),

    #[error("unexpected state under `()` in recipe {0:?}")]
    UnexpectedState(String),

    #[error("unexpected extended operation {0}")]
    UnexpectedExtendedOperation(u32),

    #[error("no environment to resolve {0:?}")]
    MissingEnvironment(String),

    #[error("indexed base must be an interface type, got {0:?}")]
    IndexedBaseNotInterface(String),

    #[error("bad index {index} for {env:?}")]
    BadIndex { index: u32, env: String },

    #[error("no {name:?} in {env:?}")]
    UnknownTypeVariable { name: String, env: String },

    #[error("{0:?} is not a generic function type")]
    NotGenericFunction(String),

    #[error("expected {expected} type arguments, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
}

/// A failed cast. Recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value}: type '{observed}' is not a subtype of type '{expected}'")]
pub struct TypeError {
    /// Short rendering of the offending value.
    pub value: String,
    /// Display of the value's runtime type.
    pub observed: String,
    /// Display of the type the value was checked against.
    pub expected: String,
}

/// Failure to load a codegen table.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("invalid rule table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown variance code {code} for {name:?}")]
    UnknownVariance { name: String, code: u8 },
}
