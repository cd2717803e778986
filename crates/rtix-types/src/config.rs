//! Configuration for a type universe.

/// Configuration for a [`Universe`](crate::Universe).
#[derive(Clone, Debug)]
pub struct UniverseConfig {
    /// Whether constructors collapse equivalent types (`T??` to `T?` and so on)
    pub(crate) normalize: bool,
    /// Whether to seed the core subtype rules (`int <: num`, `List<E> <: Iterable<E>`)
    pub(crate) builtin_rules: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            builtin_rules: true,
        }
    }
}

impl UniverseConfig {
    /// Create a new UniverseConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether constructors normalize their results.
    pub fn normalize(mut self, value: bool) -> Self {
        self.normalize = value;
        self
    }

    /// Set whether the core subtype rules are loaded on construction.
    pub fn builtin_rules(mut self, value: bool) -> Self {
        self.builtin_rules = value;
        self
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }
}
