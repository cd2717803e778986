//! Type descriptors.
//!
//! Every type the universe knows about is one `Descriptor` in an arena,
//! addressed by `TypeId`. Two descriptors with the same canonical recipe are
//! the same descriptor, so `TypeId` equality is type identity.

use std::collections::HashMap;

use rtix_core::Symbol;

use crate::predicate::Predicate;

/// Handle to an interned type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural shape of a type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeKind {
    /// Bottom type. Recipe `0&`.
    Never,
    /// `dynamic`. Recipe `@`.
    Dynamic,
    /// `void`. Recipe `~`.
    Void,
    /// Internal top type. Recipe `1&`.
    Any,
    /// Type erased by the compiler. Recipe `#`.
    Erased,
    /// `T*`, a type of unknown nullability.
    Legacy(TypeId),
    /// `T?`
    Nullable(TypeId),
    /// `FutureOr<T>`
    FutureOr(TypeId),
    /// Named class with type arguments.
    Interface { name: Symbol, args: Vec<TypeId> },
    /// Environment extension: a base environment plus extra arguments.
    Binding { base: TypeId, args: Vec<TypeId> },
    /// Record type. `shape` lists the named field names, comma separated.
    Record { shape: String, fields: Vec<TypeId> },
    Function { ret: TypeId, params: FunctionParams },
    /// Function type abstracted over type parameters with the given bounds.
    GenericFunction { body: TypeId, bounds: Vec<TypeId> },
    /// Reference to a generic function type parameter by de Bruijn index.
    GenericParameter(u32),
}

impl TypeKind {
    /// Numeric code matching the recipe encoding's kind numbering.
    pub fn code(&self) -> u8 {
        match self {
            TypeKind::Never => 1,
            TypeKind::Dynamic => 2,
            TypeKind::Void => 3,
            TypeKind::Any => 4,
            TypeKind::Erased => 5,
            TypeKind::Legacy(_) => 6,
            TypeKind::Nullable(_) => 7,
            TypeKind::FutureOr(_) => 8,
            TypeKind::Interface { .. } => 9,
            TypeKind::Binding { .. } => 10,
            TypeKind::Record { .. } => 11,
            TypeKind::Function { .. } => 12,
            TypeKind::GenericFunction { .. } => 13,
            TypeKind::GenericParameter(_) => 14,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self,
            TypeKind::Function { .. } | TypeKind::GenericFunction { .. }
        )
    }
}

/// Parameter list of a function type.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct FunctionParams {
    pub required: Vec<TypeId>,
    pub optional: Vec<TypeId>,
    /// Sorted by name.
    pub named: Vec<NamedParam>,
}

impl FunctionParams {
    pub fn positional(required: Vec<TypeId>) -> Self {
        Self {
            required,
            ..Self::default()
        }
    }

    pub fn with_optional(mut self, optional: Vec<TypeId>) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_named(mut self, mut named: Vec<NamedParam>) -> Self {
        named.sort_by(|a, b| a.name.cmp(&b.name));
        self.named = named;
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct NamedParam {
    pub name: String,
    pub required: bool,
    pub ty: TypeId,
}

impl NamedParam {
    pub fn new(name: impl Into<String>, required: bool, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            required,
            ty,
        }
    }
}

/// Declared variance of one interface type parameter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Variance {
    LegacyCovariant,
    Covariant,
    Contravariant,
    Invariant,
}

impl Variance {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::LegacyCovariant),
            1 => Some(Self::Covariant),
            2 => Some(Self::Contravariant),
            3 => Some(Self::Invariant),
            _ => None,
        }
    }
}

/// One interned type plus its lazily filled caches.
#[derive(Debug)]
pub struct Descriptor {
    kind: TypeKind,
    recipe: String,
    pub(crate) cache: DescriptorCache,
}

#[derive(Debug, Default)]
pub(crate) struct DescriptorCache {
    /// `T?` for a legacy `T*`.
    pub nullable: Option<TypeId>,
    /// `Future<T>` for a `FutureOr<T>`.
    pub future: Option<TypeId>,
    /// Recipes already evaluated with this type as the environment.
    pub eval: HashMap<String, TypeId>,
    /// Bindings of this environment, keyed by the bound argument.
    pub bind: HashMap<TypeId, TypeId>,
    /// Top-level subtype answers with this type on the left.
    pub subtype: HashMap<TypeId, bool>,
    pub predicate: Option<Predicate>,
}

impl Descriptor {
    pub(crate) fn new(kind: TypeKind, recipe: String) -> Self {
        Self {
            kind,
            recipe,
            cache: DescriptorCache::default(),
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Canonical recipe string. Unique per type.
    pub fn recipe(&self) -> &str {
        &self.recipe
    }
}
