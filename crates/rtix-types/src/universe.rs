//! The type universe: a per-program arena of interned types.
//!
//! Every constructor goes through the canonical-recipe map, so building the
//! same structure twice yields the same `TypeId`. When normalization is on,
//! constructors also collapse equivalent spellings (`T??`, `FutureOr<Object>`,
//! `Never?`) to a single representative.

use std::collections::HashMap;

use rtix_core::{Interner, Symbol};

use crate::config::UniverseConfig;
use crate::descriptor::{Descriptor, FunctionParams, TypeId, TypeKind, Variance};
use crate::rules::TypeRules;

/// Interface names the universe gives special meaning to.
pub mod names {
    pub const OBJECT: &str = "Object";
    pub const NULL: &str = "Null";
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const DOUBLE: &str = "double";
    pub const NUM: &str = "num";
    pub const STRING: &str = "String";
    pub const FUNCTION: &str = "Function";
    pub const RECORD: &str = "Record";
    pub const FUTURE: &str = "Future";
    pub const LIST: &str = "List";
    pub const ITERABLE: &str = "Iterable";
}

/// Types created when the universe is built.
#[derive(Clone, Copy, Debug)]
pub struct CoreTypes {
    pub never: TypeId,
    pub dynamic: TypeId,
    pub void: TypeId,
    pub any: TypeId,
    pub erased: TypeId,
    pub null: TypeId,
    pub object: TypeId,
    /// `Object?`, the only top type that is an interface.
    pub nullable_object: TypeId,
    /// `Object*`
    pub legacy_object: TypeId,
    pub bool: TypeId,
    pub int: TypeId,
    pub double: TypeId,
    pub num: TypeId,
    pub string: TypeId,
    pub function: TypeId,
    pub record: TypeId,
    pub future: Symbol,
    pub list: Symbol,
}

/// Owns all type descriptors, the rule tables and every cache.
pub struct Universe {
    pub(crate) config: UniverseConfig,
    pub(crate) names: Interner,
    pub(crate) types: Vec<Descriptor>,
    pub(crate) by_recipe: HashMap<String, TypeId>,
    pub(crate) rules: TypeRules,
    /// Erased class name to type-argument count.
    pub(crate) erased: HashMap<String, usize>,
    pub(crate) variances: HashMap<String, Vec<Variance>>,
    pub(crate) display_names: HashMap<String, String>,
    pub(crate) core: CoreTypes,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("types", &self.types.len())
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl Universe {
    pub fn new() -> Self {
        Self::with_config(UniverseConfig::default())
    }

    pub fn with_config(config: UniverseConfig) -> Self {
        let mut interner = Interner::new();
        let future = interner.intern(names::FUTURE);
        let list = interner.intern(names::LIST);
        let unset = TypeId::new(0);

        let mut universe = Self {
            config,
            names: interner,
            types: Vec::new(),
            by_recipe: HashMap::new(),
            rules: TypeRules::default(),
            erased: HashMap::new(),
            variances: HashMap::new(),
            display_names: HashMap::new(),
            core: CoreTypes {
                never: unset,
                dynamic: unset,
                void: unset,
                any: unset,
                erased: unset,
                null: unset,
                object: unset,
                nullable_object: unset,
                legacy_object: unset,
                bool: unset,
                int: unset,
                double: unset,
                num: unset,
                string: unset,
                function: unset,
                record: unset,
                future,
                list,
            },
        };
        universe.seed_core_types();
        if universe.config.builtin_rules {
            universe.rules.seed_builtins();
        }
        universe
    }

    fn seed_core_types(&mut self) {
        self.core.never = self.atomic(TypeKind::Never, "0&");
        self.core.dynamic = self.atomic(TypeKind::Dynamic, "@");
        self.core.void = self.atomic(TypeKind::Void, "~");
        self.core.any = self.atomic(TypeKind::Any, "1&");
        self.core.erased = self.atomic(TypeKind::Erased, "#");

        self.core.null = self.interface(names::NULL, Vec::new());
        let object = self.interface(names::OBJECT, Vec::new());
        self.core.object = object;
        self.core.nullable_object = self.nullable(object);
        self.core.legacy_object = self.legacy(object);

        self.core.bool = self.interface(names::BOOL, Vec::new());
        self.core.int = self.interface(names::INT, Vec::new());
        self.core.double = self.interface(names::DOUBLE, Vec::new());
        self.core.num = self.interface(names::NUM, Vec::new());
        self.core.string = self.interface(names::STRING, Vec::new());
        self.core.function = self.interface(names::FUNCTION, Vec::new());
        self.core.record = self.interface(names::RECORD, Vec::new());
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    pub fn core(&self) -> &CoreTypes {
        &self.core
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn descriptor(&self, id: TypeId) -> &Descriptor {
        &self.types[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        self.types[id.index()].kind()
    }

    pub fn recipe(&self, id: TypeId) -> &str {
        self.types[id.index()].recipe()
    }

    /// Type already registered under `recipe`, without parsing.
    pub fn lookup(&self, recipe: &str) -> Option<TypeId> {
        self.by_recipe.get(recipe).copied()
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.names.resolve(sym)
    }

    /// Class name of an interface type.
    pub fn interface_name(&self, id: TypeId) -> Option<&str> {
        match self.kind(id) {
            TypeKind::Interface { name, .. } => Some(self.names.resolve(*name)),
            _ => None,
        }
    }

    /// Type arguments of an interface type, empty for anything else.
    pub fn interface_args(&self, id: TypeId) -> &[TypeId] {
        match self.kind(id) {
            TypeKind::Interface { args, .. } => args,
            _ => &[],
        }
    }

    /// Returns the type registered under `key`, or registers what `make` builds.
    ///
    /// `key` may be a non-canonical spelling; it maps to whatever `make`
    /// normalizes to.
    pub(crate) fn cached(
        &mut self,
        key: String,
        make: impl FnOnce(&mut Self, String) -> TypeId,
    ) -> TypeId {
        if let Some(&id) = self.by_recipe.get(&key) {
            return id;
        }
        let id = make(self, key.clone());
        self.by_recipe.insert(key, id);
        id
    }

    fn alloc(&mut self, kind: TypeKind, recipe: String) -> TypeId {
        if let Some(&id) = self.by_recipe.get(&recipe) {
            return id;
        }
        let id = TypeId::new(self.types.len());
        tracing::trace!(%id, recipe = %recipe, "interned type");
        self.by_recipe.insert(recipe.clone(), id);
        self.types.push(Descriptor::new(kind, recipe));
        id
    }

    fn atomic(&mut self, kind: TypeKind, recipe: &str) -> TypeId {
        self.cached(recipe.to_string(), |u, key| u.alloc(kind, key))
    }

    pub(crate) fn join_recipes(&self, ids: &[TypeId]) -> String {
        let mut out = String::new();
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(self.recipe(*id));
        }
        out
    }

    pub fn never(&self) -> TypeId {
        self.core.never
    }

    pub fn dynamic(&self) -> TypeId {
        self.core.dynamic
    }

    pub fn void(&self) -> TypeId {
        self.core.void
    }

    pub fn any(&self) -> TypeId {
        self.core.any
    }

    pub fn erased(&self) -> TypeId {
        self.core.erased
    }

    pub fn legacy(&mut self, inner: TypeId) -> TypeId {
        let key = format!("{}*", self.recipe(inner));
        self.cached(key, |u, key| {
            if u.config.normalize
                && (u.is_top(inner)
                    || u.is_null(inner)
                    || matches!(u.kind(inner), TypeKind::Nullable(_) | TypeKind::Legacy(_)))
            {
                return inner;
            }
            u.alloc(TypeKind::Legacy(inner), key)
        })
    }

    pub fn nullable(&mut self, inner: TypeId) -> TypeId {
        let key = format!("{}?", self.recipe(inner));
        self.cached(key, |u, key| {
            if u.config.normalize
                && let Some(id) = u.normalize_nullable(inner)
            {
                return id;
            }
            u.alloc(TypeKind::Nullable(inner), key)
        })
    }

    fn normalize_nullable(&mut self, inner: TypeId) -> Option<TypeId> {
        if self.is_top(inner) || self.is_null(inner) {
            return Some(inner);
        }
        match *self.kind(inner) {
            TypeKind::Nullable(_) => Some(inner),
            TypeKind::FutureOr(arg) if self.accepts_null(arg) => Some(inner),
            TypeKind::Never => Some(self.core.null),
            TypeKind::Legacy(base) => {
                if let TypeKind::FutureOr(arg) = *self.kind(base)
                    && self.accepts_null(arg)
                {
                    return Some(base);
                }
                Some(self.nullable_of_legacy(inner, base))
            }
            _ => None,
        }
    }

    pub(crate) fn nullable_of_legacy(&mut self, legacy: TypeId, base: TypeId) -> TypeId {
        if let Some(id) = self.types[legacy.index()].cache.nullable {
            return id;
        }
        let id = self.nullable(base);
        self.types[legacy.index()].cache.nullable = Some(id);
        id
    }

    pub fn future_or(&mut self, inner: TypeId) -> TypeId {
        let key = format!("{}/", self.recipe(inner));
        self.cached(key, |u, key| {
            if u.config.normalize {
                if u.is_top(inner) || inner == u.core.object || inner == u.core.legacy_object {
                    return inner;
                }
                if inner == u.core.never {
                    return u.future(inner);
                }
                if u.is_null(inner) {
                    let future = u.future(inner);
                    return u.nullable(future);
                }
            }
            u.alloc(TypeKind::FutureOr(inner), key)
        })
    }

    /// `Future<arg>`
    pub fn future(&mut self, arg: TypeId) -> TypeId {
        self.interface_sym(self.core.future, vec![arg])
    }

    /// `Future<T>` for a `FutureOr<T>`, cached on the `FutureOr` descriptor.
    pub(crate) fn future_of_future_or(&mut self, future_or: TypeId, arg: TypeId) -> TypeId {
        if let Some(id) = self.types[future_or.index()].cache.future {
            return id;
        }
        let id = self.future(arg);
        self.types[future_or.index()].cache.future = Some(id);
        id
    }

    /// `List<element>`
    pub fn list(&mut self, element: TypeId) -> TypeId {
        self.interface_sym(self.core.list, vec![element])
    }

    pub fn interface(&mut self, name: &str, args: Vec<TypeId>) -> TypeId {
        let sym = self.names.intern(name);
        self.interface_sym(sym, args)
    }

    pub(crate) fn interface_sym(&mut self, name: Symbol, args: Vec<TypeId>) -> TypeId {
        let mut key = self.names.resolve(name).to_string();
        if !args.is_empty() {
            key.push('<');
            key.push_str(&self.join_recipes(&args));
            key.push('>');
        }
        self.cached(key, move |u, key| {
            u.alloc(TypeKind::Interface { name, args }, key)
        })
    }

    /// Extends an environment with more arguments. A binding of a binding
    /// flattens into one binding of the innermost base.
    pub fn binding(&mut self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        let (base, args) = match self.kind(base) {
            TypeKind::Binding {
                base: inner,
                args: prefix,
            } => {
                let mut all = prefix.clone();
                all.extend(args);
                (*inner, all)
            }
            _ => (base, args),
        };
        let key = format!("{};<{}>", self.recipe(base), self.join_recipes(&args));
        self.cached(key, move |u, key| {
            u.alloc(TypeKind::Binding { base, args }, key)
        })
    }

    pub fn record(&mut self, shape: &str, fields: Vec<TypeId>) -> TypeId {
        let key = format!("+{shape}({})", self.join_recipes(&fields));
        let shape = shape.to_string();
        self.cached(key, move |u, key| {
            u.alloc(TypeKind::Record { shape, fields }, key)
        })
    }

    pub fn function(&mut self, ret: TypeId, params: FunctionParams) -> TypeId {
        let key = format!("{}({})", self.recipe(ret), self.params_recipe(&params));
        self.cached(key, move |u, key| {
            u.alloc(TypeKind::Function { ret, params }, key)
        })
    }

    fn params_recipe(&self, params: &FunctionParams) -> String {
        let mut out = self.join_recipes(&params.required);
        let sep = if params.required.is_empty() { "" } else { "," };
        if !params.optional.is_empty() {
            out.push_str(sep);
            out.push('[');
            out.push_str(&self.join_recipes(&params.optional));
            out.push(']');
        }
        if !params.named.is_empty() {
            out.push_str(sep);
            out.push('{');
            for (i, named) in params.named.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&named.name);
                out.push(if named.required { '!' } else { ':' });
                out.push_str(self.recipe(named.ty));
            }
            out.push('}');
        }
        out
    }

    pub fn generic_function(&mut self, body: TypeId, bounds: Vec<TypeId>) -> TypeId {
        let key = format!("{}<{}>", self.recipe(body), self.join_recipes(&bounds));
        self.cached(key, move |u, key| {
            if u.config.normalize
                && let Some(id) = u.normalize_generic_function(body, &bounds)
            {
                return id;
            }
            u.alloc(TypeKind::GenericFunction { body, bounds }, key)
        })
    }

    /// Type parameters bounded by `Never` can only be `Never`, so they are
    /// substituted away inside the body and the other bounds.
    fn normalize_generic_function(&mut self, body: TypeId, bounds: &[TypeId]) -> Option<TypeId> {
        let never = self.core.never;
        if !bounds.contains(&never) {
            return None;
        }
        let replacements: Vec<Option<TypeId>> = bounds
            .iter()
            .map(|&bound| (bound == never).then_some(never))
            .collect();
        let body = self.substitute(body, &replacements, 0);
        let bounds = self.substitute_all(bounds, &replacements, 0);
        let key = format!("{}<{}>", self.recipe(body), self.join_recipes(&bounds));
        Some(self.cached(key, move |u, key| {
            u.alloc(TypeKind::GenericFunction { body, bounds }, key)
        }))
    }

    pub fn generic_parameter(&mut self, index: u32) -> TypeId {
        self.cached(format!("{index}^"), |u, key| {
            u.alloc(TypeKind::GenericParameter(index), key)
        })
    }

    /// `dynamic`, `void`, the internal top, erased, and `Object?`.
    pub fn is_top(&self, id: TypeId) -> bool {
        matches!(
            self.kind(id),
            TypeKind::Dynamic | TypeKind::Void | TypeKind::Any | TypeKind::Erased
        ) || id == self.core.nullable_object
    }

    /// `Null` or `Null*`.
    pub fn is_null(&self, id: TypeId) -> bool {
        id == self.core.null || matches!(self.kind(id), TypeKind::Legacy(inner) if *inner == self.core.null)
    }

    /// Whether `null` is a member of the type.
    pub fn accepts_null(&self, id: TypeId) -> bool {
        if self.is_null(id) || self.is_top(id) {
            return true;
        }
        match self.kind(id) {
            TypeKind::Nullable(_) => true,
            TypeKind::Legacy(inner) | TypeKind::FutureOr(inner) => self.accepts_null(*inner),
            _ => false,
        }
    }

    pub(crate) fn is_top_or_legacy_object(&self, id: TypeId) -> bool {
        self.is_top(id) || id == self.core.legacy_object
    }
}
