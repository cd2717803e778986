//! Recipe decoding.
//!
//! A recipe is the compact postfix type encoding emitted by the compiler.
//! Tokens are produced by a `logos` lexer and fed to a small stack machine:
//! operands are pushed, postfix operators rewrite the top of the stack, and
//! every opening bracket records a frame start that its closing bracket
//! collapses back into a single operand.
//!
//! ```text
//! List<int>            interface with one argument
//! 1?                   first environment argument, nullable
//! @(int,[String])      dynamic Function(int, [String])
//! ~({a:int,b!1})       void Function({int a, required T b})
//! 0^(0^)<num>          generic function <T extends num>(T) => T
//! +x,y(int,int)        record (int x, int y)
//! ```

use logos::Logos;

use crate::descriptor::{FunctionParams, NamedParam, TypeId, TypeKind};
use crate::error::InternalError;
use crate::universe::Universe;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Token<'src> {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Index(u32),

    #[regex(r"[A-Za-z_$|][A-Za-z0-9_$|]*", |lex| lex.slice())]
    Name(&'src str),

    /// `Class.T` or `.T`, resolved through the environment's type rule.
    #[regex(r"[A-Za-z_$|][A-Za-z0-9_$|]*\.[A-Za-z0-9_$|]*", |lex| lex.slice())]
    #[regex(r"\.[A-Za-z0-9_$|]*", |lex| lex.slice())]
    TypeVariable(&'src str),

    /// `+shape(` opens a record; the shape lists named field names.
    #[regex(r"\+[A-Za-z0-9_$|,]*\(", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    RecordOpen(&'src str),

    #[token(",")]
    Comma,

    #[token(":")]
    NamedOptional,

    #[token("!")]
    NamedRequired,

    #[token(";")]
    Resolve,

    #[token("<")]
    ArgsOpen,

    #[token(">")]
    ArgsClose,

    #[token("(")]
    ParamsOpen,

    #[token(")")]
    ParamsClose,

    #[token("[")]
    OptionalOpen,

    #[token("]")]
    OptionalClose,

    #[token("{")]
    NamedOpen,

    #[token("}")]
    NamedClose,

    #[token("@")]
    Dynamic,

    #[token("~")]
    Void,

    #[token("#")]
    Erased,

    /// `0&` is Never, `1&` the internal top type.
    #[token("&")]
    Extended,

    #[token("^")]
    GenericParameter,

    #[token("*")]
    Legacy,

    #[token("?")]
    Nullable,

    #[token("/")]
    FutureOr,
}

/// Operand stack entry.
#[derive(Debug)]
enum Item<'src> {
    Type(TypeId),
    /// Interface name not yet known to take arguments.
    Name(&'src str),
    /// Environment index, resolved lazily since `n^` and `n&` reuse digits.
    Index(u32),
    Flag(bool),
    FunctionOpen,
    RecordOpen(&'src str),
    Optional(Vec<TypeId>),
    Named(Vec<NamedParam>),
}

struct RecipeParser<'u, 'src> {
    universe: &'u mut Universe,
    env: Option<TypeId>,
    recipe: &'src str,
    stack: Vec<Item<'src>>,
    frames: Vec<usize>,
}

impl<'u, 'src> RecipeParser<'u, 'src> {
    fn new(universe: &'u mut Universe, env: Option<TypeId>, recipe: &'src str) -> Self {
        Self {
            universe,
            env,
            recipe,
            stack: Vec::new(),
            frames: Vec::new(),
        }
    }

    fn run(mut self) -> Result<TypeId, InternalError> {
        let recipe = self.recipe;
        for (token, span) in Token::lexer(recipe).spanned() {
            let token = token.map_err(|_| InternalError::BadCharacter {
                recipe: recipe.to_string(),
                ch: recipe[span.start..].chars().next().unwrap_or('\0'),
                offset: span.start,
            })?;
            self.step(token)?;
        }

        let item = self.pop()?;
        if !self.stack.is_empty() || !self.frames.is_empty() {
            return Err(self.malformed());
        }
        self.resolve(item)
    }

    fn step(&mut self, token: Token<'src>) -> Result<(), InternalError> {
        match token {
            Token::Index(n) => self.stack.push(Item::Index(n)),
            Token::Name(name) => self.stack.push(Item::Name(name)),
            Token::TypeVariable(name) => {
                let env = self.env.ok_or_else(|| self.missing_env())?;
                let ty = self.universe.eval_type_variable(env, name)?;
                self.stack.push(Item::Type(ty));
            }
            Token::RecordOpen(shape) => {
                self.stack.push(Item::RecordOpen(shape));
                self.open_frame();
            }
            Token::Comma => {}
            Token::NamedOptional => self.stack.push(Item::Flag(false)),
            Token::NamedRequired => self.stack.push(Item::Flag(true)),
            Token::Resolve => {
                let ty = self.pop_type()?;
                self.stack.push(Item::Type(ty));
            }
            Token::ArgsOpen | Token::OptionalOpen | Token::NamedOpen => self.open_frame(),
            Token::ArgsClose => self.close_args()?,
            Token::ParamsOpen => {
                self.stack.push(Item::FunctionOpen);
                self.open_frame();
            }
            Token::ParamsClose => self.close_params()?,
            Token::OptionalClose => {
                let types = self.collect_types()?;
                self.stack.push(Item::Optional(types));
            }
            Token::NamedClose => {
                let named = self.collect_named()?;
                self.stack.push(Item::Named(named));
            }
            Token::Dynamic => self.push_type(self.universe.dynamic()),
            Token::Void => self.push_type(self.universe.void()),
            Token::Erased => self.push_type(self.universe.erased()),
            Token::Extended => {
                let ty = match self.pop()? {
                    Item::Index(0) => self.universe.never(),
                    Item::Index(1) => self.universe.any(),
                    Item::Index(n) => return Err(InternalError::UnexpectedExtendedOperation(n)),
                    _ => return Err(self.malformed()),
                };
                self.push_type(ty);
            }
            Token::GenericParameter => {
                let Item::Index(n) = self.pop()? else {
                    return Err(self.malformed());
                };
                let ty = self.universe.generic_parameter(n);
                self.push_type(ty);
            }
            Token::Legacy => {
                let inner = self.pop_type()?;
                let ty = self.universe.legacy(inner);
                self.push_type(ty);
            }
            Token::Nullable => {
                let inner = self.pop_type()?;
                let ty = self.universe.nullable(inner);
                self.push_type(ty);
            }
            Token::FutureOr => {
                let inner = self.pop_type()?;
                let ty = self.universe.future_or(inner);
                self.push_type(ty);
            }
        }
        Ok(())
    }

    /// `>`: the head decides between interface, generic function and binding.
    fn close_args(&mut self) -> Result<(), InternalError> {
        let args = self.collect_types()?;
        let ty = match self.pop()? {
            Item::Name(name) => self.universe.interface(name, args),
            head => {
                let base = self.resolve(head)?;
                if matches!(self.universe.kind(base), TypeKind::Function { .. }) {
                    self.universe.generic_function(base, args)
                } else {
                    self.universe.binding(base, args)
                }
            }
        };
        self.push_type(ty);
        Ok(())
    }

    /// `)`: closes either a function parameter list or a record.
    fn close_params(&mut self) -> Result<(), InternalError> {
        let tail = match self.stack.last() {
            Some(Item::Optional(_) | Item::Named(_)) => self.stack.pop(),
            _ => None,
        };
        let required = self.collect_types()?;

        match self.pop()? {
            Item::FunctionOpen => {
                let ret = self.pop_type()?;
                let mut params = FunctionParams::positional(required);
                match tail {
                    Some(Item::Optional(optional)) => params = params.with_optional(optional),
                    Some(Item::Named(named)) => params = params.with_named(named),
                    _ => {}
                }
                let ty = self.universe.function(ret, params);
                self.push_type(ty);
            }
            Item::RecordOpen(shape) if tail.is_none() => {
                let names = if shape.is_empty() { 0 } else { shape.split(',').count() };
                if names > required.len() {
                    return Err(self.malformed());
                }
                let ty = self.universe.record(shape, required);
                self.push_type(ty);
            }
            _ => return Err(InternalError::UnexpectedState(self.recipe.to_string())),
        }
        Ok(())
    }

    fn open_frame(&mut self) {
        self.frames.push(self.stack.len());
    }

    fn collect_frame(&mut self) -> Result<Vec<Item<'src>>, InternalError> {
        let start = self.frames.pop().ok_or_else(|| self.malformed())?;
        if start > self.stack.len() {
            return Err(self.malformed());
        }
        Ok(self.stack.split_off(start))
    }

    fn collect_types(&mut self) -> Result<Vec<TypeId>, InternalError> {
        let items = self.collect_frame()?;
        items.into_iter().map(|item| self.resolve(item)).collect()
    }

    /// Named parameters arrive as `name`, flag, type triples.
    fn collect_named(&mut self) -> Result<Vec<NamedParam>, InternalError> {
        let mut items = self.collect_frame()?.into_iter();
        let mut named = Vec::new();
        loop {
            match (items.next(), items.next(), items.next()) {
                (None, _, _) => return Ok(named),
                (Some(Item::Name(name)), Some(Item::Flag(required)), Some(ty)) => {
                    let ty = self.resolve(ty)?;
                    named.push(NamedParam::new(name, required, ty));
                }
                _ => return Err(self.malformed()),
            }
        }
    }

    fn pop(&mut self) -> Result<Item<'src>, InternalError> {
        self.stack.pop().ok_or_else(|| self.malformed())
    }

    fn pop_type(&mut self) -> Result<TypeId, InternalError> {
        let item = self.pop()?;
        self.resolve(item)
    }

    fn push_type(&mut self, ty: TypeId) {
        self.stack.push(Item::Type(ty));
    }

    fn resolve(&mut self, item: Item<'src>) -> Result<TypeId, InternalError> {
        match item {
            Item::Type(ty) => Ok(ty),
            Item::Name(name) => Ok(self.universe.interface(name, Vec::new())),
            Item::Index(index) => {
                let env = self.env.ok_or_else(|| self.missing_env())?;
                self.universe.env_index(env, index)
            }
            _ => Err(self.malformed()),
        }
    }

    fn malformed(&self) -> InternalError {
        InternalError::Malformed(self.recipe.to_string())
    }

    fn missing_env(&self) -> InternalError {
        InternalError::MissingEnvironment(self.recipe.to_string())
    }
}

impl Universe {
    /// Decodes a closed recipe (one without environment references).
    pub fn parse(&mut self, recipe: &str) -> Result<TypeId, InternalError> {
        if let Some(id) = self.lookup(recipe) {
            return Ok(id);
        }
        let id = RecipeParser::new(self, None, recipe).run()?;
        self.by_recipe.insert(recipe.to_string(), id);
        Ok(id)
    }

    /// Alias of [`Universe::parse`].
    pub fn eval(&mut self, recipe: &str) -> Result<TypeId, InternalError> {
        self.parse(recipe)
    }

    /// Decodes `recipe` with `env` supplying indexed and named type variables.
    pub fn eval_in_env(&mut self, env: TypeId, recipe: &str) -> Result<TypeId, InternalError> {
        if let Some(&id) = self.types[env.index()].cache.eval.get(recipe) {
            return Ok(id);
        }
        let id = RecipeParser::new(self, Some(env), recipe).run()?;
        self.types[env.index()]
            .cache
            .eval
            .insert(recipe.to_string(), id);
        Ok(id)
    }

    /// Resolves environment index `index`: `0` is the environment itself,
    /// binding arguments come before the base interface's arguments.
    pub(crate) fn env_index(&self, env: TypeId, index: u32) -> Result<TypeId, InternalError> {
        let mut slot = index as usize;
        let mut env = env;
        if let TypeKind::Binding { base, args } = self.kind(env) {
            if slot == 0 {
                return Ok(*base);
            }
            if slot <= args.len() {
                return Ok(args[slot - 1]);
            }
            slot -= args.len();
            env = *base;
        } else if slot == 0 {
            return Ok(env);
        }

        let TypeKind::Interface { args, .. } = self.kind(env) else {
            return Err(InternalError::IndexedBaseNotInterface(
                self.recipe(env).to_string(),
            ));
        };
        args.get(slot - 1).copied().ok_or_else(|| InternalError::BadIndex {
            index,
            env: self.recipe(env).to_string(),
        })
    }

    /// Resolves `Class.T` through the environment interface's type rule.
    pub(crate) fn eval_type_variable(
        &mut self,
        env: TypeId,
        name: &str,
    ) -> Result<TypeId, InternalError> {
        let interface = match self.kind(env) {
            TypeKind::Binding { base, .. } => *base,
            _ => env,
        };
        let Some(class) = self.interface_name(interface) else {
            return Err(InternalError::IndexedBaseNotInterface(
                self.recipe(interface).to_string(),
            ));
        };
        let Some(recipe) = self.rules.type_variable(class, name) else {
            return Err(InternalError::UnknownTypeVariable {
                name: name.to_string(),
                env: self.recipe(interface).to_string(),
            });
        };
        let recipe = recipe.to_string();
        self.eval_in_env(interface, &recipe)
    }
}
