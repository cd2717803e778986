//! Type substitution, environment binding and generic instantiation.

use crate::descriptor::{FunctionParams, NamedParam, TypeId, TypeKind};
use crate::error::InternalError;
use crate::universe::Universe;

impl Universe {
    /// Extends `env` with `arg`. A binding argument contributes all of its
    /// arguments.
    pub fn bind(&mut self, env: TypeId, arg: TypeId) -> TypeId {
        if let Some(&id) = self.types[env.index()].cache.bind.get(&arg) {
            return id;
        }
        let args = match self.kind(arg) {
            TypeKind::Binding { args, .. } => args.clone(),
            _ => vec![arg],
        };
        let id = self.binding(env, args);
        self.types[env.index()].cache.bind.insert(arg, id);
        id
    }

    /// Replaces the outermost type parameters of a generic function type.
    pub fn instantiate(
        &mut self,
        generic: TypeId,
        args: &[TypeId],
    ) -> Result<TypeId, InternalError> {
        let TypeKind::GenericFunction { body, bounds } = self.kind(generic) else {
            return Err(InternalError::NotGenericFunction(
                self.recipe(generic).to_string(),
            ));
        };
        if bounds.len() != args.len() {
            return Err(InternalError::ArityMismatch {
                expected: bounds.len(),
                actual: args.len(),
            });
        }
        let body = *body;
        let replacements: Vec<Option<TypeId>> = args.iter().copied().map(Some).collect();
        Ok(self.substitute(body, &replacements, 0))
    }

    /// Substitutes generic parameters at or above `depth`.
    ///
    /// Parameter `depth + i` becomes `replacements[i]` when present; indices
    /// below `depth` belong to binders entered during the walk. Unchanged
    /// subtrees keep their identity.
    pub(crate) fn substitute(
        &mut self,
        ty: TypeId,
        replacements: &[Option<TypeId>],
        depth: usize,
    ) -> TypeId {
        match self.kind(ty).clone() {
            TypeKind::Never
            | TypeKind::Dynamic
            | TypeKind::Void
            | TypeKind::Any
            | TypeKind::Erased => ty,
            TypeKind::Legacy(inner) => {
                let new = self.substitute(inner, replacements, depth);
                if new == inner { ty } else { self.legacy(new) }
            }
            TypeKind::Nullable(inner) => {
                let new = self.substitute(inner, replacements, depth);
                if new == inner { ty } else { self.nullable(new) }
            }
            TypeKind::FutureOr(inner) => {
                let new = self.substitute(inner, replacements, depth);
                if new == inner { ty } else { self.future_or(new) }
            }
            TypeKind::Interface { name, args } => {
                let new = self.substitute_all(&args, replacements, depth);
                if new == args {
                    ty
                } else {
                    self.interface_sym(name, new)
                }
            }
            TypeKind::Binding { base, args } => {
                let new_base = self.substitute(base, replacements, depth);
                let new_args = self.substitute_all(&args, replacements, depth);
                if new_base == base && new_args == args {
                    ty
                } else {
                    self.binding(new_base, new_args)
                }
            }
            TypeKind::Record { shape, fields } => {
                let new = self.substitute_all(&fields, replacements, depth);
                if new == fields {
                    ty
                } else {
                    self.record(&shape, new)
                }
            }
            TypeKind::Function { ret, params } => {
                let new_ret = self.substitute(ret, replacements, depth);
                let new_params = self.substitute_params(&params, replacements, depth);
                if new_ret == ret && new_params == params {
                    ty
                } else {
                    self.function(new_ret, new_params)
                }
            }
            TypeKind::GenericFunction { body, bounds } => {
                let depth = depth + bounds.len();
                let new_bounds = self.substitute_all(&bounds, replacements, depth);
                let new_body = self.substitute(body, replacements, depth);
                if new_body == body && new_bounds == bounds {
                    ty
                } else {
                    self.generic_function(new_body, new_bounds)
                }
            }
            TypeKind::GenericParameter(index) => {
                let index = index as usize;
                if index < depth {
                    return ty;
                }
                replacements
                    .get(index - depth)
                    .copied()
                    .flatten()
                    .unwrap_or(ty)
            }
        }
    }

    pub(crate) fn substitute_all(
        &mut self,
        types: &[TypeId],
        replacements: &[Option<TypeId>],
        depth: usize,
    ) -> Vec<TypeId> {
        types
            .iter()
            .map(|&ty| self.substitute(ty, replacements, depth))
            .collect()
    }

    fn substitute_params(
        &mut self,
        params: &FunctionParams,
        replacements: &[Option<TypeId>],
        depth: usize,
    ) -> FunctionParams {
        let named = params
            .named
            .iter()
            .map(|param| NamedParam {
                name: param.name.clone(),
                required: param.required,
                ty: self.substitute(param.ty, replacements, depth),
            })
            .collect();
        FunctionParams {
            required: self.substitute_all(&params.required, replacements, depth),
            optional: self.substitute_all(&params.optional, replacements, depth),
            named,
        }
    }
}
