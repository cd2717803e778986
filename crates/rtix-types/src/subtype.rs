//! Structural subtyping.
//!
//! Both sides carry an environment of generic bounds: entering a pair of
//! generic function types prepends their bounds, so a generic parameter with
//! index `i` finds its bound at position `i`.

use crate::descriptor::{FunctionParams, TypeId, TypeKind, Variance};
use crate::rules::RuleEntry;
use crate::universe::Universe;

impl Universe {
    /// Whether `s` is a subtype of `t`. Answers are memoized on `s`.
    pub fn is_subtype(&mut self, s: TypeId, t: TypeId) -> bool {
        if let Some(&answer) = self.types[s.index()].cache.subtype.get(&t) {
            return answer;
        }
        let answer = self.subtype(s, &[], t, &[]);
        self.types[s.index()].cache.subtype.insert(t, answer);
        answer
    }

    fn subtype(&mut self, s: TypeId, s_env: &[TypeId], t: TypeId, t_env: &[TypeId]) -> bool {
        if s == t {
            return true;
        }
        if self.is_top_or_legacy_object(t) {
            return true;
        }

        let s_kind = self.kind(s).clone();
        let t_kind = self.kind(t).clone();

        if self.is_top(s) {
            return false;
        }
        if matches!(s_kind, TypeKind::Never) {
            return true;
        }

        if let TypeKind::GenericParameter(index) = s_kind
            && let Some(&bound) = s_env.get(index as usize)
            && self.subtype(bound, s_env, t, t_env)
        {
            return true;
        }

        if self.is_null(s) {
            if let TypeKind::FutureOr(inner) = t_kind {
                return self.subtype(s, s_env, inner, t_env);
            }
            return self.is_null(t)
                || matches!(t_kind, TypeKind::Nullable(_) | TypeKind::Legacy(_));
        }

        // Any generic parameter is an `Object`, whatever its bound.
        if t == self.core.object {
            return match s_kind {
                TypeKind::FutureOr(inner) | TypeKind::Legacy(inner) => {
                    self.subtype(inner, s_env, t, t_env)
                }
                TypeKind::Nullable(_) => false,
                _ => true,
            };
        }

        if let TypeKind::Legacy(inner) = s_kind {
            return self.subtype(inner, s_env, t, t_env);
        }
        if let TypeKind::Legacy(inner) = t_kind {
            let widened = self.nullable_of_legacy(t, inner);
            return self.subtype(s, s_env, widened, t_env);
        }

        if let TypeKind::FutureOr(inner) = s_kind {
            if !self.subtype(inner, s_env, t, t_env) {
                return false;
            }
            let future = self.future_of_future_or(s, inner);
            return self.subtype(future, s_env, t, t_env);
        }

        if let TypeKind::Nullable(inner) = s_kind {
            let null = self.core.null;
            return self.subtype(null, s_env, t, t_env) && self.subtype(inner, s_env, t, t_env);
        }

        if let TypeKind::FutureOr(inner) = t_kind {
            if self.subtype(s, s_env, inner, t_env) {
                return true;
            }
            let future = self.future_of_future_or(t, inner);
            return self.subtype(s, s_env, future, t_env);
        }

        if let TypeKind::Nullable(inner) = t_kind {
            let null = self.core.null;
            return self.subtype(s, s_env, null, t_env) || self.subtype(s, s_env, inner, t_env);
        }

        if matches!(s_kind, TypeKind::GenericParameter(_)) {
            return false;
        }

        if s_kind.is_function() && t == self.core.function {
            return true;
        }
        if matches!(s_kind, TypeKind::Record { .. }) && t == self.core.record {
            return true;
        }

        match (s_kind, t_kind) {
            (
                TypeKind::GenericFunction {
                    body: s_body,
                    bounds: s_bounds,
                },
                TypeKind::GenericFunction {
                    body: t_body,
                    bounds: t_bounds,
                },
            ) => {
                if s_bounds.len() != t_bounds.len() {
                    return false;
                }
                let s_env: Vec<TypeId> = s_bounds.iter().chain(s_env).copied().collect();
                let t_env: Vec<TypeId> = t_bounds.iter().chain(t_env).copied().collect();
                for (&s_bound, &t_bound) in s_bounds.iter().zip(&t_bounds) {
                    if !self.subtype(s_bound, &s_env, t_bound, &t_env)
                        || !self.subtype(t_bound, &t_env, s_bound, &s_env)
                    {
                        return false;
                    }
                }
                self.function_subtype(s_body, &s_env, t_body, &t_env)
            }
            (TypeKind::Function { .. }, TypeKind::Function { .. }) => {
                self.function_subtype(s, s_env, t, t_env)
            }
            (TypeKind::Interface { .. }, TypeKind::Interface { .. }) => {
                self.interface_subtype(s, s_env, t, t_env)
            }
            (
                TypeKind::Record {
                    shape: s_shape,
                    fields: s_fields,
                },
                TypeKind::Record {
                    shape: t_shape,
                    fields: t_fields,
                },
            ) => {
                s_shape == t_shape
                    && s_fields.len() == t_fields.len()
                    && s_fields
                        .iter()
                        .zip(&t_fields)
                        .all(|(&sf, &tf)| self.subtype(sf, s_env, tf, t_env))
            }
            _ => false,
        }
    }

    fn function_subtype(
        &mut self,
        s: TypeId,
        s_env: &[TypeId],
        t: TypeId,
        t_env: &[TypeId],
    ) -> bool {
        let TypeKind::Function {
            ret: s_ret,
            params: s_params,
        } = self.kind(s).clone()
        else {
            return false;
        };
        let TypeKind::Function {
            ret: t_ret,
            params: t_params,
        } = self.kind(t).clone()
        else {
            return false;
        };

        if !self.subtype(s_ret, s_env, t_ret, t_env) {
            return false;
        }
        self.params_subtype(&s_params, s_env, &t_params, t_env)
    }

    /// Parameters are contravariant: every argument `t` accepts must be
    /// acceptable to `s`.
    fn params_subtype(
        &mut self,
        s: &FunctionParams,
        s_env: &[TypeId],
        t: &FunctionParams,
        t_env: &[TypeId],
    ) -> bool {
        let s_required = s.required.len();
        let t_required = t.required.len();
        if s_required > t_required {
            return false;
        }
        if s_required + s.optional.len() < t_required + t.optional.len() {
            return false;
        }

        // `t`'s positional parameters line up with `s`'s required then optional ones.
        let s_positional = s.required.iter().chain(&s.optional);
        let t_positional = t.required.iter().chain(&t.optional);
        for (&sp, &tp) in s_positional.zip(t_positional) {
            if !self.subtype(tp, t_env, sp, s_env) {
                return false;
            }
        }

        let mut s_named = s.named.iter();
        for t_param in &t.named {
            loop {
                let Some(s_param) = s_named.next() else {
                    return false;
                };
                if t_param.name < s_param.name {
                    return false;
                }
                if s_param.name < t_param.name {
                    if s_param.required {
                        return false;
                    }
                    continue;
                }
                if s_param.required && !t_param.required {
                    return false;
                }
                if !self.subtype(t_param.ty, t_env, s_param.ty, s_env) {
                    return false;
                }
                break;
            }
        }
        s_named.all(|param| !param.required)
    }

    fn interface_subtype(
        &mut self,
        s: TypeId,
        s_env: &[TypeId],
        t: TypeId,
        t_env: &[TypeId],
    ) -> bool {
        let (Some(s_name), Some(t_name)) = (self.interface_name(s), self.interface_name(t)) else {
            return false;
        };
        let mut name = s_name.to_string();
        let t_name = t_name.to_string();
        let t_args = self.interface_args(t).to_vec();

        for _ in 0..=self.rules.len() {
            if name == t_name {
                let s_args = self.interface_args(s).to_vec();
                return self.args_subtype(&t_name, &s_args, s_env, &t_args, t_env);
            }
            let recipes = match self.rules.get(&name) {
                None => return false,
                Some(RuleEntry::Redirect(target)) => {
                    name = target.clone();
                    continue;
                }
                Some(RuleEntry::Interface(rule)) => {
                    match rule.supertypes.get(&t_name) {
                        Some(recipes) => recipes.clone(),
                        None => return false,
                    }
                }
            };
            let s_args: Vec<TypeId> = recipes
                .iter()
                .map(|recipe| self.ensure_rule_eval(s, recipe))
                .collect();
            return self.args_subtype(&t_name, &s_args, s_env, &t_args, t_env);
        }
        false
    }

    fn args_subtype(
        &mut self,
        head: &str,
        s_args: &[TypeId],
        s_env: &[TypeId],
        t_args: &[TypeId],
        t_env: &[TypeId],
    ) -> bool {
        if s_args.len() != t_args.len() {
            return false;
        }
        let variances = self.variances(head).map(<[Variance]>::to_vec);
        for (i, (&sa, &ta)) in s_args.iter().zip(t_args).enumerate() {
            let variance = variances
                .as_ref()
                .and_then(|v| v.get(i).copied())
                .unwrap_or(Variance::Covariant);
            let ok = match variance {
                Variance::LegacyCovariant | Variance::Covariant => {
                    self.subtype(sa, s_env, ta, t_env)
                }
                Variance::Contravariant => self.subtype(ta, t_env, sa, s_env),
                Variance::Invariant => {
                    self.subtype(sa, s_env, ta, t_env) && self.subtype(ta, t_env, sa, s_env)
                }
            };
            if !ok {
                return false;
            }
        }
        true
    }
}
