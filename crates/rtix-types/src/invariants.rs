//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::descriptor::TypeId;
use crate::error::InternalError;
use crate::universe::Universe;

impl Universe {
    /// Evaluates a supertype recipe from the rule table during a subtype
    /// check, where a failure means the tables do not match the program.
    pub(crate) fn ensure_rule_eval(&mut self, env: TypeId, recipe: &str) -> TypeId {
        self.eval_in_env(env, recipe).unwrap_or_else(|err: InternalError| {
            panic!(
                "type rules: cannot evaluate {recipe:?} in {:?}: {err} \
                 (rule tables must be generated for this program)",
                self.recipe(env)
            )
        })
    }
}
