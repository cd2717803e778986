//! Codegen tables: type rules, erased types, variances and display names.
//!
//! Type rules are keyed by interface name. An entry is either a redirect to
//! another name or a rule listing, for every supertype, the recipes of the
//! supertype's arguments (evaluated with the subtype as environment), plus
//! recipes for the class's named type variables.
//!
//! ```json
//! {
//!   "JSArray": "List",
//!   "List": { "Iterable": ["1"], "Object": [], "List.E": "1" }
//! }
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::descriptor::{TypeId, Variance};
use crate::error::{InternalError, RulesError};
use crate::universe::{Universe, names};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleEntry {
    /// The name is an alias whose rule lives under another name.
    Redirect(String),
    Interface(InterfaceRule),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceRule {
    /// Supertype name to its argument recipes.
    pub supertypes: IndexMap<String, Vec<String>>,
    /// Named type variable (`List.E`) to its recipe.
    pub type_variables: IndexMap<String, String>,
}

impl InterfaceRule {
    pub fn supertype(mut self, name: &str, args: &[&str]) -> Self {
        self.supertypes
            .insert(name.to_string(), args.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn type_variable(mut self, name: &str, recipe: &str) -> Self {
        self.type_variables
            .insert(name.to_string(), recipe.to_string());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Redirect(String),
    Interface(IndexMap<String, RawField>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Supertype(Vec<String>),
    TypeVariable(String),
}

impl From<RawEntry> for RuleEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Redirect(target) => RuleEntry::Redirect(target),
            RawEntry::Interface(fields) => {
                let mut rule = InterfaceRule::default();
                for (key, field) in fields {
                    match field {
                        RawField::Supertype(args) => {
                            rule.supertypes.insert(key, args);
                        }
                        RawField::TypeVariable(recipe) => {
                            rule.type_variables.insert(key, recipe);
                        }
                    }
                }
                RuleEntry::Interface(rule)
            }
        }
    }
}

/// Interface name to rule entry.
#[derive(Debug, Default)]
pub struct TypeRules {
    entries: HashMap<String, RuleEntry>,
}

impl TypeRules {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.get(name)
    }

    /// Replaces any existing entry for `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: RuleEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// The rule for `name`, following redirects.
    pub fn resolve(&self, name: &str) -> Option<&InterfaceRule> {
        let mut name = name;
        for _ in 0..=self.entries.len() {
            match self.entries.get(name)? {
                RuleEntry::Redirect(target) => name = target,
                RuleEntry::Interface(rule) => return Some(rule),
            }
        }
        None
    }

    pub fn type_variable(&self, class: &str, variable: &str) -> Option<&str> {
        self.resolve(class)?
            .type_variables
            .get(variable)
            .map(String::as_str)
    }

    /// Whether instances of `class` implement `head`, ignoring type arguments.
    pub fn implements(&self, class: &str, head: &str) -> bool {
        let mut name = class;
        for _ in 0..=self.entries.len() {
            if name == head {
                return true;
            }
            match self.entries.get(name) {
                Some(RuleEntry::Redirect(target)) => name = target,
                Some(RuleEntry::Interface(rule)) => return rule.supertypes.contains_key(head),
                None => return false,
            }
        }
        false
    }

    /// Merges a JSON rule table, returning the number of entries read.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, RulesError> {
        let raw: IndexMap<String, RawEntry> = serde_json::from_str(json)?;
        let count = raw.len();
        for (name, entry) in raw {
            self.entries.insert(name, entry.into());
        }
        Ok(count)
    }

    pub(crate) fn seed_builtins(&mut self) {
        let number = InterfaceRule::default().supertype(names::NUM, &[]);
        self.insert(names::INT, RuleEntry::Interface(number.clone()));
        self.insert(names::DOUBLE, RuleEntry::Interface(number));
        self.insert(
            names::LIST,
            RuleEntry::Interface(
                InterfaceRule::default()
                    .supertype(names::ITERABLE, &["1"])
                    .type_variable("List.E", "1"),
            ),
        );
        self.insert(
            names::ITERABLE,
            RuleEntry::Interface(InterfaceRule::default().type_variable("Iterable.E", "1")),
        );
        self.insert(
            names::FUTURE,
            RuleEntry::Interface(InterfaceRule::default().type_variable("Future.T", "1")),
        );
    }
}

impl Universe {
    pub fn rules(&self) -> &TypeRules {
        &self.rules
    }

    pub fn add_rule(&mut self, name: impl Into<String>, entry: RuleEntry) {
        self.rules.insert(name, entry);
        self.invalidate_answers();
    }

    /// Merges a JSON type-rule table.
    pub fn add_rules_json(&mut self, json: &str) -> Result<usize, RulesError> {
        let count = self.rules.merge_json(json)?;
        tracing::debug!(count, "loaded type rules");
        self.invalidate_answers();
        Ok(count)
    }

    pub fn add_erased_type(&mut self, name: impl Into<String>, arity: usize) {
        self.erased.insert(name.into(), arity);
    }

    /// Merges a JSON table of erased class names to type-argument counts.
    pub fn add_erased_types_json(&mut self, json: &str) -> Result<usize, RulesError> {
        let raw: IndexMap<String, usize> = serde_json::from_str(json)?;
        let count = raw.len();
        self.erased.extend(raw);
        tracing::debug!(count, "loaded erased types");
        Ok(count)
    }

    pub fn add_variances(&mut self, name: impl Into<String>, variances: Vec<Variance>) {
        self.variances.insert(name.into(), variances);
        self.invalidate_answers();
    }

    /// Merges a JSON table of class names to variance codes
    /// (0 legacy covariant, 1 covariant, 2 contravariant, 3 invariant).
    pub fn add_variances_json(&mut self, json: &str) -> Result<usize, RulesError> {
        let raw: IndexMap<String, Vec<u8>> = serde_json::from_str(json)?;
        let count = raw.len();
        for (name, codes) in raw {
            let variances = codes
                .iter()
                .map(|&code| {
                    Variance::from_u8(code).ok_or_else(|| RulesError::UnknownVariance {
                        name: name.clone(),
                        code,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.variances.insert(name, variances);
        }
        tracing::debug!(count, "loaded variances");
        self.invalidate_answers();
        Ok(count)
    }

    pub fn variances(&self, name: &str) -> Option<&[Variance]> {
        self.variances.get(name).map(Vec::as_slice)
    }

    /// Registers human readable names for minified interface names.
    pub fn add_display_names<I, K, V>(&mut self, names: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.display_names
            .extend(names.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// `name<#, ..>` with the arity recorded for an erased class; a plain
    /// recipe lookup for anything else.
    pub fn find_erased_type(&mut self, name: &str) -> Result<TypeId, InternalError> {
        match self.erased.get(name).copied() {
            Some(arity) => {
                let args = vec![self.core.erased; arity];
                Ok(self.interface(name, args))
            }
            None => self.parse(name),
        }
    }

    /// Drops memoized subtype answers and predicates after a table changed.
    fn invalidate_answers(&mut self) {
        for descriptor in &mut self.types {
            descriptor.cache.subtype.clear();
            descriptor.cache.eval.clear();
            descriptor.cache.predicate = None;
        }
    }
}
