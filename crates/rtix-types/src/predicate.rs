//! Instance checks.
//!
//! Each type compiles once into a `Predicate` specialized for its shape, so
//! the common checks (`is int`, `is String?`, `is List`) never reach the
//! subtype engine.

use rtix_core::Symbol;

use crate::descriptor::{TypeId, TypeKind, Variance};
use crate::error::TypeError;
use crate::universe::Universe;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Top types.
    Always,
    /// `Object`
    NonNull,
    /// `Never`
    Never,
    Nullable(TypeId),
    FutureOr {
        inner: TypeId,
        future: TypeId,
    },
    /// Integral numbers, including integral doubles.
    Int,
    Number,
    String,
    Bool,
    /// Interface whose arguments are all top: a class-implements test.
    Implements {
        target: TypeId,
        head: Symbol,
        accepts_null: bool,
    },
    Record {
        shape: String,
        fields: Vec<TypeId>,
    },
    /// Full subtype check of the value's runtime type.
    Subtype {
        target: TypeId,
        accepts_null: bool,
    },
}

impl Predicate {
    pub fn test(&self, universe: &mut Universe, value: &Value) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::NonNull => !value.is_null(),
            Predicate::Never => false,
            Predicate::Nullable(inner) => value.is_null() || universe.is_instance(value, *inner),
            Predicate::FutureOr { inner, future } => {
                universe.is_instance(value, *inner) || universe.is_instance(value, *future)
            }
            Predicate::Int => match value {
                Value::Int(_) => true,
                Value::Double(x) => x.floor() == *x,
                _ => false,
            },
            Predicate::Number => matches!(value, Value::Int(_) | Value::Double(_)),
            Predicate::String => matches!(value, Value::Str(_)),
            Predicate::Bool => matches!(value, Value::Bool(_)),
            Predicate::Implements {
                target,
                head,
                accepts_null,
            } => {
                if value.is_null() {
                    return *accepts_null;
                }
                let observed = universe.runtime_type(value);
                match universe.interface_name(observed) {
                    Some(class) => universe.rules.implements(class, universe.name(*head)),
                    None => universe.is_subtype(observed, *target),
                }
            }
            Predicate::Record { shape, fields } => {
                let Value::Record(record) = value else {
                    return false;
                };
                record.shape == *shape
                    && record.fields.len() == fields.len()
                    && record
                        .fields
                        .iter()
                        .zip(fields)
                        .all(|(field, &ty)| universe.is_instance(field, ty))
            }
            Predicate::Subtype {
                target,
                accepts_null,
            } => {
                if value.is_null() {
                    return *accepts_null;
                }
                let observed = universe.runtime_type(value);
                universe.is_subtype(observed, *target)
            }
        }
    }
}

impl Universe {
    /// The instance-check predicate for `ty`, compiled on first use.
    pub fn compile_predicate(&mut self, ty: TypeId) -> Predicate {
        if let Some(predicate) = &self.types[ty.index()].cache.predicate {
            return predicate.clone();
        }
        let predicate = self.build_predicate(ty);
        tracing::trace!(recipe = self.recipe(ty), ?predicate, "compiled predicate");
        self.types[ty.index()].cache.predicate = Some(predicate.clone());
        predicate
    }

    fn build_predicate(&mut self, ty: TypeId) -> Predicate {
        if ty == self.core.object {
            return Predicate::NonNull;
        }
        if self.is_top_or_legacy_object(ty) {
            return Predicate::Always;
        }
        match *self.kind(ty) {
            TypeKind::Nullable(inner) => return Predicate::Nullable(inner),
            TypeKind::Never => return Predicate::Never,
            _ => {}
        }

        let base = match *self.kind(ty) {
            TypeKind::Legacy(inner) => inner,
            _ => ty,
        };
        if let TypeKind::FutureOr(inner) = *self.kind(base) {
            let future = self.future_of_future_or(base, inner);
            return Predicate::FutureOr { inner, future };
        }
        if base == self.core.int {
            return Predicate::Int;
        }
        if base == self.core.double || base == self.core.num {
            return Predicate::Number;
        }
        if base == self.core.string {
            return Predicate::String;
        }
        if base == self.core.bool {
            return Predicate::Bool;
        }

        let accepts_null = self.accepts_null(ty);
        match self.kind(base) {
            TypeKind::Interface { name, args }
                if args.iter().all(|&arg| self.is_top_or_legacy_object(arg))
                    && self.all_covariant(self.name(*name), args.len()) =>
            {
                Predicate::Implements {
                    target: base,
                    head: *name,
                    accepts_null,
                }
            }
            TypeKind::Record { shape, fields } => Predicate::Record {
                shape: shape.clone(),
                fields: fields.clone(),
            },
            _ => Predicate::Subtype {
                target: ty,
                accepts_null,
            },
        }
    }

    /// Whether no argument position of `head` is declared contra- or
    /// invariant. Only then does a top argument admit every instance.
    fn all_covariant(&self, head: &str, arity: usize) -> bool {
        self.variances(head).is_none_or(|variances| {
            variances.iter().take(arity).all(|variance| {
                matches!(variance, Variance::Covariant | Variance::LegacyCovariant)
            })
        })
    }

    pub fn is_instance(&mut self, value: &Value, ty: TypeId) -> bool {
        self.compile_predicate(ty).test(self, value)
    }

    /// Returns `value` unchanged when it is an instance of `ty`.
    pub fn cast(&mut self, value: Value, ty: TypeId) -> Result<Value, TypeError> {
        if self.is_instance(&value, ty) {
            return Ok(value);
        }
        let observed = self.runtime_type(&value);
        Err(TypeError {
            value: self.describe_value(&value),
            observed: self.display(observed),
            expected: self.display(ty),
        })
    }

    pub fn runtime_type(&mut self, value: &Value) -> TypeId {
        match value {
            Value::Null => self.core.null,
            Value::Bool(_) => self.core.bool,
            Value::Int(_) => self.core.int,
            Value::Double(_) => self.core.double,
            Value::Str(_) => self.core.string,
            Value::List(list) => self.list(list.element),
            Value::Object(object) => object.rti,
            Value::Closure(closure) => closure.signature,
            Value::Record(record) => {
                let fields = record
                    .fields
                    .iter()
                    .map(|field| self.runtime_type(field))
                    .collect();
                self.record(&record.shape, fields)
            }
        }
    }
}
