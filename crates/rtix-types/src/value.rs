//! Runtime values seen by instance checks.

use std::any::Any;
use std::rc::Rc;

use crate::descriptor::TypeId;
use crate::universe::Universe;

/// A value that can be tested against a type.
///
/// Primitives, lists and records compare structurally; objects and closures
/// compare by identity.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Rc<str>),
    List(Rc<ListValue>),
    Object(Rc<ObjectValue>),
    Closure(Rc<ClosureValue>),
    Record(Rc<RecordValue>),
}

#[derive(Debug, PartialEq)]
pub struct ListValue {
    pub element: TypeId,
    pub items: Vec<Value>,
}

/// Class instance. The payload is opaque to the type system.
pub struct ObjectValue {
    pub rti: TypeId,
    pub payload: Option<Rc<dyn Any>>,
}

impl std::fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectValue")
            .field("rti", &self.rti)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct ClosureValue {
    pub signature: TypeId,
    pub name: String,
}

/// Record instance. Positional fields come first, then the named fields in
/// `shape` order.
#[derive(Debug, PartialEq)]
pub struct RecordValue {
    pub shape: String,
    pub fields: Vec<Value>,
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn list(element: TypeId, items: Vec<Value>) -> Self {
        Value::List(Rc::new(ListValue { element, items }))
    }

    pub fn object(rti: TypeId) -> Self {
        Value::Object(Rc::new(ObjectValue { rti, payload: None }))
    }

    pub fn object_with(rti: TypeId, payload: Rc<dyn Any>) -> Self {
        Value::Object(Rc::new(ObjectValue {
            rti,
            payload: Some(payload),
        }))
    }

    pub fn closure(signature: TypeId, name: impl Into<String>) -> Self {
        Value::Closure(Rc::new(ClosureValue {
            signature,
            name: name.into(),
        }))
    }

    pub fn record(shape: impl Into<String>, fields: Vec<Value>) -> Self {
        Value::Record(Rc::new(RecordValue {
            shape: shape.into(),
            fields,
        }))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Opaque payload of an object value.
    pub fn payload(&self) -> Option<&Rc<dyn Any>> {
        match self {
            Value::Object(object) => object.payload.as_ref(),
            _ => None,
        }
    }

    /// Converts decoded JSON: arrays become `List<dynamic>`, objects become
    /// records with one named field per key.
    pub fn from_json(universe: &Universe, json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => Value::list(
                universe.dynamic(),
                items.iter().map(|item| Value::from_json(universe, item)).collect(),
            ),
            serde_json::Value::Object(map) => {
                let shape = map.keys().cloned().collect::<Vec<_>>().join(",");
                let fields = map
                    .values()
                    .map(|item| Value::from_json(universe, item))
                    .collect();
                Value::record(shape, fields)
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}
