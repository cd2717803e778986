//! Human readable rendering of types and values.

use crate::descriptor::{FunctionParams, TypeId, TypeKind};
use crate::universe::Universe;
use crate::value::Value;

impl Universe {
    /// Renders a type the way it would be written in source.
    ///
    /// Generic function parameters are named `T1`, `T2`, ... from the
    /// outermost binder inwards.
    pub fn display(&self, ty: TypeId) -> String {
        let mut generics = Vec::new();
        self.display_in(ty, &mut generics)
    }

    fn display_in(&self, ty: TypeId, generics: &mut Vec<String>) -> String {
        match self.kind(ty) {
            TypeKind::Erased => "erased".to_string(),
            TypeKind::Dynamic => "dynamic".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Never => "Never".to_string(),
            TypeKind::Any => "any".to_string(),
            TypeKind::Legacy(inner) => self.display_in(*inner, generics),
            TypeKind::Nullable(inner) => {
                let shown = self.display_in(*inner, generics);
                if self.kind(*inner).is_function() {
                    format!("({shown})?")
                } else {
                    format!("{shown}?")
                }
            }
            TypeKind::FutureOr(inner) => {
                format!("FutureOr<{}>", self.display_in(*inner, generics))
            }
            TypeKind::Interface { name, args } => {
                let name = self.names.resolve(*name);
                let name = self.display_names.get(name).map_or(name, String::as_str);
                if args.is_empty() {
                    return name.to_string();
                }
                let args: Vec<String> = args
                    .iter()
                    .map(|&arg| self.display_in(arg, generics))
                    .collect();
                format!("{name}<{}>", args.join(", "))
            }
            TypeKind::Record { shape, fields } => self.display_record(shape, fields, generics),
            TypeKind::Function { ret, params } => {
                self.display_function(*ret, params, &[], generics)
            }
            TypeKind::GenericFunction { body, bounds } => match self.kind(*body) {
                TypeKind::Function { ret, params } => {
                    self.display_function(*ret, params, bounds, generics)
                }
                _ => self.display_in(*body, generics),
            },
            TypeKind::GenericParameter(index) => {
                let index = *index as usize;
                match generics.len().checked_sub(index + 1) {
                    Some(slot) => generics[slot].clone(),
                    None => format!("{index}^"),
                }
            }
            TypeKind::Binding { .. } => "?".to_string(),
        }
    }

    fn display_function(
        &self,
        ret: TypeId,
        params: &FunctionParams,
        bounds: &[TypeId],
        generics: &mut Vec<String>,
    ) -> String {
        let outer = generics.len();
        let mut prefix = String::new();
        if !bounds.is_empty() {
            for n in (1..=bounds.len()).rev() {
                generics.push(format!("T{}", outer + n));
            }
            prefix.push('<');
            for (i, &bound) in bounds.iter().enumerate() {
                if i > 0 {
                    prefix.push_str(", ");
                }
                prefix.push_str(&generics[generics.len() - 1 - i]);
                if !self.is_top_or_legacy_object(bound) {
                    prefix.push_str(" extends ");
                    prefix.push_str(&self.display_in(bound, generics));
                }
            }
            prefix.push('>');
        }

        let required: Vec<String> = params
            .required
            .iter()
            .map(|&p| self.display_in(p, generics))
            .collect();
        let mut shown = required.join(", ");
        let sep = if params.required.is_empty() { "" } else { ", " };
        if !params.optional.is_empty() {
            let optional: Vec<String> = params
                .optional
                .iter()
                .map(|&p| self.display_in(p, generics))
                .collect();
            shown.push_str(&format!("{sep}[{}]", optional.join(", ")));
        }
        if !params.named.is_empty() {
            let named: Vec<String> = params
                .named
                .iter()
                .map(|p| {
                    let required = if p.required { "required " } else { "" };
                    format!("{required}{} {}", self.display_in(p.ty, generics), p.name)
                })
                .collect();
            shown.push_str(&format!("{sep}{{{}}}", named.join(", ")));
        }

        let ret = self.display_in(ret, generics);
        generics.truncate(outer);
        format!("{prefix}({shown}) => {ret}")
    }

    /// Positional fields first, then `{T name, ..}` for the named ones.
    fn display_record(&self, shape: &str, fields: &[TypeId], generics: &mut Vec<String>) -> String {
        let shown: Vec<String> = fields
            .iter()
            .map(|&field| self.display_in(field, generics))
            .collect();
        if shape.is_empty() {
            return format!("({})", shown.join(", "));
        }

        let names: Vec<&str> = shape.split(',').collect();
        let positional = fields.len().saturating_sub(names.len());
        let mut out = String::from("(");
        for (i, field) in shown.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if i == positional {
                out.push('{');
            }
            out.push_str(field);
            if i >= positional {
                out.push(' ');
                out.push_str(names[i - positional]);
            }
        }
        out.push_str("})");
        out
    }

    /// Short rendering of a value for error messages.
    pub fn describe_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Double(x) => format!("{x:?}"),
            Value::Str(s) => serde_json::to_string(&**s).unwrap_or_else(|_| s.to_string()),
            Value::List(list) => {
                let items: Vec<String> = list
                    .items
                    .iter()
                    .map(|item| self.describe_value(item))
                    .collect();
                format!("[{}]", items.join(", "))
            }
            Value::Object(object) => format!("Instance of '{}'", self.display(object.rti)),
            Value::Closure(closure) => format!("Closure '{}'", closure.name),
            Value::Record(record) => {
                let names: Vec<&str> = if record.shape.is_empty() {
                    Vec::new()
                } else {
                    record.shape.split(',').collect()
                };
                let positional = record.fields.len().saturating_sub(names.len());
                let fields: Vec<String> = record
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| {
                        let shown = self.describe_value(field);
                        if i < positional {
                            shown
                        } else {
                            format!("{}: {shown}", names[i - positional])
                        }
                    })
                    .collect();
                format!("({})", fields.join(", "))
            }
        }
    }
}
