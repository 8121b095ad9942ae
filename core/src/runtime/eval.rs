#![deny(missing_docs)]

//! # Expression Evaluator
//!
//! Evaluates conversion expressions with the semantics of the emitted Dart code:
//! casts are checked, enum lookups are total or fatal, and a presence guard never
//! evaluates its body for an absent value.
//!
//! Every conversion node evaluated is counted, so callers can assert that a path did
//! (or did not) run a conversion.

use crate::ir::decl::JSON_BINDING;
use crate::ir::{CastTarget, ClassDecl, Direction, EnumDecl, Expr, Program};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::value::Value;
use crate::types::Primitive;
use indexmap::IndexMap;
use std::cell::Cell;

/// Lexically scoped bindings.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    bindings: Vec<(String, Value)>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with one binding.
    pub fn with(name: &str, value: Value) -> Self {
        let mut scope = Self::new();
        scope.push(name, value);
        scope
    }

    /// Binds `name`, shadowing any outer binding.
    pub fn push(&mut self, name: &str, value: Value) {
        self.bindings.push((name.to_string(), value));
    }

    /// Drops the innermost binding.
    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    fn lookup(&self, name: &str) -> RuntimeResult<Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeError::Unbound(name.to_string()))
    }
}

/// Evaluates expressions against one program's declarations.
#[derive(Debug)]
pub struct Evaluator<'p> {
    program: &'p Program,
    conversions: Cell<usize>,
}

impl<'p> Evaluator<'p> {
    /// Creates an evaluator for `program`.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            conversions: Cell::new(0),
        }
    }

    /// The program being evaluated.
    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Conversion nodes evaluated so far.
    pub fn conversions(&self) -> usize {
        self.conversions.get()
    }

    /// Resets the conversion counter.
    pub fn reset(&self) {
        self.conversions.set(0);
    }

    /// Evaluates `expr` with `name` bound to `value`.
    pub fn eval_with(&self, expr: &Expr, name: &str, value: Value) -> RuntimeResult<Value> {
        self.eval(expr, &mut Scope::with(name, value))
    }

    /// Evaluates `expr` in `scope`.
    pub fn eval(&self, expr: &Expr, scope: &mut Scope) -> RuntimeResult<Value> {
        if expr.is_conversion() {
            self.conversions.set(self.conversions.get() + 1);
        }

        match expr {
            Expr::Var(name) => scope.lookup(name),
            Expr::Index { target, key } => self.eval(target, scope)?.get(key),
            Expr::IfPresent {
                value,
                binding,
                then,
            } => {
                let value = self.eval(value, scope)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }
                self.bound(scope, binding, value, |scope| self.eval(then, scope))
            }
            Expr::MapList {
                list,
                binding,
                element,
                ..
            } => match self.eval(list, scope)? {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| {
                        self.bound(scope, binding, item, |scope| self.eval(element, scope))
                    })
                    .collect::<RuntimeResult<Vec<_>>>()
                    .map(Value::List),
                other => Err(mismatch("List", &other)),
            },
            Expr::MapEntries {
                map,
                key_binding,
                value_binding,
                key,
                value,
                direction,
            } => match self.eval(map, scope)? {
                Value::Map(entries) => {
                    let mut out = Vec::with_capacity(entries.len());
                    for (k, v) in entries {
                        if *direction == Direction::Decode && !matches!(k, Value::Str(_)) {
                            return Err(mismatch("String key", &k));
                        }
                        scope.push(key_binding, k);
                        scope.push(value_binding, v);
                        let converted = self
                            .eval(key, scope)
                            .and_then(|k| Ok((k, self.eval(value, scope)?)));
                        scope.pop();
                        scope.pop();
                        out.push(converted?);
                    }
                    Ok(Value::Map(out))
                }
                other => Err(mismatch("Map", &other)),
            },
            Expr::Cast { value, target } => cast(self.eval(value, scope)?, target),
            Expr::EnumFromOrdinal { enum_name, value } => {
                let decl = self.enum_decl(enum_name)?;
                match self.eval(value, scope)? {
                    Value::Int(i) if i >= 0 && (i as usize) < decl.variants.len() => {
                        Ok(Value::Enum {
                            ty: enum_name.clone(),
                            ordinal: i as usize,
                        })
                    }
                    Value::Int(i) => Err(RuntimeError::OrdinalOutOfRange {
                        enum_name: enum_name.clone(),
                        ordinal: i,
                    }),
                    other => Err(mismatch("int", &other)),
                }
            }
            Expr::EnumToOrdinal { enum_name, value } => {
                let ordinal = self.variant_of(enum_name, self.eval(value, scope)?)?;
                Ok(Value::Int(ordinal as i64))
            }
            Expr::EnumFromWire { enum_name, value } => {
                let decl = self.enum_decl(enum_name)?;
                match self.eval(value, scope)? {
                    Value::Str(wire) => decl
                        .variants
                        .iter()
                        .position(|(_, w)| *w == wire)
                        .map(|ordinal| Value::Enum {
                            ty: enum_name.clone(),
                            ordinal,
                        })
                        .ok_or(RuntimeError::UnknownVariant {
                            enum_name: enum_name.clone(),
                            wire,
                        }),
                    other => Err(mismatch("String", &other)),
                }
            }
            Expr::EnumToWire { enum_name, value } => {
                let ordinal = self.variant_of(enum_name, self.eval(value, scope)?)?;
                let decl = self.enum_decl(enum_name)?;
                decl.variants
                    .get(ordinal)
                    .map(|(_, wire)| Value::Str(wire.clone()))
                    .ok_or(RuntimeError::OrdinalOutOfRange {
                        enum_name: enum_name.clone(),
                        ordinal: ordinal as i64,
                    })
            }
            Expr::ParseKey { primitive, value } => match self.eval(value, scope)? {
                Value::Str(key) => parse_key(*primitive, key),
                other => Err(mismatch("String", &other)),
            },
            Expr::FormatKey { value, .. } => format_key(self.eval(value, scope)?),
            Expr::DecodeClass { class, value } => {
                let wire = self.eval(value, scope)?;
                let fields = self.decode_fields(self.class_decl(class)?, wire)?;
                Ok(Value::Object {
                    ty: class.clone(),
                    fields,
                })
            }
            Expr::DecodeExtension {
                base,
                extension,
                value,
            } => {
                let wire = self.eval(value, scope)?;
                let fields = self.decode_fields(self.class_decl(base)?, wire)?;
                Ok(Value::Object {
                    ty: extension.clone(),
                    fields,
                })
            }
            Expr::EncodeObject { value } => match self.eval(value, scope)? {
                Value::Object { ty, fields } => {
                    let decl = match self.program.class_decl(&ty) {
                        Some(decl) => decl,
                        None => self
                            .program
                            .extension_base(&ty)
                            .ok_or(RuntimeError::UnknownDeclaration(ty))?,
                    };
                    self.encode_fields(decl, &fields)
                }
                other => Err(mismatch("class instance", &other)),
            },
        }
    }

    fn bound<T>(
        &self,
        scope: &mut Scope,
        name: &str,
        value: Value,
        body: impl FnOnce(&mut Scope) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        scope.push(name, value);
        let result = body(scope);
        scope.pop();
        result
    }

    fn enum_decl(&self, name: &str) -> RuntimeResult<&'p EnumDecl> {
        self.program
            .enum_decl(name)
            .ok_or_else(|| RuntimeError::UnknownDeclaration(name.to_string()))
    }

    fn class_decl(&self, name: &str) -> RuntimeResult<&'p ClassDecl> {
        self.program
            .class_decl(name)
            .ok_or_else(|| RuntimeError::UnknownDeclaration(name.to_string()))
    }

    /// The ordinal of a typed enum value, checked against the declared variants.
    fn variant_of(&self, enum_name: &str, value: Value) -> RuntimeResult<usize> {
        match value {
            Value::Enum { ty, ordinal } if ty == enum_name => {
                if ordinal < self.enum_decl(enum_name)?.variants.len() {
                    Ok(ordinal)
                } else {
                    Err(RuntimeError::OrdinalOutOfRange {
                        enum_name: ty,
                        ordinal: ordinal as i64,
                    })
                }
            }
            other => Err(mismatch(enum_name, &other)),
        }
    }

    /// `Class.fromJson(json)`: each field decoded from `json['<field>']`.
    fn decode_fields(
        &self,
        decl: &ClassDecl,
        wire: Value,
    ) -> RuntimeResult<IndexMap<String, Value>> {
        if !matches!(wire, Value::Map(_)) {
            return Err(mismatch("Map", &wire));
        }
        let mut scope = Scope::with(JSON_BINDING, wire);
        decl.fields
            .iter()
            .map(|f| Ok((f.name.clone(), self.eval(&f.decode, &mut scope)?)))
            .collect()
    }

    /// `instance.toJson()`: each field encoded under its own name.
    fn encode_fields(
        &self,
        decl: &ClassDecl,
        fields: &IndexMap<String, Value>,
    ) -> RuntimeResult<Value> {
        let mut out = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let current = fields.get(&field.name).cloned().unwrap_or(Value::Null);
            let encoded = self.eval_with(&field.encode, &field.name, current)?;
            out.push((Value::Str(field.name.clone()), encoded));
        }
        Ok(Value::Map(out))
    }
}

fn mismatch(expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind(),
    }
}

/// `x as T`. `double` accepts any number, as `(x as num).toDouble()` does.
fn cast(value: Value, target: &CastTarget) -> RuntimeResult<Value> {
    let primitive = match target {
        CastTarget::Opaque(name) => {
            return if value.is_null() {
                Err(mismatch(name, &value))
            } else {
                Ok(value)
            }
        }
        CastTarget::Primitive(p) => *p,
    };
    match (primitive, value) {
        (Primitive::Dynamic, v) => Ok(v),
        (Primitive::Int, v @ Value::Int(_)) => Ok(v),
        (Primitive::Double, Value::Int(i)) => Ok(Value::Double(i as f64)),
        (Primitive::Double, v @ Value::Double(_)) => Ok(v),
        (Primitive::Num, v @ (Value::Int(_) | Value::Double(_))) => Ok(v),
        (Primitive::Bool, v @ Value::Bool(_)) => Ok(v),
        (Primitive::String, v @ Value::Str(_)) => Ok(v),
        (Primitive::Object, v) if !v.is_null() => Ok(v),
        (p, v) => Err(mismatch(p.name(), &v)),
    }
}

fn parse_key(primitive: Primitive, key: String) -> RuntimeResult<Value> {
    let parsed = match primitive {
        Primitive::Int => key.parse::<i64>().ok().map(Value::Int),
        Primitive::Double => key.parse::<f64>().ok().map(Value::Double),
        Primitive::Num => key
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| key.parse::<f64>().map(Value::Double))
            .ok(),
        Primitive::Bool => Some(Value::Bool(key == "true")),
        Primitive::String => Some(Value::Str(key.clone())),
        Primitive::Dynamic | Primitive::Object => None,
    };
    parsed.ok_or(RuntimeError::KeyParse {
        key,
        ty: primitive.name().to_string(),
    })
}

/// `x.toString()`, with Dart's rendering of integral doubles (`1.0`).
fn format_key(value: Value) -> RuntimeResult<Value> {
    let text = match value {
        Value::Int(i) => i.to_string(),
        Value::Double(d) if d.is_finite() && d.fract() == 0.0 => format!("{:.1}", d),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => s,
        other => return Err(mismatch("scalar key", &other)),
    };
    Ok(Value::Str(text))
}
