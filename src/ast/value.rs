//! Input values: AST literals as written in documents, and runtime values
//! produced by coercion.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use super::span::{Span, Spanned};

/// A literal value in a document.
///
/// Numeric literals keep their source text so that coercion can report the
/// value exactly as written and decide range errors itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A variable reference, `$name` (stored without the `$`).
    Variable(SmolStr),
    /// An integer literal.
    Int(SmolStr),
    /// A float literal.
    Float(SmolStr),
    /// A string or block string literal (already unescaped).
    String(String),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// An enum value name.
    Enum(SmolStr),
    /// A list literal.
    List(Vec<Spanned<Value>>),
    /// An input object literal, fields in source order.
    Object(Vec<ObjectField>),
}

/// One `name: value` entry of an input object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// The field name.
    pub name: Spanned<SmolStr>,
    /// The field value.
    pub value: Spanned<Value>,
    /// Span covering the whole entry.
    pub span: Span,
}

impl Value {
    /// Returns true for the `null` literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the variable name if this is a variable reference.
    pub fn as_variable(&self) -> Option<&SmolStr> {
        match self {
            Value::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if the literal contains no variable references.
    pub fn is_const(&self) -> bool {
        match self {
            Value::Variable(_) => false,
            Value::List(items) => items.iter().all(|item| item.node.is_const()),
            Value::Object(fields) => fields.iter().all(|field| field.value.node.is_const()),
            _ => true,
        }
    }
}

fn write_graphql_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${name}"),
            Value::Int(raw) | Value::Float(raw) => f.write_str(raw),
            Value::String(value) => write_graphql_string(f, value),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Null => f.write_str("null"),
            Value::Enum(name) => f.write_str(name),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.node)?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name.node, field.value.node)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A fully resolved input value, the output of coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    /// `null`.
    Null,
    /// A 32-bit range integer is guaranteed only for `Int`; custom scalars may
    /// carry any `i64`.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// A boolean.
    Boolean(bool),
    /// An enum value name.
    Enum(SmolStr),
    /// A list.
    List(Vec<ConstValue>),
    /// An input object, keyed by field name.
    Object(BTreeMap<SmolStr, ConstValue>),
}

impl ConstValue {
    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    /// Converts a raw JSON value into a `ConstValue` without any type
    /// information. Strings stay strings; enum-ness is decided by coercion.
    ///
    /// JSON does not tell integers from floats, so an integral number such
    /// as `2.0` becomes `Int(2)`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConstValue::Null,
            serde_json::Value::Bool(b) => ConstValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConstValue::Int(i),
                None => {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        ConstValue::Int(f as i64)
                    } else {
                        ConstValue::Float(f)
                    }
                }
            },
            serde_json::Value::String(s) => ConstValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                ConstValue::List(items.iter().map(ConstValue::from_json).collect())
            }
            serde_json::Value::Object(map) => ConstValue::Object(
                map.iter()
                    .map(|(k, v)| (SmolStr::new(k), ConstValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into JSON, e.g. for handing coerced variables to an
    /// executor that speaks JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConstValue::Null => serde_json::Value::Null,
            ConstValue::Int(i) => serde_json::Value::from(*i),
            ConstValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConstValue::String(s) => serde_json::Value::String(s.clone()),
            ConstValue::Boolean(b) => serde_json::Value::Bool(*b),
            ConstValue::Enum(name) => serde_json::Value::String(name.to_string()),
            ConstValue::List(items) => {
                serde_json::Value::Array(items.iter().map(ConstValue::to_json).collect())
            }
            ConstValue::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Int(i) => write!(f, "{i}"),
            ConstValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::String(s) => write_graphql_string(f, s),
            ConstValue::Boolean(b) => write!(f, "{b}"),
            ConstValue::Enum(name) => f.write_str(name),
            ConstValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConstValue::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
