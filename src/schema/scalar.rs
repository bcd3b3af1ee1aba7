//! Built-in scalar parse functions.

use std::sync::Arc;

use crate::ast::ConstValue;

use super::meta::ScalarParseFn;

/// Names of the scalars every schema defines.
pub const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// Returns the parse function of a built-in scalar.
pub fn builtin_parse_fn(name: &str) -> Option<ScalarParseFn> {
    let parse: fn(&ConstValue) -> Result<ConstValue, String> = match name {
        "Int" => parse_int,
        "Float" => parse_float,
        "String" => parse_string,
        "Boolean" => parse_boolean,
        "ID" => parse_id,
        _ => return None,
    };
    Some(Arc::new(parse))
}

/// Parse function for custom scalars without a registered one: any value is
/// accepted as is.
pub fn identity_parse_fn() -> ScalarParseFn {
    Arc::new(|value: &ConstValue| Ok(value.clone()))
}

fn parse_int(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Int(i) if i32::try_from(*i).is_ok() => Ok(ConstValue::Int(*i)),
        ConstValue::Int(i) => Err(format!("Int cannot represent non 32-bit signed integer value: {i}")),
        other => Err(format!("Int cannot represent non-integer value: {other}")),
    }
}

fn parse_float(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Int(i) => Ok(ConstValue::Float(*i as f64)),
        ConstValue::Float(f) if f.is_finite() => Ok(ConstValue::Float(*f)),
        other => Err(format!("Float cannot represent non numeric value: {other}")),
    }
}

fn parse_string(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(s) => Ok(ConstValue::String(s.clone())),
        other => Err(format!("String cannot represent a non string value: {other}")),
    }
}

fn parse_boolean(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::Boolean(b) => Ok(ConstValue::Boolean(*b)),
        other => Err(format!("Boolean cannot represent a non boolean value: {other}")),
    }
}

fn parse_id(value: &ConstValue) -> Result<ConstValue, String> {
    match value {
        ConstValue::String(s) => Ok(ConstValue::String(s.clone())),
        ConstValue::Int(i) => Ok(ConstValue::String(i.to_string())),
        other => Err(format!("ID cannot represent value: {other}")),
    }
}
