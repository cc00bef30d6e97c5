//! Value coercion and constraint checks
//!
//! Text inputs (path segments, query values) and JSON inputs (body fields)
//! are coerced into the declared kind first; constraints run on the coerced
//! value. Each field reports at most one error, except lists and nested
//! objects which report one per offending element.

use serde_json::{Map, Value};

use super::error::FieldError;
use super::field::{Constraints, FieldKind, FieldSpec, ModelSchema};

/// Extend a location path by one segment
pub fn loc_with(loc: &[Value], segment: impl Into<Value>) -> Vec<Value> {
    let mut next = loc.to_vec();
    next.push(segment.into());
    next
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// A parsed float must be finite; JSON has no spelling for NaN or infinities
fn finite(f: f64, loc: &[Value], input: Value) -> Result<Value, FieldError> {
    if f.is_finite() {
        Ok(Value::from(f))
    } else {
        Err(FieldError::new(
            "finite_number",
            loc.to_vec(),
            "Input should be a finite number",
            input,
        ))
    }
}

fn int_parsing(loc: &[Value], input: Value) -> FieldError {
    FieldError::new(
        "int_parsing",
        loc.to_vec(),
        "Input should be a valid integer, unable to parse string as an integer",
        input,
    )
}

fn float_parsing(loc: &[Value], input: Value) -> FieldError {
    FieldError::new(
        "float_parsing",
        loc.to_vec(),
        "Input should be a valid number, unable to parse string as a number",
        input,
    )
}

fn type_error(kind: &FieldKind, loc: &[Value], input: Value) -> FieldError {
    let (error_type, msg) = match kind {
        FieldKind::Integer => ("int_type", "Input should be a valid integer"),
        FieldKind::Float => ("float_type", "Input should be a valid number"),
        FieldKind::Text => ("string_type", "Input should be a valid string"),
        FieldKind::IntegerList => ("list_type", "Input should be a valid list"),
        FieldKind::Object(_) => return object_type_error(loc, input),
    };
    FieldError::new(error_type, loc.to_vec(), msg, input)
}

/// Error for a body (or nested body field) that is not a JSON object
pub fn object_type_error(loc: &[Value], input: Value) -> FieldError {
    FieldError::new(
        "model_attributes_type",
        loc.to_vec(),
        "Input should be a valid dictionary or object to extract fields from",
        input,
    )
}

/// Coerce one path segment or query value
pub fn from_text(kind: &FieldKind, raw: &str, loc: &[Value]) -> Result<Value, FieldError> {
    match kind {
        FieldKind::Integer => parse_int(raw)
            .map(Value::from)
            .ok_or_else(|| int_parsing(loc, Value::from(raw))),
        FieldKind::Float => parse_float(raw)
            .ok_or_else(|| float_parsing(loc, Value::from(raw)))
            .and_then(|f| finite(f, loc, Value::from(raw))),
        FieldKind::Text => Ok(Value::from(raw)),
        FieldKind::IntegerList | FieldKind::Object(_) => {
            Err(type_error(kind, loc, Value::from(raw)))
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn json_int(value: &Value, loc: &[Value]) -> Result<Value, FieldError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(FieldError::new(
                    "int_from_float",
                    loc.to_vec(),
                    "Input should be a valid integer, got a number with a fractional part",
                    value.clone(),
                )),
                Some(f) if f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(Value::from(f as i64))
                }
                _ => Err(FieldError::new(
                    "int_parsing_size",
                    loc.to_vec(),
                    "Unable to parse input string as an integer, exceeded maximum size",
                    value.clone(),
                )),
            }
        }
        Value::String(s) => parse_int(s)
            .map(Value::from)
            .ok_or_else(|| int_parsing(loc, value.clone())),
        other => Err(type_error(&FieldKind::Integer, loc, other.clone())),
    }
}

fn json_float(value: &Value, loc: &[Value]) -> Result<Value, FieldError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| type_error(&FieldKind::Float, loc, value.clone()))
            .and_then(|f| finite(f, loc, value.clone())),
        Value::String(s) => parse_float(s)
            .ok_or_else(|| float_parsing(loc, value.clone()))
            .and_then(|f| finite(f, loc, value.clone())),
        other => Err(type_error(&FieldKind::Float, loc, other.clone())),
    }
}

/// Coerce one JSON value, recursing into lists and objects
///
/// Returns `None` after pushing at least one error.
pub fn from_json(
    kind: &FieldKind,
    value: &Value,
    loc: &[Value],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let scalar = match kind {
        FieldKind::Integer => json_int(value, loc),
        FieldKind::Float => json_float(value, loc),
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(type_error(kind, loc, other.clone())),
        },
        FieldKind::IntegerList => {
            let Value::Array(items) = value else {
                errors.push(type_error(kind, loc, value.clone()));
                return None;
            };
            let before = errors.len();
            let coerced: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match json_int(item, &loc_with(loc, i)) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        errors.push(e);
                        None
                    }
                })
                .collect();
            return (errors.len() == before).then_some(Value::Array(coerced));
        }
        FieldKind::Object(schema) => return model(schema, value, loc, errors),
    };
    match scalar {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

/// Validate a JSON value against a model schema
pub fn model(
    schema: &ModelSchema,
    value: &Value,
    loc: &[Value],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match value {
        Value::Object(map) => object_fields(&schema.fields, map, loc, value, errors),
        other => {
            errors.push(object_type_error(loc, other.clone()));
            None
        }
    }
}

/// Validate every declared field of a JSON object
///
/// All fields are visited even after a failure so the caller sees every
/// violation. Undeclared keys are ignored.
pub fn object_fields(
    fields: &[FieldSpec],
    map: &Map<String, Value>,
    loc: &[Value],
    whole: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let before = errors.len();
    let mut out = Map::new();
    for field in fields {
        if let Some(v) = json_field(field, map, loc, whole, errors) {
            out.insert(field.name.to_string(), v);
        }
    }
    (errors.len() == before).then_some(Value::Object(out))
}

fn json_field(
    field: &FieldSpec,
    map: &Map<String, Value>,
    loc: &[Value],
    whole: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let field_loc = loc_with(loc, field.name);
    match map.get(field.name) {
        None if field.required => {
            errors.push(FieldError::missing(field_loc, whole.clone()));
            None
        }
        None => Some(field.absent_value()),
        Some(Value::Null) if !field.required => Some(Value::Null),
        Some(raw) => {
            let coerced = from_json(&field.kind, raw, &field_loc, errors)?;
            if let Some(e) = check(&field.constraints, &coerced, &field_loc, raw) {
                errors.push(e);
                return None;
            }
            Some(coerced)
        }
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Check a coerced value against its constraint descriptor
///
/// Returns the first violated constraint. `input` is the raw value echoed
/// back in the error.
pub fn check(
    constraints: &Constraints,
    value: &Value,
    loc: &[Value],
    input: &Value,
) -> Option<FieldError> {
    if constraints.is_empty() {
        return None;
    }
    let fail = |error_type, msg: String| {
        Some(FieldError::new(error_type, loc.to_vec(), msg, input.clone()))
    };

    match value {
        Value::String(s) => {
            let len = s.chars().count();
            if let Some(min) = constraints.min_length.filter(|min| len < *min) {
                return fail(
                    "string_too_short",
                    format!("String should have at least {}", plural(min, "character")),
                );
            }
            if let Some(max) = constraints.max_length.filter(|max| len > *max) {
                return fail(
                    "string_too_long",
                    format!("String should have at most {}", plural(max, "character")),
                );
            }
            if let Some(re) = constraints.pattern.as_ref().filter(|re| !re.is_match(s)) {
                return fail(
                    "string_pattern_mismatch",
                    format!("String should match pattern '{}'", re.as_str()),
                );
            }
            None
        }
        Value::Number(n) => {
            let x = n.as_f64()?;
            if let Some(b) = constraints.gt.filter(|b| x <= *b) {
                return fail("greater_than", format!("Input should be greater than {b}"));
            }
            if let Some(b) = constraints.ge.filter(|b| x < *b) {
                return fail(
                    "greater_than_equal",
                    format!("Input should be greater than or equal to {b}"),
                );
            }
            if let Some(b) = constraints.lt.filter(|b| x >= *b) {
                return fail("less_than", format!("Input should be less than {b}"));
            }
            if let Some(b) = constraints.le.filter(|b| x > *b) {
                return fail(
                    "less_than_equal",
                    format!("Input should be less than or equal to {b}"),
                );
            }
            None
        }
        Value::Array(items) => {
            let len = items.len();
            if let Some(min) = constraints.min_length.filter(|min| len < *min) {
                return fail(
                    "too_short",
                    format!(
                        "List should have at least {} after validation, not {len}",
                        plural(min, "item")
                    ),
                );
            }
            if let Some(max) = constraints.max_length.filter(|max| len > *max) {
                return fail(
                    "too_long",
                    format!(
                        "List should have at most {} after validation, not {len}",
                        plural(max, "item")
                    ),
                );
            }
            None
        }
        _ => None,
    }
}
