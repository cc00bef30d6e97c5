//! Input validation module
//!
//! One routine validates every declared input of a route:
//! - Path segments and query values are coerced from text
//! - The JSON body is parsed once and checked against its model(s)
//! - Constraint descriptors (length, numeric bounds, pattern) run on the
//!   coerced values
//!
//! All violations are collected before returning; a handler only ever sees
//! a fully validated request.

mod coerce;
mod error;
mod field;

pub use error::{BindError, FieldError, ValidationErrors};
pub use field::{BodySpec, Constraints, FieldKind, FieldSpec, Location, ModelSchema, RouteInputs};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::logger;

/// Parsed query string, keeping repeated keys in order
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Self::default();
        };
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                logger::log_warning(&format!("Ignoring malformed query string '{query}': {e}"));
                return Self::default();
            }
        };
        let mut values: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            values.entry(key).or_default().push(value);
        }
        Self { values }
    }

    /// Every value supplied for `name`, in request order
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Last value supplied for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).last().map(String::as_str)
    }
}

/// Raw request inputs as seen by the validator
#[derive(Debug, Clone, Copy)]
pub struct RawInputs<'a> {
    /// Decoded path parameters captured by the route pattern
    pub path: &'a [(String, String)],
    pub query: &'a QueryParams,
    /// Request body bytes (empty when absent)
    pub body: &'a [u8],
}

impl RawInputs<'_> {
    fn path_value(&self, name: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Inputs that passed validation, ready to bind into handler types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    path: Map<String, Value>,
    query: Map<String, Value>,
    body: Value,
}

fn bind<T: DeserializeOwned>(
    location: Location,
    field: &str,
    value: Option<&Value>,
) -> Result<T, BindError> {
    T::deserialize(value.unwrap_or(&Value::Null)).map_err(|source| BindError {
        location: location.as_str(),
        field: field.to_string(),
        source,
    })
}

impl Validated {
    pub fn path<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindError> {
        bind(Location::Path, name, self.path.get(name))
    }

    pub fn query<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindError> {
        bind(Location::Query, name, self.query.get(name))
    }

    /// The whole body (a model, or the object of embedded parameters)
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        bind(Location::Body, "<body>", Some(&self.body))
    }

    /// One embedded body parameter
    pub fn body_field<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindError> {
        bind(Location::Body, name, self.body.get(name))
    }
}

fn base_loc(field: &FieldSpec) -> Vec<Value> {
    vec![Value::from(field.location.as_str()), Value::from(field.name)]
}

/// Validate a text-sourced field (path segment or query parameter)
fn text_field(field: &FieldSpec, values: &[&str], errors: &mut Vec<FieldError>) -> Option<Value> {
    let loc = base_loc(field);
    let Some(last) = values.last() else {
        if field.required {
            errors.push(FieldError::missing(loc, Value::Null));
            return None;
        }
        return Some(field.absent_value());
    };

    let (coerced, input) = if matches!(field.kind, FieldKind::IntegerList) {
        let before = errors.len();
        let mut items = Vec::with_capacity(values.len());
        for (i, raw) in values.iter().enumerate() {
            match coerce::from_text(&FieldKind::Integer, raw, &coerce::loc_with(&loc, i)) {
                Ok(v) => items.push(v),
                Err(e) => errors.push(e),
            }
        }
        if errors.len() != before {
            return None;
        }
        let input = values.iter().map(|v| Value::from(*v)).collect();
        (Value::Array(items), Value::Array(input))
    } else {
        match coerce::from_text(&field.kind, last, &loc) {
            Ok(v) => (v, Value::from(*last)),
            Err(e) => {
                errors.push(e);
                return None;
            }
        }
    };

    if let Some(e) = coerce::check(&field.constraints, &coerced, &loc, &input) {
        errors.push(e);
        return None;
    }
    Some(coerced)
}

/// Validate the request body against the route's body declaration
fn body_value(spec: &BodySpec, raw: &[u8], errors: &mut Vec<FieldError>) -> Option<Value> {
    let parsed = if raw.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<Value>(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                errors.push(FieldError::new(
                    "json_invalid",
                    vec![Value::from("body"), Value::from(e.column())],
                    "JSON decode error",
                    Value::Object(Map::new()),
                ));
                return None;
            }
        }
    };
    let loc = vec![Value::from("body")];

    match spec {
        BodySpec::Model { schema, required } => match (parsed, *required) {
            (None, true) => {
                errors.push(FieldError::missing(loc, Value::Null));
                None
            }
            (None | Some(Value::Null), false) => Some(Value::Null),
            (Some(value), _) => coerce::model(schema, &value, &loc, errors),
        },
        BodySpec::Embedded(fields) => {
            let whole = parsed.unwrap_or_else(|| Value::Object(Map::new()));
            match &whole {
                Value::Object(map) => coerce::object_fields(fields, map, &loc, &whole, errors),
                other => {
                    errors.push(coerce::object_type_error(&loc, other.clone()));
                    None
                }
            }
        }
    }
}

/// Validate every declared input of a route
///
/// Path and query fields are checked in declaration order, then the body.
/// On failure the error lists every violated field.
pub fn validate(inputs: &RouteInputs, raw: &RawInputs<'_>) -> Result<Validated, ValidationErrors> {
    let mut errors = Vec::new();
    let mut validated = Validated::default();

    for field in &inputs.params {
        match field.location {
            Location::Path => {
                let values: Vec<&str> = raw.path_value(field.name).into_iter().collect();
                if let Some(v) = text_field(field, &values, &mut errors) {
                    validated.path.insert(field.name.to_string(), v);
                }
            }
            Location::Query => {
                let values: Vec<&str> =
                    raw.query.get_all(field.name).iter().map(String::as_str).collect();
                if let Some(v) = text_field(field, &values, &mut errors) {
                    validated.query.insert(field.name.to_string(), v);
                }
            }
            // Registration keeps body fields out of `params`
            Location::Body => {}
        }
    }

    if let Some(spec) = &inputs.body {
        if let Some(body) = body_value(spec, raw.body, &mut errors) {
            validated.body = body;
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Truthiness for optional numbers: absent and zero are false
pub fn truthy<T>(value: Option<T>) -> Option<T>
where
    T: PartialEq + Default,
{
    value.filter(|v| *v != T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_schema() -> std::sync::Arc<ModelSchema> {
        ModelSchema::new(
            "Item",
            vec![
                FieldSpec::body("name", FieldKind::Text)
                    .constrained(Constraints::new().min_length(1)),
                FieldSpec::body("price", FieldKind::Float),
            ],
        )
    }

    fn run(
        inputs: &RouteInputs,
        path: &[(&str, &str)],
        query: &str,
        body: &str,
    ) -> Result<Validated, ValidationErrors> {
        let path: Vec<(String, String)> = path
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let query = QueryParams::parse(Some(query));
        validate(
            inputs,
            &RawInputs {
                path: &path,
                query: &query,
                body: body.as_bytes(),
            },
        )
    }

    #[test]
    fn test_query_params_repeated_and_decoded() {
        let q = QueryParams::parse(Some("friend_id=1&friend_id=2&q=hello%20world&x=a+b"));
        assert_eq!(q.get_all("friend_id"), ["1", "2"]);
        assert_eq!(q.get("friend_id"), Some("2"));
        assert_eq!(q.get("q"), Some("hello world"));
        assert_eq!(q.get("x"), Some("a b"));
        assert!(q.get_all("missing").is_empty());
        assert!(QueryParams::parse(None).get("q").is_none());
    }

    #[test]
    fn test_optional_query_defaults() {
        let inputs = RouteInputs {
            params: vec![
                FieldSpec::query("item_type", FieldKind::Text).with_default("Cloths"),
                FieldSpec::query("friend_id", FieldKind::IntegerList).optional(),
            ],
            body: None,
        };
        let v = run(&inputs, &[], "", "").unwrap();
        assert_eq!(v.query::<String>("item_type").unwrap(), "Cloths");
        assert_eq!(v.query::<Option<Vec<i64>>>("friend_id").unwrap(), None);
    }

    #[test]
    fn test_collects_errors_across_locations() {
        let inputs = RouteInputs {
            params: vec![
                FieldSpec::path("item_id", FieldKind::Integer)
                    .constrained(Constraints::new().gt(0.0).le(1000.0)),
                FieldSpec::query("item_type", FieldKind::Text)
                    .constrained(Constraints::new().min_length(1).max_length(5)),
            ],
            body: Some(BodySpec::Embedded(vec![
                FieldSpec::body("item", FieldKind::Object(item_schema())),
                FieldSpec::body("importance", FieldKind::Integer),
            ])),
        };
        let err = run(
            &inputs,
            &[("item_id", "0")],
            "item_type=toolong",
            r#"{"importance": 3}"#,
        )
        .unwrap_err();
        let locs: Vec<String> = err.errors().iter().map(FieldError::loc_display).collect();
        assert_eq!(locs, vec!["path.item_id", "query.item_type", "body.item"]);
        assert_eq!(err.errors()[2].error_type, "missing");
    }

    #[test]
    fn test_model_body_binding() {
        let inputs = RouteInputs {
            params: Vec::new(),
            body: Some(BodySpec::Model {
                schema: item_schema(),
                required: true,
            }),
        };
        let v = run(&inputs, &[], "", r#"{"name": "pen", "price": "2.5"}"#).unwrap();
        assert_eq!(v.body::<Value>().unwrap(), json!({"name": "pen", "price": 2.5}));

        let err = run(&inputs, &[], "", "").unwrap_err();
        assert_eq!(err.errors()[0].loc, vec![json!("body")]);
        assert_eq!(err.errors()[0].error_type, "missing");

        let err = run(&inputs, &[], "", "{not json").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].error_type, "json_invalid");
    }

    #[test]
    fn test_query_list_bad_member_location() {
        let inputs = RouteInputs {
            params: vec![FieldSpec::query("friend_id", FieldKind::IntegerList).optional()],
            body: None,
        };
        let err = run(&inputs, &[], "friend_id=1&friend_id=x", "").unwrap_err();
        assert_eq!(err.errors()[0].loc, vec![json!("query"), json!("friend_id"), json!(1)]);
        assert_eq!(err.errors()[0].input, json!("x"));
    }

    #[test]
    fn test_truthy() {
        assert_eq!(truthy(Some(0.0_f64)), None);
        assert_eq!(truthy(Some(1.5_f64)), Some(1.5));
        assert_eq!(truthy::<i64>(None), None);
        assert_eq!(truthy(Some(0_i64)), None);
    }
}
