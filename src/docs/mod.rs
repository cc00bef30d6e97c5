//! Interface description module
//!
//! Generates an OpenAPI 3.1 document from the route table. Field
//! declarations supply parameter and body schemas, route metadata supplies
//! operation ids, summaries and tags. Routes marked hidden stay reachable
//! but are left out of the document.

mod openapi;

pub use openapi::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, Tag,
};

use indexmap::IndexMap;

use crate::config::DocsConfig;
use crate::logger;
use crate::routing::{Registry, Route};
use crate::validate::{BodySpec, FieldKind, FieldSpec, Location, ModelSchema};

const JSON: &str = "application/json";
const VALIDATION_ERROR: &str = "ValidationError";
const HTTP_VALIDATION_ERROR: &str = "HTTPValidationError";

/// `item_type` -> `Item Type`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    IndexMap::from([(JSON.to_string(), MediaType { schema })])
}

struct Generator {
    schemas: IndexMap<String, Schema>,
}

impl Generator {
    fn model(&mut self, model: &ModelSchema) -> Schema {
        if !self.schemas.contains_key(model.name) {
            let object = self.object(&model.fields).titled(model.name.to_string());
            self.schemas.insert(model.name.to_string(), object);
        }
        Schema::reference(model.name)
    }

    fn object(&mut self, fields: &[FieldSpec]) -> Schema {
        let mut object = Schema::of_type("object");
        for field in fields {
            if field.required {
                object.required.push(field.name.to_string());
            }
            let schema = self.field(field);
            object.properties.insert(field.name.to_string(), schema);
        }
        object
    }

    fn field(&mut self, field: &FieldSpec) -> Schema {
        let mut schema = match &field.kind {
            FieldKind::Integer => Schema::of_type("integer"),
            FieldKind::Float => Schema::of_type("number"),
            FieldKind::Text => Schema::of_type("string"),
            FieldKind::IntegerList => Schema {
                items: Some(Box::new(Schema::of_type("integer"))),
                ..Schema::of_type("array")
            },
            FieldKind::Object(model) => self.model(model),
        };

        let c = &field.constraints;
        if matches!(field.kind, FieldKind::IntegerList) {
            schema.min_items = c.min_length;
            schema.max_items = c.max_length;
        } else {
            schema.min_length = c.min_length;
            schema.max_length = c.max_length;
        }
        schema.pattern = c.pattern.as_ref().map(|re| re.as_str().to_string());
        schema.exclusive_minimum = c.gt;
        schema.minimum = c.ge;
        schema.exclusive_maximum = c.lt;
        schema.maximum = c.le;

        if !field.required && field.default.is_none() {
            schema = schema.nullable();
        }
        schema.default = field.default.clone();
        schema.description = field.description.map(ToString::to_string);
        schema.titled(title_case(field.name))
    }

    fn parameter(&mut self, field: &FieldSpec) -> Parameter {
        Parameter {
            name: field.name.to_string(),
            location: if field.location == Location::Path {
                ParameterIn::Path
            } else {
                ParameterIn::Query
            },
            required: field.required,
            description: field.description.map(ToString::to_string),
            schema: self.field(field),
        }
    }

    fn request_body(&mut self, route: &Route, body: &BodySpec) -> RequestBody {
        match body {
            BodySpec::Model { schema, required } => RequestBody {
                required: *required,
                content: json_content(self.model(schema)),
            },
            BodySpec::Embedded(fields) => {
                let name = format!("Body_{}", route.meta.operation_id);
                let object = self.object(fields).titled(name.clone());
                self.schemas.insert(name.clone(), object);
                RequestBody {
                    required: true,
                    content: json_content(Schema::reference(&name)),
                }
            }
        }
    }

    fn operation(&mut self, route: &Route) -> Operation {
        let parameters = route
            .inputs
            .params
            .iter()
            .map(|f| self.parameter(f))
            .collect::<Vec<_>>();
        let request_body = route
            .inputs
            .body
            .as_ref()
            .map(|b| self.request_body(route, b));

        let mut responses = IndexMap::from([(
            "200".to_string(),
            Response {
                description: "Successful Response".to_string(),
                content: json_content(Schema::default()),
            },
        )]);
        if !parameters.is_empty() || request_body.is_some() {
            self.validation_schemas();
            responses.insert(
                "422".to_string(),
                Response {
                    description: "Validation Error".to_string(),
                    content: json_content(Schema::reference(HTTP_VALIDATION_ERROR)),
                },
            );
        }

        Operation {
            operation_id: route.meta.operation_id.to_string(),
            summary: route.meta.summary.to_string(),
            description: route.meta.description.map(ToString::to_string),
            tags: route.meta.tags.iter().map(ToString::to_string).collect(),
            parameters,
            request_body,
            responses,
        }
    }

    /// Schemas of the 422 reply body
    fn validation_schemas(&mut self) {
        if self.schemas.contains_key(HTTP_VALIDATION_ERROR) {
            return;
        }
        let loc_item = Schema {
            any_of: vec![Schema::of_type("string"), Schema::of_type("integer")],
            ..Schema::default()
        };
        let mut error = Schema::of_type("object").titled(VALIDATION_ERROR.to_string());
        error.properties = IndexMap::from([
            (
                "loc".to_string(),
                Schema {
                    items: Some(Box::new(loc_item)),
                    ..Schema::of_type("array")
                }
                .titled("Location".to_string()),
            ),
            (
                "msg".to_string(),
                Schema::of_type("string").titled("Message".to_string()),
            ),
            (
                "type".to_string(),
                Schema::of_type("string").titled("Error Type".to_string()),
            ),
            ("input".to_string(), Schema::default().titled("Input".to_string())),
        ]);
        error.required = vec!["loc".to_string(), "msg".to_string(), "type".to_string()];

        let mut wrapper = Schema::of_type("object").titled(HTTP_VALIDATION_ERROR.to_string());
        wrapper.properties.insert(
            "detail".to_string(),
            Schema {
                items: Some(Box::new(Schema::reference(VALIDATION_ERROR))),
                ..Schema::of_type("array")
            }
            .titled("Detail".to_string()),
        );

        self.schemas.insert(VALIDATION_ERROR.to_string(), error);
        self.schemas.insert(HTTP_VALIDATION_ERROR.to_string(), wrapper);
    }
}

/// Build the interface description of every visible route
pub fn generate(registry: &Registry, config: &DocsConfig) -> OpenApi {
    let mut generator = Generator {
        schemas: IndexMap::new(),
    };
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    let mut tags: Vec<Tag> = Vec::new();

    for route in registry.routes().iter().filter(|r| r.meta.include_in_schema) {
        let item = paths.entry(route.pattern.as_str().to_string()).or_default();
        let Some(slot) = item.slot(&route.method) else {
            logger::log_warning(&format!(
                "{} {} left out of the interface description: unsupported method",
                route.method,
                route.pattern.as_str()
            ));
            continue;
        };
        *slot = Some(generator.operation(route));

        for tag in &route.meta.tags {
            if !tags.iter().any(|t| t.name == *tag) {
                tags.push(Tag {
                    name: (*tag).to_string(),
                });
            }
        }
    }

    OpenApi {
        openapi: "3.1.0",
        info: Info {
            title: config.title.clone(),
            version: config.version.clone(),
        },
        paths,
        components: Components {
            schemas: generator.schemas,
        },
        tags,
    }
}
