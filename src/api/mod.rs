//! Request handler set
//!
//! The demonstration routes, their models and the explicit registration
//! list. `catalogue()` is called once at startup; the resulting registry is
//! shared with the dispatch entry point.

mod handlers;
mod types;

pub use types::{AccountProfile, AgeClass, Person, PriceableItem, EMAIL_PATTERN};

use crate::routing::{Registry, RegistryError, RouteDef};
use crate::validate::{BodySpec, Constraints, FieldKind, FieldSpec};

const ROOT: &str = "root";
const USERS: &str = "users";
const ITEMS: &str = "items";
const FRIENDS: &str = "friends";

fn friend_ids() -> FieldSpec {
    FieldSpec::query("friend_id", FieldKind::IntegerList)
        .optional()
        .constrained(Constraints::new().min_length(1).max_length(100))
        .describe("Friend ids, repeat the key for each")
}

/// Build the route table
///
/// Order matters: the first route whose pattern and method match a request
/// wins, so `/user/me` and `/user/item` precede `/user/{user_id}`.
pub fn catalogue() -> Result<Registry, RegistryError> {
    let item = PriceableItem::schema();
    let account = AccountProfile::schema()?;
    let mut registry = Registry::new();

    registry
        .register(
            RouteDef::get("/", handlers::root_get)
                .operation("get_request", "Get Request")
                .description("This is a GET request")
                .tag(ROOT),
        )?
        .register(
            RouteDef::post("/", handlers::root_post)
                .operation("post_request", "Post Request")
                .description("This is a POST request")
                .tag(ROOT),
        )?
        .register(
            RouteDef::put("/", handlers::root_put)
                .operation("put_request", "Put Request")
                .description("This is a PUT request")
                .tag(ROOT),
        )?
        .register(
            RouteDef::get("/user", handlers::user_get)
                .operation("get_user", "Get User")
                .description("This is a GET request for user")
                .tag(USERS),
        )?
        .register(
            RouteDef::post("/user", handlers::user_create)
                .operation("create_user", "Create User")
                .description("Create a user from an account profile")
                .tag(USERS)
                .body(BodySpec::Model {
                    schema: account.clone(),
                    required: true,
                }),
        )?
        .register(
            RouteDef::get("/user/me", handlers::current_user)
                .operation("get_current_user", "Get Current User")
                .description("This is a GET request for current user")
                .tag(USERS),
        )?
        .register(
            RouteDef::get("/user/item", handlers::user_item)
                .operation("get_user_item", "Get User Item")
                .description("This is a GET request for user item using query params")
                .tag(USERS)
                .param(FieldSpec::query("user_id", FieldKind::Integer))
                .param(FieldSpec::query("item_id", FieldKind::Integer).optional()),
        )?
        .register(
            RouteDef::get("/user/{user_id}", handlers::user_by_name)
                .operation("get_item", "Get Item")
                .description("This is a GET request for a specific item")
                .tag(USERS)
                .param(FieldSpec::path("user_id", FieldKind::Text)),
        )?
        .register(
            RouteDef::post("/user/{user_id}", handlers::user_by_id)
                .operation("get_item_int", "Get Item Int")
                .description("This is a POST request for a specific item")
                .tag(USERS)
                .param(FieldSpec::path("user_id", FieldKind::Integer)),
        )?
        .register(
            RouteDef::get("/user/adult/{age}", handlers::adult_check)
                .operation("get_is_user_adult", "Get Is User Adult")
                .description("This is a GET request to check if user is adult")
                .tag(USERS)
                .param(FieldSpec::path("age", FieldKind::Integer)),
        )?
        .register(
            RouteDef::post("/items", handlers::item_create)
                .operation("create_item", "Create Item")
                .description("Create an item and compute its total price")
                .tag(ITEMS)
                .body(BodySpec::Model {
                    schema: item.clone(),
                    required: true,
                }),
        )?
        .register(
            RouteDef::put("/items/{item_id}", handlers::item_update)
                .operation("update_item", "Update Item")
                .description("Update an item, tagging it with its type")
                .tag(ITEMS)
                .param(FieldSpec::path("item_id", FieldKind::Integer))
                .param(FieldSpec::query("item_type", FieldKind::Text).with_default("Cloths"))
                .body(BodySpec::Model {
                    schema: item.clone(),
                    required: true,
                }),
        )?
        .register(
            RouteDef::post("/items/{item_id}", handlers::item_compose)
                .operation("create_composite_item", "Create Composite Item")
                .description("Create an item together with its owner and importance")
                .tag(ITEMS)
                .param(
                    FieldSpec::path("item_id", FieldKind::Integer)
                        .constrained(Constraints::new().gt(0.0).le(1000.0))
                        .describe("The ID of the item to create"),
                )
                .param(
                    FieldSpec::query("item_type", FieldKind::Text)
                        .constrained(Constraints::new().min_length(1).max_length(50)),
                )
                .body(BodySpec::Embedded(vec![
                    FieldSpec::body("item", FieldKind::Object(item)),
                    FieldSpec::body("user", FieldKind::Object(account)).optional(),
                    FieldSpec::body("importance", FieldKind::Integer),
                ])),
        )?
        .register(
            RouteDef::get("/friend", handlers::friend_lookup)
                .operation("get_friend", "Get Friend")
                .description("Look up a friend by an optional text id")
                .tag(FRIENDS)
                .param(
                    FieldSpec::query("friend_id", FieldKind::Text)
                        .optional()
                        .constrained(Constraints::new().min_length(1).max_length(100)),
                ),
        )?
        .register(
            RouteDef::get("/friend/{friend_id}", handlers::friend_by_id)
                .operation("get_friend_by_path", "Get Friend By Path")
                .description("Look up a friend by numeric id with a search query")
                .tag(FRIENDS)
                .param(
                    FieldSpec::path("friend_id", FieldKind::Integer)
                        .constrained(Constraints::new().gt(1.0).le(1000.0)),
                )
                .param(FieldSpec::query("q", FieldKind::Text)),
        )?
        .register(
            RouteDef::get("/friends", handlers::friends_list)
                .operation("get_friends", "Get Friends")
                .description("List friends by repeated integer ids")
                .tag(FRIENDS)
                .param(friend_ids()),
        )?
        .register(
            RouteDef::get("/friends/hidden", handlers::friends_list)
                .operation("get_hidden_friends", "Get Hidden Friends")
                .tag(FRIENDS)
                .param(friend_ids())
                .hidden(),
        )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Resolution;
    use crate::validate::{validate, QueryParams, RawInputs, ValidationErrors};
    use hyper::Method;
    use serde_json::{json, Value};

    fn call(method: Method, uri: &str, body: &str) -> Result<Value, ValidationErrors> {
        let registry = catalogue().unwrap();
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let Resolution::Matched { route, params } = registry.resolve(&method, path) else {
            panic!("no route for {method} {path}");
        };
        let query = QueryParams::parse(Some(query));
        let raw = RawInputs {
            path: &params,
            query: &query,
            body: body.as_bytes(),
        };
        let validated = validate(&route.inputs, &raw)?;
        Ok(route.call(&validated).unwrap())
    }

    fn get(uri: &str) -> Result<Value, ValidationErrors> {
        call(Method::GET, uri, "")
    }

    #[test]
    fn test_catalogue_registers_every_route() {
        let registry = catalogue().unwrap();
        assert_eq!(registry.len(), 17);
        assert!(registry.routes().iter().filter(|r| !r.meta.include_in_schema).count() == 1);
    }

    #[test]
    fn test_root_messages() {
        assert_eq!(get("/").unwrap(), json!({"message": "This is a GET request"}));
        assert_eq!(
            call(Method::PUT, "/", "").unwrap(),
            json!({"message": "This is a PUT request"})
        );
    }

    #[test]
    fn test_adult_check_classifies() {
        assert_eq!(
            get("/user/adult/18").unwrap(),
            json!({"message": "User is adult", "classification": "adult"})
        );
        assert_eq!(
            get("/user/adult/0").unwrap(),
            json!({"message": "User is not adult", "classification": "minor"})
        );
        assert_eq!(
            get("/user/adult/-3").unwrap(),
            json!({"message": "Invalid age", "classification": "invalid"})
        );
        let err = get("/user/adult/old").unwrap_err();
        assert_eq!(err.errors()[0].error_type, "int_parsing");
    }

    #[test]
    fn test_create_item_doubles_price_without_tax() {
        let reply = call(
            Method::POST,
            "/items",
            r#"{"name": "pen", "price": 10, "tax": null}"#,
        )
        .unwrap();
        assert_eq!(
            reply,
            json!({
                "item": {
                    "name": "pen",
                    "description": null,
                    "price": 10.0,
                    "tax": null,
                    "total_price": 20.0
                },
                "message": "Item created successfully"
            })
        );

        let reply = call(
            Method::POST,
            "/items",
            r#"{"name": "pen", "price": 10, "tax": 2.5}"#,
        )
        .unwrap();
        assert_eq!(reply["item"]["total_price"], json!(12.5));
    }

    #[test]
    fn test_create_item_rejects_non_finite_numbers() {
        for tax in ["nan", "inf"] {
            let body = format!(r#"{{"name": "pen", "price": 10, "tax": "{tax}"}}"#);
            let err = call(Method::POST, "/items", &body).unwrap_err();
            assert_eq!(err.len(), 1);
            assert_eq!(err.errors()[0].error_type, "finite_number");
            assert_eq!(err.errors()[0].loc, vec![json!("body"), json!("tax")]);
        }
        for price in ["inf", "1e400"] {
            let body = format!(r#"{{"name": "pen", "price": "{price}"}}"#);
            let err = call(Method::POST, "/items", &body).unwrap_err();
            assert_eq!(err.errors()[0].error_type, "finite_number");
            assert_eq!(err.errors()[0].loc, vec![json!("body"), json!("price")]);
            assert_eq!(err.errors()[0].input, json!(price));
        }
    }

    #[test]
    fn test_update_item_defaults_type() {
        let reply = call(Method::PUT, "/items/7", r#"{"name": "hat", "price": 4}"#).unwrap();
        assert_eq!(reply["type"], "Cloths");
        assert_eq!(reply["item_id"], 7);
        assert_eq!(reply["total_price"], json!(8.0));

        let reply = call(
            Method::PUT,
            "/items/7?item_type=Hats",
            r#"{"name": "hat", "price": 4, "tax": 1}"#,
        )
        .unwrap();
        assert_eq!(reply["type"], "Hats");
        assert_eq!(reply["total_price"], json!(5.0));
    }

    #[test]
    fn test_composite_item() {
        let body = r#"{
            "item": {"name": "pen", "price": 3},
            "user": {"username": "ann", "email": "ann@example.com"},
            "importance": 2
        }"#;
        let reply = call(Method::POST, "/items/5?item_type=office", body).unwrap();
        assert_eq!(reply["item_id"], 5);
        assert_eq!(reply["item_type"], "office");
        assert_eq!(reply["item"]["total_price"], json!(6.0));
        assert_eq!(reply["user"]["username"], "ann");
        assert_eq!(reply["importance"], 2);

        let reply = call(
            Method::POST,
            "/items/5?item_type=office",
            r#"{"item": {"name": "pen", "price": 3}, "importance": 1}"#,
        )
        .unwrap();
        assert!(reply["user"].is_null());
    }

    #[test]
    fn test_composite_item_missing_item() {
        let err = call(Method::POST, "/items/5?item_type=office", r#"{"importance": 1}"#)
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.errors()[0].error_type, "missing");
        assert_eq!(err.errors()[0].loc, vec![json!("body"), json!("item")]);
    }

    #[test]
    fn test_composite_item_reports_every_violation() {
        let long_type = "x".repeat(51);
        let uri = format!("/items/0?item_type={long_type}");
        let err = call(
            Method::POST,
            &uri,
            r#"{"item": {"name": "pen", "price": 3}, "user": {"username": "ann", "email": "nope"}}"#,
        )
        .unwrap_err();
        let types: Vec<&str> = err.errors().iter().map(|e| e.error_type).collect();
        assert_eq!(
            types,
            vec![
                "greater_than",
                "string_too_long",
                "string_pattern_mismatch",
                "missing"
            ]
        );
    }

    #[test]
    fn test_friend_by_path_bounds() {
        assert_eq!(
            get("/friend/5?q=hi").unwrap(),
            json!({"message": "Friend ID: 5, Query: hi"})
        );
        assert_eq!(get("/friend/0?q=hi").unwrap_err().errors()[0].error_type, "greater_than");
        assert_eq!(get("/friend/1?q=hi").unwrap_err().errors()[0].error_type, "greater_than");
        assert_eq!(
            get("/friend/1001?q=hi").unwrap_err().errors()[0].error_type,
            "less_than_equal"
        );
        assert_eq!(get("/friend/5").unwrap_err().errors()[0].error_type, "missing");
    }

    #[test]
    fn test_friend_queries() {
        assert_eq!(get("/friend").unwrap(), json!({"friend_id": null}));
        assert_eq!(get("/friend?friend_id=bob").unwrap(), json!({"friend_id": "bob"}));
        assert_eq!(
            get("/friend?friend_id=").unwrap_err().errors()[0].error_type,
            "string_too_short"
        );

        for uri in ["/friends?friend_id=1&friend_id=2", "/friends/hidden?friend_id=1&friend_id=2"] {
            assert_eq!(get(uri).unwrap(), json!({"friend_id": [1, 2]}));
        }
        assert_eq!(get("/friends").unwrap(), json!({"friend_id": null}));
    }

    #[test]
    fn test_user_routes() {
        assert_eq!(
            get("/user/me").unwrap(),
            json!({"message": "This is a GET request for current user"})
        );
        assert_eq!(get("/user/alice").unwrap(), json!({"message": "alice"}));
        assert_eq!(get("/user/42").unwrap(), json!({"message": "42"}));
        assert_eq!(
            call(Method::POST, "/user/42", "").unwrap(),
            json!({"message": 42})
        );
        assert_eq!(
            get("/user/item?user_id=3&item_id=9").unwrap(),
            json!({"message": "User ID: 3, Item ID: 9"})
        );
        assert_eq!(
            get("/user/item?user_id=3&item_id=0").unwrap(),
            json!({"message": "User ID: 3"})
        );
        assert_eq!(get("/user/item").unwrap_err().errors()[0].error_type, "missing");
    }

    #[test]
    fn test_create_user_validates_profile() {
        let profile = r#"{"username": "ann", "email": "ann@example.com"}"#;
        assert_eq!(
            call(Method::POST, "/user", profile).unwrap(),
            json!({"username": "ann", "email": "ann@example.com"})
        );
        let err = call(Method::POST, "/user", r#"{"username": "", "email": "x"}"#).unwrap_err();
        assert_eq!(err.len(), 2);
    }
}
