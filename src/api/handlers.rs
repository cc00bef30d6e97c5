//! Handlers of the demonstration routes
//!
//! Every handler receives inputs that already passed validation and only
//! binds them into typed values before computing its reply.

use serde::Serialize;
use serde_json::{json, Value};

use super::types::{
    AccountProfile, AgeReply, ComposedItem, CreatedItem, FriendReply, Message, Person,
    PriceableItem, PricedItem, UpdatedItem,
};
use crate::routing::HandlerError;
use crate::validate::{truthy, Validated};

fn reply<T: Serialize>(value: T) -> Result<Value, HandlerError> {
    Ok(serde_json::to_value(value)?)
}

fn message(text: &str) -> Value {
    json!({ "message": text })
}

pub fn root_get(_: &Validated) -> Result<Value, HandlerError> {
    Ok(message("This is a GET request"))
}

pub fn root_post(_: &Validated) -> Result<Value, HandlerError> {
    Ok(message("This is a POST request"))
}

pub fn root_put(_: &Validated) -> Result<Value, HandlerError> {
    Ok(message("This is a PUT request"))
}

pub fn user_get(_: &Validated) -> Result<Value, HandlerError> {
    Ok(message("This is a GET request for user"))
}

/// Echo a validated account profile
pub fn user_create(input: &Validated) -> Result<Value, HandlerError> {
    let profile: AccountProfile = input.body()?;
    reply(profile)
}

pub fn current_user(_: &Validated) -> Result<Value, HandlerError> {
    Ok(message("This is a GET request for current user"))
}

pub fn user_item(input: &Validated) -> Result<Value, HandlerError> {
    let user_id: i64 = input.query("user_id")?;
    let item_id: Option<i64> = input.query("item_id")?;
    let text = match truthy(item_id) {
        Some(item_id) => format!("User ID: {user_id}, Item ID: {item_id}"),
        None => format!("User ID: {user_id}"),
    };
    Ok(message(&text))
}

/// Text id, echoed as given
pub fn user_by_name(input: &Validated) -> Result<Value, HandlerError> {
    let user_id: String = input.path("user_id")?;
    reply(Message { message: user_id })
}

/// Integer id, echoed as a number
pub fn user_by_id(input: &Validated) -> Result<Value, HandlerError> {
    let user_id: i64 = input.path("user_id")?;
    reply(Message { message: user_id })
}

pub fn adult_check(input: &Validated) -> Result<Value, HandlerError> {
    let person = Person {
        age: input.path("age")?,
    };
    reply(AgeReply::from(person))
}

pub fn item_create(input: &Validated) -> Result<Value, HandlerError> {
    let item: PriceableItem = input.body()?;
    reply(CreatedItem {
        item: PricedItem::from(item),
        message: "Item created successfully",
    })
}

pub fn item_update(input: &Validated) -> Result<Value, HandlerError> {
    let item: PriceableItem = input.body()?;
    let total_price = item.total_price();
    reply(UpdatedItem {
        item,
        item_type: input.query("item_type")?,
        item_id: input.path("item_id")?,
        total_price,
    })
}

/// Item, optional owner and importance submitted under separate body keys
pub fn item_compose(input: &Validated) -> Result<Value, HandlerError> {
    let item: PriceableItem = input.body_field("item")?;
    reply(ComposedItem {
        item_id: input.path("item_id")?,
        item_type: input.query("item_type")?,
        item: PricedItem::from(item),
        user: input.body_field("user")?,
        importance: input.body_field("importance")?,
    })
}

pub fn friend_lookup(input: &Validated) -> Result<Value, HandlerError> {
    let friend_id: Option<String> = input.query("friend_id")?;
    reply(FriendReply { friend_id })
}

pub fn friend_by_id(input: &Validated) -> Result<Value, HandlerError> {
    let friend_id: i64 = input.path("friend_id")?;
    let q: String = input.query("q")?;
    Ok(message(&format!("Friend ID: {friend_id}, Query: {q}")))
}

/// Shared by the listed and the hidden friends routes
pub fn friends_list(input: &Validated) -> Result<Value, HandlerError> {
    let friend_id: Option<Vec<i64>> = input.query("friend_id")?;
    reply(FriendReply { friend_id })
}
