//! Request and reply types of the handler set
//!
//! Each request model has two faces: a serde struct the handler binds
//! validated input into, and a `ModelSchema` the validator checks raw input
//! against. The two are declared side by side so they stay in step.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::validate::{truthy, Constraints, FieldKind, FieldSpec, ModelSchema};

/// Email shape accepted by `AccountProfile`
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

// ============== Request models ==============

/// Item submitted for creation or update
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceableItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tax: Option<f64>,
}

impl PriceableItem {
    /// Price plus tax, or twice the price when tax is absent or zero
    pub fn total_price(&self) -> f64 {
        self.price + truthy(self.tax).unwrap_or(self.price)
    }

    pub fn schema() -> Arc<ModelSchema> {
        ModelSchema::new(
            "PriceableItem",
            vec![
                FieldSpec::body("name", FieldKind::Text)
                    .constrained(Constraints::new().min_length(1)),
                FieldSpec::body("description", FieldKind::Text).optional(),
                FieldSpec::body("price", FieldKind::Float),
                FieldSpec::body("tax", FieldKind::Float).optional(),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountProfile {
    pub username: String,
    pub email: String,
}

impl AccountProfile {
    pub fn schema() -> Result<Arc<ModelSchema>, regex::Error> {
        Ok(ModelSchema::new(
            "AccountProfile",
            vec![
                FieldSpec::body("username", FieldKind::Text)
                    .constrained(Constraints::new().min_length(1).max_length(50)),
                FieldSpec::body("email", FieldKind::Text)
                    .constrained(Constraints::new().pattern(Regex::new(EMAIL_PATTERN)?)),
            ],
        ))
    }
}

/// Age classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeClass {
    Adult,
    Minor,
    Invalid,
}

impl AgeClass {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Adult => "User is adult",
            Self::Minor => "User is not adult",
            Self::Invalid => "Invalid age",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Person {
    pub age: i64,
}

impl Person {
    pub const fn classify(self) -> AgeClass {
        if self.age < 0 {
            AgeClass::Invalid
        } else if self.age >= 18 {
            AgeClass::Adult
        } else {
            AgeClass::Minor
        }
    }
}

// ============== Replies ==============

#[derive(Debug, Serialize)]
pub struct Message<T> {
    pub message: T,
}

#[derive(Debug, Serialize)]
pub struct AgeReply {
    pub message: &'static str,
    pub classification: AgeClass,
}

impl From<Person> for AgeReply {
    fn from(person: Person) -> Self {
        let classification = person.classify();
        Self {
            message: classification.message(),
            classification,
        }
    }
}

/// Item echoed back with its computed total
#[derive(Debug, Serialize)]
pub struct PricedItem {
    #[serde(flatten)]
    pub item: PriceableItem,
    pub total_price: f64,
}

impl From<PriceableItem> for PricedItem {
    fn from(item: PriceableItem) -> Self {
        let total_price = item.total_price();
        Self { item, total_price }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedItem {
    pub item: PricedItem,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UpdatedItem {
    #[serde(flatten)]
    pub item: PriceableItem,
    #[serde(rename = "type")]
    pub item_type: String,
    pub item_id: i64,
    pub total_price: f64,
}

#[derive(Debug, Serialize)]
pub struct ComposedItem {
    pub item_id: i64,
    pub item_type: String,
    pub item: PricedItem,
    pub user: Option<AccountProfile>,
    pub importance: i64,
}

#[derive(Debug, Serialize)]
pub struct FriendReply<T> {
    pub friend_id: Option<T>,
}
