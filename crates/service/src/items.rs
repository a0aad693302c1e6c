//! Item entity: a priced catalogue entry keyed by a sequential integer id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::storage::{Resource, ResourceStore, SequentialIds};

pub type ItemStore = ResourceStore<Item>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload; the id and timestamps are assigned by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

/// Update payload; absent fields keep their stored value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

pub fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::invalid("name", "name is required"));
    }
    Ok(())
}

pub fn validate_price(price: i64) -> Result<(), ServiceError> {
    if price < 0 {
        return Err(ServiceError::invalid("price", "price must be >= 0"));
    }
    Ok(())
}

impl Resource for Item {
    type Id = u64;
    type Ids = SequentialIds;
    type Input = NewItem;
    type Patch = ItemPatch;

    const KIND: &'static str = "item";

    fn validate(input: &NewItem) -> Result<(), ServiceError> {
        validate_name(&input.name)?;
        validate_price(input.price)
    }

    fn build(id: u64, input: NewItem, now: DateTime<Utc>) -> Self {
        Item {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ItemPatch) -> Result<(), ServiceError> {
        if let Some(name) = patch.name {
            validate_name(&name)?;
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            self.price = price;
        }
        Ok(())
    }

    fn id(&self) -> &u64 { &self.id }

    fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    fn set_updated_at(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
}
