//! Represents a product in the catalog.
//!
//! # Actor Framework
//! [`Product`] implements the [`Entity`](crate::actor_framework::Entity) trait,
//! allowing it to be managed by a [`ResourceActor`](crate::actor_framework::ResourceActor).
//!
//! See the `Entity` impl in [`crate::product_actor`] for details on:
//! - Creation parameters ([`ProductCreate`])
//! - Update parameters ([`ProductUpdate`])
//! - Custom actions ([`ProductAction`](crate::product_actor::ProductAction))
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates a new, live Product instance.
    ///
    /// # Arguments
    /// * `id` - Unique identifier (typically set by the actor system)
    /// * `name` - Product name
    /// * `price` - Unit price
    /// * `stock_quantity` - Units currently in stock
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal, stock_quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock_quantity,
            is_deleted: false,
            deleted_at: None,
        }
    }
}

/// Payload for creating a new product.
///
/// `stock_quantity` is signed so that a negative value from the caller can be
/// rejected with a validation error instead of failing to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i64,
}

/// Full replacement of a product's editable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i64,
}
