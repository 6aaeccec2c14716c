use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderId, ProductId};
use crate::error::ErrorKind;
use crate::product_actor::ProductError;

/// Errors that can occur during order placement and lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order persistence error: {0}")]
    PersistenceError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotFound(_) | OrderError::ProductNotFound(_) => ErrorKind::NotFound,
            OrderError::InsufficientStock { .. } => ErrorKind::Conflict,
            OrderError::ValidationError(_) => ErrorKind::InvalidRequest,
            OrderError::PersistenceError(_) | OrderError::ActorCommunicationError(_) => {
                ErrorKind::PersistenceFailure
            }
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::ProductNotFound(id),
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(err: FrameworkError<OrderError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
