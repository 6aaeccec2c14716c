use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::ProductId;
use crate::error::ErrorKind;

/// Errors that can occur during catalog and stock operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProductError::NotFound(_) => ErrorKind::NotFound,
            ProductError::InsufficientStock { .. } => ErrorKind::Conflict,
            ProductError::ValidationError(_) => ErrorKind::InvalidRequest,
            ProductError::ActorCommunicationError(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(err: FrameworkError<ProductError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
