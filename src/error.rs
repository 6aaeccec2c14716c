use serde::Serialize;
use std::fmt::Display;

/// Coarse error taxonomy handed to the transport layer.
///
/// Domain errors ([`ProductError`](crate::product_actor::ProductError),
/// [`OrderError`](crate::order_actor::OrderError)) keep their descriptive
/// payloads and expose their kind through `kind()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Unknown or soft-deleted product, unknown order.
    NotFound,
    /// Malformed request: empty order, zero quantity, negative threshold or price.
    InvalidRequest,
    /// Insufficient stock. Nothing was applied.
    Conflict,
    /// The underlying store failed. Not retried.
    PersistenceFailure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::PersistenceFailure => "persistence_failure",
        };
        f.write_str(name)
    }
}
