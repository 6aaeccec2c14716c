use chrono::{DateTime, Utc};

/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Decrements stock by the given amount.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the amount exceeds available stock.
    ReserveStock(u32),
    /// Returns previously reserved units to stock.
    ReleaseStock(u32),
    /// Marks the product deleted at the given instant.
    SoftDelete { at: DateTime<Utc> },
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    /// Result from CheckStock action - returns the current stock level
    CheckStock(u32),
    /// Stock left after the reservation
    ReserveStock(u32),
    /// Stock after the release
    ReleaseStock(u32),
    SoftDelete,
}
