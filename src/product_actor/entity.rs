//! Entity trait implementation for the Product domain type.
//!
//! Products are soft-deletable: once `is_deleted` is set the framework treats
//! the product as absent for every request, so ordering and catalog reads
//! cannot see it while past order lines keep their snapshots.

use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate};

const MAX_NAME_LEN: usize = 200;

fn validate_name(name: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::ValidationError("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProductError::ValidationError(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ProductError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ProductError::ValidationError(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    Ok(())
}

fn validate_stock(stock_quantity: i64) -> Result<u32, ProductError> {
    u32::try_from(stock_quantity).map_err(|_| {
        ProductError::ValidationError(format!(
            "stock quantity must be between 0 and {}, got {}",
            u32::MAX,
            stock_quantity
        ))
    })
}

impl Entity for Product {
    type Id = ProductId;
    type CreateParams = ProductCreate;
    type UpdateParams = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn not_found(id: &ProductId) -> ProductError {
        ProductError::NotFound(*id)
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// `ValidationError` for an empty or overlong name, a negative price or a
    /// stock quantity outside `0..=u32::MAX`.
    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        validate_name(&params.name)?;
        validate_price(params.price)?;
        let stock_quantity = validate_stock(params.stock_quantity)?;
        Ok(Self::new(id, params.name, params.price, stock_quantity))
    }

    /// Replaces name, price and stock quantity. Validation matches creation.
    fn on_update(&mut self, params: ProductUpdate) -> Result<(), ProductError> {
        validate_name(&params.name)?;
        validate_price(params.price)?;
        self.stock_quantity = validate_stock(params.stock_quantity)?;
        self.name = params.name;
        self.price = params.price;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        !self.is_deleted
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `ReserveStock(amount)`: Decrements stock, never below zero
    /// - `ReleaseStock(amount)`: Increments stock
    /// - `SoftDelete`: Marks the product deleted
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock_quantity)),
            ProductAction::ReserveStock(amount) => {
                if self.stock_quantity >= amount {
                    self.stock_quantity -= amount;
                    Ok(ProductActionResult::ReserveStock(self.stock_quantity))
                } else {
                    Err(ProductError::InsufficientStock {
                        product_id: self.id,
                        requested: amount,
                        available: self.stock_quantity,
                    })
                }
            }
            ProductAction::ReleaseStock(amount) => {
                self.stock_quantity = self.stock_quantity.checked_add(amount).ok_or_else(|| {
                    ProductError::ValidationError(format!("stock overflow releasing {} units", amount))
                })?;
                Ok(ProductActionResult::ReleaseStock(self.stock_quantity))
            }
            ProductAction::SoftDelete { at } => {
                self.is_deleted = true;
                self.deleted_at = Some(at);
                Ok(ProductActionResult::SoftDelete)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn create(name: &str, price: Decimal, stock: i64) -> Result<Product, ProductError> {
        Product::from_create_params(
            ProductId(1),
            ProductCreate {
                name: name.into(),
                price,
                stock_quantity: stock,
            },
        )
    }

    #[test]
    fn test_create_validates_fields() {
        assert!(create("Mouse", Decimal::new(2999, 2), 100).is_ok());
        assert!(create("Free sample", Decimal::ZERO, 0).is_ok());

        for bad in [
            create("  ", Decimal::ONE, 1),
            create(&"x".repeat(201), Decimal::ONE, 1),
            create("Mouse", Decimal::new(-1, 2), 1),
            create("Mouse", Decimal::ONE, -1),
        ] {
            assert!(matches!(bad, Err(ProductError::ValidationError(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_reserve_exact_stock_then_one_more() {
        let mut product = create("Webcam", Decimal::new(8999, 2), 5).unwrap();

        assert_eq!(
            product.handle_action(ProductAction::ReserveStock(5)),
            Ok(ProductActionResult::ReserveStock(0))
        );
        assert_eq!(
            product.handle_action(ProductAction::ReserveStock(1)),
            Err(ProductError::InsufficientStock {
                product_id: ProductId(1),
                requested: 1,
                available: 0,
            })
        );
        assert_eq!(product.stock_quantity, 0);
    }

    #[test]
    fn test_release_restores_stock() {
        let mut product = create("Tablet", Decimal::new(39999, 2), 3).unwrap();
        product.handle_action(ProductAction::ReserveStock(2)).unwrap();
        assert_eq!(
            product.handle_action(ProductAction::ReleaseStock(2)),
            Ok(ProductActionResult::ReleaseStock(3))
        );
    }

    #[test]
    fn test_soft_delete_hides_product() {
        let mut product = create("Monitor", Decimal::new(29999, 2), 40).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        product.handle_action(ProductAction::SoftDelete { at }).unwrap();

        assert!(!product.is_visible());
        assert_eq!(product.deleted_at, Some(at));
    }

    #[test]
    fn test_update_rejects_negative_stock_without_partial_change() {
        let mut product = create("Keyboard", Decimal::new(7999, 2), 75).unwrap();
        let err = product
            .on_update(ProductUpdate {
                name: "Mechanical keyboard".into(),
                price: Decimal::new(8999, 2),
                stock_quantity: -3,
            })
            .unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRequest);
        assert_eq!(product.name, "Keyboard");
        assert_eq!(product.stock_quantity, 75);
    }
}
