//! Turns a placement request into aggregated, priced order lines.
//!
//! Assembly is side-effect-free: products are only read, never reserved.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::error::OrderError;
use crate::clients::ProductClient;
use crate::domain::{OrderLine, OrderRequestLine, Product, ProductId};

/// Aggregated, priced line set ready for the stock ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledOrder {
    /// One line per distinct product, in order of first appearance.
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

impl AssembledOrder {
    /// `(product, quantity)` pairs to reserve, one per line.
    pub fn reservations(&self) -> Vec<(ProductId, u32)> {
        self.lines.iter().map(|line| (line.product_id, line.quantity)).collect()
    }
}

/// Sums requested quantities per product id, keeping first-appearance order.
///
/// This must run before any stock comparison: two small lines for the same
/// product can each fit in stock while their sum does not.
pub fn aggregate_lines(lines: &[OrderRequestLine]) -> Result<Vec<(ProductId, u32)>, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::ValidationError("order must contain at least one line".into()));
    }

    let mut aggregated: Vec<(ProductId, u32)> = Vec::new();
    for line in lines {
        if line.quantity == 0 {
            return Err(OrderError::ValidationError(format!(
                "quantity must be greater than 0 for product {}",
                line.product_id
            )));
        }
        match aggregated.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, quantity)) => {
                *quantity = quantity.checked_add(line.quantity).ok_or_else(|| {
                    OrderError::ValidationError(format!("quantity overflow for product {}", line.product_id))
                })?;
            }
            None => aggregated.push((line.product_id, line.quantity)),
        }
    }
    Ok(aggregated)
}

/// Snapshots the product's name and price into a line for `quantity` units.
pub fn price_line(product: &Product, quantity: u32) -> Result<OrderLine, OrderError> {
    let subtotal = product
        .price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| OrderError::ValidationError(format!("subtotal overflow for product {}", product.id)))?;
    Ok(OrderLine {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        quantity,
        subtotal,
    })
}

/// Resolves products through the catalog and prices the aggregated lines.
#[derive(Clone)]
pub struct OrderAssembler {
    product_client: ProductClient,
}

impl OrderAssembler {
    pub fn new(product_client: ProductClient) -> Self {
        Self { product_client }
    }

    #[instrument(skip(self, lines), fields(requested_lines = lines.len()))]
    pub async fn assemble(&self, lines: &[OrderRequestLine]) -> Result<AssembledOrder, OrderError> {
        let aggregated = aggregate_lines(lines)?;

        let mut priced = Vec::with_capacity(aggregated.len());
        let mut total = Decimal::ZERO;
        for (product_id, quantity) in aggregated {
            // Soft-deleted products resolve to None, exactly like unknown ids.
            let product = self
                .product_client
                .get_product(product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(product_id))?;

            let line = price_line(&product, quantity)?;
            total = total
                .checked_add(line.subtotal)
                .ok_or_else(|| OrderError::ValidationError("order total overflows".into()))?;
            priced.push(line);
        }

        debug!(lines = priced.len(), %total, "Order assembled");
        Ok(AssembledOrder { lines: priced, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates_duplicate_products_in_first_appearance_order() {
        let lines = [
            OrderRequestLine::new(3, 2),
            OrderRequestLine::new(1, 1),
            OrderRequestLine::new(3, 4),
        ];
        assert_eq!(
            aggregate_lines(&lines).unwrap(),
            vec![(ProductId(3), 6), (ProductId(1), 1)]
        );
    }

    #[test]
    fn test_rejects_empty_and_zero_quantity() {
        assert!(matches!(aggregate_lines(&[]), Err(OrderError::ValidationError(_))));

        let lines = [OrderRequestLine::new(1, 1), OrderRequestLine::new(2, 0)];
        let err = aggregate_lines(&lines).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_rejects_quantity_overflow() {
        let lines = [OrderRequestLine::new(1, u32::MAX), OrderRequestLine::new(1, 1)];
        assert!(matches!(aggregate_lines(&lines), Err(OrderError::ValidationError(_))));
    }

    #[test]
    fn test_price_line_uses_exact_decimal_arithmetic() {
        let product = Product::new(ProductId(2), "USB Cable", Decimal::new(1299, 2), 200);
        let line = price_line(&product, 3).unwrap();

        assert_eq!(line.subtotal, Decimal::new(3897, 2));
        assert_eq!(line.unit_price, product.price);
        assert_eq!(line.product_name, "USB Cable");
    }
}
