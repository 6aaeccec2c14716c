use rust_decimal::Decimal;

use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderId};

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type UpdateParams = ();
    type Action = ();
    type ActionResult = ();
    type Error = OrderError;

    const KIND: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }

    fn not_found(id: &OrderId) -> OrderError {
        OrderError::NotFound(*id)
    }

    /// Creates a new Order together with all of its lines.
    ///
    /// The total is the exact sum of the line subtotals; each subtotal must
    /// equal `unit_price * quantity`.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.lines.is_empty() {
            return Err(OrderError::ValidationError("order must contain at least one line".into()));
        }

        let mut total_amount = Decimal::ZERO;
        for line in &params.lines {
            if line.quantity == 0 {
                return Err(OrderError::ValidationError(format!(
                    "quantity must be greater than 0 for product {}",
                    line.product_id
                )));
            }
            if line.unit_price.checked_mul(Decimal::from(line.quantity)) != Some(line.subtotal) {
                return Err(OrderError::ValidationError(format!(
                    "subtotal mismatch for product {}",
                    line.product_id
                )));
            }
            total_amount = total_amount
                .checked_add(line.subtotal)
                .ok_or_else(|| OrderError::ValidationError("order total overflows".into()))?;
        }

        Ok(Self {
            id,
            order_date: params.order_date,
            total_amount,
            lines: params.lines,
        })
    }

    /// Orders are append-only.
    fn on_update(&mut self, _params: ()) -> Result<(), OrderError> {
        Err(OrderError::ValidationError(format!("order {} is immutable", self.id)))
    }

    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::ValidationError(format!("order {} is immutable", self.id)))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), OrderError> {
        Ok(())
    }
}
