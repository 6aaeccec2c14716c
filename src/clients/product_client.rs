use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Filter, ResourceClient};
use crate::app_system::SharedClock;
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the Product actor.
///
/// Covers the catalog operations and the stock ledger contract used by order
/// placement. Soft-deleted products are invisible to every method here.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    clock: SharedClock,
}

impl_client_methods!(ProductClient, Product, ProductId, ProductError, product);

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>, clock: SharedClock) -> Self {
        Self { inner, clock }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(params).await?;
        info!(product_id = %id, "Product created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, params: ProductUpdate) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, params).await?)
    }

    /// Marks the product deleted. A second call for the same id fails with `NotFound`.
    #[instrument(skip(self))]
    pub async fn soft_delete_product(&self, id: ProductId) -> Result<(), ProductError> {
        debug!("Sending request");
        let at = self.clock.now();
        match self.inner.perform_action(id, ProductAction::SoftDelete { at }).await? {
            ProductActionResult::SoftDelete => {
                info!(product_id = %id, "Product soft-deleted");
                Ok(())
            }
            _ => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Removes the product permanently. Past order lines keep their snapshots.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Live products with `stock_quantity < threshold`, ordered by id.
    #[instrument(skip(self))]
    pub async fn products_below(&self, threshold: u64) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let filter = Filter::new(move |p: &Product| u64::from(p.stock_quantity) < threshold);
        Ok(self.inner.list(filter).await?)
    }

    // --- Stock ledger ---

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            _ => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Decrements every listed product, or none of them.
    ///
    /// The whole batch is checked and applied inside the product actor as one
    /// message, so it always sees the latest committed stock.
    #[instrument(skip(self))]
    pub async fn reserve_stock_batch(&self, reservations: &[(ProductId, u32)]) -> Result<(), ProductError> {
        debug!("Sending request");
        let actions = reservations
            .iter()
            .map(|&(id, quantity)| (id, ProductAction::ReserveStock(quantity)))
            .collect();
        match self.inner.perform_batch(actions).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let e = ProductError::from(e);
                warn!(error = %e, "Stock reservation rejected");
                Err(e)
            }
        }
    }

    /// Returns previously reserved units, all or nothing.
    #[instrument(skip(self))]
    pub async fn release_stock_batch(&self, reservations: &[(ProductId, u32)]) -> Result<(), ProductError> {
        debug!("Sending request");
        let actions = reservations
            .iter()
            .map(|&(id, quantity)| (id, ProductAction::ReleaseStock(quantity)))
            .collect();
        self.inner.perform_batch(actions).await?;
        Ok(())
    }
}
