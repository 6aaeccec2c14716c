use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use super::{seed_catalog, Config, SharedClock};
use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient, ReportClient};
use crate::domain::{Order, OrderId, Product, ProductId};
use crate::reports::DailySummaryCache;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    pub report_client: ReportClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(config: &Config, clock: SharedClock) -> Self {
        // 1. Product actor: catalog and stock ledger
        let product_id_counter = Arc::new(AtomicU32::new(1));
        let next_product_id = move || ProductId(product_id_counter.fetch_add(1, Ordering::SeqCst));

        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(config.actor_buffer_size, next_product_id);
        let product_client = ProductClient::new(product_resource_client, clock.clone());
        let product_handle = tokio::spawn(product_actor.run());

        // 2. Order actor, sharing the report cache with the report client
        let order_id_counter = Arc::new(AtomicU32::new(1));
        let next_order_id = move || OrderId(order_id_counter.fetch_add(1, Ordering::SeqCst));

        let report_cache = DailySummaryCache::new(clock.clone());
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(config.actor_buffer_size, next_order_id);
        let order_client = OrderClient::new(
            order_resource_client,
            product_client.clone(),
            report_cache.clone(),
            clock.clone(),
        );
        let order_handle = tokio::spawn(order_actor.run());

        // 3. Reports read through both clients
        let report_client = ReportClient::new(
            order_client.clone(),
            product_client.clone(),
            report_cache,
            clock,
            config.low_stock_threshold,
        );

        Self {
            order_client,
            product_client,
            report_client,
            handles: vec![product_handle, order_handle],
        }
    }

    /// Starts the system and loads the demo catalog when `config.seed_catalog` is set.
    pub async fn start(config: &Config, clock: SharedClock) -> Result<Self, String> {
        let system = Self::new(config, clock);
        if config.seed_catalog {
            seed_catalog(&system.product_client).await.map_err(|e| e.to_string())?;
        }
        Ok(system)
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        // Actors stop once every client clone is gone and their mailboxes close.
        drop(self.report_client);
        drop(self.order_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
