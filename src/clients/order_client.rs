use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, Instrument};

use crate::actor_framework::{Filter, ResourceClient};
use crate::app_system::SharedClock;
use crate::clients::ProductClient;
use crate::domain::{Order, OrderCreate, OrderId, OrderLineSummary, OrderRequestLine, OrderSummary};
use crate::order_actor::{AssembledOrder, OrderAssembler, OrderError};
use crate::reports::{DailySummaryCache, ReportKey};

/// Client for interacting with the Order actor.
///
/// Placing an order spans two actors: the stock for every line is reserved
/// in one batch on the product actor, then the order is written to the order
/// actor. If the write fails the reservation is released again, so a failed
/// placement leaves stock as it found it.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    assembler: OrderAssembler,
    report_cache: DailySummaryCache,
    clock: SharedClock,
}

impl_client_methods!(OrderClient, Order, OrderId, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        report_cache: DailySummaryCache,
        clock: SharedClock,
    ) -> Self {
        Self {
            inner,
            assembler: OrderAssembler::new(product_client.clone()),
            product_client,
            report_cache,
            clock,
        }
    }

    /// Places an order for `lines`, reserving stock for all of them or none.
    ///
    /// # Errors
    /// - `ValidationError` for an empty request or a zero quantity
    /// - `ProductNotFound` for an unknown or soft-deleted product
    /// - `InsufficientStock` naming the first line that does not fit
    /// - `PersistenceError` when the order could not be stored
    #[instrument(skip(self, lines), fields(requested_lines = lines.len()))]
    pub async fn place_order(&self, lines: Vec<OrderRequestLine>) -> Result<OrderSummary, OrderError> {
        info!("Processing place_order request");
        let assembled = self.assembler.assemble(&lines).await?;

        // Once stock is touched the commit runs to completion even if the caller goes away.
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.commit(assembled).await }.in_current_span())
            .await
            .map_err(|e| OrderError::PersistenceError(format!("order commit task failed: {}", e)))?
    }

    async fn commit(&self, assembled: AssembledOrder) -> Result<OrderSummary, OrderError> {
        let reservations = assembled.reservations();
        self.product_client.reserve_stock_batch(&reservations).await?;
        debug!(lines = reservations.len(), "Stock reserved");

        let order_date = self.clock.now();
        let payload = OrderCreate {
            order_date,
            lines: assembled.lines.clone(),
        };
        let order_id = match self.inner.create(payload).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Order persistence failed, releasing stock");
                if let Err(release_err) = self.product_client.release_stock_batch(&reservations).await {
                    error!(error = %release_err, "Stock release failed");
                }
                return Err(OrderError::PersistenceError(e.to_string()));
            }
        };

        let key = ReportKey::DailySummary(order_date.date_naive());
        self.report_cache.invalidate(&key).await;

        info!(order_id = %order_id, total = %assembled.total, "Order committed");
        Ok(OrderSummary {
            order_id,
            order_date,
            total_amount: assembled.total,
            lines: assembled.lines.iter().map(OrderLineSummary::from).collect(),
        })
    }

    /// Like `get_order`, but an unknown id is an error.
    #[instrument(skip(self))]
    pub async fn require_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get_order(id).await?.ok_or(OrderError::NotFound(id))
    }

    /// Orders with `start <= order_date < end`, ordered by id.
    #[instrument(skip(self))]
    pub async fn orders_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let filter = Filter::new(move |o: &Order| start <= o.order_date && o.order_date < end);
        Ok(self.inner.list(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{FrameworkError, ResourceActor};
    use crate::app_system::{Clock, ManualClock};
    use crate::domain::{DailySummary, Product, ProductCreate, ProductId};
    use crate::error::ErrorKind;
    use crate::mock_framework::{create_mock_client, expect_batch, expect_create};
    use crate::order_actor::price_line;
    use crate::product_actor::{ProductAction, ProductActionResult};
    use crate::reports::{ReportCache, DAILY_SUMMARY_TTL};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn product_client(clock: SharedClock) -> ProductClient {
        let counter = Arc::new(AtomicU32::new(1));
        let next_id = move || ProductId(counter.fetch_add(1, Ordering::SeqCst));
        let (actor, inner) = ResourceActor::<Product>::new(16, next_id);
        tokio::spawn(actor.run());
        ProductClient::new(inner, clock)
    }

    #[tokio::test]
    async fn test_failed_persistence_releases_stock() {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap());
        let products = product_client(clock.clone());
        let id = products
            .create_product(ProductCreate {
                name: "Headphones".into(),
                price: Decimal::new(14999, 2),
                stock_quantity: 60,
            })
            .await
            .unwrap();

        let (inner, mut order_rx) = create_mock_client::<Order>(4);
        let cache = ReportCache::new(clock.clone());
        let orders = OrderClient::new(inner, products.clone(), cache, clock.clone());

        let task = tokio::spawn(async move { orders.place_order(vec![OrderRequestLine::new(id, 3)]).await });

        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.lines[0].quantity, 3);
        assert_eq!(products.check_stock(id).await.unwrap(), 57);
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(products.check_stock(id).await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_commit_message_sequence() {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap());
        let (product_inner, mut product_rx) = create_mock_client::<Product>(4);
        let (order_inner, mut order_rx) = create_mock_client::<Order>(4);
        let products = ProductClient::new(product_inner, clock.clone());
        let cache: DailySummaryCache = ReportCache::new(clock.clone());
        let orders = OrderClient::new(order_inner, products.clone(), cache.clone(), clock.clone());

        let today = clock.today();
        let stale = DailySummary {
            date: today,
            total_orders: 0,
            total_revenue: Decimal::ZERO,
        };
        cache.set(ReportKey::DailySummary(today), stale, DAILY_SUMMARY_TTL).await;

        let mouse = Product::new(ProductId(2), "Mouse", Decimal::new(2999, 2), 100);
        let line = price_line(&mouse, 2).unwrap();
        let assembled = AssembledOrder {
            total: line.subtotal,
            lines: vec![line],
        };
        let task = tokio::spawn(async move { orders.commit(assembled).await });

        let (actions, responder) = expect_batch(&mut product_rx).await.expect("Expected Product Batch");
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], (ProductId(2), ProductAction::ReserveStock(2))));
        responder.send(Ok(vec![ProductActionResult::ReserveStock(98)])).unwrap();

        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.order_date, clock.now());
        assert_eq!(payload.lines[0].subtotal, Decimal::new(5998, 2));
        responder.send(Ok(OrderId(1))).unwrap();

        let summary = task.await.unwrap().unwrap();
        assert_eq!(summary.order_id, OrderId(1));
        assert_eq!(summary.total_amount, Decimal::new(5998, 2));
        assert_eq!(cache.get(&ReportKey::DailySummary(today)).await, None);
    }
}
