use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::app_system::SharedClock;
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{DailySummary, LowStockProduct};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::reports::{DailySummaryCache, ReportKey, DAILY_SUMMARY_TTL};

/// `[date 00:00, date+1 00:00)` in UTC.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let end = date
        .succ_opt()
        .map(|next| Utc.from_utc_datetime(&next.and_time(NaiveTime::MIN)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Read-side reports over orders and stock.
///
/// Daily summaries go through the report cache; low-stock listings always
/// read live stock.
#[derive(Clone)]
pub struct ReportClient {
    order_client: OrderClient,
    product_client: ProductClient,
    cache: DailySummaryCache,
    clock: SharedClock,
    default_low_stock_threshold: u32,
}

impl ReportClient {
    pub fn new(
        order_client: OrderClient,
        product_client: ProductClient,
        cache: DailySummaryCache,
        clock: SharedClock,
        default_low_stock_threshold: u32,
    ) -> Self {
        Self {
            order_client,
            product_client,
            cache,
            clock,
            default_low_stock_threshold,
        }
    }

    /// Order count and revenue for `date`, today (UTC) when `None`.
    #[instrument(skip(self))]
    pub async fn daily_summary(&self, date: Option<NaiveDate>) -> Result<DailySummary, OrderError> {
        let date = date.unwrap_or_else(|| self.clock.today());
        self.cache
            .get_or_compute(ReportKey::DailySummary(date), DAILY_SUMMARY_TTL, || {
                self.compute_daily_summary(date)
            })
            .await
    }

    async fn compute_daily_summary(&self, date: NaiveDate) -> Result<DailySummary, OrderError> {
        let (start, end) = day_bounds(date);
        let orders = self.order_client.orders_between(start, end).await?;
        let total_revenue = orders
            .iter()
            .try_fold(Decimal::ZERO, |sum, order| sum.checked_add(order.total_amount))
            .ok_or_else(|| OrderError::ValidationError(format!("revenue for {} overflows", date)))?;

        debug!(%date, total_orders = orders.len(), %total_revenue, "Daily summary computed");
        Ok(DailySummary {
            date,
            total_orders: orders.len(),
            total_revenue,
        })
    }

    /// Live products with stock strictly below `threshold`, ordered by id.
    ///
    /// # Errors
    /// `ValidationError` for a negative threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: Option<i64>) -> Result<Vec<LowStockProduct>, ProductError> {
        let threshold = threshold.unwrap_or(i64::from(self.default_low_stock_threshold));
        let threshold = u64::try_from(threshold).map_err(|_| {
            ProductError::ValidationError(format!("threshold must be non-negative, got {}", threshold))
        })?;

        let products = self.product_client.products_below(threshold).await?;
        Ok(products.into_iter().map(LowStockProduct::from).collect())
    }
}
