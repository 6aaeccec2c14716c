//! Reporting: the read-through cache and the keys it is addressed by.

pub mod cache;

pub use cache::*;

use chrono::NaiveDate;
use std::time::Duration;

use crate::domain::DailySummary;

/// Daily summaries are served from cache for at most this long.
pub const DAILY_SUMMARY_TTL: Duration = Duration::from_secs(5 * 60);

/// Report kind plus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKey {
    /// Aggregate over `[date 00:00, date+1 00:00)` UTC.
    DailySummary(NaiveDate),
}

pub type DailySummaryCache = ReportCache<ReportKey, DailySummary>;
