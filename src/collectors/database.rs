//! Database Metrics Collector
//!
//! Collects per-table row and size estimates from `admin/get-table-stats`.
//!
//! # Metrics Produced
//! - `database_table_rows` - Labels: tablename, software
//! - `database_table_size_bytes` - Labels: tablename, software
//!   - plus `tablename="total"`: the sum over every table, including the
//!     PostgreSQL statistics views that are not reported individually

use super::{collect_endpoint, CollectionContext, CollectionResult};
use crate::fedi::types::{TableStat, TableStatsMap};
use crate::fedi::{RequestOptions, SoftwareVariant, Transport};
use crate::metrics::MetricsCollector;
use serde::Deserialize;
use tracing::debug;

pub const TABLE_STATS_ENDPOINT: &str = "admin/get-table-stats";

/// Tables with this prefix are PostgreSQL internals
pub const INTERNAL_TABLE_PREFIX: &str = "pg_stat_";

/// Synthetic `tablename` for the summed size
pub const TOTAL_TABLE: &str = "total";

/// Update table gauges and return the summed size.
///
/// The total is only emitted when strictly positive.
pub fn record_table_stats(
    metrics: &MetricsCollector,
    software: SoftwareVariant,
    tables: &TableStatsMap,
) -> f64 {
    let software = software.as_str();
    let mut total_size = 0.0;

    for (name, raw) in tables {
        let table = match TableStat::deserialize(raw) {
            Ok(table) => table,
            Err(e) => {
                debug!("Skipping table {}: {}", name, e);
                continue;
            }
        };

        total_size += table.total_size().unwrap_or_default();

        if name.starts_with(INTERNAL_TABLE_PREFIX) {
            continue;
        }
        metrics.set_gauge_opt(
            &metrics.database_table_rows,
            &[name.as_str(), software],
            table.row_count(),
        );
        metrics.set_gauge_opt(
            &metrics.database_table_size_bytes,
            &[name.as_str(), software],
            table.total_size(),
        );
    }

    if total_size > 0.0 {
        metrics.set_gauge(
            &metrics.database_table_size_bytes,
            &[TOTAL_TABLE, software],
            total_size,
        );
    }
    total_size
}

/// Collects database table metrics (requires the API token)
pub async fn collect_database_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    collect_endpoint(
        ctx,
        TABLE_STATS_ENDPOINT,
        RequestOptions::authenticated(),
        |tables: TableStatsMap| {
            record_table_stats(ctx.metrics, ctx.software, &tables);
        },
    )
    .await
}
