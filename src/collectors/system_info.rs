//! System Information Metrics Collector
//!
//! Collects host facts from `admin/server-info`.
//!
//! # Metrics Produced
//! - `system_cpu_usage` - CPU core count
//! - `system_memory_bytes` - Labels: type (total)
//! - `system_disk_bytes` - Labels: type (total, used, free)

use super::{collect_endpoint, CollectionContext, CollectionResult};
use crate::fedi::types::ServerInfo;
use crate::fedi::{RequestOptions, Transport};
use crate::metrics::MetricsCollector;

pub const SERVER_INFO_ENDPOINT: &str = "admin/server-info";

fn record_server_info(metrics: &MetricsCollector, info: &ServerInfo) {
    if let Some(cores) = info.cpu.as_ref().and_then(|cpu| cpu.cores) {
        metrics.system_cpu_usage.set(cores);
    }

    if let Some(mem) = &info.mem {
        metrics.set_gauge_opt(&metrics.system_memory_bytes, &["total"], mem.total);
    }

    // Free space is derived; the API only reports total and used
    if let Some(fs) = &info.fs {
        metrics.set_gauge_opt(&metrics.system_disk_bytes, &["total"], fs.total);
        metrics.set_gauge_opt(&metrics.system_disk_bytes, &["used"], fs.used);
        metrics.set_gauge_opt(&metrics.system_disk_bytes, &["free"], fs.free());
    }
}

/// Collects system information metrics
///
/// Queries the admin server-info API and updates CPU, memory and disk gauges.
/// Requires the API token.
///
/// # Returns
///
/// * `Ok(CollectionStatus::Success)` - Successfully collected system info metrics
/// * `Ok(CollectionStatus::Failed)` - Failed to collect metrics (non-fatal, logged as warning)
pub async fn collect_system_info_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    collect_endpoint(
        ctx,
        SERVER_INFO_ENDPOINT,
        RequestOptions::authenticated(),
        |info: ServerInfo| record_server_info(ctx.metrics, &info),
    )
    .await
}
