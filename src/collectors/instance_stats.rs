//! Instance Statistics Collector
//!
//! Reads the public `stats` endpoint twice per pass:
//!
//! 1. [`collect_instance_stats_metrics`] runs with the other collectors and owns the
//!    `endpoint_availability` entry for `stats`.
//! 2. [`collect_legacy_stats_metrics`] runs last and feeds the bare legacy gauges
//!    older dashboards still query. The second request is intentional.
//!
//! # Metrics Produced
//! - `instance_stats` - Labels: metric (notes_count, original_notes_count, users_count,
//!   original_users_count, reactions_count, instances_count, drive_usage_local,
//!   drive_usage_remote, federated_instances)
//! - `instance_users_total`, `instance_notes_total` - legacy bare counters
//! - `drive_usage_bytes` - Labels: type (local, remote); only when > 0

use super::{collect_endpoint, CollectionContext, CollectionResult, CollectionStatus};
use crate::fedi::types::ServerStats;
use crate::fedi::{fetch, RequestOptions, Transport};
use crate::metrics::MetricsCollector;
use tracing::{info, warn};

pub const STATS_ENDPOINT: &str = "stats";

fn record_instance_stats(metrics: &MetricsCollector, stats: &ServerStats) {
    let values = [
        ("notes_count", stats.notes_count),
        ("original_notes_count", stats.original_notes_count),
        ("users_count", stats.users_count),
        ("original_users_count", stats.original_users_count),
        ("reactions_count", stats.reactions_count),
        ("instances_count", stats.instances),
        ("drive_usage_local", stats.drive_usage_local),
        ("drive_usage_remote", stats.drive_usage_remote),
    ];
    for (name, value) in values {
        metrics.set_gauge_opt(&metrics.instance_stats, &[name], value);
    }
}

/// Collects instance counters from the public `stats` endpoint
pub async fn collect_instance_stats_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    collect_endpoint(
        ctx,
        STATS_ENDPOINT,
        RequestOptions::public(),
        |stats: ServerStats| record_instance_stats(ctx.metrics, &stats),
    )
    .await
}

fn record_legacy_stats(metrics: &MetricsCollector, stats: &ServerStats) {
    if let Some(users) = stats.users_count {
        metrics.set_gauge(&metrics.instance_stats, &["users_count"], users);
        metrics.users_total.set(users);
    }
    if let Some(notes) = stats.notes_count {
        metrics.set_gauge(&metrics.instance_stats, &["notes_count"], notes);
        metrics.notes_total.set(notes);
    }

    let values = [
        ("original_users_count", stats.original_users_count),
        ("original_notes_count", stats.original_notes_count),
        ("reactions_count", stats.reactions_count),
        ("federated_instances", stats.instances),
    ];
    for (name, value) in values {
        metrics.set_gauge_opt(&metrics.instance_stats, &[name], value);
    }

    let drives = [
        ("local", stats.drive_usage_local),
        ("remote", stats.drive_usage_remote),
    ];
    for (kind, value) in drives {
        metrics.set_gauge_opt(
            &metrics.drive_usage_bytes,
            &[kind],
            value.filter(|v| *v > 0.0),
        );
    }
}

/// Re-reads `stats` for the legacy gauges.
///
/// Does not touch `endpoint_availability`; the first read already recorded it.
pub async fn collect_legacy_stats_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    let response = fetch(ctx.client, STATS_ENDPOINT, &RequestOptions::public()).await;
    let Some(data) = response.data else {
        warn!("Failed to fetch stats for legacy metrics");
        return Ok(CollectionStatus::Failed);
    };

    match serde_json::from_value::<ServerStats>(data) {
        Ok(stats) => {
            record_legacy_stats(ctx.metrics, &stats);
            info!("Updated legacy stats metrics");
            Ok(CollectionStatus::Success)
        }
        Err(e) => {
            warn!("Failed to decode stats for legacy metrics: {}", e);
            Ok(CollectionStatus::Failed)
        }
    }
}
