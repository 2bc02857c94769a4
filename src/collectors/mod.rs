//! Metrics Collectors
//!
//! This module contains one collector per statistics domain of a Misskey-family
//! server. Each collector queries a single API endpoint and updates the
//! corresponding Prometheus gauges.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Accept a `CollectionContext` carrying the transport, the metrics and the
//!   software variant detected for this pass
//! - Fetch the endpoint and record `endpoint_availability` from the outcome
//! - Decode leniently and update only the gauges whose source field is present
//! - Return `CollectionResult` (`Ok(Success)` or `Ok(Failed)`)
//!
//! The pass itself lives in [`pass`]: it reads `meta`, detects the variant and
//! runs the collectors in a fixed order.
//!
//! # Error Handling
//!
//! Individual collector failures are non-fatal - they log warnings and return
//! `Ok(CollectionStatus::Failed)`. Only a failed `meta` fetch abandons a pass.

use crate::fedi::{fetch, RequestOptions, SoftwareVariant, Transport};
use crate::metrics::MetricsCollector;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Shared context passed to all collectors
///
/// All fields are immutable references or plain values, so no invariants can be
/// violated by handing it around.
pub struct CollectionContext<'a, T> {
    /// API transport for querying endpoints
    pub client: &'a T,
    /// Metrics collector for updating Prometheus metrics
    pub metrics: &'a MetricsCollector,
    /// Variant detected from `meta` at the start of this pass
    pub software: SoftwareVariant,
}

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Metrics were successfully collected and updated
    Success,
    /// Collection failed but is non-fatal (already logged as warning)
    Failed,
}

/// Result type for collector functions
///
/// - `Ok(CollectionStatus::Success)` = Collection succeeded
/// - `Ok(CollectionStatus::Failed)` = Collection failed but non-fatal (logged as warning)
/// - `Err(_)` = Unexpected error; the pass logs it and carries on
pub type CollectionResult = Result<CollectionStatus, anyhow::Error>;

/// Helper to reduce boilerplate in collectors
///
/// Wraps a fallible step with consistent error handling:
/// - On success: processes data, logs success, returns `CollectionStatus::Success`
/// - On error: logs warning, returns `CollectionStatus::Failed` (non-fatal)
///
/// # Examples
///
/// ```no_run
/// # use fedi_exporter::collectors::*;
/// # async fn example() -> CollectionResult {
/// collect_with_handler(
///     "stats",
///     async { Ok::<_, serde_json::Error>(vec![1.0, 2.0]) },
///     |values| {
///         for value in values {
///             // Update metrics...
///         }
///     },
/// )
/// .await
/// # }
/// ```
pub async fn collect_with_handler<T, F, P, E>(
    name: &str,
    query_future: F,
    process: P,
) -> CollectionResult
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T),
{
    match query_future.await {
        Ok(data) => {
            process(data);
            info!("Updated {} metrics", name);
            Ok(CollectionStatus::Success)
        }
        Err(e) => {
            warn!("Failed to collect {}: {}", name, e);
            Ok(CollectionStatus::Failed)
        }
    }
}

/// Fetch one endpoint, record its availability, then decode and process it.
///
/// Availability reflects the fetch alone; a body that fails to decode as `D` is
/// logged and reported as `Failed` without touching any other gauge.
pub async fn collect_endpoint<T, D, P>(
    ctx: &CollectionContext<'_, T>,
    endpoint: &str,
    options: RequestOptions,
    process: P,
) -> CollectionResult
where
    T: Transport,
    D: DeserializeOwned,
    P: FnOnce(D),
{
    let response = fetch(ctx.client, endpoint, &options).await;
    ctx.metrics
        .set_endpoint_availability(endpoint, ctx.software, response.success);

    let Some(data) = response.data else {
        if response.success {
            warn!("{} returned an empty body", endpoint);
        }
        return Ok(CollectionStatus::Failed);
    };

    collect_with_handler(
        endpoint,
        async move { serde_json::from_value::<D>(data) },
        process,
    )
    .await
}

// Collector modules
pub mod database;
pub mod federation;
pub mod instance_stats;
pub mod meta;
pub mod pass;
pub mod queue;
pub mod system_info;

// Re-export collector functions for convenient access
pub use database::collect_database_metrics;
pub use federation::collect_federation_metrics;
pub use instance_stats::{collect_instance_stats_metrics, collect_legacy_stats_metrics};
pub use meta::collect_meta_metrics;
pub use pass::{run_collection_pass, PassSummary};
pub use queue::{collect_queue_metrics, QueueSchema};
pub use system_info::collect_system_info_metrics;
