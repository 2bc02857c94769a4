//! Collection Pass
//!
//! One pass reads `meta`, detects the server variant, then runs every collector in
//! a fixed order. A failed `meta` read abandons the pass before any gauge is
//! touched; any other failure is logged and the pass carries on.

use super::{
    collect_database_metrics, collect_federation_metrics, collect_instance_stats_metrics,
    collect_legacy_stats_metrics, collect_meta_metrics, collect_queue_metrics,
    collect_system_info_metrics, CollectionContext, CollectionStatus,
};
use crate::fedi::types::MetaInfo;
use crate::fedi::{detect, fetch, RequestOptions, SoftwareVariant, Transport};
use crate::metrics::MetricsCollector;
use anyhow::Context;
use serde_json::Value;
use tracing::{info, warn};

pub const META_ENDPOINT: &str = "meta";

/// Outcome of a completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub software: SoftwareVariant,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run one collection pass.
///
/// Returns `Err` only when `meta` cannot be fetched or is not a JSON object.
pub async fn run_collection_pass<T: Transport>(
    client: &T,
    metrics: &MetricsCollector,
) -> anyhow::Result<PassSummary> {
    info!("Collecting metrics");

    let response = fetch(client, META_ENDPOINT, &RequestOptions::public()).await;
    let data = match response.data {
        Some(data @ Value::Object(_)) if response.success => data,
        Some(other) if response.success => {
            anyhow::bail!("meta returned a non-object body: {}", other)
        }
        _ => anyhow::bail!("Failed to fetch meta information"),
    };
    let meta: MetaInfo = serde_json::from_value(data).context("Failed to decode meta")?;

    let software = detect(&meta);
    info!(
        "Detected {} {}",
        software,
        meta.version.as_deref().unwrap_or("(unknown version)")
    );

    let ctx = CollectionContext {
        client,
        metrics,
        software,
    };
    let mut summary = PassSummary {
        software,
        succeeded: 0,
        failed: 0,
    };

    collect_meta_metrics(&ctx, &meta);

    macro_rules! collect {
        ($name:literal, $collector:expr) => {
            match $collector.await {
                Ok(CollectionStatus::Success) => summary.succeeded += 1,
                Ok(CollectionStatus::Failed) => summary.failed += 1,
                Err(e) => {
                    warn!("{} collector error: {:#}", $name, e);
                    summary.failed += 1;
                }
            }
        };
    }

    collect!("instance stats", collect_instance_stats_metrics(&ctx));
    collect!("system info", collect_system_info_metrics(&ctx));
    collect!("federation", collect_federation_metrics(&ctx));
    collect!("database", collect_database_metrics(&ctx));
    collect!("queue", collect_queue_metrics(&ctx));
    collect!("legacy stats", collect_legacy_stats_metrics(&ctx));

    info!(
        "Collection pass finished for {}: {} succeeded, {} failed",
        software, summary.succeeded, summary.failed
    );
    Ok(summary)
}
