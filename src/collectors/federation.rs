//! Federation Metrics Collector
//!
//! Walks the public `federation/instances` directory page by page.
//!
//! # Metrics Produced
//! - `federated_instance_info` - per-peer counters
//!   - Labels: host, metric (users_count, notes_count, following_count, followers_count)
//!
//! A large instance knows tens of thousands of peers, so a pass reads at most
//! [`FEDERATION_MAX_ROWS`] rows.

use super::{CollectionContext, CollectionResult, CollectionStatus};
use crate::fedi::types::FederatedInstance;
use crate::fedi::{fetch, RequestOptions, Transport};
use crate::metrics::MetricsCollector;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const FEDERATION_ENDPOINT: &str = "federation/instances";
pub const FEDERATION_PAGE_SIZE: usize = 100;
pub const FEDERATION_MAX_ROWS: usize = 1000;

fn record_instance(metrics: &MetricsCollector, instance: &FederatedInstance) {
    let host = instance.host.as_str();
    let values = [
        ("users_count", instance.users_count),
        ("notes_count", instance.notes_count),
        ("following_count", instance.following_count),
        ("followers_count", instance.followers_count),
    ];
    for (name, value) in values {
        metrics.set_gauge_opt(&metrics.federated_instance_info, &[host, name], value);
    }
}

fn page_request(offset: usize) -> RequestOptions {
    RequestOptions::public().with_body(json!({
        "sort": "+pubSub",
        "limit": FEDERATION_PAGE_SIZE,
        "offset": offset,
    }))
}

/// Collects per-peer federation metrics
///
/// Requests pages of [`FEDERATION_PAGE_SIZE`] rows until a short page arrives or
/// [`FEDERATION_MAX_ROWS`] rows have been requested. Rows without a `host` are
/// skipped. `endpoint_availability` is written once, after the last page: 1 if
/// every page fetch succeeded. A fetch failing mid-walk stops the walk and
/// leaves availability at 0, while the hosts from pages already read stay
/// recorded.
pub async fn collect_federation_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    let mut offset = 0;
    let mut hosts = 0;
    let mut available = true;
    let mut complete = true;

    loop {
        let response = fetch(ctx.client, FEDERATION_ENDPOINT, &page_request(offset)).await;
        if !response.success {
            available = false;
            break;
        }

        let rows = match response.data {
            Some(Value::Array(rows)) => rows,
            other => {
                warn!(
                    "Unexpected federation page at offset {}: {}",
                    offset,
                    other.map(|v| v.to_string()).unwrap_or_else(|| "empty".into())
                );
                complete = false;
                break;
            }
        };

        for row in &rows {
            match FederatedInstance::deserialize(row) {
                Ok(instance) => {
                    record_instance(ctx.metrics, &instance);
                    hosts += 1;
                }
                Err(e) => debug!("Skipping federation row: {}", e),
            }
        }

        offset += FEDERATION_PAGE_SIZE;
        if rows.len() < FEDERATION_PAGE_SIZE || offset >= FEDERATION_MAX_ROWS {
            break;
        }
    }

    ctx.metrics
        .set_endpoint_availability(FEDERATION_ENDPOINT, ctx.software, available);

    if available && complete {
        info!("Updated federation metrics for {} instances", hosts);
        Ok(CollectionStatus::Success)
    } else {
        warn!(
            "Federation listing stopped at offset {} after {} instances",
            offset, hosts
        );
        Ok(CollectionStatus::Failed)
    }
}
