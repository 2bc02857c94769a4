//! Job Queue Metrics Collector
//!
//! `admin/queue/stats` comes in two incompatible layouts:
//!
//! - **Fixed queues** (Firefish): a document with the known keys `deliver`, `inbox`,
//!   `db`, `objectStorage` and optionally `backgroundQueue`.
//! - **Open map** (Misskey and every other fork): any number of queue names, each
//!   with BullMQ counts including `prioritized` and `waiting-children`.
//!
//! [`QueueSchema::for_variant`] picks the layout; each layout has its own collector.
//!
//! # Metrics Produced
//! - `instance_queue_jobs` - jobs in the queue - Labels: queue, software
//! - `instance_queue_delayed_jobs` - only when delayed > 0 - Labels: queue, software
//! - `instance_stats{metric="queue_<name>_<state>"}` - open map only; state is one of
//!   waiting, active, failed, delayed, paused

use super::{collect_endpoint, CollectionContext, CollectionResult};
use crate::fedi::types::{QueueCounts, QueueStatsMap, FIREFISH_QUEUES};
use crate::fedi::{RequestOptions, SoftwareVariant, Transport};
use crate::metrics::MetricsCollector;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const QUEUE_STATS_ENDPOINT: &str = "admin/queue/stats";

/// Layout of the queue statistics document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSchema {
    FixedQueues,
    OpenMap,
}

impl QueueSchema {
    pub fn for_variant(software: SoftwareVariant) -> Self {
        match software {
            SoftwareVariant::Firefish => QueueSchema::FixedQueues,
            _ => QueueSchema::OpenMap,
        }
    }
}

fn decode_queue(name: &str, raw: &Value) -> Option<QueueCounts> {
    match QueueCounts::deserialize(raw) {
        Ok(counts) => Some(counts),
        Err(e) => {
            debug!("Skipping queue {}: {}", name, e);
            None
        }
    }
}

fn record_delayed(metrics: &MetricsCollector, labels: &[&str], delayed: f64) {
    if delayed > 0.0 {
        metrics.set_gauge(&metrics.queue_delayed_jobs, labels, delayed);
    }
}

/// Update gauges from a fixed-queue document; unknown keys are ignored
pub fn record_fixed_queues(
    metrics: &MetricsCollector,
    software: SoftwareVariant,
    queues: &QueueStatsMap,
) {
    for name in FIREFISH_QUEUES {
        let Some(counts) = queues.get(name).and_then(|raw| decode_queue(name, raw)) else {
            continue;
        };
        let labels = [name, software.as_str()];
        let delayed = counts.delayed.unwrap_or_default();
        let depth =
            counts.waiting.unwrap_or_default() + counts.active.unwrap_or_default() + delayed;

        metrics.set_gauge(&metrics.queue_jobs, &labels, depth);
        record_delayed(metrics, &labels, delayed);
    }
}

/// Update gauges from an open queue map
pub fn record_open_queues(
    metrics: &MetricsCollector,
    software: SoftwareVariant,
    queues: &QueueStatsMap,
) {
    for (name, raw) in queues {
        let Some(counts) = decode_queue(name, raw) else {
            continue;
        };
        let labels = [name.as_str(), software.as_str()];
        let delayed = counts.delayed.unwrap_or_default();
        let depth = [
            counts.waiting,
            counts.active,
            counts.failed,
            counts.paused,
            counts.prioritized,
            counts.waiting_children,
        ]
        .into_iter()
        .flatten()
        .sum::<f64>()
            + delayed;

        metrics.set_gauge(&metrics.queue_jobs, &labels, depth);
        record_delayed(metrics, &labels, delayed);

        let states = [
            ("waiting", counts.waiting),
            ("active", counts.active),
            ("failed", counts.failed),
            ("delayed", counts.delayed),
            ("paused", counts.paused),
        ];
        for (state, value) in states {
            let metric = format!("queue_{}_{}", name, state);
            metrics.set_gauge_opt(&metrics.instance_stats, &[metric.as_str()], value);
        }
    }
}

/// Collects queue metrics for Firefish's fixed queue set
pub async fn collect_fixed_queue_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    collect_endpoint(
        ctx,
        QUEUE_STATS_ENDPOINT,
        RequestOptions::authenticated(),
        |queues: QueueStatsMap| record_fixed_queues(ctx.metrics, ctx.software, &queues),
    )
    .await
}

/// Collects queue metrics for an open queue map
pub async fn collect_open_queue_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    collect_endpoint(
        ctx,
        QUEUE_STATS_ENDPOINT,
        RequestOptions::authenticated(),
        |queues: QueueStatsMap| record_open_queues(ctx.metrics, ctx.software, &queues),
    )
    .await
}

/// Collects queue metrics using the layout the detected variant reports
pub async fn collect_queue_metrics<T: Transport>(
    ctx: &CollectionContext<'_, T>,
) -> CollectionResult {
    match QueueSchema::for_variant(ctx.software) {
        QueueSchema::FixedQueues => collect_fixed_queue_metrics(ctx).await,
        QueueSchema::OpenMap => collect_open_queue_metrics(ctx).await,
    }
}
