//! Meta Metrics Collector
//!
//! Emits what the `meta` response already carries, so it needs no extra request.
//!
//! # Metrics Produced
//! - `instance_software` - detected software (value is always 1)
//!   - Labels: metric="version", software, version
//! - `process_memory_bytes` - heap_used, heap_total, rss, external (only when > 0)
//!   - Labels: type
//! - `process_cpu_usage_percent` - process CPU usage (only when >= 0)

use super::CollectionContext;
use crate::fedi::types::MetaInfo;
use tracing::debug;

pub fn collect_meta_metrics<T>(ctx: &CollectionContext<'_, T>, meta: &MetaInfo) {
    let metrics = ctx.metrics;

    if let Some(version) = meta.version.as_deref() {
        metrics.set_gauge(
            &metrics.software_info,
            &["version", ctx.software.as_str(), version],
            1.0,
        );
    }

    let Some(process) = &meta.process else {
        debug!("meta carries no process statistics");
        return;
    };

    let memory = [
        ("heap_used", process.heap_used),
        ("heap_total", process.heap_total),
        ("rss", process.rss),
        ("external", process.external),
    ];
    for (kind, value) in memory {
        metrics.set_gauge_opt(
            &metrics.process_memory_bytes,
            &[kind],
            value.filter(|v| *v > 0.0),
        );
    }

    if let Some(cpu) = process.cpu_usage.filter(|v| *v >= 0.0) {
        metrics.process_cpu_usage_percent.set(cpu);
    }
}
