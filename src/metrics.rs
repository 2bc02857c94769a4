//! Prometheus Metrics Definitions
//!
//! This module defines every gauge exposed by the exporter. Names and label keys
//! are fixed by existing dashboards, so nothing here carries a namespace prefix.
//!
//! # Metric Categories
//!
//! ## Instance
//! - `instance_stats{metric}` - counters from `stats`, plus per-state queue counts
//! - `instance_users_total`, `instance_notes_total` - legacy bare counters
//! - `drive_usage_bytes{type}` - local/remote drive usage
//! - `instance_software{metric,software,version}` - detected software (always 1)
//!
//! ## Host and Process
//! - `system_cpu_usage` - CPU core count reported by `admin/server-info`
//! - `system_memory_bytes{type}`, `system_disk_bytes{type}`
//! - `process_memory_bytes{type}`, `process_cpu_usage_percent`
//!
//! ## Queues, Federation, Database
//! - `instance_queue_jobs{queue,software}`, `instance_queue_delayed_jobs{queue,software}`
//! - `federated_instance_info{host,metric}`
//! - `database_table_rows{tablename,software}`, `database_table_size_bytes{tablename,software}`
//!
//! ## Exporter
//! - `endpoint_availability{endpoint,software}` - 1 if the last fetch succeeded
//! - `fedi_exporter_up` - 1 if the last pass could read `meta`
//!
//! Gauges are never reset between passes: a value that is not refreshed keeps
//! its last reading.

use crate::fedi::SoftwareVariant;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector for a Misskey-family instance
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // Instance metrics
    pub instance_stats: Arc<GaugeVec>,
    pub users_total: Arc<Gauge>,
    pub notes_total: Arc<Gauge>,
    pub drive_usage_bytes: Arc<GaugeVec>,
    pub software_info: Arc<GaugeVec>,

    // System metrics
    pub system_cpu_usage: Arc<Gauge>,
    pub system_memory_bytes: Arc<GaugeVec>,
    pub system_disk_bytes: Arc<GaugeVec>,

    // Process metrics
    pub process_memory_bytes: Arc<GaugeVec>,
    pub process_cpu_usage_percent: Arc<Gauge>,

    // Queue metrics
    pub queue_jobs: Arc<GaugeVec>,
    pub queue_delayed_jobs: Arc<GaugeVec>,

    // Federation
    pub federated_instance_info: Arc<GaugeVec>,

    // Database
    pub database_table_rows: Arc<GaugeVec>,
    pub database_table_size_bytes: Arc<GaugeVec>,

    // Exporter health
    pub endpoint_availability: Arc<GaugeVec>,
    pub up: Arc<Gauge>,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Instance metrics
        let instance_stats = GaugeVec::new(
            Opts::new("instance_stats", "Instance statistics"),
            &["metric"],
        )?;

        let users_total = Gauge::new(
            "instance_users_total",
            "Total number of users on the instance",
        )?;

        let notes_total = Gauge::new(
            "instance_notes_total",
            "Total number of notes on the instance",
        )?;

        let drive_usage_bytes = GaugeVec::new(
            Opts::new("drive_usage_bytes", "Drive usage in bytes"),
            &["type"],
        )?;

        let software_info = GaugeVec::new(
            Opts::new(
                "instance_software",
                "Information about the instance software",
            ),
            &["metric", "software", "version"],
        )?;

        // System metrics
        let system_cpu_usage = Gauge::new(
            "system_cpu_usage",
            "CPU core count reported by the server",
        )?;

        let system_memory_bytes = GaugeVec::new(
            Opts::new("system_memory_bytes", "Memory usage in bytes"),
            &["type"],
        )?;

        let system_disk_bytes = GaugeVec::new(
            Opts::new("system_disk_bytes", "Disk usage in bytes"),
            &["type"],
        )?;

        // Process metrics
        let process_memory_bytes = GaugeVec::new(
            Opts::new(
                "process_memory_bytes",
                "Process memory usage in bytes",
            ),
            &["type"],
        )?;

        let process_cpu_usage_percent = Gauge::new(
            "process_cpu_usage_percent",
            "Process CPU usage percentage",
        )?;

        // Queue metrics
        let queue_jobs = GaugeVec::new(
            Opts::new("instance_queue_jobs", "Number of jobs in each queue"),
            &["queue", "software"],
        )?;

        let queue_delayed_jobs = GaugeVec::new(
            Opts::new(
                "instance_queue_delayed_jobs",
                "Number of delayed jobs in each queue",
            ),
            &["queue", "software"],
        )?;

        let federated_instance_info = GaugeVec::new(
            Opts::new(
                "federated_instance_info",
                "Information about federated instances",
            ),
            &["host", "metric"],
        )?;

        let database_table_rows = GaugeVec::new(
            Opts::new(
                "database_table_rows",
                "Estimated number of rows in each database table",
            ),
            &["tablename", "software"],
        )?;

        let database_table_size_bytes = GaugeVec::new(
            Opts::new(
                "database_table_size_bytes",
                "Size of each database table in bytes",
            ),
            &["tablename", "software"],
        )?;

        let endpoint_availability = GaugeVec::new(
            Opts::new("endpoint_availability", "Availability of API endpoints"),
            &["endpoint", "software"],
        )?;

        let up = Gauge::new(
            "fedi_exporter_up",
            "Whether the last collection pass could read meta (1=up, 0=down)",
        )?;

        // Register all metrics
        registry.register(Box::new(instance_stats.clone()))?;
        registry.register(Box::new(users_total.clone()))?;
        registry.register(Box::new(notes_total.clone()))?;
        registry.register(Box::new(drive_usage_bytes.clone()))?;
        registry.register(Box::new(software_info.clone()))?;
        registry.register(Box::new(system_cpu_usage.clone()))?;
        registry.register(Box::new(system_memory_bytes.clone()))?;
        registry.register(Box::new(system_disk_bytes.clone()))?;
        registry.register(Box::new(process_memory_bytes.clone()))?;
        registry.register(Box::new(process_cpu_usage_percent.clone()))?;
        registry.register(Box::new(queue_jobs.clone()))?;
        registry.register(Box::new(queue_delayed_jobs.clone()))?;
        registry.register(Box::new(federated_instance_info.clone()))?;
        registry.register(Box::new(database_table_rows.clone()))?;
        registry.register(Box::new(database_table_size_bytes.clone()))?;
        registry.register(Box::new(endpoint_availability.clone()))?;
        registry.register(Box::new(up.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            instance_stats: Arc::new(instance_stats),
            users_total: Arc::new(users_total),
            notes_total: Arc::new(notes_total),
            drive_usage_bytes: Arc::new(drive_usage_bytes),
            software_info: Arc::new(software_info),
            system_cpu_usage: Arc::new(system_cpu_usage),
            system_memory_bytes: Arc::new(system_memory_bytes),
            system_disk_bytes: Arc::new(system_disk_bytes),
            process_memory_bytes: Arc::new(process_memory_bytes),
            process_cpu_usage_percent: Arc::new(process_cpu_usage_percent),
            queue_jobs: Arc::new(queue_jobs),
            queue_delayed_jobs: Arc::new(queue_delayed_jobs),
            federated_instance_info: Arc::new(federated_instance_info),
            database_table_rows: Arc::new(database_table_rows),
            database_table_size_bytes: Arc::new(database_table_size_bytes),
            endpoint_availability: Arc::new(endpoint_availability),
            up: Arc::new(up),
        })
    }

    /// Set a labeled gauge
    pub fn set_gauge(&self, gauge: &GaugeVec, labels: &[&str], value: f64) {
        gauge.with_label_values(labels).set(value);
    }

    /// Set a labeled gauge only when the value is present
    pub fn set_gauge_opt(&self, gauge: &GaugeVec, labels: &[&str], value: Option<f64>) {
        if let Some(value) = value {
            self.set_gauge(gauge, labels, value);
        }
    }

    /// Set a labeled gauge to 1 or 0
    pub fn set_bool_metric(&self, gauge: &GaugeVec, labels: &[&str], value: bool) {
        self.set_gauge(gauge, labels, if value { 1.0 } else { 0.0 });
    }

    /// Record whether the latest fetch of `endpoint` succeeded
    pub fn set_endpoint_availability(
        &self,
        endpoint: &str,
        software: SoftwareVariant,
        available: bool,
    ) {
        self.set_bool_metric(
            &self.endpoint_availability,
            &[endpoint, software.as_str()],
            available,
        );
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics collector")
    }
}
