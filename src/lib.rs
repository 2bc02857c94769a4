//! Misskey-family Prometheus Exporter
//!
//! A Prometheus metrics exporter for Misskey and its API-compatible forks
//! (Calckey, Firefish, Sharkey, FoundKey).
//!
//! # Overview
//!
//! The exporter polls the instance's public and admin REST endpoints on a fixed
//! interval, normalizes the answers across the software variants, and exposes
//! the result as Prometheus gauges. Metric names and label keys are a stable
//! surface that existing dashboards query.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    POST /api/*       ┌──────────────┐
//! │  Misskey /  │ ◄─────────────────►  │   Exporter   │
//! │   fork      │   JSON + Bearer      │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │ Client │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Metrics │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fedi`] - HTTP client, response types and variant detection
//! - [`collectors`] - per-endpoint collectors and the collection pass
//! - [`metrics`] - Prometheus metric definitions
//! - [`server`] - HTTP server and collection loop
//! - [`validation`] - endpoint schema checks used by `validate-endpoints`
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use fedi_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod fedi;
pub mod metrics;
pub mod server;
pub mod validation;
