//! Misskey API Type Definitions
//!
//! Per-cycle response shapes consumed by the collectors.
//!
//! # Design Notes
//!
//! - **Lenient numbers**: every numeric field goes through [`lenient_number`], so a
//!   missing, `null`, or wrong-typed value becomes `None` instead of failing the
//!   whole document. Collectors then skip exactly that one observation.
//! - **Open maps**: queue and table statistics are keyed by names the server
//!   chooses; they are kept as `BTreeMap<String, serde_json::Value>` and each entry
//!   is decoded on its own so one malformed entry cannot hide the others.
//! - Only fields the exporter reads are declared; serde ignores the rest.
//!
//! # API Endpoints Covered
//!
//! - `meta` → [`MetaInfo`], [`ProcessInfo`]
//! - `stats` → [`ServerStats`]
//! - `admin/server-info` → [`ServerInfo`]
//! - `federation/instances` → [`FederatedInstance`]
//! - `admin/queue/stats` → [`QueueCounts`] (both queue schemas)
//! - `admin/get-table-stats` → [`TableStat`]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Deserialize any JSON value, keeping it only if it is a finite number.
///
/// Use with `#[serde(default, deserialize_with = "lenient_number")]`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}

/// Numeric view of a JSON value; `None` for anything that is not a finite number
pub fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// Deserialize any JSON value, keeping it only if it decodes as `T`.
///
/// Used for nested objects, strings and flags so a schema drift in one field
/// does not discard its siblings.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Server self-description from `meta`
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub repository_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub process: Option<ProcessInfo>,
}

/// Process statistics some variants inline into `meta`
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub heap_used: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub heap_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub external: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cpu_usage: Option<f64>,
}

/// Public instance counters from `stats`
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    #[serde(default, deserialize_with = "lenient_number")]
    pub notes_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub original_notes_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub users_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub original_users_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub reactions_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub instances: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub drive_usage_local: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub drive_usage_remote: Option<f64>,
}

/// Host machine facts from `admin/server-info`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub cpu: Option<CpuInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub mem: Option<MemInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub fs: Option<FsInfo>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CpuInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub cores: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MemInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FsInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub used: Option<f64>,
}

impl FsInfo {
    /// Free space, derived locally (the API does not send it)
    pub fn free(&self) -> Option<f64> {
        Some(self.total? - self.used?)
    }
}

/// One row of `federation/instances`
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FederatedInstance {
    pub host: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub users_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub notes_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub following_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub followers_count: Option<f64>,
}

/// Job counts for a single queue.
///
/// Firefish reports the first five fields; Misskey and the other forks add
/// `prioritized` and `waiting-children`. `completed` is never part of a depth
/// and is not decoded.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct QueueCounts {
    #[serde(default, deserialize_with = "lenient_number")]
    pub waiting: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub active: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub delayed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub failed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub paused: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub prioritized: Option<f64>,
    #[serde(default, rename = "waiting-children", deserialize_with = "lenient_number")]
    pub waiting_children: Option<f64>,
}

/// Queue names Firefish reports, in its own key spelling
pub const FIREFISH_QUEUES: [&str; 5] = ["deliver", "inbox", "db", "objectStorage", "backgroundQueue"];

/// Raw `admin/queue/stats` document, decoded per queue by the collectors
pub type QueueStatsMap = BTreeMap<String, Value>;

/// One table of `admin/get-table-stats`
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableStat {
    #[serde(default, deserialize_with = "lenient_number")]
    pub count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rows: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub size_with_indices: Option<f64>,
}

impl TableStat {
    /// Row estimate, preferring `count` over `rows`
    pub fn row_count(&self) -> Option<f64> {
        self.count.or(self.rows)
    }

    /// On-disk size, preferring the index-inclusive figure
    pub fn total_size(&self) -> Option<f64> {
        self.size_with_indices.or(self.size)
    }
}

pub type TableStatsMap = BTreeMap<String, Value>;
