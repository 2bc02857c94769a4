//! Strict response shapes for endpoint validation
//!
//! Unlike [`crate::fedi::types`], these structs require every field the upstream API
//! documents, so decoding fails on schema drift. They are only used by the
//! `validate-endpoints` tool, never by the collection pass.

#![allow(dead_code)] // Fields exist to be checked, not read
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaSchema {
    pub maintainer_name: Option<String>,
    pub maintainer_email: Option<String>,
    pub version: String,
    pub name: String,
    pub uri: String,
    pub description: Option<String>,
    pub langs: Vec<String>,
    pub tos_url: Option<String>,
    pub repository_url: Option<String>,
    pub feedback_url: Option<String>,
    pub disable_registration: bool,
    pub email_required_for_signup: bool,
    pub enable_hcaptcha: bool,
    pub enable_recaptcha: bool,
    pub theme_color: Option<String>,
    pub icon_url: Option<String>,
    pub max_note_text_length: f64,
    #[serde(default)]
    pub policies: Option<PoliciesSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliciesSchema {
    pub gtl_available: Option<bool>,
    pub ltl_available: Option<bool>,
    pub can_public_note: Option<bool>,
    pub can_invite: Option<bool>,
    pub can_manage_custom_emojis: Option<bool>,
    pub can_search_notes: Option<bool>,
    pub drive_capacity_mb: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatsSchema {
    pub notes_count: u64,
    pub original_notes_count: u64,
    pub users_count: u64,
    pub original_users_count: u64,
    pub reactions_count: u64,
    pub instances: u64,
    pub drive_usage_local: f64,
    pub drive_usage_remote: f64,
}

#[derive(Debug, Deserialize)]
pub struct ServerInfoSchema {
    pub machine: String,
    pub os: String,
    pub node: String,
    pub psql: String,
    pub redis: String,
    pub cpu: CpuSchema,
    pub mem: MemSchema,
    pub fs: FsSchema,
}

#[derive(Debug, Deserialize)]
pub struct CpuSchema {
    pub model: String,
    pub cores: f64,
}

#[derive(Debug, Deserialize)]
pub struct MemSchema {
    pub total: f64,
}

#[derive(Debug, Deserialize)]
pub struct FsSchema {
    pub total: f64,
    pub used: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatSchema {
    pub count: f64,
    pub size: f64,
    pub rows: Option<f64>,
    pub size_with_indices: Option<f64>,
}

pub type TableStatsSchema = BTreeMap<String, TableStatSchema>;

#[derive(Debug, Deserialize)]
pub struct IndexStatSchema {
    pub tablename: String,
    pub indexname: String,
}

pub type IndexStatsSchema = Vec<IndexStatSchema>;

#[derive(Debug, Deserialize)]
pub struct QueueCountsSchema {
    pub waiting: Option<f64>,
    pub active: Option<f64>,
    pub delayed: Option<f64>,
    pub completed: Option<f64>,
    pub failed: Option<f64>,
    pub paused: Option<f64>,
}

/// Fixed-name queue document (Firefish layout)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedQueueStatsSchema {
    pub deliver: QueueCountsSchema,
    pub inbox: QueueCountsSchema,
    pub db: QueueCountsSchema,
    pub object_storage: QueueCountsSchema,
    #[serde(default)]
    pub background_queue: Option<QueueCountsSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedInstanceSchema {
    pub id: String,
    pub first_retrieved_at: String,
    pub host: String,
    pub users_count: Option<f64>,
    pub notes_count: Option<f64>,
    pub following_count: Option<f64>,
    pub followers_count: Option<f64>,
    pub is_not_responding: bool,
    pub is_suspended: bool,
    pub is_blocked: bool,
    pub software_name: Option<String>,
    pub software_version: Option<String>,
    pub open_registrations: Option<bool>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub maintainer_name: Option<String>,
    pub maintainer_email: Option<String>,
    pub icon_url: Option<String>,
    pub favicon_url: Option<String>,
    pub theme_color: Option<String>,
    pub info_updated_at: Option<String>,
}

pub type FederatedInstancesSchema = Vec<FederatedInstanceSchema>;

/// Check a payload against schema `T`, returning the decoder's message on mismatch
pub fn check<T: serde::de::DeserializeOwned>(payload: &Value) -> Result<(), String> {
    T::deserialize(payload)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
