//! Shared test helpers: a scripted transport and canned API payloads.

#![allow(dead_code)] // Not every test file uses every helper

use fedi_exporter::error::{ExporterError, Result};
use fedi_exporter::fedi::{RequestOptions, Transport};
use fedi_exporter::metrics::MetricsCollector;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Mutex;

/// A request the transport has seen
#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: String,
    pub requires_auth: bool,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&str, &RequestOptions) -> Result<Value> + Send + Sync>;

/// Transport double answering from a closure and recording every call
pub struct ScriptedTransport {
    handler: Handler,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &RequestOptions) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.endpoint == endpoint)
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Value>> + Send {
        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.to_string(),
            requires_auth: options.requires_auth,
            body: options.body.clone(),
        });
        let result = (self.handler)(endpoint, options);
        async move { result }
    }
}

/// An HTTP 500 for `endpoint`
pub fn server_error(endpoint: &str) -> ExporterError {
    ExporterError::HttpStatus {
        endpoint: endpoint.to_string(),
        status: 500,
        code: None,
    }
}

pub fn create_test_metrics() -> MetricsCollector {
    MetricsCollector::new().expect("Failed to create metrics")
}

pub fn misskey_meta() -> Value {
    json!({
        "name": "misskey.example",
        "version": "2024.11.0",
        "repositoryUrl": "https://github.com/misskey-dev/misskey",
        "uri": "https://misskey.example",
    })
}

pub fn firefish_meta() -> Value {
    json!({
        "name": "fish.example",
        "version": "1.0.5-rc",
        "repositoryUrl": "https://git.joinfirefish.org/firefish/firefish",
    })
}

pub fn stats_payload() -> Value {
    json!({
        "notesCount": 1200,
        "originalNotesCount": 300,
        "usersCount": 40,
        "originalUsersCount": 12,
        "reactionsCount": 800,
        "instances": 75,
        "driveUsageLocal": 2048,
        "driveUsageRemote": 0,
    })
}

pub fn server_info_payload() -> Value {
    json!({
        "machine": "host",
        "os": "linux",
        "node": "v20.11.0",
        "psql": "16.1",
        "redis": "7.2.4",
        "cpu": { "model": "AMD EPYC", "cores": 8 },
        "mem": { "total": 16000 },
        "fs": { "total": 1000, "used": 400 },
    })
}

pub fn table_stats_payload() -> Value {
    json!({
        "note": { "count": 1200, "size": 500, "sizeWithIndices": 800 },
        "user": { "count": 40, "size": 100 },
        "pg_stat_statements": { "count": 10, "size": 50 },
    })
}

pub fn open_queue_payload() -> Value {
    json!({
        "deliver": {
            "waiting": 3, "active": 1, "delayed": 2, "failed": 4,
            "paused": 0, "prioritized": 5, "waiting-children": 1
        },
        "inbox": { "waiting": 0, "active": 0, "delayed": 0 },
    })
}

pub fn fixed_queue_payload() -> Value {
    json!({
        "deliver": { "waiting": 3, "active": 1, "delayed": 2, "completed": 100, "failed": 9 },
        "inbox": { "waiting": 1, "active": 0, "delayed": 0 },
        "db": { "waiting": 0, "active": 0, "delayed": 0 },
        "objectStorage": { "waiting": 0, "active": 2, "delayed": 0 },
    })
}

/// `n` federation rows with hosts `peer-<start>.example` onwards
pub fn federation_page(start: usize, n: usize) -> Value {
    Value::Array(
        (start..start + n)
            .map(|i| {
                json!({
                    "host": format!("peer-{}.example", i),
                    "usersCount": i,
                    "notesCount": i * 10,
                    "followingCount": 1,
                    "followersCount": 2,
                })
            })
            .collect(),
    )
}

/// Offset from a federation request body
pub fn offset_of(options: &RequestOptions) -> usize {
    options
        .body
        .as_ref()
        .and_then(|body| body.get("offset"))
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize
}

/// What a healthy instance answers for `endpoint`
pub fn healthy_response(meta: &Value, endpoint: &str, options: &RequestOptions) -> Result<Value> {
    let queues = if *meta == firefish_meta() {
        fixed_queue_payload()
    } else {
        open_queue_payload()
    };
    match endpoint {
        "meta" => Ok(meta.clone()),
        "stats" => Ok(stats_payload()),
        "admin/server-info" => Ok(server_info_payload()),
        "admin/get-table-stats" => Ok(table_stats_payload()),
        "admin/queue/stats" => Ok(queues),
        "federation/instances" => Ok(federation_page(offset_of(options), 3)),
        other => Err(server_error(other)),
    }
}

/// An instance where every endpoint answers
pub fn healthy_instance(meta: Value) -> ScriptedTransport {
    ScriptedTransport::new(move |endpoint, options| healthy_response(&meta, endpoint, options))
}
