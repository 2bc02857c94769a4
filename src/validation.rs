//! Endpoint Validation
//!
//! Diagnostic checks behind the `validate-endpoints` binary. Each known endpoint is
//! fetched through the same [`Transport`] the exporter uses and its body is checked
//! against a strict schema from [`crate::fedi::schemas`].
//!
//! Failures are classified more finely than the collection pass ever needs
//! (see [`FailureKind`]); nothing here feeds back into the exporter.

use crate::error::ExporterError;
use crate::fedi::schemas::{
    check, FederatedInstancesSchema, FixedQueueStatsSchema, IndexStatsSchema, MetaSchema,
    ServerInfoSchema, ServerStatsSchema, TableStatsSchema,
};
use crate::fedi::types::MetaInfo;
use crate::fedi::{detect, RequestOptions, SoftwareVariant, Transport};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Why an endpoint check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    Auth,
    NotFound,
    Server,
    Network,
    Validation,
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Auth => "AUTH_ERROR",
            FailureKind::NotFound => "NOT_FOUND",
            FailureKind::Server => "SERVER_ERROR",
            FailureKind::Network => "NETWORK_ERROR",
            FailureKind::Validation => "VALIDATION_ERROR",
            FailureKind::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Upstream error code for a token that lacks a permission
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";

/// Map a transport error to a failure kind
pub fn classify(error: &ExporterError) -> FailureKind {
    match error {
        ExporterError::Auth(_) => FailureKind::Auth,
        ExporterError::HttpStatus { status, .. } => match status {
            401 | 403 => FailureKind::Auth,
            404 => FailureKind::NotFound,
            500..=599 => FailureKind::Server,
            _ => FailureKind::Unknown,
        },
        ExporterError::Http(_) => FailureKind::Network,
        ExporterError::Json(_) => FailureKind::Validation,
        ExporterError::Config(_) => FailureKind::Unknown,
    }
}

fn is_permission_denied(error: &ExporterError) -> bool {
    matches!(
        error,
        ExporterError::HttpStatus { code: Some(code), .. } if code == PERMISSION_DENIED
    )
}

type SchemaCheck = fn(&Value) -> Result<(), String>;

/// One endpoint to validate
#[derive(Clone)]
pub struct EndpointCheck {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub requires_auth: bool,
    pub body: Value,
    pub schema: SchemaCheck,
}

/// The endpoints the exporter depends on, in the order they are checked
pub fn default_checks() -> Vec<EndpointCheck> {
    vec![
        EndpointCheck {
            name: "Meta",
            endpoint: "meta",
            requires_auth: false,
            body: json!({ "detail": false }),
            schema: check::<MetaSchema>,
        },
        EndpointCheck {
            name: "Stats",
            endpoint: "stats",
            requires_auth: false,
            body: json!({}),
            schema: check::<ServerStatsSchema>,
        },
        EndpointCheck {
            name: "Server Info",
            endpoint: "admin/server-info",
            requires_auth: true,
            body: json!({}),
            schema: check::<ServerInfoSchema>,
        },
        EndpointCheck {
            name: "Table Stats",
            endpoint: "admin/get-table-stats",
            requires_auth: true,
            body: json!({}),
            schema: check::<TableStatsSchema>,
        },
        EndpointCheck {
            name: "Index Stats",
            endpoint: "admin/get-index-stats",
            requires_auth: true,
            body: json!({}),
            schema: check::<IndexStatsSchema>,
        },
        EndpointCheck {
            name: "Queue Stats",
            endpoint: "admin/queue/stats",
            requires_auth: true,
            body: json!({}),
            schema: check::<FixedQueueStatsSchema>,
        },
        EndpointCheck {
            name: "Federation",
            endpoint: "federation/instances",
            requires_auth: false,
            body: json!({}),
            schema: check::<FederatedInstancesSchema>,
        },
    ]
}

/// Result of checking one endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Passed,
    /// The token lacks a permission; not counted as a failure
    PermissionDenied,
    Failed { kind: FailureKind, message: String },
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, CheckOutcome::Failed { .. })
    }
}

/// Fetch and validate a single endpoint
pub async fn run_check<T: Transport>(transport: &T, check: &EndpointCheck) -> CheckOutcome {
    let mut options = RequestOptions::public().with_body(check.body.clone());
    options.requires_auth = check.requires_auth;

    let payload = match transport.request(check.endpoint, &options).await {
        Ok(payload) => payload,
        Err(e) if is_permission_denied(&e) => {
            warn!(
                "Endpoint {} requires additional permissions. Skipping validation.",
                check.endpoint
            );
            return CheckOutcome::PermissionDenied;
        }
        Err(e) => {
            return CheckOutcome::Failed {
                kind: classify(&e),
                message: e.to_string(),
            }
        }
    };

    match (check.schema)(&payload) {
        Ok(()) => CheckOutcome::Passed,
        Err(message) => CheckOutcome::Failed {
            kind: FailureKind::Validation,
            message,
        },
    }
}

/// Aggregated results of a validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors_by_kind: BTreeMap<FailureKind, usize>,
    /// Schema mismatch messages keyed by endpoint name
    pub validation_errors: BTreeMap<String, String>,
}

impl ValidationSummary {
    pub fn record(&mut self, name: &str, outcome: &CheckOutcome) {
        self.total += 1;
        match outcome {
            CheckOutcome::Passed | CheckOutcome::PermissionDenied => self.successful += 1,
            CheckOutcome::Failed { kind, message } => {
                self.failed += 1;
                *self.errors_by_kind.entry(*kind).or_default() += 1;
                if *kind == FailureKind::Validation {
                    self.validation_errors
                        .insert(name.to_string(), message.clone());
                }
            }
        }
    }
}

/// Detect the variant for reporting; `Unknown` if `meta` is unreadable
pub async fn detect_variant<T: Transport>(transport: &T) -> SoftwareVariant {
    let options = RequestOptions::public().with_body(json!({ "detail": false }));
    match transport.request("meta", &options).await {
        Ok(payload @ Value::Object(_)) => match serde_json::from_value::<MetaInfo>(payload) {
            Ok(meta) => detect(&meta),
            Err(e) => {
                warn!("Meta response could not be decoded: {}", e);
                SoftwareVariant::Unknown
            }
        },
        Ok(other) => {
            warn!("Meta response is not an object: {}", other);
            SoftwareVariant::Unknown
        }
        Err(e) => {
            warn!("Meta endpoint failed: {}", e);
            SoftwareVariant::Unknown
        }
    }
}

/// Run every check in order and collect a summary
pub async fn validate_all<T: Transport>(
    transport: &T,
    checks: &[EndpointCheck],
) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for check in checks {
        let outcome = run_check(transport, check).await;
        summary.record(check.name, &outcome);
    }
    summary
}
