//! Collection pass orchestration tests

mod common;

use common::{
    create_test_metrics, firefish_meta, healthy_instance, healthy_response, misskey_meta,
    server_error, stats_payload, ScriptedTransport,
};
use fedi_exporter::collectors::run_collection_pass;
use fedi_exporter::fedi::SoftwareVariant;
use fedi_exporter::metrics::MetricsCollector;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

fn availability(metrics: &MetricsCollector, endpoint: &str, software: &str) -> f64 {
    metrics
        .endpoint_availability
        .with_label_values(&[endpoint, software])
        .get()
}

#[tokio::test]
async fn test_healthy_pass_calls_endpoints_in_order() {
    // Given: A Misskey instance answering every endpoint
    let transport = healthy_instance(misskey_meta());
    let metrics = create_test_metrics();

    // When: Running a pass
    let summary = run_collection_pass(&transport, &metrics).await.unwrap();

    // Then: Every collector succeeded
    assert_eq!(summary.software, SoftwareVariant::Misskey);
    assert_eq!(summary.succeeded, 6);
    assert_eq!(summary.failed, 0);

    // And: Endpoints were read in a fixed order, stats twice
    let order: Vec<_> = transport.calls().into_iter().map(|c| c.endpoint).collect();
    assert_eq!(
        order,
        [
            "meta",
            "stats",
            "admin/server-info",
            "federation/instances",
            "admin/get-table-stats",
            "admin/queue/stats",
            "stats",
        ]
    );
}

#[tokio::test]
async fn test_healthy_pass_populates_gauges() {
    let transport = healthy_instance(misskey_meta());
    let metrics = create_test_metrics();

    run_collection_pass(&transport, &metrics).await.unwrap();

    let stat = |name: &str| metrics.instance_stats.with_label_values(&[name]).get();
    assert_eq!(stat("notes_count"), 1200.0);
    assert_eq!(stat("instances_count"), 75.0);
    assert_eq!(stat("federated_instances"), 75.0);
    assert_eq!(metrics.users_total.get(), 40.0);
    assert_eq!(metrics.notes_total.get(), 1200.0);
    assert_eq!(
        metrics.drive_usage_bytes.with_label_values(&["local"]).get(),
        2048.0
    );
    assert_eq!(metrics.system_cpu_usage.get(), 8.0);
    assert_eq!(
        metrics.system_disk_bytes.with_label_values(&["free"]).get(),
        600.0
    );
    assert_eq!(
        metrics
            .software_info
            .with_label_values(&["version", "misskey", "2024.11.0"])
            .get(),
        1.0
    );

    for endpoint in [
        "stats",
        "admin/server-info",
        "federation/instances",
        "admin/get-table-stats",
        "admin/queue/stats",
    ] {
        assert_eq!(availability(&metrics, endpoint, "misskey"), 1.0, "{}", endpoint);
    }

    // Zero remote drive usage is not reported
    let output = metrics.render().unwrap();
    assert!(!output.contains("type=\"remote\""));
}

#[tokio::test]
async fn test_firefish_pass_uses_fixed_queues() {
    let transport = healthy_instance(firefish_meta());
    let metrics = create_test_metrics();

    let summary = run_collection_pass(&transport, &metrics).await.unwrap();

    assert_eq!(summary.software, SoftwareVariant::Firefish);
    assert_eq!(
        metrics
            .queue_jobs
            .with_label_values(&["deliver", "firefish"])
            .get(),
        6.0
    );
    assert!(!metrics.render().unwrap().contains("queue_deliver_waiting"));
}

#[tokio::test]
async fn test_meta_failure_abandons_pass() {
    // Given: Gauges from an earlier pass
    let metrics = create_test_metrics();
    let healthy = healthy_instance(misskey_meta());
    run_collection_pass(&healthy, &metrics).await.unwrap();
    let before = metrics.render().unwrap();

    // When: meta fails on the next pass
    let transport = ScriptedTransport::new(|endpoint, _| Err(server_error(endpoint)));
    let result = run_collection_pass(&transport, &metrics).await;

    // Then: The pass errors after one request and leaves every gauge as it was
    assert!(result.is_err());
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(metrics.render().unwrap(), before);
}

#[tokio::test]
async fn test_null_or_malformed_meta_abandons_pass() {
    for meta in [Value::Null, json!("not an object"), json!([1, 2]), json!([])] {
        let transport = ScriptedTransport::new(move |_, _| Ok(meta.clone()));
        let metrics = create_test_metrics();

        let result = run_collection_pass(&transport, &metrics).await;

        assert!(result.is_err());
        assert_eq!(transport.calls().len(), 1);
        assert!(!metrics.render().unwrap().contains("endpoint_availability"));
    }
}

#[tokio::test]
async fn test_failing_collector_is_isolated() {
    // Given: server-info fails, everything else answers
    let meta = misskey_meta();
    let transport = ScriptedTransport::new(move |endpoint, options| {
        if endpoint == "admin/server-info" {
            Err(server_error(endpoint))
        } else {
            healthy_response(&meta, endpoint, options)
        }
    });
    let metrics = create_test_metrics();

    // When: Running a pass
    let summary = run_collection_pass(&transport, &metrics).await.unwrap();

    // Then: Only that collector failed and later collectors still ran
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 5);
    assert_eq!(availability(&metrics, "admin/server-info", "misskey"), 0.0);
    assert_eq!(availability(&metrics, "admin/get-table-stats", "misskey"), 1.0);
    assert_eq!(transport.calls_to("admin/queue/stats").len(), 1);
    assert!(!metrics.render().unwrap().contains("system_disk_bytes"));
}

#[tokio::test]
async fn test_legacy_stats_failure_keeps_availability() {
    // Given: stats answers the first time and fails the second
    let calls = AtomicUsize::new(0);
    let transport = ScriptedTransport::new(move |endpoint, _| match endpoint {
        "meta" => Ok(misskey_meta()),
        "stats" => {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(stats_payload())
            } else {
                Err(server_error(endpoint))
            }
        }
        other => Err(server_error(other)),
    });
    let metrics = create_test_metrics();

    // When: Running a pass
    run_collection_pass(&transport, &metrics).await.unwrap();

    // Then: The failed second read does not overwrite the availability entry
    assert_eq!(transport.calls_to("stats").len(), 2);
    assert_eq!(availability(&metrics, "stats", "misskey"), 1.0);
    assert_eq!(metrics.users_total.get(), 0.0);
}
