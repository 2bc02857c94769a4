//! Federation pagination tests

mod common;

use common::{create_test_metrics, federation_page, offset_of, server_error, ScriptedTransport};
use fedi_exporter::collectors::federation::{FEDERATION_ENDPOINT, FEDERATION_MAX_ROWS};
use fedi_exporter::collectors::{collect_federation_metrics, CollectionContext, CollectionStatus};
use fedi_exporter::fedi::SoftwareVariant;
use serde_json::json;

fn availability(metrics: &fedi_exporter::metrics::MetricsCollector) -> f64 {
    metrics
        .endpoint_availability
        .with_label_values(&[FEDERATION_ENDPOINT, "misskey"])
        .get()
}

#[tokio::test]
async fn test_short_page_ends_listing() {
    // Given: 240 peers served 100 at a time
    let transport = ScriptedTransport::new(|_, options| {
        let offset = offset_of(options);
        Ok(federation_page(offset, 240usize.saturating_sub(offset).min(100)))
    });
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    // When: Collecting federation metrics
    let result = collect_federation_metrics(&ctx).await.unwrap();

    // Then: Three pages were requested and every peer was recorded
    assert_eq!(result, CollectionStatus::Success);
    let offsets: Vec<_> = transport
        .calls()
        .iter()
        .map(|call| call.body.as_ref().unwrap()["offset"].as_u64().unwrap())
        .collect();
    assert_eq!(offsets, [0, 100, 200]);

    for i in [0, 99, 100, 239] {
        let host = format!("peer-{}.example", i);
        let users = metrics
            .federated_instance_info
            .with_label_values(&[host.as_str(), "users_count"])
            .get();
        assert_eq!(users, i as f64);
    }
    let output = metrics.render().unwrap();
    assert!(!output.contains("peer-240.example"));
    assert_eq!(availability(&metrics), 1.0);
}

#[tokio::test]
async fn test_listing_is_capped_at_max_rows() {
    // Given: An instance that always returns a full page
    let transport = ScriptedTransport::new(|_, options| Ok(federation_page(offset_of(options), 100)));
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    // When: Collecting federation metrics
    collect_federation_metrics(&ctx).await.unwrap();

    // Then: Exactly ten pages were requested
    let calls = transport.calls_to(FEDERATION_ENDPOINT);
    assert_eq!(calls.len(), FEDERATION_MAX_ROWS / 100);
    assert_eq!(calls.len(), 10);
    assert_eq!(calls.last().unwrap().body.as_ref().unwrap()["offset"], 900);
}

#[tokio::test]
async fn test_page_request_body() {
    let transport = ScriptedTransport::new(|_, _| Ok(json!([])));
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    collect_federation_metrics(&ctx).await.unwrap();

    // Then: A single public request carrying the page parameters
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].requires_auth);
    assert_eq!(
        calls[0].body,
        Some(json!({ "sort": "+pubSub", "limit": 100, "offset": 0 }))
    );
    assert_eq!(availability(&metrics), 1.0);
}

#[tokio::test]
async fn test_failed_page_stops_listing_and_marks_unavailable() {
    // Given: The second page fails
    let transport = ScriptedTransport::new(|endpoint, options| {
        let offset = offset_of(options);
        if offset == 0 {
            Ok(federation_page(0, 100))
        } else {
            Err(server_error(endpoint))
        }
    });
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    // When: Collecting federation metrics
    let result = collect_federation_metrics(&ctx).await.unwrap();

    // Then: The first page is kept, no further pages are requested
    assert_eq!(result, CollectionStatus::Failed);
    assert_eq!(transport.calls().len(), 2);
    assert_eq!(
        metrics
            .federated_instance_info
            .with_label_values(&["peer-42.example", "notes_count"])
            .get(),
        420.0
    );
    assert_eq!(availability(&metrics), 0.0);
}

#[tokio::test]
async fn test_rows_without_host_are_skipped() {
    // Given: A page mixing valid and host-less rows with absent counters
    let transport = ScriptedTransport::new(|_, _| {
        Ok(json!([
            { "host": "good.example", "usersCount": 5 },
            { "usersCount": 7 },
            "not an object",
        ]))
    });
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    // When: Collecting
    let result = collect_federation_metrics(&ctx).await.unwrap();

    // Then: Only the valid row is recorded, and only its present counter
    assert_eq!(result, CollectionStatus::Success);
    let output = metrics.render().unwrap();
    assert!(output.contains("good.example"));
    assert!(output.contains("metric=\"users_count\""));
    assert!(!output.contains("metric=\"notes_count\""));
    assert_eq!(availability(&metrics), 1.0);
}

#[tokio::test]
async fn test_non_array_page_is_not_fatal() {
    let transport = ScriptedTransport::new(|_, _| Ok(json!({ "error": "nope" })));
    let metrics = create_test_metrics();
    let ctx = CollectionContext {
        client: &transport,
        metrics: &metrics,
        software: SoftwareVariant::Misskey,
    };

    let result = collect_federation_metrics(&ctx).await.unwrap();

    assert_eq!(result, CollectionStatus::Failed);
    assert_eq!(transport.calls().len(), 1);
    // The fetch itself succeeded
    assert_eq!(availability(&metrics), 1.0);
}
