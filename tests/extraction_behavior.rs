//! Behavior-driven tests for the transactions extraction run.
//!
//! These tests drive the extractor against a scripted transport and check
//! what reaches the sink, what is requested, and what the report says.

use serde_json::json;
use taxjar_core::{
    CollectingSink, HttpError, HttpResponse, MissingOrderPolicy, RetryConfig, SkipReason,
};
use taxjar_tests::{
    config, detail_url, extractor, list_url, order_body, orders_body, window, ScriptedHttpClient,
    API_KEY,
};
use time::macros::date;

// =============================================================================
// Extraction: Happy Path
// =============================================================================

#[tokio::test]
async fn when_each_day_lists_one_order_system_emits_one_record_per_day() {
    // Given: Two days that both list order 101
    let client = ScriptedHttpClient::new();
    client
        .on_day("2024/03/09", Ok(orders_body(&["101"])))
        .on_day("2024/03/10", Ok(orders_body(&["101"])))
        .on(
            detail_url("101"),
            Ok(order_body(json!({ "transaction_id": "101", "amount": 17.95 }))),
        );
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts a one-day lookback
    let report = extractor
        .run(&window(1), &mut sink)
        .await
        .expect("run should succeed");

    // Then: The record is emitted once per day, unchanged
    assert_eq!(sink.records().len(), 2);
    for record in sink.records() {
        assert_eq!(record.transaction_id(), Some("101"));
        assert_eq!(record.get("amount"), Some(&json!(17.95)));
    }
    assert_eq!(report.days.len(), 2);
    assert_eq!(report.days[0].date, date!(2024-03-09));
    assert_eq!(report.days[1].date, date!(2024-03-10));
    assert_eq!(report.emitted(), 2);
    assert_eq!(report.skipped(), 0);
    assert_eq!(client.recorded_requests().len(), 4);
}

#[tokio::test]
async fn when_lookback_is_zero_system_queries_only_today() {
    // Given: A day without orders
    let client = ScriptedHttpClient::new();
    client.on_day("2024/03/10", Ok(orders_body(&[])));
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts with days_back = 0
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: Exactly one list request is made and nothing is emitted
    let requests = client.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("transaction_date"), Some("2024/03/10"));
    assert!(sink.records().is_empty());
    assert_eq!(report.days[0].listed, 0);
    assert_eq!(report.days[0].loaded, 0);
}

#[tokio::test]
async fn when_records_are_emitted_system_preserves_day_then_list_order() {
    // Given: Two days listing different orders
    let client = ScriptedHttpClient::new();
    client
        .on_day("2024/03/08", Ok(orders_body(&["3", "1"])))
        .on_day("2024/03/09", Ok(orders_body(&[])))
        .on_day("2024/03/10", Ok(orders_body(&["2"])));
    for id in ["1", "2", "3"] {
        client.on(detail_url(id), Ok(order_body(json!({ "transaction_id": id }))));
    }
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts a two-day lookback
    extractor
        .run(&window(2), &mut sink)
        .await
        .expect("run should succeed");

    // Then: Records follow the day order, then the list order within a day
    let ids = sink
        .records()
        .iter()
        .filter_map(|record| record.transaction_id())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["3", "1", "2"]);
}

#[tokio::test]
async fn when_order_references_are_integers_system_fetches_them_as_text() {
    // Given: A list response with numeric references
    let client = ScriptedHttpClient::new();
    client
        .on(
            list_url(),
            Ok(HttpResponse::ok_json(json!({ "orders": [42, "43"] }).to_string())),
        )
        .on(detail_url("42"), Ok(order_body(json!({ "transaction_id": "42" }))))
        .on(detail_url("43"), Ok(order_body(json!({ "transaction_id": "43" }))));
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: Both orders are loaded
    assert_eq!(report.emitted(), 2);
    assert_eq!(client.requests_to(&detail_url("42")), 1);
}

// =============================================================================
// Extraction: Request Shape
// =============================================================================

#[tokio::test]
async fn when_requests_are_sent_system_authenticates_and_scopes_to_provider() {
    // Given: One order on the only day
    let client = ScriptedHttpClient::new();
    client
        .on(list_url(), Ok(orders_body(&["101"])))
        .on(detail_url("101"), Ok(order_body(json!({ "transaction_id": "101" }))));
    let extractor = extractor(&client, config());

    // When: The system extracts today
    extractor
        .run(&window(0), &mut CollectingSink::new())
        .await
        .expect("run should succeed");

    // Then: Every request carries the bearer key and the provider filter
    let requests = client.recorded_requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some(format!("Bearer {API_KEY}").as_str())
        );
        assert_eq!(request.query_value("provider"), Some("upsellery"));
    }

    // And: The list request uses slash-separated dates, encoded on the wire
    assert_eq!(requests[0].url, list_url());
    assert!(requests[0]
        .full_url()
        .contains("transaction_date=2024%2F03%2F10"));
    assert_eq!(requests[1].url, detail_url("101"));
    assert_eq!(requests[1].query_value("transaction_date"), None);
}

#[tokio::test]
async fn when_reference_contains_a_slash_system_encodes_it_into_one_path_segment() {
    // Given: A reference that would otherwise add a path segment
    let client = ScriptedHttpClient::new();
    client
        .on(list_url(), Ok(orders_body(&["A/7"])))
        .on(detail_url("A%2F7"), Ok(order_body(json!({ "transaction_id": "A/7" }))));
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: The detail request hits the encoded path
    assert_eq!(client.requests_to(&detail_url("A%2F7")), 1);
    assert_eq!(sink.records()[0].transaction_id(), Some("A/7"));
}

#[tokio::test]
async fn when_provider_is_overridden_system_uses_it_on_both_endpoints() {
    // Given: An extractor configured for another provider
    let client = ScriptedHttpClient::new();
    client
        .on(list_url(), Ok(orders_body(&["9"])))
        .on(detail_url("9"), Ok(order_body(json!({}))));
    let extractor = extractor(&client, config().with_provider("amazon"));

    // When: The system extracts today
    extractor
        .run(&window(0), &mut CollectingSink::new())
        .await
        .expect("run should succeed");

    // Then: Every request is scoped to that provider
    assert!(client
        .recorded_requests()
        .iter()
        .all(|request| request.query_value("provider") == Some("amazon")));
}

// =============================================================================
// Extraction: Missing Order Payloads
// =============================================================================

#[tokio::test]
async fn when_detail_has_no_order_key_system_emits_an_empty_record() {
    // Given: A detail body without an `order` member
    let client = ScriptedHttpClient::new();
    client
        .on(list_url(), Ok(orders_body(&["101"])))
        .on(detail_url("101"), Ok(HttpResponse::ok_json(r#"{"status":"ok"}"#)));
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: An empty record is emitted and counted as loaded
    assert_eq!(sink.records().len(), 1);
    assert!(sink.records()[0].is_empty());
    assert_eq!(report.days[0].loaded, 1);
}

#[tokio::test]
async fn when_missing_orders_are_skipped_system_records_the_reason() {
    // Given: The skip policy for absent `order` members
    let client = ScriptedHttpClient::new();
    client
        .on(list_url(), Ok(orders_body(&["101"])))
        .on(detail_url("101"), Ok(HttpResponse::ok_json("{}")));
    let extractor = extractor(
        &client,
        config().with_missing_order_policy(MissingOrderPolicy::Skip),
    );
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: Nothing is emitted and the skip is reported
    assert!(sink.records().is_empty());
    assert_eq!(report.days[0].skipped[0].reason, SkipReason::MissingOrder);
}

// =============================================================================
// Extraction: Retry
// =============================================================================

#[tokio::test]
async fn when_detail_is_briefly_unavailable_and_retry_is_enabled_system_recovers() {
    // Given: A detail endpoint that answers 503 once, then succeeds
    let client = ScriptedHttpClient::new();
    client.on(list_url(), Ok(orders_body(&["101"]))).on_sequence(
        detail_url("101"),
        vec![
            Ok(HttpResponse::new(503, "unavailable")),
            Ok(order_body(json!({ "transaction_id": "101" }))),
        ],
    );
    let extractor = extractor(
        &client,
        config().with_retry(RetryConfig::fixed(std::time::Duration::ZERO, 2)),
    );
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: The second attempt is emitted
    assert_eq!(report.emitted(), 1);
    assert_eq!(client.requests_to(&detail_url("101")), 2);
}

#[tokio::test]
async fn when_retry_is_disabled_system_skips_the_unavailable_detail() {
    // Given: The same flaky detail endpoint without retry
    let client = ScriptedHttpClient::new();
    client.on(list_url(), Ok(orders_body(&["101"]))).on_sequence(
        detail_url("101"),
        vec![
            Ok(HttpResponse::new(503, "unavailable")),
            Ok(order_body(json!({ "transaction_id": "101" }))),
        ],
    );
    let extractor = extractor(&client, config());
    let mut sink = CollectingSink::new();

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut sink)
        .await
        .expect("run should succeed");

    // Then: One attempt is made and the order is skipped
    assert!(sink.records().is_empty());
    assert_eq!(client.requests_to(&detail_url("101")), 1);
    assert_eq!(report.days[0].skipped[0].reason, SkipReason::Status(503));
}

#[tokio::test]
async fn when_list_times_out_once_and_retry_is_enabled_system_continues() {
    // Given: A list endpoint that times out before answering
    let client = ScriptedHttpClient::new();
    client.on_sequence(
        list_url(),
        vec![
            Err(HttpError::timeout("request timed out")),
            Ok(orders_body(&[])),
        ],
    );
    let extractor = extractor(
        &client,
        config().with_retry(RetryConfig::fixed(std::time::Duration::ZERO, 1)),
    );

    // When: The system extracts today
    let report = extractor
        .run(&window(0), &mut CollectingSink::new())
        .await
        .expect("run should succeed after retry");

    // Then: The day completes with no orders
    assert_eq!(report.days.len(), 1);
    assert_eq!(client.requests_to(&list_url()), 2);
}
