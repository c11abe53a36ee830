//! Behavior-driven tests for valuation lookups
//!
//! These tests verify HOW the lookup service behaves against an upstream whose
//! contract is unknown: fallback between strategies, failure trails, caching
//! and best-effort normalization.

mod support;

use std::sync::Arc;
use std::time::Duration;

use homeval_core::{
    AddressKey, AttemptOutcome, AuthScheme, CacheStore, Diagnosis, FailureKind, HttpError,
    HttpMethod, LookupService, Normalizer, PayloadEncoding, PropertyAddress,
    RequestStrategy, StrategyRegistry, UpstreamClient,
};
use serde_json::Number;
use support::{springfield, upstream_config, ScriptedHttpClient};

fn two_strategies() -> StrategyRegistry {
    StrategyRegistry::new(vec![
        RequestStrategy::new("A", HttpMethod::Get, AuthScheme::Bearer, PayloadEncoding::Query),
        RequestStrategy::new(
            "B",
            HttpMethod::Post,
            AuthScheme::RapidApi,
            PayloadEncoding::JsonBody,
        ),
    ])
    .expect("valid registry")
}

fn service(http: Arc<ScriptedHttpClient>, registry: StrategyRegistry) -> LookupService {
    LookupService::new(
        CacheStore::with_default_ttl(),
        UpstreamClient::new(http, registry),
        Normalizer::default(),
    )
}

// =============================================================================
// Strategy ordering
// =============================================================================

#[tokio::test]
async fn when_first_strategy_is_unauthorized_second_strategy_result_is_used() {
    // Given: A rejects the credential, B answers with JSON
    let http = Arc::new(ScriptedHttpClient::statuses(&[
        (401, r#"{"message":"Invalid API key"}"#),
        (200, r#"{"zestimate": 505000}"#),
    ]));
    let client = UpstreamClient::new(http.clone(), two_strategies());

    // When: The upstream is probed
    let success = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("B should succeed");

    // Then: B's payload is returned and A is the only failure on the trail
    assert_eq!(success.strategy_name, "B");
    assert_eq!(success.payload["zestimate"], 505000);
    assert_eq!(success.failed_attempts.len(), 1);
    assert_eq!(success.failed_attempts[0].strategy_name, "A");
    assert_eq!(success.failed_attempts[0].outcome, AttemptOutcome::Status(401));
    assert_eq!(http.call_count(), 2);
}

#[tokio::test]
async fn when_a_strategy_succeeds_later_strategies_are_not_called() {
    // Given: The default registry and an upstream that accepts the first call
    let http = Arc::new(ScriptedHttpClient::statuses(&[(200, r#"{"value": 1}"#)]));
    let client = UpstreamClient::new(http.clone(), StrategyRegistry::default());

    // When: The upstream is probed
    let success = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("first strategy should succeed");

    // Then: Exactly one metered call is made
    assert_eq!(success.strategy_name, "get_apikey_split_query");
    assert!(success.failed_attempts.is_empty());
    assert_eq!(http.call_count(), 1);
}

// =============================================================================
// Total failure
// =============================================================================

#[tokio::test]
async fn when_every_strategy_fails_trail_has_one_record_per_strategy_in_order() {
    // Given: An upstream that rejects everything
    let registry = StrategyRegistry::default();
    let http = Arc::new(ScriptedHttpClient::statuses(&[
        (401, "no"),
        (403, "no"),
        (404, "no"),
        (500, "no"),
        (502, "no"),
    ]));
    let client = UpstreamClient::new(http, registry.clone());

    // When: The upstream is probed
    let failure = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect_err("no strategy should succeed");

    // Then: The trail mirrors the registry
    assert_eq!(failure.kind, FailureKind::UpstreamRejected);
    assert_eq!(failure.attempts.len(), registry.len());
    let names = failure
        .attempts
        .iter()
        .map(|record| record.strategy_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, registry.names());
    assert_eq!(failure.attempts[0].diagnosis, Diagnosis::AuthRejected);
    assert_eq!(failure.attempts[4].diagnosis, Diagnosis::UpstreamError);
}

#[tokio::test]
async fn when_network_is_down_for_every_strategy_failure_is_unreachable() {
    // Given: No strategy can reach the upstream
    let http = Arc::new(ScriptedHttpClient::new(vec![
        Err(HttpError::new("connection failed: dns error")),
        Err(HttpError::new("request timeout")),
    ]));
    let client = UpstreamClient::new(http, two_strategies());

    // When: The upstream is probed
    let failure = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect_err("should fail");

    // Then: Every attempt carries the transport message
    assert_eq!(failure.kind, FailureKind::TransportUnreachable);
    assert_eq!(
        failure.attempts[1].outcome,
        AttemptOutcome::TransportError(String::from("request timeout"))
    );
}

#[tokio::test]
async fn when_last_answered_attempt_is_rate_limited_failure_is_rate_limited() {
    // Given: A auth error, B rate-limited
    let http = Arc::new(ScriptedHttpClient::statuses(&[(401, ""), (429, "Too Many Requests")]));
    let client = UpstreamClient::new(http, two_strategies());

    // When: The upstream is probed
    let failure = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect_err("should fail");

    // Then: The caller is told to wait rather than fix credentials
    assert_eq!(failure.kind, FailureKind::RateLimited);
    assert_eq!(failure.attempts[1].diagnosis, Diagnosis::RateLimited);
}

#[tokio::test]
async fn when_rate_limit_is_followed_by_a_rejection_failure_is_rejected() {
    // Given: A rate-limited, B rejects
    let http = Arc::new(ScriptedHttpClient::statuses(&[(429, ""), (403, "")]));
    let client = UpstreamClient::new(http, two_strategies());

    // When: The upstream is probed
    let failure = client
        .lookup(&springfield(), &upstream_config())
        .await
        .expect_err("should fail");

    // Then: The last answered attempt decides
    assert_eq!(failure.kind, FailureKind::UpstreamRejected);
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn when_rate_limited_then_recovered_result_is_cached_for_repeat_requests() {
    // Given: A is rate-limited, B returns a zestimate payload
    let http = Arc::new(ScriptedHttpClient::statuses(&[
        (429, r#"{"message":"rate limited"}"#),
        (200, r#"{"zestimate": 310000, "rentZestimate": 1800}"#),
    ]));
    let service = service(http.clone(), two_strategies());

    // When: The same address is looked up twice
    let first = service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("should succeed through B");
    let second = service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("should be cached");

    // Then: The second call is a cache hit with no upstream traffic
    assert_eq!(first.address, "1 Main St, Springfield, IL");
    assert_eq!(first.estimated_value, Some(Number::from(310_000)));
    assert_eq!(first.rent_estimate, Some(Number::from(1_800)));
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.estimated_value, first.estimated_value);
    assert_eq!(second.rent_estimate, first.rent_estimate);
    assert_eq!(http.call_count(), 2);
}

#[tokio::test]
async fn when_failure_occurs_nothing_is_cached_and_next_request_probes_again() {
    // Given: A failing upstream followed by a healthy one
    let http = Arc::new(ScriptedHttpClient::statuses(&[
        (500, ""),
        (500, ""),
        (200, r#"{"data": {"zestimate": 99000}}"#),
    ]));
    let service = service(http.clone(), two_strategies());

    // When: The first lookup fails and the second is attempted
    service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect_err("first lookup fails");
    let recovered = service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("second lookup succeeds");

    // Then: The failure did not poison the cache
    assert!(!recovered.cached);
    assert_eq!(recovered.estimated_value, Some(Number::from(99_000)));
    assert_eq!(http.call_count(), 3);
}

#[tokio::test]
async fn cache_entries_expire_and_are_removed_on_read() {
    // Given: A cache with a very short lifetime
    let cache = CacheStore::new(Duration::from_millis(50));
    let key = AddressKey::normalize("1 Main St, Springfield, IL");
    cache.set(key.clone(), 1_u8).await;

    // When: The entry outlives its TTL
    tokio::time::sleep(Duration::from_millis(80)).await;

    // Then: It is reported absent and is gone afterwards
    assert_eq!(cache.get(&key).await, None);
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn addresses_differing_in_case_and_spacing_share_a_cache_entry() {
    // Given: A warm cache for one spelling of the address
    let http = Arc::new(ScriptedHttpClient::statuses(&[(200, r#"{"zestimate": 1}"#)]));
    let service = service(http.clone(), two_strategies());
    service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("warms cache");

    // When: Another spelling is looked up
    let shouted = PropertyAddress::new("  1 MAIN   ST ", "SPRINGFIELD", "il").expect("valid");
    let result = service
        .lookup(&shouted, &upstream_config())
        .await
        .expect("cache hit");

    // Then: No new upstream call is made
    assert!(result.cached);
    assert_eq!(http.call_count(), 1);
}

// =============================================================================
// Normalization
// =============================================================================

#[tokio::test]
async fn when_payload_has_no_known_fields_estimates_are_null_not_errors() {
    // Given: An upstream that answers with an unfamiliar shape
    let http = Arc::new(ScriptedHttpClient::statuses(&[(
        200,
        r#"{"unexpected": {"shape": true}}"#,
    )]));
    let service = service(http, two_strategies());

    // When: The address is looked up
    let result = service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("unknown shapes are not failures");

    // Then: The estimates are simply missing
    assert_eq!(result.estimated_value, None);
    assert_eq!(result.rent_estimate, None);
}

#[tokio::test]
async fn attom_style_payload_is_normalized() {
    // Given: An AVM payload nested under property[0]
    let http = Arc::new(ScriptedHttpClient::statuses(&[(
        200,
        r#"{"status": {"code": 0}, "property": [{"avm": {"amount": {"value": 287500}}}]}"#,
    )]));
    let service = service(http, two_strategies());

    // When: The address is looked up
    let result = service
        .lookup(&springfield(), &upstream_config())
        .await
        .expect("succeeds");

    // Then: The nested amount is extracted
    assert_eq!(result.estimated_value, Some(Number::from(287_500)));
}
