use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::cache::CacheStore;
use crate::http_client::HttpClient;
use crate::normalize::Normalizer;
use crate::strategy::StrategyRegistry;
use crate::upstream::{LookupFailure, UpstreamClient};
use crate::{PropertyAddress, UpstreamConfig};

/// Normalized valuation returned to the caller.
///
/// A missing estimate is a valid outcome and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub address: String,
    pub estimated_value: Option<Number>,
    pub rent_estimate: Option<Number>,
    pub cached: bool,
}

/// Cache-first valuation lookup: cache, strategies, normalizer, cache.
#[derive(Clone)]
pub struct LookupService {
    cache: CacheStore<LookupResult>,
    upstream: UpstreamClient,
    normalizer: Arc<Normalizer>,
}

impl LookupService {
    pub fn new(cache: CacheStore<LookupResult>, upstream: UpstreamClient, normalizer: Normalizer) -> Self {
        Self {
            cache,
            upstream,
            normalizer: Arc::new(normalizer),
        }
    }

    /// Service with the default strategy registry and field candidates.
    pub fn with_defaults(cache: CacheStore<LookupResult>, http_client: Arc<dyn HttpClient>) -> Self {
        Self::new(
            cache,
            UpstreamClient::new(http_client, StrategyRegistry::default()),
            Normalizer::default(),
        )
    }

    pub fn cache(&self) -> &CacheStore<LookupResult> {
        &self.cache
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Looks up `address`, serving from the cache when possible.
    ///
    /// Failures are returned untouched and never cached.
    pub async fn lookup(
        &self,
        address: &PropertyAddress,
        config: &UpstreamConfig,
    ) -> Result<LookupResult, LookupFailure> {
        let key = address.key();

        if let Some(mut hit) = self.cache.get(&key).await {
            tracing::debug!(key = %key, "lookup cache hit");
            hit.cached = true;
            return Ok(hit);
        }

        tracing::debug!(key = %key, "lookup cache miss");
        let success = self.upstream.lookup(address, config).await?;

        let result = self.normalizer.normalize(address.display(), &success.payload);
        tracing::info!(
            strategy = %success.strategy_name,
            failed_attempts = success.failed_attempts.len(),
            has_estimate = result.estimated_value.is_some(),
            has_rent = result.rent_estimate.is_some(),
            "valuation lookup succeeded"
        );

        self.cache.set(key, result.clone()).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpResponse;
    use crate::testing::ScriptedHttpClient;
    use crate::Credential;
    use std::time::Duration;

    fn counting(response: HttpResponse) -> Arc<ScriptedHttpClient> {
        Arc::new(ScriptedHttpClient::repeating(Ok(response)))
    }

    fn config() -> UpstreamConfig {
        UpstreamConfig::new("https://avm.example.test/estimate", Credential::new("key"))
            .expect("valid config")
    }

    fn address() -> PropertyAddress {
        PropertyAddress::new("1 Main St", "Springfield", "IL").expect("valid address")
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let http = counting(HttpResponse::ok_json(
            r#"{"zestimate": 310000, "rentZestimate": 1800}"#,
        ));
        let service = LookupService::with_defaults(CacheStore::with_default_ttl(), http.clone());

        let first = service.lookup(&address(), &config()).await.expect("succeeds");
        assert!(!first.cached);
        assert_eq!(first.address, "1 Main St, Springfield, IL");
        assert_eq!(first.estimated_value, Some(Number::from(310_000)));
        assert_eq!(http.call_count(), 1);

        let same_place = PropertyAddress::new("1 MAIN ST", " springfield", "il").expect("valid");
        let second = service.lookup(&same_place, &config()).await.expect("succeeds");
        assert!(second.cached);
        assert_eq!(second.estimated_value, first.estimated_value);
        assert_eq!(second.address, first.address);
        assert_eq!(http.call_count(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let http = counting(HttpResponse::new(503, "down"));
        let service = LookupService::with_defaults(CacheStore::with_default_ttl(), http.clone());
        let strategies = service.upstream().registry().len();

        service
            .lookup(&address(), &config())
            .await
            .expect_err("every strategy fails");
        assert!(service.cache().is_empty().await);

        service
            .lookup(&address(), &config())
            .await
            .expect_err("every strategy fails again");
        assert_eq!(http.call_count(), strategies * 2);
    }

    #[tokio::test]
    async fn missing_estimate_is_still_cached() {
        let http = counting(HttpResponse::ok_json("{}"));
        let service = LookupService::with_defaults(CacheStore::with_default_ttl(), http.clone());

        let result = service.lookup(&address(), &config()).await.expect("succeeds");
        assert_eq!(result.estimated_value, None);
        assert_eq!(result.rent_estimate, None);
        assert_eq!(service.cache().len().await, 1);
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_fresh_lookup() {
        let http = counting(HttpResponse::ok_json(r#"{"zestimate": 1}"#));
        let service =
            LookupService::with_defaults(CacheStore::new(Duration::from_millis(50)), http.clone());

        service.lookup(&address(), &config()).await.expect("succeeds");
        tokio::time::sleep(Duration::from_millis(80)).await;
        let again = service.lookup(&address(), &config()).await.expect("succeeds");

        assert!(!again.cached);
        assert_eq!(http.call_count(), 2);
    }

    #[test]
    fn result_serializes_with_nulls() {
        let result = LookupResult {
            address: String::from("1 Main St, Springfield, IL"),
            estimated_value: Some(Number::from(310_000)),
            rent_estimate: None,
            cached: false,
        };

        assert_eq!(
            serde_json::to_value(&result).expect("serializable"),
            serde_json::json!({
                "address": "1 Main St, Springfield, IL",
                "estimatedValue": 310000,
                "rentEstimate": null,
                "cached": false
            })
        );
    }
}
