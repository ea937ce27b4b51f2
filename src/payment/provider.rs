//! Payment-provider client.
//!
//! Order creation talks to the external payment provider over HTTPS. The
//! client is injected into the order issuer as a [`PaymentProvider`]
//! implementation so tests and local development can run against
//! [`StubProvider`] instead of the real gateway.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub endpoint: String,
    /// Publishable key id, safe to hand to the checkout widget.
    pub key_id: String,
    /// Timeout for provider API calls.
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.gateway.example".to_string(),
            key_id: String::new(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Purchase intent carried in the provider order so the verification step
/// can recover it without trusting the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNotes {
    /// Paying account.
    pub account_id: String,
    /// Requested plan id.
    pub plan_id: String,
    /// Requested plan category.
    pub plan_category: String,
    /// Credits the plan grants.
    pub credits: u32,
}

/// Request for a provider-side order resource.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Amount in minor units (paise).
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
    /// Receipt identifier, unique per order, at most 40 characters.
    pub receipt: String,
    /// Purchase intent metadata.
    pub notes: OrderNotes,
}

/// A created provider-side order.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOrder {
    /// Provider-assigned order handle.
    #[serde(rename = "id")]
    pub order_id: String,
    /// Amount in minor units, as echoed by the provider.
    pub amount: u64,
    /// ISO currency code.
    pub currency: String,
}

/// A client capable of creating provider-side payment orders.
pub trait PaymentProvider: Send + Sync {
    /// Create an order resource at the provider.
    fn create_order(
        &self,
        request: OrderRequest,
    ) -> impl Future<Output = Result<ProviderOrder>> + Send;

    /// Publishable key id for the checkout widget.
    fn key_id(&self) -> &str;
}

/// HTTPS client for the real payment gateway.
///
/// Authenticates with the key id/secret pair; the secret never leaves this
/// struct and is excluded from `Debug` output.
pub struct HttpProvider {
    config: ProviderConfig,
    key_secret: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("endpoint", &self.config.endpoint)
            .field("key_id", &self.config.key_id)
            .finish_non_exhaustive()
    }
}

impl HttpProvider {
    /// Create a provider client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the underlying HTTP client cannot be built.
    pub fn new(config: ProviderConfig, key_secret: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            key_secret,
            client,
        })
    }
}

impl PaymentProvider for HttpProvider {
    fn create_order(
        &self,
        request: OrderRequest,
    ) -> impl Future<Output = Result<ProviderOrder>> + Send {
        async move {
            let url = format!("{}/v1/orders", self.config.endpoint.trim_end_matches('/'));
            debug!("Creating provider order (receipt={})", request.receipt);

            let send = self
                .client
                .post(&url)
                .basic_auth(&self.config.key_id, Some(&self.key_secret))
                .json(&request)
                .send();

            let response = match tokio::time::timeout(self.config.timeout, send).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!("Provider order request failed: {e}");
                    return Err(Error::OrderCreation(format!("provider request failed: {e}")));
                }
                Err(_) => {
                    warn!("Provider order request timed out");
                    return Err(Error::OrderCreation("provider request timed out".to_string()));
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::OrderCreation(format!(
                    "provider returned HTTP {status}"
                )));
            }

            response
                .json::<ProviderOrder>()
                .await
                .map_err(|e| Error::OrderCreation(format!("malformed provider response: {e}")))
        }
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }
}

/// Deterministic in-process provider for tests and local development.
///
/// Hands out sequential order ids and echoes the requested amount/currency.
/// Set `failing` to simulate a provider outage.
#[derive(Debug, Default)]
pub struct StubProvider {
    counter: AtomicU64,
    /// When true, every order creation fails.
    pub failing: bool,
    requests: parking_lot::Mutex<Vec<OrderRequest>>,
}

impl StubProvider {
    /// Create a stub provider that accepts every order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stub provider that rejects every order.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Requests seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().clone()
    }
}

impl PaymentProvider for StubProvider {
    fn create_order(
        &self,
        request: OrderRequest,
    ) -> impl Future<Output = Result<ProviderOrder>> + Send {
        let order = if self.failing {
            Err(Error::OrderCreation("stub provider set to fail".to_string()))
        } else {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderOrder {
                order_id: format!("order_stub_{n:06}"),
                amount: request.amount,
                currency: request.currency.clone(),
            })
        };
        self.requests.lock().push(request);
        async move { order }
    }

    fn key_id(&self) -> &str {
        "key_stub"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn request() -> OrderRequest {
        OrderRequest {
            amount: 29_900,
            currency: "INR".to_string(),
            receipt: "rcpt_acct_1_0".to_string(),
            notes: OrderNotes {
                account_id: "acct_1".to_string(),
                plan_id: "gold".to_string(),
                plan_category: "GOLD".to_string(),
                credits: 25,
            },
        }
    }

    #[tokio::test]
    async fn test_stub_provider_assigns_sequential_ids() {
        let provider = StubProvider::new();

        let first = provider.create_order(request()).await.unwrap();
        let second = provider.create_order(request()).await.unwrap();

        assert_ne!(first.order_id, second.order_id);
        assert_eq!(first.amount, 29_900);
        assert_eq!(first.currency, "INR");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_stub_surfaces_order_creation_error() {
        let provider = StubProvider::failing();
        let err = provider.create_order(request()).await.unwrap_err();
        assert!(matches!(err, Error::OrderCreation(_)));
    }

    #[test]
    fn test_http_provider_debug_hides_secret() {
        let provider = HttpProvider::new(
            ProviderConfig {
                key_id: "key_live_x".to_string(),
                ..Default::default()
            },
            "super_secret".to_string(),
        )
        .unwrap();
        let debugged = format!("{provider:?}");
        assert!(!debugged.contains("super_secret"));
    }
}
