//! Test harness that runs the service over loopback HTTP.

use planpay::api::TokenVerifier;
use planpay::payment::{signature, StubProvider};
use planpay::{Account, Ledger, Secrets, ServiceBuilder, ServiceConfig};
use serde_json::Value;

/// Provider key secret shared with the (stubbed) gateway.
pub const PROVIDER_SECRET: &str = "e2e_provider_secret";

/// Secret the identity provider signs session tokens with.
pub const AUTH_SECRET: &str = "e2e_auth_secret";

/// A running service plus the handles tests need to drive it.
pub struct TestHarness {
    base_url: String,
    client: reqwest::Client,
    ledger: Ledger,
    tokens: TokenVerifier,
}

impl TestHarness {
    /// Build the service with the stub provider and serve it on an
    /// ephemeral loopback port.
    pub async fn setup() -> Self {
        let secrets = Secrets {
            provider_key_secret: PROVIDER_SECRET.to_string(),
            auth_token_secret: AUTH_SECRET.to_string(),
        };
        let mut service =
            ServiceBuilder::new(ServiceConfig::default(), secrets, StubProvider::new()).build();
        let ledger = service.ledger();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = service.serve(listener).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            ledger,
            tokens: TokenVerifier::new(AUTH_SECRET.to_string()),
        }
    }

    /// Provision an account the way the external registration flow would.
    pub fn provision(&self, account_id: &str) {
        self.ledger
            .insert_account(Account::new(account_id.to_string()))
            .expect("provision account");
    }

    /// Direct ledger handle for state assertions.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Issue a session token for an account.
    pub fn token(&self, account_id: &str) -> String {
        self.tokens.issue(account_id).expect("issue token")
    }

    /// Sign an (order, payment) pair the way the provider would.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        signature::sign_order(PROVIDER_SECRET, order_id, payment_id).expect("sign")
    }

    /// POST a JSON body with a bearer token; returns (status, body).
    pub async fn post(&self, path: &str, token: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("request");
        let status = response.status().as_u16();
        let body = response.json().await.expect("json body");
        (status, body)
    }

    /// GET with a bearer token; returns (status, body).
    pub async fn get(&self, path: &str, token: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("request");
        let status = response.status().as_u16();
        let body = response.json().await.expect("json body");
        (status, body)
    }

    /// GET without any Authorization header.
    pub async fn get_unauthenticated(&self, path: &str) -> u16 {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request")
            .status()
            .as_u16()
    }

    /// Run the purchase endpoint for a catalog plan and return the order id.
    pub async fn purchase(&self, token: &str, plan_id: &str) -> String {
        let (price, category, credits) = match plan_id {
            "silver" => (199, "SILVER", 10),
            "gold" => (299, "GOLD", 25),
            "platinum" => (399, "PLATINUM", 50),
            other => panic!("unknown test plan {other}"),
        };
        let (status, body) = self
            .post(
                "/payments/purchase",
                token,
                &serde_json::json!({
                    "planId": plan_id,
                    "planCategory": category,
                    "amount": price,
                    "credits": credits,
                }),
            )
            .await;
        assert_eq!(status, 200, "purchase failed: {body}");
        assert_eq!(body["success"], true);
        body["orderId"].as_str().expect("orderId").to_string()
    }

    /// Verify a payment with a correctly-computed signature.
    pub async fn verify(&self, token: &str, order_id: &str, payment_id: &str) -> (u16, Value) {
        let signature = self.sign(order_id, payment_id);
        self.post(
            "/payments/verify",
            token,
            &serde_json::json!({
                "orderId": order_id,
                "paymentId": payment_id,
                "signature": signature,
            }),
        )
        .await
    }
}
