//! Service assembly - wires the payment components together and serves the
//! HTTP API.

use crate::api::{create_router, TokenVerifier};
use crate::config::{Secrets, ServiceConfig};
use crate::error::Result;
use crate::event::{create_event_channel, LedgerEvent, LedgerEventsChannel, LedgerEventsSender};
use crate::ledger::Ledger;
use crate::payment::{OrderIssuer, PaymentProvider, PaymentVerifier, PendingOrders, ProcessedCache};
use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared state behind the HTTP handlers.
pub struct AppState<P> {
    /// Creates provider orders and records purchase intents.
    pub issuer: OrderIssuer<P>,
    /// Verifies confirmations and commits ledger mutations.
    pub verifier: PaymentVerifier,
    /// Account store.
    pub ledger: Ledger,
    /// Free job applications before a plan is required.
    pub free_job_limit: u32,
}

/// Builder for constructing the payment service.
pub struct ServiceBuilder<P> {
    config: ServiceConfig,
    secrets: Secrets,
    provider: P,
}

impl<P: PaymentProvider + 'static> ServiceBuilder<P> {
    /// Create a new builder with the given configuration, secrets, and
    /// provider client.
    #[must_use]
    pub fn new(config: ServiceConfig, secrets: Secrets, provider: P) -> Self {
        Self {
            config,
            secrets,
            provider,
        }
    }

    /// Wire the components and produce a runnable service.
    #[must_use]
    pub fn build(self) -> RunningService<P> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = create_event_channel();

        let ledger = Ledger::new();
        let pending = PendingOrders::with_capacity(self.config.pending_capacity);
        let processed = ProcessedCache::with_capacity(self.config.processed_capacity);

        let issuer = OrderIssuer::new(
            Arc::new(self.provider),
            self.config.catalog.clone(),
            pending.clone(),
            self.config.currency.clone(),
            events_tx.clone(),
        );
        let verifier = PaymentVerifier::new(
            self.secrets.provider_key_secret,
            ledger.clone(),
            pending,
            processed,
            events_tx.clone(),
        );

        let state = Arc::new(AppState {
            issuer,
            verifier,
            ledger,
            free_job_limit: self.config.free_job_limit,
        });
        let tokens = Arc::new(TokenVerifier::new(self.secrets.auth_token_secret));

        RunningService {
            config: self.config,
            state,
            tokens,
            shutdown_tx,
            shutdown_rx,
            events_tx,
            events_rx: Some(events_rx),
        }
    }
}

/// A wired payment service, ready to serve.
pub struct RunningService<P> {
    config: ServiceConfig,
    state: Arc<AppState<P>>,
    tokens: Arc<TokenVerifier>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    events_tx: LedgerEventsSender,
    events_rx: Option<LedgerEventsChannel>,
}

impl<P: PaymentProvider + 'static> RunningService<P> {
    /// Shared handler state (ledger access for provisioning, caches).
    #[must_use]
    pub fn state(&self) -> Arc<AppState<P>> {
        Arc::clone(&self.state)
    }

    /// Handle to the account store.
    #[must_use]
    pub fn ledger(&self) -> Ledger {
        self.state.ledger.clone()
    }

    /// Build the axum router for this service.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state), Arc::clone(&self.tokens))
    }

    /// Get a receiver for ledger events.
    ///
    /// Note: Can only be called once. Subsequent calls return None.
    pub fn events(&mut self) -> Option<LedgerEventsChannel> {
        self.events_rx.take()
    }

    /// Subscribe to ledger events.
    #[must_use]
    pub fn subscribe_events(&self) -> LedgerEventsChannel {
        self.events_tx.subscribe()
    }

    /// Request shutdown of a running service.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if binding or serving fails.
    pub async fn run(&mut self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until Ctrl-C or [`Self::shutdown`].
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(&mut self, listener: tokio::net::TcpListener) -> Result<()> {
        info!("planpay listening on {}", listener.local_addr()?);

        let mut shutdown_rx = self.shutdown_rx.clone();
        let shutdown = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, shutting down");
                }
                _ = shutdown_rx.changed() => {
                    info!("Shutdown requested");
                }
            }
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        let _ = self.events_tx.send(LedgerEvent::ShuttingDown);
        info!("planpay stopped");
        Ok(())
    }
}
