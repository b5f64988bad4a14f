//! # Slotbook API
//!
//! HTTP server for the appointment booking service. It exposes the booking
//! form's submission endpoint, the availability queries the calendar
//! widgets render from, and the admin dashboard's management surface.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error mapping from the domain taxonomy to HTTP
//! - **Config**: Environment-based configuration
//!
//! A single driver task owns the ledger subscription: every snapshot it
//! receives is applied to the availability synchronizer, in arrival order,
//! and the widgets read derived state from there.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use slotbook_core::admin::AdminConsole;
use slotbook_core::availability::{AvailabilityStore, HorizonPolicy};
use slotbook_core::booking::BookingDesk;
use slotbook_core::kv::KvStore;
use slotbook_core::ledger::AppointmentLedger;
use slotbook_core::pricing::PriceBook;
use slotbook_core::sync::AvailabilitySync;

/// Shared application state that is accessible to all request handlers.
pub struct ApiState {
    pub ledger: Arc<dyn AppointmentLedger>,
    pub store: Arc<AvailabilityStore>,
    pub sync: Arc<AvailabilitySync>,
    pub desk: BookingDesk,
    pub admin: AdminConsole,
}

impl ApiState {
    /// Wire the availability store, synchronizer, booking desk and admin
    /// console around one ledger and one persisted key-value backend.
    pub fn new(
        ledger: Arc<dyn AppointmentLedger>,
        kv: Box<dyn KvStore>,
        horizon: HorizonPolicy,
    ) -> Self {
        let store = Arc::new(AvailabilityStore::new(kv, horizon));
        let sync = Arc::new(AvailabilitySync::new(Arc::clone(&store)));
        let desk = BookingDesk::new(Arc::clone(&sync), Arc::clone(&ledger));
        let admin = AdminConsole::new(Arc::clone(&sync), Arc::clone(&ledger), PriceBook::standard());
        Self {
            ledger,
            store,
            sync,
            desk,
            admin,
        }
    }

    /// Start the synchronization driver: apply the current ledger snapshot,
    /// then every subsequent one in arrival order. The task ends when the
    /// ledger side shuts down.
    pub fn spawn_sync_driver(&self) -> JoinHandle<()> {
        let sync = Arc::clone(&self.sync);
        let mut subscription = self.ledger.subscribe();
        tokio::spawn(async move {
            sync.apply_snapshot(subscription.latest());
            while let Some(snapshot) = subscription.next().await {
                sync.apply_snapshot(snapshot);
            }
            info!("ledger subscription closed, synchronization stopped");
        })
    }
}

/// Starts the API server with the provided configuration and dependencies.
pub async fn start_server(
    config: config::ApiConfig,
    ledger: Arc<dyn AppointmentLedger>,
    kv: Box<dyn KvStore>,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(
        ledger,
        kv,
        HorizonPolicy {
            days_ahead: config.horizon_days,
        },
    ));
    state.spawn_sync_driver();

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Customer booking endpoints
        .merge(routes::bookings::routes())
        // Calendar availability endpoints
        .merge(routes::availability::routes())
        // Admin dashboard endpoints
        .merge(routes::admin::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            );

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .into_inner(),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
