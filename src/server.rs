//! HTTP Server
//!
//! Exposes the switch data as JSON over HTTP.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to the endpoints
//! - `GET /status` - Session counters (pretty JSON as plain text)
//! - `GET /profiles` - Sofia profiles
//! - `GET /gateways` - Sofia gateways
//! - `GET /gateways/check` - Gateways; 500 unless every gateway is up
//! - `GET /gateways/check-latency` - Like `check`, also failing on slow pings
//!
//! # Request Model
//!
//! Every request opens its own event socket connection through the
//! [`Connector`], fetches once and closes the connection before responding.
//! Nothing is shared between requests except the connector and thresholds.
//!
//! # Error Handling
//!
//! Any failure becomes `500 {"error": "<message>"}`. A panic while fetching is
//! caught and reported the same way so one bad request cannot take the
//! listener down.

use crate::config::{Config, HealthConfig};
use crate::error::{ExporterError, Result};
use crate::fetcher::Fetcher;
use crate::freeswitch::types::SofiaGateway;
use crate::freeswitch::{Connector, EslConnector};
use crate::health;
use crate::output::OutputFormat;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

struct AppState<C> {
    connector: Arc<C>,
    health: HealthConfig,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            health: self.health,
        }
    }
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let connector = EslConnector::new(config.freeswitch.clone());
    let app = router(connector, config.health);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on {}", addr);
    info!("Gateway check available at http://{}/gateways/check", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router around a connector
pub fn router<C: Connector>(connector: C, health: HealthConfig) -> Router {
    let state = AppState {
        connector: Arc::new(connector),
        health,
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/status", get(status_handler::<C>))
        .route("/profiles", get(profiles_handler::<C>))
        .route("/gateways", get(gateways_handler::<C>))
        .route("/gateways/check", get(gateways_check_handler::<C>))
        .route(
            "/gateways/check-latency",
            get(gateways_check_latency_handler::<C>),
        )
        .with_state(state)
}

/// Connect, fetch once and close
async fn fetch<C: Connector>(connector: &C) -> Result<Fetcher<C::Transport>> {
    let transport = connector.connect().await?;
    let mut fetcher = Fetcher::new(transport);
    let outcome = fetcher.get_data().await;
    fetcher.close().await;
    outcome.map(|()| fetcher)
}

async fn fetch_isolated<C: Connector>(
    state: &AppState<C>,
) -> Result<Fetcher<C::Transport>> {
    match AssertUnwindSafe(fetch(state.connector.as_ref()))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(_) => Err(ExporterError::Internal(
            "panic while fetching switch data".to_string(),
        )),
    }
}

fn error_response(e: ExporterError) -> Response {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

fn gateway_verdict(gateways: &[SofiaGateway], healthy: bool) -> Response {
    let status = if healthy {
        StatusCode::OK
    } else {
        warn!("Gateway check failed for {} gateways", gateways.len());
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(gateways.to_vec())).into_response()
}

async fn root_handler() -> impl IntoResponse {
    Html(
        r#"<html>
<head><title>FreeSWITCH Exporter</title></head>
<body>
<h1>FreeSWITCH Exporter</h1>
<p><a href="/status">Status</a></p>
<p><a href="/profiles">Profiles</a></p>
<p><a href="/gateways">Gateways</a></p>
<p><a href="/gateways/check">Gateway check</a></p>
<p><a href="/gateways/check-latency">Gateway latency check</a></p>
</body>
</html>"#,
    )
}

async fn status_handler<C: Connector>(State(state): State<AppState<C>>) -> Response {
    match fetch_isolated(&state).await {
        Ok(fetcher) => {
            let output = fetcher.format_output(OutputFormat::Json);
            (StatusCode::OK, output.sessions).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn profiles_handler<C: Connector>(State(state): State<AppState<C>>) -> Response {
    match fetch_isolated(&state).await {
        Ok(fetcher) => (StatusCode::OK, Json(fetcher.profiles().to_vec())).into_response(),
        Err(e) => error_response(e),
    }
}

async fn gateways_handler<C: Connector>(State(state): State<AppState<C>>) -> Response {
    match fetch_isolated(&state).await {
        Ok(fetcher) => (StatusCode::OK, Json(fetcher.gateways().to_vec())).into_response(),
        Err(e) => error_response(e),
    }
}

async fn gateways_check_handler<C: Connector>(State(state): State<AppState<C>>) -> Response {
    match fetch_isolated(&state).await {
        Ok(fetcher) => {
            let healthy = health::gateways_up(fetcher.gateways());
            gateway_verdict(fetcher.gateways(), healthy)
        }
        Err(e) => error_response(e),
    }
}

async fn gateways_check_latency_handler<C: Connector>(
    State(state): State<AppState<C>>,
) -> Response {
    match fetch_isolated(&state).await {
        Ok(fetcher) => {
            let healthy = health::gateways_within_latency(fetcher.gateways(), &state.health);
            gateway_verdict(fetcher.gateways(), healthy)
        }
        Err(e) => error_response(e),
    }
}
