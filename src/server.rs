//! HTTP prover service.
//!
//! Two listeners share one immutable [`ProvingSystem`]: the prover address
//! serves `POST /prove`, the metrics address serves `GET /metrics`. Proof
//! generation runs on tokio's blocking pool so slow proofs never stall the
//! accept loop.

use crate::api::{InsertionParameters, ProvingSystem};
use crate::config;
use crate::metrics::{MetricsSnapshot, ProverMetrics};
use crate::InsertionProverError;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Listen addresses of the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub prover_address: String,
    pub metrics_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prover_address: config::DEFAULT_PROVER_ADDRESS.to_string(),
            metrics_address: config::DEFAULT_METRICS_ADDRESS.to_string(),
        }
    }
}

/// Error body: `code` is `malformed_body`, `proving_error` or `unexpected_error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Clone)]
struct AppState {
    system: Arc<ProvingSystem>,
    metrics: Arc<ProverMetrics>,
}

/// Router for the prover address. Non-POST requests to `/prove` get 405.
pub fn prover_router(system: Arc<ProvingSystem>, metrics: Arc<ProverMetrics>) -> Router {
    Router::new()
        .route("/prove", post(prove_handler))
        .layer(DefaultBodyLimit::max(config::MAX_REQUEST_BODY_BYTES))
        .with_state(AppState { system, metrics })
}

/// Router for the metrics address.
pub fn metrics_router(metrics: Arc<ProverMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Bound but not yet serving listeners.
pub struct Server {
    prover_listener: TcpListener,
    metrics_listener: TcpListener,
    system: Arc<ProvingSystem>,
    metrics: Arc<ProverMetrics>,
}

impl Server {
    /// Bind both listeners.
    pub async fn bind(config: &Config, system: Arc<ProvingSystem>) -> Result<Self> {
        let prover_listener = TcpListener::bind(&config.prover_address)
            .await
            .with_context(|| format!("binding prover address {}", config.prover_address))?;
        let metrics_listener = TcpListener::bind(&config.metrics_address)
            .await
            .with_context(|| format!("binding metrics address {}", config.metrics_address))?;

        Ok(Self {
            prover_listener,
            metrics_listener,
            system,
            metrics: Arc::new(ProverMetrics::new()),
        })
    }

    pub fn prover_addr(&self) -> Result<SocketAddr> {
        Ok(self.prover_listener.local_addr()?)
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        Ok(self.metrics_listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(
            tree_depth = self.system.tree_depth(),
            batch_size = self.system.batch_size(),
            prover = %self.prover_addr()?,
            metrics = %self.metrics_addr()?,
            "prover service listening"
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            shutdown.await;
            let _ = stop_tx.send(true);
        });

        let prover = axum::serve(
            self.prover_listener,
            prover_router(self.system, self.metrics.clone()).into_make_service(),
        )
        .with_graceful_shutdown(wait_for_stop(stop_rx.clone()));
        let metrics = axum::serve(
            self.metrics_listener,
            metrics_router(self.metrics).into_make_service(),
        )
        .with_graceful_shutdown(wait_for_stop(stop_rx));

        let (prover_result, metrics_result) =
            tokio::join!(prover.into_future(), metrics.into_future());
        prover_result.context("prover server error")?;
        metrics_result.context("metrics server error")?;

        info!("prover service stopped");
        Ok(())
    }
}

async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    // A dropped sender also means stop.
    let _ = stop.changed().await;
}

async fn prove_handler(State(state): State<AppState>, body: Bytes) -> Response {
    state.metrics.record_request();

    let params = match parse_body(&body) {
        Ok(params) => params,
        Err(e) => {
            warn!("malformed prove request: {}", e);
            state.metrics.record_failure(&e);
            return error_response(StatusCode::BAD_REQUEST, "malformed_body", e.to_string());
        }
    };

    let system = state.system.clone();
    let started = Instant::now();
    let result =
        tokio::task::spawn_blocking(move || system.prove(&params).and_then(|p| p.to_json())).await;

    match result {
        Ok(Ok(proof)) => {
            state.metrics.record_proof(started.elapsed());
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "proof generated");
            (StatusCode::OK, Json(proof)).into_response()
        }
        Ok(Err(e)) => {
            state.metrics.record_failure(&e);
            let status = proving_error_status(&e);
            if status.is_server_error() {
                error!("proving failed: {}", e);
            } else {
                warn!("batch rejected: {}", e);
            }
            error_response(status, "proving_error", e.to_string())
        }
        Err(join_error) => {
            state.metrics.record_backend_failure();
            error!("proving task failed: {}", join_error);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected_error",
                "proving task failed".to_string(),
            )
        }
    }
}

fn parse_body(body: &[u8]) -> crate::Result<InsertionParameters> {
    let json = std::str::from_utf8(body).map_err(|e| {
        InsertionProverError::Parse(format!("request body is not valid UTF-8: {e}"))
    })?;
    InsertionParameters::from_json(json)
}

async fn metrics_handler(State(metrics): State<Arc<ProverMetrics>>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}

/// Caller mistakes are 400, backend failures 500.
fn proving_error_status(err: &InsertionProverError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message,
        }),
    )
        .into_response()
}
