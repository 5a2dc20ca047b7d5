#[warn(clippy::pedantic)]
mod error;

use crate::error::MainError;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use pikud_haoref::alerts::AlertFetcher;
use pikud_haoref::error::UpstreamError;
use pikud_haoref::hfc::HfcClient;
use pikud_haoref::poller::AlertPoller;
use pikud_haoref::{init_tracing, load_config, shutdown_listener};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), MainError> {
    init_tracing()?;

    let config = load_config()
        .inspect_err(|e| error!(error = ?e, "configuration could not be initialized"))?;

    let client = HfcClient::from_config(&config.http)?;
    let fetcher = AlertFetcher::new(client, config.alerts.clone());
    let poller = AlertPoller::new(Duration::from_secs(config.alerts.cooldown_seconds));
    let interval = Duration::from_secs(config.alerts.poll_interval_seconds);
    let status = PollStatus::default();

    // Cancellation token shared across tasks; listener cancels on SIGINT/SIGTERM.
    let shutdown_token = CancellationToken::new();
    let signal_handle = tokio::spawn(shutdown_listener(Some(shutdown_token.clone())));

    let health_addr = config.alerts.health_addr.clone();
    let health_status = status.clone();
    let health_shutdown = shutdown_token.clone();
    let axum_handle = tokio::spawn(async move {
        match health_addr {
            Some(addr) => run_health_server(addr, health_status, health_shutdown).await,
            None => {
                health_shutdown.cancelled().await;
                Ok(())
            }
        }
    });

    let poller_handle = tokio::spawn(poll_loop(
        fetcher,
        poller,
        interval,
        status,
        shutdown_token.clone(),
    ));

    tokio::select! {
        res = axum_handle => {
            shutdown_token.cancel();
            res??;
        }
        res = poller_handle => {
            shutdown_token.cancel();
            res?;
        }
        res = signal_handle => {
            shutdown_token.cancel();
            res?;
        }
    }

    Ok(())
}

#[derive(Clone, Default)]
struct PollStatus {
    last_attempted_poll: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_successful_poll: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_error: Arc<RwLock<Option<UpstreamError>>>,
}

async fn poll_loop(
    fetcher: AlertFetcher,
    mut poller: AlertPoller,
    interval: Duration,
    status: PollStatus,
    shutdown: CancellationToken,
) {
    info!(interval = ?interval, "initialized alert poller");
    let mut initial_loop = true;
    loop {
        if initial_loop {
            initial_loop = false;
        } else {
            tokio::select! {
                _ = sleep(interval) => {},
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, exiting poll loop");
                    break;
                }
            }
        }

        let now = Utc::now();
        *status.last_attempted_poll.write() = Some(now);
        let alert = match fetcher.get_active_alert().await {
            Ok(alert) => alert,
            Err(e) => {
                error!(error = ?e, error_id = %Uuid::now_v7(), "retrieving active alert failed");
                *status.last_error.write() = Some(e);
                continue;
            }
        };
        *status.last_successful_poll.write() = Some(now);

        let alert = poller.filter(alert, now.timestamp());
        if alert.is_active() {
            match serde_json::to_string(&alert) {
                Ok(json) => info!(alert = %json, "currently active alert"),
                Err(e) => warn!(error = ?e, "failed to serialize active alert"),
            }
        } else {
            info!("there is no currently active alert");
        }
    }
}

async fn run_health_server(
    addr: String,
    status: PollStatus,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    info!(addr = %addr, "starting axum health server");
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(status);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;
    Ok(())
}

async fn health_check(State(status): State<PollStatus>) -> impl IntoResponse {
    let last_attempted_poll = *status.last_attempted_poll.read();
    let last_successful_poll = *status.last_successful_poll.read();
    let last_error = if let Some(e) = status.last_error.read().as_ref() {
        format!("{e}")
    } else {
        "unknown".to_string()
    };

    match (last_attempted_poll, last_successful_poll) {
        (None, _) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "No attempted or successful alert polls".to_string(),
        ),
        (Some(last_attempted_poll), None) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Alerts have not been successfully polled. Last attempted poll: {last_attempted_poll}. Last error: {last_error}"
            ),
        ),
        (Some(last_attempted_poll), Some(last_successful_poll)) => {
            if (Utc::now() - last_successful_poll) > TimeDelta::seconds(60) {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!(
                        "Alerts not polled in the last 60 seconds. Last successful poll: {last_successful_poll}. Last attempted poll: {last_attempted_poll}. Last error: {last_error}"
                    ),
                )
            } else {
                (
                    StatusCode::OK,
                    format!("Alerts last successfully polled: {last_successful_poll}"),
                )
            }
        }
    }
}
