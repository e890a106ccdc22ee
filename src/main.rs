//! Idiom Wordle · daily four-character idiom puzzle backend
//!
//! - Axum HTTP + WebSocket API
//! - Deterministic daily target, keyboard and hint per date and difficulty
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   GAME_CONFIG_PATH : path to TOML config (calendar, keyboard, hints, defaults)
//!   IDIOMS_PATH      : idiom CSV (word,pinyin,derivation,mark); built-in list if unset
//!   DATA_DIR         : directory for per-player JSON records; memory only if unset
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod pinyin;
mod rng;
mod calendar;
mod pool;
mod keyboard;
mod evaluate;
mod session;
mod hint;
mod puzzle;
mod stats;
mod store;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::calendar::format_date;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config, idiom pool and player store; the pool must be loaded before binding.
  let state = Arc::new(AppState::from_env().await?);
  info!(target: "idiom_wordle", today = %format_date(state.today()), "Puzzle calendar ready");

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "idiom_wordle", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "idiom_wordle", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "idiom_wordle", error = %e, "Failed to listen for shutdown signal");
  }
}
