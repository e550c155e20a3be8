// crates/packrun-http/src/bin/packrun-server.rs
// ============================================================================
// Module: Packrun Server
// Description: Standalone HTTP server over the execution runtime.
// Purpose: Serve the automation pack surface with in-memory storage.
// Dependencies: axum, clap, packrun-core, packrun-http, tokio, tracing
// ============================================================================

//! ## Overview
//! Binds the automation pack router on the configured address with an
//! in-memory definition store and the default no-op runner. Deployments with
//! real action runners embed [`packrun_http::router`] instead of running
//! this binary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use packrun_core::runtime::PackRuntime;
use packrun_core::runtime::RuntimeConfig;
use packrun_http::AppState;
use packrun_http::router;
use packrun_store_memory::InMemoryDefinitionStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Command-line arguments for the server.
#[derive(Debug, Parser)]
#[command(name = "packrun-server", about = "Automation pack execution server")]
struct Args {
    /// Address to bind the HTTP listener on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
    /// Per-attempt timeout in seconds for steps that declare 0.
    #[arg(long, default_value_t = 30)]
    default_step_timeout_secs: u64,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(InMemoryDefinitionStore::new());
    let runtime = PackRuntime::builder()
        .reader(Arc::clone(&store))
        .config(RuntimeConfig {
            default_step_timeout_secs: args.default_step_timeout_secs,
        })
        .build()
        .map_err(io::Error::other)?;

    let state = AppState {
        runtime: Arc::new(runtime),
        store,
    };
    let listener = TcpListener::bind(args.bind).await?;
    info!(bind = %args.bind, "packrun server listening");
    axum::serve(listener, router(state)).await
}
