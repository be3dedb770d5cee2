use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use jobmatch_app_server::{AppState, DEFAULT_MAX_UPLOAD_BYTES, router};
use jobmatch_common::{ConfigOverrides, Services, init_tracing};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "jobmatch-app-server",
    about = "Recommend a job posting for an uploaded PDF resume"
)]
struct Cli {
    /// Address to bind the HTTP server to (host:port).
    #[arg(long, env = "JOBMATCH_BIND", default_value = "127.0.0.1:8000")]
    bind: String,

    /// Largest accepted request body in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let cli = Cli::parse();
    let config = cli.overrides.load().context("failed to load configuration")?;
    let services = Services::build(config, cli.overrides.api_key())
        .context("failed to initialise services")?;
    let pipeline = services
        .require_pipeline()
        .context("the server needs a completion model")?;

    let app = router(AppState::new(pipeline), cli.max_upload_bytes);
    let addr: SocketAddr = cli
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("jobmatch-app-server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
