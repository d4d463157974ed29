//! Abacus CLI and REST API entry point.
//!
//! Binary name: `abacus`
//!
//! Parses CLI arguments, loads configuration, wires the engine, then
//! dispatches to the command handler or starts the REST API server.

mod cli;
mod config;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

/// Default log level for one-shot commands, so a CLI run is not drowned
/// in startup logs.
const COMMAND_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "abacus", &mut std::io::stdout());
        return Ok(());
    }

    // Config decides the log format, so load it under a temporary stderr
    // subscriber before the real one is installed.
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(cli.level_override().unwrap_or(COMMAND_LOG_LEVEL)))
        .with_target(false)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        config::load_from_env(cli.config.as_deref())
    });

    let level_override = match cli.command {
        Commands::Serve { .. } => cli.level_override(),
        _ => cli.level_override().or(Some(COMMAND_LOG_LEVEL)),
    };
    abacus_observe::init_tracing(&config.logging, level_override)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(config)?;

    let result = match cli.command {
        Commands::Serve { port, host } => serve(state, host, port).await,
        Commands::List { query, prompt } => {
            cli::skill::list_skills(&state, query.as_deref(), prompt, cli.json)
        }
        Commands::Describe { id } => cli::skill::describe_skill(&state, &id, cli.json),
        Commands::Run { id, input, adapt } => {
            cli::skill::run_skill(&state, &id, &input, adapt, cli.json)
        }
        Commands::Chain { file } => cli::skill::run_chain(&state, &file, cli.json),
        Commands::Completions { .. } => Ok(()),
    };

    abacus_observe::shutdown_tracing();
    result
}

async fn serve(state: AppState, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, skills = state.registry.len(), "server listening");
    println!(
        "  {} Abacus API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
