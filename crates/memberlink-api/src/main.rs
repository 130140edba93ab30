//! Memberlink CLI and REST API entry point.
//!
//! Binary name: `mlink`
//!
//! Parses CLI arguments, initializes database and services, then starts the
//! REST API server and/or the chat relay.

mod cli;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use memberlink_infra::config::{BOT_TOKEN_ENV, bot_token_from_env};
use memberlink_infra::telegram::{TelegramGateway, bot_from_token, run_relay};
use memberlink_observe::tracing_setup::{
    LogFormat, TracingOptions, filter_directive, init_tracing, shutdown_tracing,
};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions {
        default_directive: filter_directive(cli.verbose, cli.quiet).to_string(),
        format: if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
        enable_otel: cli.otel,
    };
    if let Err(e) = init_tracing(&options) {
        eprintln!("failed to initialize tracing: {e}");
    }

    let state = AppState::init().await?;
    let shutdown = CancellationToken::new();

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_relay,
        } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);

            let relay = if no_relay || !state.config.relay.enabled {
                None
            } else {
                spawn_relay(&state, shutdown.clone())
            };

            let router = http::router::build_router(state.clone());
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Memberlink API listening on {}",
                console::style("▶").green().bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} Data directory: {}",
                console::style("•").dim(),
                state.data_dir.display()
            );
            println!(
                "  {} Chat relay: {}",
                console::style("•").dim(),
                if relay.is_some() {
                    console::style("running").green()
                } else {
                    console::style("off").yellow()
                }
            );
            println!("  Press Ctrl+C to stop.\n");

            let signal_token = shutdown.clone();
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    signal_token.cancel();
                })
                .await?;

            // The server can also stop on its own; make sure the relay follows.
            shutdown.cancel();
            if let Some(relay) = relay {
                if let Err(e) = relay.await {
                    tracing::warn!(error = %e, "chat relay task failed");
                }
            }

            println!("\n  Server stopped.");
        }

        Commands::Relay => {
            let Some(mut relay) = spawn_relay(&state, shutdown.clone()) else {
                anyhow::bail!("{BOT_TOKEN_ENV} is not set; the chat relay needs a bot token");
            };

            println!(
                "  {} Chat relay running. Press Ctrl+C to stop.",
                console::style("▶").green().bold()
            );

            let interrupted = tokio::select! {
                _ = shutdown_signal() => true,
                finished = &mut relay => {
                    finished?;
                    false
                }
            };
            if interrupted {
                shutdown.cancel();
                relay.await?;
            }

            println!("\n  Relay stopped.");
        }
    }

    // Let in-flight cache refills land before exiting.
    state.member_writer.reconciliation_idle().await;
    shutdown_tracing();

    Ok(())
}

/// Start the chat relay in the background if a bot token is configured.
fn spawn_relay(
    state: &AppState,
    shutdown: CancellationToken,
) -> Option<tokio::task::JoinHandle<()>> {
    let Some(token) = bot_token_from_env() else {
        tracing::info!(env = BOT_TOKEN_ENV, "no bot token set, chat relay disabled");
        return None;
    };

    let bot = bot_from_token(&token);
    let relay = Arc::new(state.chat_relay(TelegramGateway::new(bot.clone())));
    Some(tokio::spawn(run_relay(bot, relay, shutdown)))
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
