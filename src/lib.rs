pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use cli::{Cli, Commands};
pub use config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use state::SharedState;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run_with(cli: Cli, config: Config) -> anyhow::Result<()> {
    config.validate()?;
    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let prometheus_handle = install_metrics(&config)?;
            run_server(config, prometheus_handle).await
        }

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists.");
            }
            Ok(())
        }

        Commands::CreateAccount {
            login_id,
            password,
            pun,
            not_owner,
            roles,
            email,
        } => {
            let state = SharedState::new(config).await?;
            cli::cmd_create_account(
                &state,
                &login_id,
                &password,
                pun.as_deref(),
                !not_owner,
                &roles,
                email.as_deref(),
            )
            .await
        }

        Commands::EnableLogin { login_id, disable } => {
            let state = SharedState::new(config).await?;
            cli::cmd_enable_login(&state, &login_id, !disable).await
        }

        Commands::Link {
            login_id,
            pun,
            owner,
        } => {
            let state = SharedState::new(config).await?;
            cli::cmd_link(&state, &login_id, &pun, owner).await
        }

        Commands::Account { login_id } => {
            let state = SharedState::new(config).await?;
            cli::cmd_account(&state, &login_id).await
        }

        Commands::SignupPolicy => {
            let state = SharedState::new(config).await?;
            cli::cmd_signup_policy(&state).await
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let (json_layer, fmt_layer) = if config.general.log_json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    // A second init (e.g. from tests) is not an error.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(fmt_layer)
        .try_init();
}

fn install_metrics(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("swanpipe v{} starting...", env!("CARGO_PKG_VERSION"));

    let shared = Arc::new(SharedState::new(config).await?);

    if let Some(report) = services::create_startup_accounts(
        &shared.config.startup_accounts,
        shared.config_gate.as_ref(),
        shared.provisioner.as_ref(),
    )
    .await?
    {
        info!(
            created = report.created,
            conflicts = report.conflicts,
            "Startup accounts processed"
        );
    }

    let addr = format!("{}:{}", shared.config.server.host, shared.config.server.port);
    let app = api::router(api::create_app_state(shared, prometheus_handle));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 HTTP server running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
