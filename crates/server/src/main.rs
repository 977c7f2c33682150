use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use bandshare_core::{Band, BandCode};
use bandshare_gateway::GatewayBuilder;
use bandshare_server::api::AppState;
use bandshare_server::auth::JwtVerifier;
use bandshare_server::config::BandshareConfig;
use bandshare_server::error::ServerError;
use bandshare_state::BandStore;

/// Bandshare HTTP server.
#[derive(Parser, Debug)]
#[command(name = "bandshare-server", about = "HTTP server for tap-to-share NFC bands")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "bandshare.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run database migrations for the configured state backend, then exit.
    Migrate,
    /// Register a band code, optionally claimed by an owner, then exit.
    Provision {
        /// Code printed on the band.
        #[arg(long)]
        code: String,
        /// User id of the owner; the band stays unclaimed when omitted.
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_exists = Path::new(&cli.config).exists();
    let config: BandshareConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    bandshare_server::telemetry::init(&config.logging);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    match cli.command {
        Some(Commands::Migrate) => return run_migrate(&config).await,
        Some(Commands::Provision { code, owner }) => {
            return run_provision(&config, &code, owner.as_deref()).await;
        }
        None => {}
    }

    let store = bandshare_server::state_factory::create_state(&config.state).await?;
    info!(backend = %config.state.backend, "state store initialized");

    let gateway = GatewayBuilder::new()
        .state(store)
        .config(config.share.to_share_config())
        .build()?;

    let auth = if config.auth.enabled {
        let secret = config.auth.resolve_secret().ok_or_else(|| {
            ServerError::Config(format!(
                "auth is enabled but no jwt_secret is configured (set [auth].jwt_secret or {})",
                bandshare_server::config::JWT_SECRET_ENV
            ))
        })?;
        info!("bearer token authentication enabled");
        Some(Arc::new(JwtVerifier::new(
            &secret,
            config.auth.issuer.as_deref(),
            config.auth.audience.as_deref(),
        )))
    } else {
        tracing::warn!("authentication disabled, owner routes skip ownership checks");
        None
    };

    let state = AppState {
        gateway: Arc::new(gateway),
        auth,
        public_url: config.server.public_url.clone(),
    };
    let app = bandshare_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "bandshare-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM, bounded by the
    // configured timeout once the signal arrives.
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    tokio::select! {
        result = server => result?,
        () = async {
            if signalled_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping open connections"
            );
        }
    }

    info!("bandshare-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: initialize the state schema and exit.
async fn run_migrate(config: &BandshareConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.state.backend, "running state backend migrations...");
    let _store = bandshare_server::state_factory::create_state(&config.state).await?;
    info!(backend = %config.state.backend, "state backend migrations complete");
    Ok(())
}

/// Run the `provision` subcommand: register a band and print its id.
async fn run_provision(
    config: &BandshareConfig,
    code: &str,
    owner: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = BandCode::new(code);
    if code.is_blank() {
        return Err(ServerError::Config("band code must not be empty".into()).into());
    }
    if config.state.backend == "memory" {
        tracing::warn!("memory backend does not persist, the band is lost on exit");
    }

    let store = bandshare_server::state_factory::create_state(&config.state).await?;
    let band = match owner {
        Some(user) => Band::claimed(code, user),
        None => Band::unclaimed(code),
    };
    let stored = store.put_band(&band).await?;
    info!(band_id = %stored.id, code = %stored.code, status = stored.status.as_str(), "band provisioned");
    println!("{}", stored.id);
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
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
            Ok(mut sig) => {
                sig.recv().await;
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
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
