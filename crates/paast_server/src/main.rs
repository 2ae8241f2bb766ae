//! paast server entrypoint.

use paast_server::{config::Config, serve_router, AppState, PasteStore, DEFAULT_PORT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    verify: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--verify" => flags.verify = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "paast=info,paast_core=info,paast_server=info,tower_http=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    if config.id_salt.is_empty() {
        tracing::warn!("ID_SALT is empty; paste identifiers are predictable");
    }

    let store = PasteStore::open(&config)?;
    tracing::info!(
        "Paste store opened at {} (last ordinal {})",
        store.data_dir().display(),
        store.current_ordinal()?
    );

    if cli_flags.verify {
        return run_verify(&store);
    }

    let state = AppState::new(config.clone(), store);
    let bind_addr = paast_server::resolve_bind_address(&config);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("paast listening on http://{}", actual_addr);

    serve_router(listener, state, shutdown_signal()).await?;
    tracing::info!("paast stopped");
    Ok(())
}

fn run_verify(store: &PasteStore) -> anyhow::Result<()> {
    let report = store.verify()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_clean() {
        anyhow::bail!("Store verification found problems");
    }
    Ok(())
}

fn print_help() {
    println!("paast paste server\n");
    println!("Usage: paast [OPTIONS]\n");
    println!("Options:");
    println!("  --verify          Check stored pastes against the counter and ID_SALT, then exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DATA_DIR              Data directory (default: /var/lib/paast)");
    println!("  ID_SALT               Identifier salt. Changing it orphans every existing paste");
    println!("  PORT                  Server port (default: {})", DEFAULT_PORT);
    println!("  BIND                  Override bind address (e.g. 127.0.0.1:{})", DEFAULT_PORT);
    println!("  MAX_PASTE_SIZE        Maximum paste size in bytes (default: 1MB)");
    println!("  PASTE_COOLDOWN_SECS   Seconds between pastes per client (default: 5)");
    println!("  TRUST_PROXY_HEADERS   Trust X-Forwarded-For/-Host/-Proto and X-Real-IP from a reverse proxy");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
