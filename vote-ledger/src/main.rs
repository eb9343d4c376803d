use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vote_ledger::server::{create_app, run_server, state::AppState};
use vote_ledger::{Dependencies, LogFormat, ServiceError, Settings};

/// Initialize tracing with JSON output when requested, pretty console output otherwise.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("vote_ledger=info,vote_ledger_core=info,vote_ledger_repository=info,tower_http=info")
    });

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();
        }
    }

    info!(
        service_name = "vote-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
}

/// Main entry point for the Vote Ledger service.
///
/// Loads `.env`, reads the settings, wires the repository and ledger, and
/// serves the HTTP surface until ctrl-c.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    let dependencies = Dependencies::new(&settings).await?;
    let app = create_app(AppState {
        ledger: dependencies.ledger,
    });

    run_server(app, settings.socket_addr()).await
}
