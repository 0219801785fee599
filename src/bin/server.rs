use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use projectboard::db;
use projectboard::server::config::ServerConfig;
use projectboard::web;

fn init_logging() {
    // Filter based on RUST_LOG, defaulting to `info`.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_logging();

    let config = ServerConfig::from_env()?;

    let db = db::connect(&config.database_url).await?;
    db::setup_schema(&db).await?;

    let app_router = web::create_router(db);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "HTTP server listening");
    axum::serve(listener, app_router).await?;

    Ok(())
}
