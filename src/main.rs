use tracing::info;
use tracing_subscriber::EnvFilter;
use uniforum::{app, config::Config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uniforum=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::load()?;

    let db_pool = db::connect(&config.database_url, config.max_connections).await?;
    db::init_schema(&db_pool).await?;
    if config.seed_demo_data {
        db::seed_demo(&db_pool).await?;
    }

    let app = app(AppState::new(db_pool));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
