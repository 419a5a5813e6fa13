use tokio::net::TcpListener;

use journal::config::Config;
use journal::{build_app, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    let app = build_app(AppState::new(pool, &config));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
