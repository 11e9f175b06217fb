use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use cakeday_api::auth::{AppState, AppStateInner};
use cakeday_api::forms::DEFAULT_MAX_AGE_YEARS;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cakeday=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("CAKEDAY_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("CAKEDAY_DB_PATH").unwrap_or_else(|_| "cakeday.db".into());
    let host = std::env::var("CAKEDAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CAKEDAY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let upload_dir =
        PathBuf::from(std::env::var("CAKEDAY_UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()));
    let max_age_years: i32 = std::env::var("CAKEDAY_MAX_AGE_YEARS")
        .unwrap_or_else(|_| DEFAULT_MAX_AGE_YEARS.to_string())
        .parse()?;

    // Init database
    let db = cakeday_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        max_age_years,
        upload_dir,
    });

    let app = cakeday_api::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Cakeday server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
