use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use sac_web::app::{build_router, AppState};
use sac_web::articles::repository::{ArticleRepository, ObjectStoreArticleRepository};
use sac_web::authors::AuthorDirectory;
use sac_web::config::AppConfig;
use sac_web::storage::client::{MemoryStorage, S3StorageClient, StorageClient};

/// Blog API server for the Sociedad de Astronomia del Caribe website.
#[derive(Parser)]
#[command(name = "sac-web", version)]
struct Cli {
    /// Optional configuration file (TOML, YAML or JSON).
    #[arg(long, env = "SAC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sac_web=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Starting sac-web server...");

    let storage: Arc<dyn StorageClient> = if config.storage.in_memory {
        tracing::warn!("Using in-memory article storage; nothing will be persisted");
        Arc::new(MemoryStorage::new())
    } else {
        let client = S3StorageClient::from_config(&config.storage)
            .await
            .context("Failed to initialize S3 client")?;
        tracing::info!(bucket = %config.storage.bucket, "S3 storage client initialized");
        Arc::new(client)
    };

    let articles: Arc<dyn ArticleRepository> = Arc::new(ObjectStoreArticleRepository::new(storage));
    let authors = AuthorDirectory::load(&config.authors.dir, &config.site.author)
        .context("Failed to load author profiles")?;

    if config.admin.service_token.trim().is_empty() {
        tracing::warn!("No service token configured; the admin API rejects every request");
    }

    let state = AppState::new(&config, articles, authors);
    let mut app = build_router(state);

    if let Some(dir) = &config.server.static_dir {
        tracing::info!(dir = %dir.display(), "Serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    let app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    tracing::info!("Listening on http://{}", config.server.addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
