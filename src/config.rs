use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

/// Top-level service configuration.
///
/// Layered with the `config` crate: built-in defaults, then an optional
/// file, then `SAC__*` environment variables (`SAC__STORAGE__BUCKET`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub site: SiteMetadata,
    #[serde(default)]
    pub admin: AdminConfig,
    pub cache: CacheConfig,
    pub blog: BlogConfig,
    pub authors: AuthorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
    /// Directory served as static fallback (images, favicon...).
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom endpoint for MinIO / LocalStack.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub force_path_style: bool,
    /// Keep articles in process memory instead of S3 (local development).
    pub in_memory: bool,
}

/// Public identity of the site, used by feeds and structured data.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub language: String,
    /// Absolute base URL, e.g. `https://sac-website.vercel.app/`.
    pub site_url: String,
    pub email: String,
    pub social_banner: String,
    pub logo: String,
}

impl SiteMetadata {
    /// Absolute URL for a site-relative `path`.
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.site_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        }
    }

    /// `email (author)` as used by RSS author fields.
    pub fn editor(&self) -> String {
        format!("{} ({})", self.email, self.author)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required by the admin API. Empty disables the admin API.
    #[serde(default)]
    pub service_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Upper bound on cached pages.
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorsConfig {
    pub dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = ::config::Config::builder()
            .set_default("server.addr", "127.0.0.1:3000")
            .and_then(|b| b.set_default("storage.bucket", "sac-articles"))
            .and_then(|b| b.set_default("storage.force_path_style", true))
            .and_then(|b| b.set_default("storage.in_memory", false))
            .and_then(|b| b.set_default("site.title", "Sociedad de Astronomia del Caribe"))
            .and_then(|b| b.set_default("site.author", "SAC"))
            .and_then(|b| {
                b.set_default(
                    "site.description",
                    "Una organización sin fines de lucro compuesta por profesionales, \
                     estudiantes y personas de la comunidad que comparten el interés y la \
                     pasión por la Astronomía.",
                )
            })
            .and_then(|b| b.set_default("site.language", "es-pr"))
            .and_then(|b| b.set_default("site.site_url", "https://sac-website.vercel.app/"))
            .and_then(|b| b.set_default("site.email", "info@sociedadastronomia.com"))
            .and_then(|b| b.set_default("site.social_banner", "/static/images/sac-white-logo.png"))
            .and_then(|b| b.set_default("site.logo", "/static/images/sac-main-logo-25.svg"))
            .and_then(|b| b.set_default("cache.ttl_secs", 3600))
            .and_then(|b| b.set_default("cache.max_entries", 512))
            .and_then(|b| b.set_default("blog.page_size", 5))
            .and_then(|b| b.set_default("authors.dir", "data/authors"))
            .map_err(|e| AppError::Internal(format!("Invalid config defaults: {e}")))?;

        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix("SAC")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {e}")))
    }

    /// Startup checks that deserialization cannot express.
    ///
    /// A service token is mandatory once articles live in S3; in-memory
    /// development may run without one, leaving the admin API closed.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.admin.service_token.trim().is_empty() && !self.storage.in_memory {
            return Err(AppError::Internal(
                "admin.service_token must be set (SAC__ADMIN__SERVICE_TOKEN) when using S3 storage"
                    .into(),
            ));
        }
        Ok(())
    }
}
