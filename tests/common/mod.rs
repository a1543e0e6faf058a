#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use sac_web::app::{build_router, AppState};
use sac_web::articles::repository::{ArticleRepository, ObjectStoreArticleRepository};
use sac_web::authors::{Author, AuthorDirectory};
use sac_web::cache::PageCache;
use sac_web::config::AppConfig;
use sac_web::models::article::{Article, NewArticle};
use sac_web::storage::client::{MemoryStorage, StorageClient};

pub const TOKEN: &str = "test-token";

/// The full router wired to in-memory storage.
pub struct TestEnv {
    pub router: Router,
    pub articles: Arc<dyn ArticleRepository>,
    pub storage: Arc<MemoryStorage>,
    pub pages: Arc<PageCache>,
}

impl TestEnv {
    /// Public listings use two articles per page so pagination is cheap to exercise.
    pub fn start() -> Self {
        let mut config = AppConfig::load(None).expect("Failed to load default config");
        config.admin.service_token = TOKEN.to_string();
        config.blog.page_size = 2;
        config.cache.ttl_secs = 300;

        let storage = Arc::new(MemoryStorage::new());
        let dyn_storage: Arc<dyn StorageClient> = storage.clone();
        let articles: Arc<dyn ArticleRepository> =
            Arc::new(ObjectStoreArticleRepository::new(dyn_storage));

        let mut ana = Author::named("ana-rivera", "Ana Rivera");
        ana.occupation = Some("Astrofotógrafa".into());
        let authors = AuthorDirectory::new(
            vec![Author::named("default", "Sociedad de Astronomía del Caribe"), ana],
            &config.site.author,
        );

        let state = AppState::new(&config, articles.clone(), authors);
        let pages = state.pages.clone();

        Self {
            router: build_router(state),
            articles,
            storage,
            pages,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Store an article directly through the repository, bypassing HTTP.
    pub async fn seed(&self, slug: &str, title: &str, date: DateTime<Utc>, tags: &[&str], draft: bool) -> Article {
        self.articles
            .create_article(NewArticle {
                slug: Some(slug.to_string()),
                title: title.to_string(),
                date: Some(date),
                summary: format!("Resumen de {title}"),
                content: format!("# {title}\n\nContenido de prueba.\n\n## Detalles\n\nMás texto."),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                draft: Some(draft),
                ..NewArticle::default()
            })
            .await
            .expect("Failed to seed article")
    }

    /// Three published articles and one draft, oldest first.
    pub async fn seed_blog(&self) {
        self.seed("2024/01/10/luna", "Fases de la Luna", day(2024, 1, 10), &["Luna", "Observación"], false)
            .await;
        self.seed("2024/02/20/marte", "Marte en oposición", day(2024, 2, 20), &["Planetas"], false)
            .await;
        self.seed("2024/03/30/eclipse", "Eclipse total", day(2024, 3, 30), &["Eclipse", "Luna"], false)
            .await;
        self.seed("2024/04/01/borrador", "Borrador", day(2024, 4, 1), &["Luna"], true)
            .await;
    }
}

pub fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 12, 0, 0).unwrap()
}
