use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::time::Duration;

use crate::api;
use crate::articles::repository::ArticleRepository;
use crate::authors::AuthorDirectory;
use crate::cache::PageCache;
use crate::config::{AppConfig, SiteMetadata};

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<dyn ArticleRepository>,
    pub authors: Arc<AuthorDirectory>,
    pub pages: Arc<PageCache>,
    pub site: Arc<SiteMetadata>,
    pub service_token: String,
    /// Articles per public blog page.
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        articles: Arc<dyn ArticleRepository>,
        authors: AuthorDirectory,
    ) -> Self {
        Self {
            articles,
            authors: Arc::new(authors),
            pages: Arc::new(PageCache::with_capacity(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_entries,
            )),
            site: Arc::new(config.site.clone()),
            service_token: config.admin.service_token.clone(),
            page_size: config.blog.page_size.max(1),
        }
    }
}

/// Build the HTTP router: public blog routes plus the admin API.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            "/articles",
            get(api::admin::list_articles_handler).post(api::admin::create_article_handler),
        )
        .route("/articles/preview", post(api::admin::preview_handler))
        .route("/articles/authors", get(api::admin::authors_handler))
        .route(
            "/articles/{*slug}",
            get(api::admin::get_article_handler)
                .put(api::admin::update_article_handler)
                .delete(api::admin::delete_article_handler),
        )
        .route("/revalidate", post(api::admin::revalidate_handler));

    Router::new()
        .route("/health", get(api::blog::health_handler))
        .route("/blog", get(api::blog::blog_index_handler))
        .route("/blog/{*path}", get(api::blog::blog_path_handler))
        .route("/tags", get(api::blog::tags_handler))
        .route("/tags/{tag}", get(api::blog::tag_handler))
        .route("/tags/{tag}/feed.xml", get(api::feed::tag_feed_handler))
        .route("/feed.xml", get(api::feed::feed_handler))
        .route("/sitemap.xml", get(api::feed::sitemap_handler))
        .route("/robots.txt", get(api::feed::robots_handler))
        .nest("/api/admin", admin)
        .with_state(state)
}
