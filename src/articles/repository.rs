use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::articles::listing;
use crate::articles::slug::generate_slug;
use crate::error::AppError;
use crate::models::article::{
    Article, ArticleIndex, ArticleSummary, ArticleUpdate, ListQuery, ListResult, NewArticle,
};
use crate::storage::client::StorageClient;

/// Object key of the listing index.
pub const INDEX_KEY: &str = "articles/index.json";

/// Object key of an article body.
pub fn article_key(slug: &str) -> String {
    format!("articles/{slug}.json")
}

/// Repository trait for article operations.
///
/// This trait allows mocking the persistence layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Fetch an article (drafts included). `NotFound` if the slug is unknown.
    async fn get_article(&self, slug: &str) -> Result<Article, AppError>;

    /// List index entries, newest first, filtered and paginated per `query`.
    async fn list_articles(&self, query: &ListQuery) -> Result<ListResult, AppError>;

    /// Persist a new article and register it in the index.
    async fn create_article(&self, new: NewArticle) -> Result<Article, AppError>;

    /// Merge `update` into the stored article, renaming it if the slug changes.
    async fn update_article(&self, slug: &str, update: ArticleUpdate) -> Result<Article, AppError>;

    /// Remove the article body and its index entry.
    async fn delete_article(&self, slug: &str) -> Result<(), AppError>;
}

/// Article repository on top of an object store.
///
/// Bodies live at `articles/{slug}.json`; listing reads only the index at
/// [`INDEX_KEY`]. Index read-modify-write cycles are serialized per process.
pub struct ObjectStoreArticleRepository {
    storage: Arc<dyn StorageClient>,
    write_lock: Mutex<()>,
}

impl ObjectStoreArticleRepository {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_index(&self) -> Result<ArticleIndex, AppError> {
        match self.storage.get_object(INDEX_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Storage(format!("Corrupt article index: {e}"))),
            None => Ok(ArticleIndex::default()),
        }
    }

    async fn write_index(&self, mut articles: Vec<ArticleSummary>) -> Result<(), AppError> {
        listing::sort_by_date_desc(&mut articles);
        let index = ArticleIndex {
            articles,
            updated_at: Some(Utc::now()),
        };
        let body = serde_json::to_vec_pretty(&index)?;
        self.storage.put_object(INDEX_KEY, body).await
    }

    async fn read_article(&self, slug: &str) -> Result<Option<Article>, AppError> {
        match self.storage.get_object(&article_key(slug)).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("Corrupt article '{slug}': {e}"))),
            None => Ok(None),
        }
    }

    async fn write_article(&self, article: &Article) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(article)?;
        self.storage.put_object(&article_key(&article.slug), body).await
    }
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() || slug.trim_matches('/').is_empty() {
        return Err(AppError::BadRequest("Slug cannot be empty".into()));
    }
    if slug.starts_with('/') || slug.ends_with('/') || slug.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
        return Err(AppError::BadRequest(format!("Invalid slug '{slug}'")));
    }
    Ok(())
}

#[async_trait]
impl ArticleRepository for ObjectStoreArticleRepository {
    async fn get_article(&self, slug: &str) -> Result<Article, AppError> {
        self.read_article(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article not found: {slug}")))
    }

    async fn list_articles(&self, query: &ListQuery) -> Result<ListResult, AppError> {
        let index = self.read_index().await?;
        listing::list(index.articles, query)
    }

    async fn create_article(&self, new: NewArticle) -> Result<Article, AppError> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title is required".into()));
        }

        let date = new.date.unwrap_or_else(Utc::now);
        let slug = match new.slug.filter(|s| !s.trim().is_empty()) {
            Some(slug) => slug,
            None => generate_slug(&title, date),
        };
        validate_slug(&slug)?;

        let article = Article {
            slug,
            title,
            summary: new.summary,
            date,
            lastmod: Some(Utc::now()),
            tags: new.tags,
            authors: new.authors,
            images: new.images,
            img_width: new.img_width,
            img_height: new.img_height,
            draft: new.draft.unwrap_or(true),
            archived: new.archived.unwrap_or(false),
            content: new.content,
        };

        let _guard = self.write_lock.lock().await;
        let index = self.read_index().await?;
        if index.articles.iter().any(|a| a.slug == article.slug) {
            return Err(AppError::Conflict(format!(
                "Article already exists: {}",
                article.slug
            )));
        }

        self.write_article(&article).await?;
        let mut entries = index.articles;
        entries.push(ArticleSummary::from(&article));
        self.write_index(entries).await?;

        tracing::info!(slug = %article.slug, draft = article.draft, "Article created");
        Ok(article)
    }

    async fn update_article(&self, slug: &str, update: ArticleUpdate) -> Result<Article, AppError> {
        let _guard = self.write_lock.lock().await;

        let mut article = self
            .read_article(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article not found: {slug}")))?;
        let index = self.read_index().await?;

        let new_slug = update
            .slug
            .clone()
            .filter(|s| !s.trim().is_empty() && s != slug);
        if let Some(new_slug) = &new_slug {
            validate_slug(new_slug)?;
            if index.articles.iter().any(|a| &a.slug == new_slug) {
                return Err(AppError::Conflict(format!("Article already exists: {new_slug}")));
            }
        }

        update.apply_to(&mut article);
        article.lastmod = Some(Utc::now());

        let renamed = new_slug.is_some();
        if let Some(new_slug) = new_slug {
            article.slug = new_slug;
        }
        // New body first, then the index, then the old body: a failure at any
        // step leaves the index pointing at a body that exists.
        self.write_article(&article).await?;

        let mut entries = index.articles;
        match entries.iter_mut().find(|a| a.slug == slug) {
            Some(entry) => *entry = ArticleSummary::from(&article),
            None => entries.push(ArticleSummary::from(&article)),
        }
        if let Err(e) = self.write_index(entries).await {
            if renamed {
                if let Err(cleanup) = self.storage.delete_object(&article_key(&article.slug)).await {
                    tracing::warn!(slug = %article.slug, "Failed to remove orphaned article body: {cleanup}");
                }
            }
            return Err(e);
        }

        if renamed {
            if let Err(e) = self.storage.delete_object(&article_key(slug)).await {
                tracing::warn!(old_slug = slug, "Renamed article left its old body behind: {e}");
            }
        }

        tracing::info!(old_slug = slug, slug = %article.slug, "Article updated");
        Ok(article)
    }

    async fn delete_article(&self, slug: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let index = self.read_index().await?;
        let in_index = index.articles.iter().any(|a| a.slug == slug);
        if !in_index && self.read_article(slug).await?.is_none() {
            return Err(AppError::NotFound(format!("Article not found: {slug}")));
        }

        self.storage.delete_object(&article_key(slug)).await?;
        let entries = index
            .articles
            .into_iter()
            .filter(|a| a.slug != slug)
            .collect();
        self.write_index(entries).await?;

        tracing::info!(slug, "Article deleted");
        Ok(())
    }
}
