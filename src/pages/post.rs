use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::articles::repository::ArticleRepository;
use crate::authors::{Author, AuthorDirectory};
use crate::config::SiteMetadata;
use crate::error::AppError;
use crate::feed::json_ld::{article_json_ld, to_script_json};
use crate::models::article::{flexible_date, ArticleSummary, ListQuery};
use crate::rendering::markdown::{compile_mdx, reading_time, ReadingTime};
use crate::rendering::toc::TocEntry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    pub slug: String,
    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,
    pub title: String,
    pub tags: Vec<String>,
    #[serde(default, with = "flexible_date::option")]
    pub lastmod: Option<DateTime<Utc>>,
    pub summary: String,
    pub images: Vec<String>,
    pub reading_time: ReadingTime,
}

/// Neighbouring post in the published ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLink {
    pub slug: String,
    pub title: String,
}

impl From<&ArticleSummary> for PostLink {
    fn from(summary: &ArticleSummary) -> Self {
        Self {
            slug: summary.slug.clone(),
            title: summary.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub front_matter: FrontMatter,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub author_details: Vec<Author>,
    /// Older neighbour.
    pub prev: Option<PostLink>,
    /// Newer neighbour.
    pub next: Option<PostLink>,
    pub json_ld: serde_json::Value,
    /// `json_ld` ready to embed in a `<script type="application/ld+json">`.
    pub json_ld_script: String,
}

/// Compose the public view of a post. Drafts are reported as missing.
pub async fn post_view(
    repo: &dyn ArticleRepository,
    authors: &AuthorDirectory,
    site: &SiteMetadata,
    slug: &str,
) -> Result<PostView, AppError> {
    let article = repo.get_article(slug).await?;
    if article.draft {
        return Err(AppError::NotFound(format!("Article not found: {slug}")));
    }

    let published = repo.list_articles(&ListQuery::published()).await?.articles;
    let (prev, next) = match published.iter().position(|a| a.slug == article.slug) {
        Some(idx) => (
            published.get(idx + 1).map(PostLink::from),
            idx.checked_sub(1)
                .and_then(|i| published.get(i))
                .map(PostLink::from),
        ),
        None => (None, None),
    };

    let compiled = compile_mdx(&article.content)?;
    let author_details = authors.details(&article.authors);
    let json_ld = article_json_ld(site, &article, &author_details);
    let json_ld_script = to_script_json(&json_ld);

    let front_matter = FrontMatter {
        slug: article.slug.clone(),
        date: article.date,
        title: article.title.clone(),
        tags: article.tags.clone(),
        lastmod: article.lastmod,
        summary: article.summary.clone(),
        images: article.images.clone(),
        reading_time: reading_time(&article.content),
    };

    Ok(PostView {
        front_matter,
        html: compiled.html,
        toc: compiled.toc,
        author_details,
        prev,
        next,
        json_ld,
        json_ld_script,
    })
}
