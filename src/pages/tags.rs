use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::articles::repository::ArticleRepository;
use crate::articles::slug::tag_slug;
use crate::articles::tags::{count_tags, filter_by_tag, tag_display_title, TagCount};
use crate::config::SiteMetadata;
use crate::error::AppError;
use crate::feed::rss::{render_rss, FeedChannel};
use crate::models::article::{ArticleSummary, ListQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsPage {
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPage {
    pub tag: String,
    pub title: String,
    pub articles: Vec<ArticleSummary>,
}

pub async fn tags_page(repo: &dyn ArticleRepository) -> Result<TagsPage, AppError> {
    let published = repo.list_articles(&ListQuery::published()).await?;
    Ok(TagsPage {
        tags: count_tags(&published.articles),
    })
}

/// Rendered feed of one tag.
#[derive(Debug, Clone)]
pub struct TagFeed {
    pub xml: String,
    pub items: usize,
}

/// Published articles carrying `tag`, compared in slug form so
/// `Sistema Solar` and `sistema-solar` name the same tag.
///
/// An unknown tag renders an empty list.
pub async fn tag_page(repo: &dyn ArticleRepository, tag: &str) -> Result<TagPage, AppError> {
    let tag = tag_slug(tag);
    let published = repo.list_articles(&ListQuery::published()).await?;
    Ok(TagPage {
        title: tag_display_title(&tag),
        articles: filter_by_tag(published.articles, &tag),
        tag,
    })
}

/// RSS feed restricted to one tag.
pub async fn tag_feed(
    repo: &dyn ArticleRepository,
    site: &SiteMetadata,
    tag: &str,
) -> Result<TagFeed, AppError> {
    let page = tag_page(repo, tag).await?;
    let xml = render_rss(
        site,
        &FeedChannel::tag(site, &page.tag),
        &page.articles,
        Utc::now(),
    );
    Ok(TagFeed {
        xml,
        items: page.articles.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::repository::ObjectStoreArticleRepository;
    use crate::config::AppConfig;
    use crate::models::article::NewArticle;
    use crate::storage::client::MemoryStorage;
    use std::sync::Arc;

    async fn seeded() -> ObjectStoreArticleRepository {
        let repo = ObjectStoreArticleRepository::new(Arc::new(MemoryStorage::new()));
        let posts: [(&str, &[&str], bool); 4] = [
            ("Eclipse", &["Eclipse Solar", "Sol"], false),
            ("Manchas", &["sol"], false),
            ("Otro eclipse", &["eclipse-solar"], false),
            ("Secreto", &["Sol", "privado"], true),
        ];
        for (title, tags, draft) in posts {
            repo.create_article(NewArticle {
                title: title.into(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                draft: Some(draft),
                ..NewArticle::default()
            })
            .await
            .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_tags_page_counts_published_only() {
        let repo = seeded().await;
        let page = tags_page(&repo).await.unwrap();
        assert_eq!(
            page.tags,
            vec![
                TagCount { tag: "eclipse-solar".into(), count: 2 },
                TagCount { tag: "sol".into(), count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_tag_page_filters_by_slug() {
        let repo = seeded().await;
        let page = tag_page(&repo, "eclipse-solar").await.unwrap();
        assert_eq!(page.title, "Eclipse-solar");
        assert_eq!(page.articles.len(), 2);

        let unknown = tag_page(&repo, "galaxias").await.unwrap();
        assert!(unknown.articles.is_empty());
    }

    #[tokio::test]
    async fn test_tag_page_slugs_requested_tag() {
        let repo = seeded().await;
        for requested in ["Eclipse Solar", "eclipse_solar", "EclipseSolar", "Eclipse-Solar"] {
            let page = tag_page(&repo, requested).await.unwrap();
            assert_eq!(page.tag, "eclipse-solar", "{requested}");
            assert_eq!(page.articles.len(), 2, "{requested}");
        }
    }

    #[tokio::test]
    async fn test_tag_feed() {
        let repo = seeded().await;
        let site = AppConfig::load(None).unwrap().site;
        let feed = tag_feed(&repo, &site, "sol").await.unwrap();
        assert_eq!(feed.items, 2);
        assert_eq!(feed.xml.matches("<item>").count(), 2);
        assert!(!feed.xml.contains("Secreto"));
        assert!(feed.xml.contains("/tags/sol/feed.xml"));

        let feed = tag_feed(&repo, &site, "Eclipse Solar").await.unwrap();
        assert_eq!(feed.items, 2);
        assert!(feed.xml.contains("<title>eclipse-solar - SAC</title>"));
        assert!(feed.xml.contains("/tags/eclipse-solar/feed.xml"));
    }
}
