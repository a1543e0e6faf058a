use chrono::Utc;

use crate::articles::repository::ArticleRepository;
use crate::config::SiteMetadata;
use crate::error::AppError;
use crate::feed::rss::{render_rss, FeedChannel};
use crate::feed::sitemap::render_sitemap;
use crate::models::article::ListQuery;

/// The site-wide RSS feed over every published article.
pub async fn site_feed(repo: &dyn ArticleRepository, site: &SiteMetadata) -> Result<String, AppError> {
    let published = repo.list_articles(&ListQuery::published()).await?;
    Ok(render_rss(
        site,
        &FeedChannel::site(site),
        &published.articles,
        Utc::now(),
    ))
}

pub async fn sitemap(repo: &dyn ArticleRepository, site: &SiteMetadata) -> Result<String, AppError> {
    let published = repo.list_articles(&ListQuery::published()).await?;
    Ok(render_sitemap(site, &published.articles))
}
