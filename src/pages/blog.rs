use serde::{Deserialize, Serialize};

use crate::articles::repository::ArticleRepository;
use crate::error::AppError;
use crate::models::article::{ArticleSummary, ListQuery};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
}

/// One page of the public blog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPage {
    pub articles: Vec<ArticleSummary>,
    pub pagination: Pagination,
    pub total: usize,
}

/// Compose page `page` of the blog index.
///
/// The first page always renders, even with no articles; any other page
/// outside `1..=total_pages` is `NotFound`.
pub async fn blog_page(
    repo: &dyn ArticleRepository,
    page: usize,
    page_size: usize,
) -> Result<BlogPage, AppError> {
    if page == 0 {
        return Err(AppError::NotFound("Page 0 does not exist".into()));
    }

    let result = repo
        .list_articles(&ListQuery::published_page(page, page_size))
        .await?;

    if page > 1 && page > result.total_pages {
        return Err(AppError::NotFound(format!(
            "Page {page} does not exist (total pages: {})",
            result.total_pages
        )));
    }

    Ok(BlogPage {
        articles: result.articles,
        pagination: Pagination {
            current_page: page,
            total_pages: result.total_pages,
        },
        total: result.total,
    })
}
