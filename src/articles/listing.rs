use crate::error::AppError;
use crate::models::article::{ArticleSummary, ListQuery, ListResult};

/// Number of pages needed for `total` items; zero when there is nothing to show.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Slice page `page` (1-indexed) out of `items`.
///
/// Out-of-range pages, including page 0, yield an empty slice.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Sort newest first. The sort is stable: equal dates keep index order.
pub fn sort_by_date_desc(articles: &mut [ArticleSummary]) {
    articles.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Apply filters, ordering and pagination to the full index.
pub fn list(entries: Vec<ArticleSummary>, query: &ListQuery) -> Result<ListResult, AppError> {
    if query.page_size == 0 {
        return Err(AppError::BadRequest("pageSize must be greater than zero".into()));
    }

    let tag = query.tag.as_deref().map(str::to_lowercase);
    let mut articles: Vec<ArticleSummary> = entries
        .into_iter()
        .filter(|a| !a.archived)
        .filter(|a| query.include_drafts || !a.draft)
        .filter(|a| match &tag {
            Some(tag) => a.tags.iter().any(|t| t.to_lowercase() == *tag),
            None => true,
        })
        .collect();

    sort_by_date_desc(&mut articles);

    let total = articles.len();
    let total_pages = total_pages(total, query.page_size);

    let articles = match query.page {
        Some(page) => page_slice(&articles, page, query.page_size).to_vec(),
        None => articles,
    };

    Ok(ListResult {
        articles,
        total,
        page: query.page,
        page_size: query.page_size,
        total_pages,
    })
}
