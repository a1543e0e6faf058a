use std::future::Future;

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::app::AppState;
use crate::articles::slug::tag_slug;
use crate::cache::CachedPage;
use crate::error::AppError;
use crate::pages;

const JSON: &str = "application/json";

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        let mut response = self.body.into_response();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        response
    }
}

/// Serve `path` from the page cache, rendering and storing it on a miss.
///
/// Errors are never cached.
pub(crate) async fn cached<F, Fut>(
    state: &AppState,
    path: &str,
    content_type: &str,
    render: F,
) -> Result<CachedPage, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, AppError>>,
{
    cached_if(state, path, content_type, || async move {
        render().await.map(|body| (body, true))
    })
    .await
}

/// Like [`cached`], but `render` also says whether its output may be stored.
/// Pages for arbitrary user-supplied paths that match nothing are served
/// without taking a cache slot.
pub(crate) async fn cached_if<F, Fut>(
    state: &AppState,
    path: &str,
    content_type: &str,
    render: F,
) -> Result<CachedPage, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(String, bool), AppError>>,
{
    if let Some(page) = state.pages.get(path) {
        tracing::debug!(path, "Page cache hit");
        return Ok(page);
    }

    let (body, cacheable) = render().await?;
    let page = CachedPage {
        content_type: content_type.to_string(),
        body,
    };
    if cacheable {
        state.pages.insert(path, page.clone());
    }
    Ok(page)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(value)?)
}

fn with_max_age(mut response: Response, state: &AppState) -> Response {
    let secs = state.pages.ttl().as_secs();
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={secs}, s-maxage={secs}")) {
        response.headers_mut().insert(CACHE_CONTROL, value);
    }
    response
}

async fn blog_listing(state: &AppState, path: &str, page: usize) -> Result<Response, AppError> {
    let rendered = cached(state, path, JSON, || async {
        let page = pages::blog::blog_page(state.articles.as_ref(), page, state.page_size).await?;
        to_json(&page)
    })
    .await?;
    Ok(with_max_age(rendered.into_response(), state))
}

/// Axum handler for `GET /blog`.
pub async fn blog_index_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    blog_listing(&state, "/blog", 1).await
}

/// Axum handler for `GET /blog/{*path}`.
///
/// `page/{n}` selects a listing page; anything else is an article slug.
pub async fn blog_path_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let cache_key = format!("/blog/{path}");

    if let Some(n) = path.strip_prefix("page/") {
        let page = n
            .parse::<usize>()
            .map_err(|_| AppError::NotFound(format!("Page '{n}' does not exist")))?;
        return blog_listing(&state, &cache_key, page).await;
    }

    let rendered = cached(&state, &cache_key, JSON, || async {
        let view = pages::post::post_view(
            state.articles.as_ref(),
            &state.authors,
            &state.site,
            &path,
        )
        .await?;
        to_json(&view)
    })
    .await?;
    Ok(with_max_age(rendered.into_response(), &state))
}

/// Axum handler for `GET /tags`.
pub async fn tags_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let rendered = cached(&state, "/tags", JSON, || async {
        to_json(&pages::tags::tags_page(state.articles.as_ref()).await?)
    })
    .await?;
    Ok(with_max_age(rendered.into_response(), &state))
}

/// Axum handler for `GET /tags/{tag}`.
pub async fn tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Response, AppError> {
    let path = format!("/tags/{}", tag_slug(&tag));
    let rendered = cached_if(&state, &path, JSON, || async {
        let page = pages::tags::tag_page(state.articles.as_ref(), &tag).await?;
        Ok((to_json(&page)?, !page.articles.is_empty()))
    })
    .await?;
    Ok(with_max_age(rendered.into_response(), &state))
}

/// Axum handler for `GET /health`.
pub async fn health_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
