use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::api::blog::{cached, cached_if};
use crate::app::AppState;
use crate::articles::slug::tag_slug;
use crate::cache::CachedPage;
use crate::feed::sitemap::render_robots;
use crate::pages;

const RSS: &str = "application/rss+xml; charset=utf-8";
const XML: &str = "application/xml; charset=utf-8";
const FEED_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";

/// Strong validator for a rendered feed body.
pub fn etag_for(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    format!("\"{}\"", URL_SAFE_NO_PAD.encode(digest.as_slice()))
}

/// Turn a rendered feed into a response, answering `304` when the client
/// already holds this exact body.
fn feed_response(page: CachedPage, headers: &HeaderMap) -> Response {
    let etag = etag_for(&page.body);
    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|t| t.trim() == etag || t.trim() == "*"));

    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        page.into_response()
    };

    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(FEED_CACHE_CONTROL));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(ETAG, value);
    }
    response
}

fn plain_error(message: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// Axum handler for `GET /feed.xml`.
///
/// Failures answer `500` with a plain-text body rather than JSON.
pub async fn feed_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let rendered = cached(&state, "/feed.xml", RSS, || {
        pages::feeds::site_feed(state.articles.as_ref(), &state.site)
    })
    .await;

    match rendered {
        Ok(page) => feed_response(page, &headers),
        Err(e) => {
            tracing::error!("Error generating RSS feed: {e}");
            plain_error("Error generating RSS feed")
        }
    }
}

/// Axum handler for `GET /tags/{tag}/feed.xml`.
pub async fn tag_feed_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    headers: HeaderMap,
) -> Response {
    let path = format!("/tags/{}/feed.xml", tag_slug(&tag));
    let rendered = cached_if(&state, &path, RSS, || async {
        let feed = pages::tags::tag_feed(state.articles.as_ref(), &state.site, &tag).await?;
        Ok((feed.xml, feed.items > 0))
    })
    .await;

    match rendered {
        Ok(page) => feed_response(page, &headers),
        Err(e) => {
            tracing::error!(tag = %tag, "Error generating tag feed: {e}");
            plain_error("Error generating RSS feed")
        }
    }
}

/// Axum handler for `GET /sitemap.xml`.
pub async fn sitemap_handler(State(state): State<AppState>) -> Response {
    let rendered = cached(&state, "/sitemap.xml", XML, || {
        pages::feeds::sitemap(state.articles.as_ref(), &state.site)
    })
    .await;

    match rendered {
        Ok(page) => page.into_response(),
        Err(e) => {
            tracing::warn!("sitemap: failed to list articles: {e}");
            plain_error("Failed to generate sitemap")
        }
    }
}

/// Axum handler for `GET /robots.txt`.
pub async fn robots_handler(State(state): State<AppState>) -> Response {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&state.site),
    )
        .into_response()
}
