use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::ServiceAuth;
use crate::app::AppState;
use crate::articles::listing::{page_slice, total_pages};
use crate::articles::repository::ArticleRepository;
use crate::authors::AuthorRef;
use crate::cache::PageCache;
use crate::error::AppError;
use crate::models::article::{
    Article, ArticleSummary, ArticleUpdate, ListQuery, NewArticle,
};
use crate::rendering::markdown::{compile_mdx, CompiledMdx};

pub const ADMIN_DEFAULT_PAGE_SIZE: usize = 50;
pub const ADMIN_MAX_PAGE_SIZE: usize = 100;

/// Query string of `GET /api/admin/articles`.
///
/// Numbers are kept as strings and parsed leniently: garbage falls back to
/// the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListResponse {
    pub articles: Vec<ArticleSummary>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleEnvelope {
    pub article: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub content: String,
}

/// Preview outcome. Compile errors are data, not HTTP failures.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PreviewResponse {
    Compiled {
        #[serde(rename = "mdxSource")]
        mdx_source: Option<CompiledMdx>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorsResponse {
    pub authors: Vec<AuthorRef>,
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.max(0) as usize)
        .unwrap_or(default)
}

/// Editor listing: drafts included, newest edit first.
pub async fn process_list(
    repo: &dyn ArticleRepository,
    params: AdminListParams,
) -> Result<AdminListResponse, AppError> {
    let page = parse_or(params.page.as_deref(), 1).max(1);
    let page_size = parse_or(params.page_size.as_deref(), ADMIN_DEFAULT_PAGE_SIZE)
        .clamp(1, ADMIN_MAX_PAGE_SIZE);

    let query = ListQuery {
        include_drafts: true,
        tag: params.tag.filter(|t| !t.trim().is_empty()),
        page: None,
        page_size,
    };
    let mut articles = repo.list_articles(&query).await?.articles;

    match params.status.as_deref() {
        Some("published") => articles.retain(|a| !a.draft),
        Some("draft") => articles.retain(|a| a.draft),
        _ => {}
    }

    if let Some(search) = params
        .search
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
    {
        articles.retain(|a| a.title.to_lowercase().contains(&search));
    }

    articles.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));

    let total = articles.len();
    Ok(AdminListResponse {
        articles: page_slice(&articles, page, page_size).to_vec(),
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
    })
}

/// Compile an editor draft for live preview.
pub fn process_preview(request: PreviewRequest) -> PreviewResponse {
    if request.content.trim().is_empty() {
        return PreviewResponse::Compiled { mdx_source: None };
    }
    match compile_mdx(&request.content) {
        Ok(compiled) => PreviewResponse::Compiled {
            mdx_source: Some(compiled),
        },
        Err(e) => PreviewResponse::Failed {
            error: e.to_string(),
        },
    }
}

/// Drop cached pages. No paths means the blog listings, tags and feed;
/// explicit paths always bring the blog index and tags along.
pub fn process_revalidate(pages: &PageCache, request: RevalidateRequest) -> RevalidateResponse {
    let mut paths: Vec<String> = Vec::new();
    let mut push = |p: String| {
        if !paths.contains(&p) {
            paths.push(p);
        }
    };

    if request.paths.is_empty() {
        for p in ["/blog", "/tags", "/feed.xml"] {
            push(p.to_string());
        }
    } else {
        for p in request.paths {
            push(p);
        }
        push("/blog".to_string());
        push("/tags".to_string());
    }

    for path in &paths {
        pages.invalidate(path);
    }

    RevalidateResponse {
        revalidated: true,
        paths,
    }
}

/// Axum handler for `GET /api/admin/articles`.
pub async fn list_articles_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<AdminListResponse>, AppError> {
    Ok(Json(process_list(state.articles.as_ref(), params).await?))
}

/// Axum handler for `POST /api/admin/articles`.
pub async fn create_article_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Json(new): Json<NewArticle>,
) -> Result<(StatusCode, Json<ArticleEnvelope>), AppError> {
    let article = state.articles.create_article(new).await?;
    state.pages.invalidate_all();
    Ok((StatusCode::CREATED, Json(ArticleEnvelope { article })))
}

/// Axum handler for `GET /api/admin/articles/{*slug}`.
pub async fn get_article_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleEnvelope>, AppError> {
    let article = state.articles.get_article(&slug).await?;
    Ok(Json(ArticleEnvelope { article }))
}

/// Axum handler for `PUT /api/admin/articles/{*slug}`.
pub async fn update_article_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(update): Json<ArticleUpdate>,
) -> Result<Json<ArticleEnvelope>, AppError> {
    let article = state.articles.update_article(&slug, update).await?;
    state.pages.invalidate_all();
    Ok(Json(ArticleEnvelope { article }))
}

/// Axum handler for `DELETE /api/admin/articles/{*slug}`.
pub async fn delete_article_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.articles.delete_article(&slug).await?;
    state.pages.invalidate_all();
    Ok(Json(DeleteResponse {
        deleted: true,
        slug,
    }))
}

/// Axum handler for `POST /api/admin/articles/preview`.
pub async fn preview_handler(
    _auth: ServiceAuth,
    Json(request): Json<PreviewRequest>,
) -> Json<PreviewResponse> {
    Json(process_preview(request))
}

/// Axum handler for `POST /api/admin/revalidate`.
///
/// The body is optional; an empty or unparsable body revalidates the
/// default set.
pub async fn revalidate_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Json<RevalidateResponse> {
    let request: RevalidateRequest = serde_json::from_slice(&body).unwrap_or_default();
    Json(process_revalidate(&state.pages, request))
}

/// Axum handler for `GET /api/admin/articles/authors`.
pub async fn authors_handler(
    _auth: ServiceAuth,
    State(state): State<AppState>,
) -> Json<AuthorsResponse> {
    Json(AuthorsResponse {
        authors: state.authors.list(),
    })
}
