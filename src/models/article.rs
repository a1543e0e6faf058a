use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog article as persisted in the object store (`articles/{slug}.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Path-like unique identifier (e.g. `2024/02/15/cometa-leonard`).
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Publication date. Legacy posts may carry a bare `YYYY-MM-DD`.
    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,
    #[serde(default, with = "flexible_date::option")]
    pub lastmod: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub img_width: Option<u32>,
    #[serde(default)]
    pub img_height: Option<u32>,
    #[serde(default)]
    pub draft: bool,
    /// Archived articles never show up in listings.
    #[serde(default)]
    pub archived: bool,
    /// Raw MDX body.
    #[serde(default)]
    pub content: String,
}

/// Index projection of an [`Article`]: everything but the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,
    #[serde(default, with = "flexible_date::option")]
    pub lastmod: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub img_width: Option<u32>,
    #[serde(default)]
    pub img_height: Option<u32>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub archived: bool,
}

impl ArticleSummary {
    /// Most recent edit time, falling back to the publication date.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.lastmod.unwrap_or(self.date)
    }
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            slug: article.slug.clone(),
            title: article.title.clone(),
            summary: article.summary.clone(),
            date: article.date,
            lastmod: article.lastmod,
            tags: article.tags.clone(),
            authors: article.authors.clone(),
            images: article.images.clone(),
            img_width: article.img_width,
            img_height: article.img_height,
            draft: article.draft,
            archived: article.archived,
        }
    }
}

/// The listing index stored at `articles/index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleIndex {
    #[serde(default)]
    pub articles: Vec<ArticleSummary>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    /// Defaults to "now" when absent.
    #[serde(default, with = "flexible_date::option")]
    pub date: Option<DateTime<Utc>>,
    /// Generated from title and date when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub img_width: Option<u32>,
    #[serde(default)]
    pub img_height: Option<u32>,
    /// New articles start as drafts unless stated otherwise.
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, with = "flexible_date::option")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub img_width: Option<u32>,
    #[serde(default)]
    pub img_height: Option<u32>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ArticleUpdate {
    /// Apply this update onto `article` (slug and lastmod are handled by the repository).
    pub fn apply_to(self, article: &mut Article) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(summary) = self.summary {
            article.summary = summary;
        }
        if let Some(date) = self.date {
            article.date = date;
        }
        if let Some(tags) = self.tags {
            article.tags = tags;
        }
        if let Some(authors) = self.authors {
            article.authors = authors;
        }
        if let Some(images) = self.images {
            article.images = images;
        }
        if self.img_width.is_some() {
            article.img_width = self.img_width;
        }
        if self.img_height.is_some() {
            article.img_height = self.img_height;
        }
        if let Some(draft) = self.draft {
            article.draft = draft;
        }
        if let Some(archived) = self.archived {
            article.archived = archived;
        }
        if let Some(content) = self.content {
            article.content = content;
        }
    }
}

/// Parameters of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub include_drafts: bool,
    /// Raw tag, compared case-insensitively.
    pub tag: Option<String>,
    /// 1-indexed page; `None` returns the whole filtered set.
    pub page: Option<usize>,
    pub page_size: usize,
}

impl ListQuery {
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    /// Every published article, unpaginated.
    pub fn published() -> Self {
        Self {
            include_drafts: false,
            tag: None,
            page: None,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn published_page(page: usize, page_size: usize) -> Self {
        Self {
            page: Some(page),
            page_size,
            ..Self::published()
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            include_drafts: true,
            tag: None,
            page: None,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// A listing page. Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub articles: Vec<ArticleSummary>,
    pub total: usize,
    pub page: Option<usize>,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Serde helpers accepting RFC 3339 timestamps as well as bare dates.
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'"))),
            }
        }
    }
}
