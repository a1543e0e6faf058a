use std::collections::BTreeMap;
use std::path::Path;

use gray_matter::engine::YAML;
use gray_matter::{Matter, Pod};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Slug of the fallback author profile.
pub const DEFAULT_AUTHOR: &str = "default";

/// Author profile, read from the YAML frontmatter of `{dir}/{slug}.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// Entry of the admin author picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub slug: String,
    pub name: String,
}

fn parse_author(slug: &str, source: &str) -> Result<Author, AppError> {
    let data = Matter::<YAML>::new()
        .parse(source)
        .data
        .filter(|pod| !matches!(pod, Pod::Null));
    let mut author: Author = match data {
        Some(pod) => pod
            .deserialize()
            .map_err(|e| AppError::Internal(format!("Invalid author file '{slug}': {e}")))?,
        None => Author::named(slug, ""),
    };
    author.slug = slug.to_string();
    if author.name.is_empty() {
        author.name = slug.to_string();
    }
    Ok(author)
}

impl Author {
    pub fn named(slug: &str, name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            avatar: None,
            occupation: None,
            company: None,
            email: None,
            twitter: None,
            linkedin: None,
            github: None,
        }
    }
}

/// Author profiles loaded once at startup.
#[derive(Debug, Clone)]
pub struct AuthorDirectory {
    authors: BTreeMap<String, Author>,
    fallback: Author,
}

impl AuthorDirectory {
    /// Build a directory from already parsed profiles.
    ///
    /// `site_author` names the synthetic fallback used when no
    /// `default` profile exists.
    pub fn new(authors: impl IntoIterator<Item = Author>, site_author: &str) -> Self {
        let authors: BTreeMap<String, Author> =
            authors.into_iter().map(|a| (a.slug.clone(), a)).collect();
        let fallback = authors
            .get(DEFAULT_AUTHOR)
            .cloned()
            .unwrap_or_else(|| Author::named(DEFAULT_AUTHOR, site_author));
        Self { authors, fallback }
    }

    /// Read every `*.md` profile in `dir`. A missing directory yields an
    /// empty set; an unreadable profile is skipped with a warning.
    pub fn load(dir: &Path, site_author: &str) -> Result<Self, AppError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %dir.display(), "Authors directory not found, using site author");
                return Ok(Self::new(Vec::new(), site_author));
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read authors directory '{}': {e}",
                    dir.display()
                )))
            }
        };

        let mut authors = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Internal(e.to_string()))
                .and_then(|source| parse_author(slug, &source));
            match parsed {
                Ok(author) => authors.push(author),
                Err(e) => tracing::warn!(path = %path.display(), "Skipping author profile: {e}"),
            }
        }

        tracing::info!(count = authors.len(), "Loaded author profiles");
        Ok(Self::new(authors, site_author))
    }

    /// Resolve an author, falling back to the default profile.
    pub fn get(&self, slug: &str) -> Author {
        self.authors
            .get(slug)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Resolve a list of author slugs; an empty list means `["default"]`.
    pub fn details(&self, slugs: &[String]) -> Vec<Author> {
        if slugs.is_empty() {
            return vec![self.get(DEFAULT_AUTHOR)];
        }
        slugs.iter().map(|slug| self.get(slug)).collect()
    }

    /// All known profiles, sorted by display name.
    pub fn list(&self) -> Vec<AuthorRef> {
        let mut refs: Vec<AuthorRef> = self
            .authors
            .values()
            .map(|a| AuthorRef {
                slug: a.slug.clone(),
                name: a.name.clone(),
            })
            .collect();
        refs.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        refs
    }
}
