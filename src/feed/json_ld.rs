use serde_json::{json, Value};

use crate::authors::Author;
use crate::config::SiteMetadata;
use crate::models::article::Article;

fn rfc3339(date: chrono::DateTime<chrono::Utc>) -> String {
    date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// schema.org `Article` structured data for a post page.
pub fn article_json_ld(site: &SiteMetadata, article: &Article, authors: &[Author]) -> Value {
    let images: Vec<String> = if article.images.is_empty() {
        vec![site.absolute_url(&site.social_banner)]
    } else {
        article.images.clone()
    };

    let author: Vec<Value> = authors
        .iter()
        .map(|a| json!({ "@type": "Person", "name": a.name }))
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": article.title,
        "datePublished": rfc3339(article.date),
        "dateModified": rfc3339(article.lastmod.unwrap_or(article.date)),
        "description": article.summary,
        "image": images,
        "url": site.absolute_url(&format!("blog/{}", article.slug)),
        "author": author,
        "publisher": {
            "@type": "Organization",
            "name": site.author,
            "logo": {
                "@type": "ImageObject",
                "url": site.absolute_url(&site.logo),
            },
        },
    })
}

/// Serialize structured data for embedding in a
/// `<script type="application/ld+json">` element.
///
/// `<`, `>` and `&` are written as JSON unicode escapes so user text can
/// never close the script element.
pub fn to_script_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}
