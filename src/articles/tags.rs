use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::articles::slug::tag_slug;
use crate::models::article::ArticleSummary;

/// Number of published articles carrying a (slugged) tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Count tags across non-draft articles.
///
/// Tags are keyed by their slug, so `"Sistema Solar"` and `"sistema-solar"`
/// merge into one entry. Ordered by count descending, then tag ascending.
pub fn count_tags<'a, I>(articles: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a ArticleSummary>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for article in articles.into_iter().filter(|a| !a.draft) {
        for tag in &article.tags {
            let slug = tag_slug(tag);
            if slug.is_empty() {
                continue;
            }
            *counts.entry(slug).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

/// Whether any of the article's tags slugs to `slugged_tag`.
pub fn has_tag(article: &ArticleSummary, slugged_tag: &str) -> bool {
    article.tags.iter().any(|t| tag_slug(t) == slugged_tag)
}

/// Keep the articles carrying `slugged_tag`, preserving order.
pub fn filter_by_tag(articles: Vec<ArticleSummary>, slugged_tag: &str) -> Vec<ArticleSummary> {
    articles
        .into_iter()
        .filter(|a| has_tag(a, slugged_tag))
        .collect()
}

/// Title shown on a tag page: first letter uppercased.
pub fn tag_display_title(slugged_tag: &str) -> String {
    let mut chars = slugged_tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::listing::tests::summary;

    fn tagged(slug: &str, tags: &[&str], draft: bool) -> ArticleSummary {
        let mut s = summary(slug, 0, draft);
        s.tags = tags.iter().map(|t| t.to_string()).collect();
        s
    }

    #[test]
    fn test_count_tags_merges_equivalent_spellings() {
        let articles = vec![
            tagged("a", &["Sistema Solar", "Luna"], false),
            tagged("b", &["sistema-solar"], false),
            tagged("c", &["SistemaSolar", "luna"], false),
        ];

        let counts = count_tags(&articles);
        assert_eq!(
            counts,
            vec![
                TagCount { tag: "sistema-solar".into(), count: 3 },
                TagCount { tag: "luna".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_count_tags_skips_drafts() {
        let articles = vec![
            tagged("a", &["cometas"], false),
            tagged("b", &["cometas", "secreto"], true),
        ];

        let counts = count_tags(&articles);
        assert_eq!(counts, vec![TagCount { tag: "cometas".into(), count: 1 }]);
    }

    #[test]
    fn test_count_tags_is_idempotent() {
        let articles = vec![
            tagged("a", &["b", "a", "c"], false),
            tagged("b", &["c", "a"], false),
            tagged("c", &["a"], false),
        ];

        let first = count_tags(&articles);
        let second = count_tags(&articles);
        assert_eq!(first, second);
        assert_eq!(first[0], TagCount { tag: "a".into(), count: 3 });
        assert_eq!(first[1], TagCount { tag: "c".into(), count: 2 });
        assert_eq!(first[2], TagCount { tag: "b".into(), count: 1 });
    }

    #[test]
    fn test_filter_by_tag_matches_slugged_form() {
        let articles = vec![
            tagged("a", &["Eclipse Solar"], false),
            tagged("b", &["eclipse"], false),
            tagged("c", &["eclipse-solar"], false),
        ];

        let filtered = filter_by_tag(articles, "eclipse-solar");
        let slugs: Vec<&str> = filtered.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "c"]);
    }

    #[test]
    fn test_tag_display_title() {
        assert_eq!(tag_display_title("cometas"), "Cometas");
        assert_eq!(tag_display_title("sistema-solar"), "Sistema-solar");
        assert_eq!(tag_display_title(""), "");
    }
}
