use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::articles::slug::Slugger;
use crate::rendering::markdown::parser_options;

/// One heading of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Plain heading text.
    pub value: String,
    /// Fragment link, `#` + slug.
    pub url: String,
    /// Heading level, 1..=6.
    pub depth: u8,
}

/// Extract the table of contents from a Markdown/MDX source.
///
/// Walks the Markdown event stream, so ATX and setext headings are both
/// found and headings inside code blocks are not. Slugs match the `id`
/// attributes emitted by [`compile_mdx`](crate::rendering::markdown::compile_mdx).
pub fn extract_toc(source: &str) -> Vec<TocEntry> {
    let mut slugger = Slugger::new();
    let mut entries = Vec::new();
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new_ext(source, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level as u8, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((depth, text)) = current.take() {
                    let value = text.trim().to_string();
                    let url = format!("#{}", slugger.slug(&value));
                    entries.push(TocEntry { value, url, depth });
                }
            }
            Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            _ => {}
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(entries: &[TocEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.url.as_str()).collect()
    }

    #[test]
    fn test_duplicate_headings_get_distinct_urls() {
        let toc = extract_toc("# Intro\n\ntext\n\n# Intro\n\n## Intro");
        assert_eq!(urls(&toc), vec!["#intro", "#intro-1", "#intro-2"]);
        assert!(toc.iter().all(|e| e.value == "Intro"));
    }

    #[test]
    fn test_depth_and_document_order() {
        let toc = extract_toc("# Uno\n## Dos\n### Tres\n###### Seis");
        let depths: Vec<u8> = toc.iter().map(|e| e.depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 6]);
        assert_eq!(toc[1].value, "Dos");
    }

    #[test]
    fn test_headings_in_code_fences_are_ignored() {
        let toc = extract_toc("# Real\n\n```bash\n# not a heading\n```\n\n    # indented code");
        assert_eq!(urls(&toc), vec!["#real"]);
    }

    #[test]
    fn test_setext_headings() {
        let toc = extract_toc("Titulo\n======\n\nSub\n---\n");
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].depth, 1);
        assert_eq!(toc[1].depth, 2);
    }

    #[test]
    fn test_inline_markup_flattened() {
        let toc = extract_toc("## Uso de `cargo` y **Rust**!");
        assert_eq!(toc[0].value, "Uso de cargo y Rust!");
        assert_eq!(toc[0].url, "#uso-de-cargo-y-rust");
    }

    #[test]
    fn test_accented_text_kept() {
        let toc = extract_toc("## Observación del Cometa");
        assert_eq!(toc[0].url, "#observación-del-cometa");
    }

    #[test]
    fn test_punctuation_kept_verbatim() {
        let toc = extract_toc("# A -- B\n\n## \"Citas\" y 'comillas'...");
        assert_eq!(toc[0].value, "A -- B");
        assert_eq!(toc[0].url, "#a----b");
        assert_eq!(toc[1].value, "\"Citas\" y 'comillas'...");
        assert_eq!(toc[1].url, "#citas-y-comillas");
    }

    #[test]
    fn test_no_headings() {
        assert!(extract_toc("just text").is_empty());
    }
}
