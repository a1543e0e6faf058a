use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::articles::slug::Slugger;
use crate::error::AppError;
use crate::rendering::mdx;
use crate::rendering::toc::{extract_toc, TocEntry};

/// Words per minute used for reading time estimates.
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Result of compiling an MDX article body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledMdx {
    /// Sanitized HTML, ready to embed in a page.
    pub html: String,
    pub toc: Vec<TocEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingTime {
    pub text: String,
    pub minutes: f64,
    pub words: usize,
}

/// Markdown extensions shared by rendering and TOC extraction.
///
/// GFM tables, footnotes and strikethrough, plus `$`/`$$` math.
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_MATH
}

/// Compile an MDX body to sanitized HTML plus its table of contents.
///
/// Fails with [`AppError::Compile`] when JSX tags or `{}` expressions are
/// malformed. Component tags that pass validation are not executed; the
/// sanitizer drops them and keeps their text content.
pub fn compile_mdx(source: &str) -> Result<CompiledMdx, AppError> {
    mdx::validate(source)?;

    let html = sanitize(&render_markdown(source));
    let toc = extract_toc(source);

    Ok(CompiledMdx { html, toc })
}

/// Render Markdown to (unsanitized) HTML.
///
/// Headings get slug ids and a leading anchor link; fenced code info
/// strings of the form `lang:title` emit a title block before the code.
pub fn render_markdown(raw: &str) -> String {
    let mut slugger = Slugger::new();
    let mut events: Vec<Event> = Vec::new();
    let mut heading: Option<(u8, Vec<Event>)> = None;

    for event in Parser::new_ext(raw, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as u8, Vec::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, inner)) = heading.take() {
                    let text = heading_text(&inner);
                    let id = slugger.slug(text.trim());
                    events.push(Event::Html(CowStr::from(format!(
                        "<h{level} id=\"{id}\"><a class=\"anchor\" aria-hidden=\"true\" tabindex=\"-1\" href=\"#{id}\"></a>",
                        id = escape_attr(&id)
                    ))));
                    events.extend(inner);
                    events.push(Event::Html(CowStr::from(format!("</h{level}>\n"))));
                }
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let (lang, title) = split_code_info(&info);
                if let Some(title) = title {
                    events.push(Event::Html(CowStr::from(format!(
                        "<div class=\"remark-code-title\">{}</div>",
                        escape_attr(title)
                    ))));
                }
                let kind = CodeBlockKind::Fenced(CowStr::from(lang.to_string()));
                events.push(Event::Start(Tag::CodeBlock(kind)));
            }
            other => match heading.as_mut() {
                Some((_, inner)) => inner.push(other),
                None => events.push(other),
            },
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        if let Event::Text(t) | Event::Code(t) | Event::InlineMath(t) = event {
            text.push_str(t);
        }
    }
    text
}

/// Split ```` ```lang:title ```` info strings.
fn split_code_info(info: &str) -> (&str, Option<&str>) {
    let first = info.split_whitespace().next().unwrap_or("");
    match first.split_once(':') {
        Some((lang, title)) if !title.is_empty() => (lang, Some(title)),
        Some((lang, _)) => (lang, None),
        None => (first, None),
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Strip scripts, event handlers and unknown elements.
fn sanitize(html: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(&["id", "class"])
        .add_tag_attributes("a", &["aria-hidden", "tabindex"])
        .clean(html)
        .to_string()
}

/// Estimate reading time at [`WORDS_PER_MINUTE`].
pub fn reading_time(source: &str) -> ReadingTime {
    let words = source.split_whitespace().count();
    let minutes = words as f64 / WORDS_PER_MINUTE;
    let rounded = minutes.ceil() as u64;
    ReadingTime {
        text: format!("{rounded} min read"),
        minutes,
        words,
    }
}
