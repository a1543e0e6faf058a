use chrono::{DateTime, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::config::SiteMetadata;
use crate::models::article::ArticleSummary;

/// RFC 1123 date in GMT, as RSS readers expect.
pub fn rfc1123(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Channel-level fields of a feed.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    /// Absolute URL of the HTML listing this feed mirrors.
    pub link: String,
    /// Absolute URL of the feed itself (`atom:link rel="self"`).
    pub self_link: String,
}

impl FeedChannel {
    /// The site-wide feed at `/feed.xml`.
    pub fn site(site: &SiteMetadata) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            link: site.absolute_url("blog"),
            self_link: site.absolute_url("feed.xml"),
        }
    }

    /// The per-tag feed at `/tags/{tag}/feed.xml`.
    pub fn tag(site: &SiteMetadata, slugged_tag: &str) -> Self {
        let tag_path = format!("tags/{slugged_tag}");
        Self {
            title: format!("{slugged_tag} - {}", site.author),
            description: format!("{slugged_tag} tags - {}", site.author),
            link: site.absolute_url(&tag_path),
            self_link: site.absolute_url(&format!("{tag_path}/feed.xml")),
        }
    }
}

fn render_item(site: &SiteMetadata, article: &ArticleSummary) -> Item {
    let link = site.absolute_url(&format!("blog/{}", article.slug));
    let categories = article
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.as_str()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .guid(GuidBuilder::default().value(link.as_str()).permalink(true).build())
        .title(article.title.clone())
        .link(link)
        .description((!article.summary.is_empty()).then(|| article.summary.clone()))
        .pub_date(rfc1123(article.date))
        .author(site.editor())
        .categories(categories)
        .build()
}

fn self_link(href: &str) -> AtomExtension {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("self");
    link.set_mime_type(Some("application/rss+xml".to_string()));

    let mut atom = AtomExtension::default();
    atom.set_links(vec![link]);
    atom
}

/// Render an RSS 2.0 document.
///
/// `articles` must already be published-only and sorted newest first; the
/// first one drives `lastBuildDate` (falling back to `now`).
pub fn render_rss(
    site: &SiteMetadata,
    channel: &FeedChannel,
    articles: &[ArticleSummary],
    now: DateTime<Utc>,
) -> String {
    let last_build = articles.first().map(|a| a.date).unwrap_or(now);
    let editor = site.editor();

    ChannelBuilder::default()
        .title(channel.title.as_str())
        .link(channel.link.as_str())
        .description(channel.description.as_str())
        .language(site.language.clone())
        .managing_editor(editor.clone())
        .webmaster(editor)
        .last_build_date(rfc1123(last_build))
        .atom_ext(self_link(&channel.self_link))
        .items(
            articles
                .iter()
                .map(|article| render_item(site, article))
                .collect::<Vec<_>>(),
        )
        .build()
        .to_string()
}
