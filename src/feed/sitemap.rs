use crate::config::SiteMetadata;
use crate::models::article::ArticleSummary;

/// Escape text for XML interpolation (`& < > " '`).
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `sitemap.xml` for the home page, the listings and every published article.
pub fn render_sitemap(site: &SiteMetadata, articles: &[ArticleSummary]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for (path, priority) in [("", "1.0"), ("blog", "0.9"), ("tags", "0.5")] {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <changefreq>daily</changefreq>\n    \
             <priority>{priority}</priority>\n  </url>\n",
            escape_xml(&site.absolute_url(path))
        ));
    }

    for article in articles.iter().filter(|a| !a.draft && !a.archived) {
        let loc = site.absolute_url(&format!("blog/{}", article.slug));
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
             <changefreq>weekly</changefreq>\n    <priority>0.8</priority>\n  </url>\n",
            escape_xml(&loc),
            article.last_modified().format("%Y-%m-%d"),
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// `robots.txt` allowing everything but the admin API.
pub fn render_robots(site: &SiteMetadata) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /api/\n\nSitemap: {}\n",
        site.absolute_url("sitemap.xml")
    )
}
