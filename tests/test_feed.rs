mod common;

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::StatusCode;
use sac_web::articles::repository::ArticleRepository;
use sac_web::models::article::NewArticle;

#[tokio::test]
async fn site_feed_lists_published_articles() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server();

    let response = server.get("/feed.xml").await;
    assert_eq!(response.header(CONTENT_TYPE), "application/rss+xml; charset=utf-8");
    assert_eq!(response.header(CACHE_CONTROL), "public, max-age=3600, s-maxage=3600");

    let xml = response.text();
    assert!(xml.starts_with("<?xml version=\"1.0\""));
    assert!(xml.contains("<title>Sociedad de Astronomia del Caribe</title>"));
    assert!(xml.contains("<link>https://sac-website.vercel.app/blog/2024/03/30/eclipse</link>"));
    assert!(xml.contains("<lastBuildDate>Sat, 30 Mar 2024 12:00:00 GMT</lastBuildDate>"));
    assert!(!xml.contains("borrador"));

    let eclipse = xml.find("2024/03/30/eclipse").unwrap();
    let luna = xml.find("2024/01/10/luna").unwrap();
    assert!(eclipse < luna, "newest article first");
}

#[tokio::test]
async fn feed_escapes_titles() {
    let env = common::TestEnv::start();
    env.articles
        .create_article(NewArticle {
            slug: Some("2024/06/01/a-b".into()),
            title: "A & B <test>".into(),
            date: Some(common::day(2024, 6, 1)),
            draft: Some(false),
            ..NewArticle::default()
        })
        .await
        .unwrap();
    let server = env.server();

    let xml = server.get("/feed.xml").await.text();
    assert!(xml.contains("<title>A &amp; B &lt;test&gt;</title>"));
}

#[tokio::test]
async fn feed_answers_not_modified_for_matching_etag() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server_permissive();

    let first = server.get("/feed.xml").await;
    first.assert_status_ok();
    let etag = first.header(ETAG);

    let second = server
        .get("/feed.xml")
        .add_header(IF_NONE_MATCH, etag.clone())
        .await;
    second.assert_status(StatusCode::NOT_MODIFIED);
    assert_eq!(second.header(ETAG), etag);
}

#[tokio::test]
async fn tag_feed_uses_tag_channel() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server();

    let xml = server.get("/tags/luna/feed.xml").await.text();
    assert!(xml.contains("<title>luna - SAC</title>"));
    assert!(xml.contains("<description>luna tags - SAC</description>"));
    assert!(xml.contains("https://sac-website.vercel.app/tags/luna/feed.xml"));
    assert!(xml.contains("2024/01/10/luna"));
    assert!(!xml.contains("2024/02/20/marte"));
}

#[tokio::test]
async fn sitemap_lists_pages_and_published_articles() {
    let env = common::TestEnv::start();
    env.seed_blog().await;
    let server = env.server();

    let response = server.get("/sitemap.xml").await;
    assert_eq!(response.header(CONTENT_TYPE), "application/xml; charset=utf-8");

    let xml = response.text();
    assert!(xml.contains("<loc>https://sac-website.vercel.app/</loc>"));
    assert!(xml.contains("<loc>https://sac-website.vercel.app/blog/2024/02/20/marte</loc>"));
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    assert!(xml.contains(&format!("<lastmod>{today}</lastmod>")));
    assert!(!xml.contains("borrador"));
}

#[tokio::test]
async fn robots_points_at_sitemap() {
    let env = common::TestEnv::start();
    let server = env.server();

    let text = server.get("/robots.txt").await.text();
    assert!(text.contains("Disallow: /api/"));
    assert!(text.contains("Sitemap: https://sac-website.vercel.app/sitemap.xml"));
}
