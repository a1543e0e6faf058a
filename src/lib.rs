pub mod app;
pub mod authors;
pub mod cache;
pub mod config;
pub mod error;
pub mod api {
    pub mod admin;
    pub mod auth;
    pub mod blog;
    pub mod errors;
    pub mod feed;
}
pub mod articles {
    pub mod listing;
    pub mod repository;
    pub mod slug;
    pub mod tags;
}
pub mod feed {
    pub mod json_ld;
    pub mod rss;
    pub mod sitemap;
}
pub mod models {
    pub mod article;
}
pub mod pages {
    pub mod blog;
    pub mod feeds;
    pub mod post;
    pub mod tags;
}
pub mod rendering {
    pub mod markdown;
    pub mod mdx;
    pub mod toc;
}
pub mod storage {
    pub mod client;
}
