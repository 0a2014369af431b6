//! Concurrent site crawling: fetch, link filtering, dedupe, traversal.

pub mod client;
pub mod engine;
pub mod links;
pub mod used_links;

pub use client::{FetchedPage, PageClient};
pub use engine::CrawlEngine;
pub use used_links::UsedLinks;
