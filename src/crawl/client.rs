//! HTTP fetch capability.

use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "Helicon Search Engine/0.1";

/// Status code assumed when a request never produced a response
/// (connection refused, timeout, bad address).
const ASSUMED_ERROR_CODE: u16 = 404;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub code: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_error(&self) -> bool {
        self.code >= 400
    }
}

/// Thin wrapper around the HTTP client. Error statuses are tolerated
/// (their body is still read); transport failures degrade to an assumed
/// 404 with an empty body so the crawl never stops on a broken link.
pub struct PageClient {
    client: Client,
}

impl PageClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    pub async fn fetch(&self, url: &str) -> FetchedPage {
        match self.client.get(url).send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                log::trace!("[CRAWL] Fetched {} ({}, {} bytes)", url, code, body.len());
                FetchedPage { code, body }
            }
            Err(e) => {
                log::debug!("[CRAWL] Fetch failed for {}: {}", url, e);
                FetchedPage {
                    code: ASSUMED_ERROR_CODE,
                    body: String::new(),
                }
            }
        }
    }
}
