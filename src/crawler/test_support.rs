//! In-memory fetcher for engine tests

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::url::CanonicalUrl;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockPage {
    Html(String),
    Status(u16),
    Binary(String),
    Unreachable,
}

/// Serves canned responses keyed by canonical URL string and records every
/// fetch in call order. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub(crate) struct MockFetcher {
    pages: HashMap<String, MockPage>,
    fetched: Mutex<Vec<String>>,
    delay: Duration,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// An HTML page whose body is one anchor per link
    pub fn page(self, url: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        self.html(url, &format!("<html><body><p>Page</p>{}</body></html>", anchors))
    }

    pub fn html(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), MockPage::Html(body.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status_code: u16) -> Self {
        self.pages
            .insert(url.to_string(), MockPage::Status(status_code));
        self
    }

    pub fn binary(mut self, url: &str, content_type: &str) -> Self {
        self.pages
            .insert(url.to_string(), MockPage::Binary(content_type.to_string()));
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), MockPage::Unreachable);
        self
    }

    /// Delays every response, after the fetch has been recorded
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetched_set(&self) -> HashSet<String> {
        self.fetched().into_iter().collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &CanonicalUrl) -> FetchResult {
        self.fetched.lock().unwrap().push(url.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.pages.get(url.as_str()) {
            Some(MockPage::Html(body)) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                content_type: "text/html".to_string(),
                body: body.clone(),
            },
            Some(MockPage::Status(status_code)) => FetchResult::HttpError {
                status_code: *status_code,
            },
            Some(MockPage::Binary(content_type)) => FetchResult::ContentMismatch {
                content_type: content_type.clone(),
            },
            Some(MockPage::Unreachable) => FetchResult::NetworkError {
                error: "Connection refused".to_string(),
            },
            None => FetchResult::HttpError { status_code: 404 },
        }
    }
}
