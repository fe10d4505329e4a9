//! Worker loop: dequeue, fetch, extract, discover

use crate::crawler::extractor::{Extractor, PageContent};
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::session::CrawlSession;
use crate::state::PageState;
use crate::url::CanonicalUrl;
use std::sync::Arc;

/// Shared handles every worker needs
pub(crate) struct WorkerContext {
    pub session: Arc<CrawlSession>,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub abort_fetch_on_cancel: bool,
}

/// A fetched and extracted page, owned by the worker processing it
#[derive(Debug)]
struct PageResult {
    status_code: u16,
    content: PageContent,
}

/// Runs one worker until the frontier is closed and drained or the crawl is
/// cancelled
///
/// Returns the number of URLs this worker took off the frontier.
pub(crate) async fn run_worker(id: usize, ctx: Arc<WorkerContext>) -> u64 {
    let session = &ctx.session;
    let mut handled = 0;

    tracing::debug!("Worker {} started", id);

    loop {
        let next = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => {
                tracing::debug!("Worker {} stopping on cancellation", id);
                break;
            }
            next = session.frontier.dequeue() => next,
        };

        let Some(url) = next else {
            break;
        };

        let _task = session.counter.complete_on_drop();
        let state = process_url(&ctx, &url).await;
        session.stats.record_outcome(state);
        handled += 1;
    }

    tracing::debug!("Worker {} exiting after {} URLs", id, handled);
    handled
}

async fn process_url(ctx: &WorkerContext, url: &CanonicalUrl) -> PageState {
    let session = &ctx.session;
    tracing::debug!("Processing URL: {}", url);

    let fetch = ctx.fetcher.fetch(url);
    let result = if ctx.abort_fetch_on_cancel {
        tokio::select! {
            biased;
            _ = session.cancel.cancelled() => {
                tracing::debug!("Fetch of {} abandoned on cancellation", url);
                return PageState::Cancelled;
            }
            result = fetch => result,
        }
    } else {
        fetch.await
    };

    let page = match result {
        FetchResult::Success {
            status_code, body, ..
        } => match ctx.extractor.extract(&body) {
            Ok(content) => PageResult {
                status_code,
                content,
            },
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", url, e);
                return PageState::ParseFailed;
            }
        },
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!("Skipping {}: expected HTML, got {}", url, content_type);
            return PageState::ContentMismatch;
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!("HTTP {} for {}", status_code, url);
            return PageState::HttpError;
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Failed to fetch {}: {}", url, error);
            return PageState::Unreachable;
        }
    };

    session.stats.record_text(page.content.text.len());
    tracing::debug!(
        "Fetched {} (HTTP {}, {} links, {} bytes of text)",
        url,
        page.status_code,
        page.content.links.len(),
        page.content.text.len()
    );

    for href in &page.content.links {
        session.offer_link(href, url).await;
    }

    PageState::Processed
}
