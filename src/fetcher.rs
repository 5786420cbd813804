//! Page fetching.
//!
//! [`PageSource`] is the seam between the polling loop and the network: the
//! real [`HttpSource`] issues one GET per call, tests replay fixture pages.

use crate::document::Page;
use crate::error::{Error, FetchError};
use reqwest::{StatusCode, get};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Anything that can produce a parsed page for a URL.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<Page, Error>;
}

/// Fetches pages over HTTP with library-default headers.
///
/// No retries here; a failed fetch is the caller's to handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpSource;

impl PageSource for HttpSource {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Page, Error> {
        let t0 = Instant::now();
        let body = fetch_body(url).await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(Page::parse(url, &body)?)
    }
}

async fn fetch_body(url: &str) -> Result<String, FetchError> {
    let network = |source| FetchError::Network {
        url: url.to_string(),
        source,
    };

    let resp = get(url).await.map_err(network)?;
    check_status(url, resp.status())?;
    resp.text().await.map_err(network)
}

/// Only 2xx answers carry a page worth parsing.
fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    warn!(%url, %status, "Non-success status");
    Err(FetchError::Status {
        url: url.to_string(),
        status,
    })
}
