//! Feed retrieval over HTTP.
//!
//! The core never fetches anything itself; this module turns a source
//! descriptor into already-parsed in-memory data, one source at a time.
//! There are no retries: a failed download is a single skip-and-report
//! event at the orchestration layer.

use std::time::Duration;

use calmerge_core::{CalMergeError, CalMergeResult, Feed, Source};
use url::Url;

/// User agent presented to the calendar hosts.
const USER_AGENT: &str = "calmerge/0.1 (+https://github.com/calmerge)";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client configured for feed downloads.
pub fn client() -> CalMergeResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| CalMergeError::Fetch(e.to_string()))
}

/// Validate and normalize a source's URL.
pub fn source_url(source: &Source) -> CalMergeResult<Url> {
    let url = source.normalized_url()?;
    Url::parse(url).map_err(|e| CalMergeError::Config(format!("invalid URL {:?}: {}", url, e)))
}

/// Download one feed as raw bytes.
pub async fn fetch_ics(client: &reqwest::Client, url: &str) -> CalMergeResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| CalMergeError::Fetch(e.to_string()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CalMergeError::Fetch(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Download and parse one feed.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> CalMergeResult<Feed> {
    let raw = fetch_ics(client, url).await?;
    Feed::parse(&raw)
}
