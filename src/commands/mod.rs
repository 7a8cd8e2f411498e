pub mod merge;
pub mod refresh;
pub mod run;
pub mod sources;

use calmerge_core::{CalMergeError, Feed, Source};
use owo_colors::OwoColorize;

use crate::fetch;

/// Download and parse one source, reporting any skip with its reason.
///
/// Every failure here is non-fatal: the caller moves on to the next
/// source.
pub(crate) async fn download_feed(client: &reqwest::Client, source: &Source) -> Option<Feed> {
    let url = match fetch::source_url(source) {
        Ok(url) => url,
        Err(reason) => {
            report_skip(&source.name, &reason);
            return None;
        }
    };

    println!(
        "→ Downloading {} from {}",
        source.name.bold(),
        url.host_str().unwrap_or("unknown host")
    );
    match fetch::fetch_feed(client, url.as_str()).await {
        Ok(feed) => Some(feed),
        Err(reason) => {
            report_skip(&source.name, &reason);
            None
        }
    }
}

fn report_skip(name: &str, reason: &CalMergeError) {
    eprintln!("   {} {}: {}", "Skipping".red(), name, reason);
}
