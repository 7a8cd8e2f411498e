//! Per-source refresh: download, prune to the recent window, save.

use std::path::Path;

use anyhow::Result;
use calmerge_core::{filter_recent, load_sources, to_ics_bytes, RECENT_DAYS};
use chrono::{Duration, Utc};
use owo_colors::OwoColorize;

use super::download_feed;
use crate::fetch;
use crate::publish::Publisher;

pub async fn run(json: &Path, folder: &Path, publisher: Option<&Publisher>) -> Result<()> {
    let sources = load_sources(json)?;
    std::fs::create_dir_all(folder)?;

    let client = fetch::client()?;
    let cutoff = Utc::now() - Duration::days(RECENT_DAYS);

    for source in sources.iter().filter(|s| s.enabled) {
        let feed = match download_feed(&client, source).await {
            Some(feed) => feed,
            None => continue,
        };

        let cleaned = filter_recent(&feed, cutoff);
        let bytes = to_ics_bytes(&cleaned);

        let filename = format!("{}.ics", source.slug());
        let local_path = folder.join(&filename);
        std::fs::write(&local_path, &bytes)?;
        println!("   Saved {}", local_path.display());

        if let Some(publisher) = publisher {
            let remote_path = publisher.config().remote_path_for(&filename);
            publisher
                .upsert(&remote_path, &bytes, &publisher.config().commit_msg)
                .await?;
            println!("   {} {}", "Published".green(), remote_path);
        }
    }

    println!("{} All calendars refreshed.", "✓".green());
    Ok(())
}
