//! Build the merged, deduplicated calendar from all enabled sources.

use std::path::Path;

use anyhow::Result;
use calmerge_core::{load_sources, to_ics_bytes, Merger};
use owo_colors::OwoColorize;

use super::download_feed;
use crate::fetch;
use crate::publish::Publisher;

pub async fn run(json: &Path, output: &Path, publisher: Option<&Publisher>) -> Result<()> {
    let sources = load_sources(json)?;
    let client = fetch::client()?;

    let mut merger = Merger::new();
    let mut merged_sources = 0usize;

    for source in sources.iter().filter(|s| s.enabled) {
        let feed = match download_feed(&client, source).await {
            Some(feed) => feed,
            None => continue,
        };
        merger.add_feed(&feed, &source.prefix);
        merged_sources += 1;
    }

    let merged = merger.into_feed();
    let bytes = to_ics_bytes(&merged);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, &bytes)?;
    println!(
        "{} Merged {} sources ({} events) into {}",
        "✓".green(),
        merged_sources,
        merged.events().count(),
        output.display()
    );

    if let Some(publisher) = publisher {
        let remote_path = publisher.config().path.clone();
        publisher
            .upsert(&remote_path, &bytes, &publisher.config().commit_msg)
            .await?;
        println!("   {} {}", "Published".green(), remote_path);
    }

    Ok(())
}
