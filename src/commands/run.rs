//! The unattended scheduled-job entry: refresh, merge, publish.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use super::{merge, refresh};
use crate::publish::Publisher;

pub async fn run(json: &Path, folder: &Path, publisher: &Publisher) -> Result<()> {
    refresh::run(json, folder, Some(publisher)).await?;
    println!();

    let output = publisher.config().path.clone();
    merge::run(json, Path::new(&output), Some(publisher)).await?;

    println!(
        "\n{} Completed: refreshed calendars, merged, and published.",
        "✓".green()
    );
    Ok(())
}
