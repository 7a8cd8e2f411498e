//! Source-list configuration: the ordered set of feeds to aggregate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CalMergeError, CalMergeResult};

/// Slug used when a source name contains no alphanumeric characters.
const FALLBACK_SLUG: &str = "calendar";

/// One remote feed entry, as stored in the sources JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "Name", default = "default_name")]
    pub name: String,
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(rename = "Prefix", default)]
    pub prefix: String,
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
}

fn default_name() -> String {
    "Unnamed".to_string()
}

impl Source {
    /// The URL with any junk before the first literal `http` stripped.
    ///
    /// Copy-pasted feed links sometimes arrive with a label glued to the
    /// front; everything before the scheme is dropped.
    pub fn normalized_url(&self) -> CalMergeResult<&str> {
        match self.url.find("http") {
            Some(pos) => Ok(&self.url[pos..]),
            None => Err(CalMergeError::Config(format!(
                "invalid URL string: {:?}",
                self.url
            ))),
        }
    }

    /// Filesystem-safe file stem derived from the source name.
    pub fn slug(&self) -> String {
        let slug: String = self
            .name
            .chars()
            .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
            .collect();
        let slug = slug.trim_matches('_');
        if slug.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            slug.to_string()
        }
    }
}

/// Load the source list from a JSON file.
pub fn load_sources(path: &Path) -> CalMergeResult<Vec<Source>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CalMergeError::Config(format!("{}: {}", path.display(), e)))
}

/// Save the source list back to disk, pretty-printed.
pub fn save_sources(path: &Path, sources: &[Source]) -> CalMergeResult<()> {
    let contents = serde_json::to_string_pretty(sources)
        .map_err(|e| CalMergeError::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}
