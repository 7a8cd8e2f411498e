//! Create-or-update publishing through the GitHub contents API.
//!
//! The protocol is read-then-conditional-write: GET the current file to
//! obtain its SHA (absent when the path does not exist yet), then PUT
//! the new content, including the SHA only when updating. Publish
//! failures are fatal for the run; a partial publish would leave the
//! remote inconsistent.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use calmerge_core::{CalMergeError, CalMergeResult};
use serde::{Deserialize, Serialize};

const API_ROOT: &str = "https://api.github.com";

/// Settings for the remote upsert, read from publish.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default)]
    pub token: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_commit_msg")]
    pub commit_msg: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_path() -> String {
    "calendars/combined.ics".to_string()
}

fn default_commit_msg() -> String {
    "Automated update of merged calendar".to_string()
}

impl PublishConfig {
    /// Load from a JSON file, then apply GITHUB_* environment overrides.
    pub fn load(path: &Path) -> CalMergeResult<PublishConfig> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: PublishConfig = serde_json::from_str(&contents)
            .map_err(|e| CalMergeError::Config(format!("{}: {}", path.display(), e)))?;

        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            config.token = token;
        }
        if let Ok(repository) = std::env::var("GITHUB_REPOSITORY") {
            config.repository = repository;
        }
        if let Ok(branch) = std::env::var("GITHUB_BRANCH") {
            config.branch = branch;
        }

        if config.token.is_empty() {
            return Err(CalMergeError::Config(
                "missing GitHub token (publish.json or GITHUB_TOKEN)".to_string(),
            ));
        }
        Ok(config)
    }

    /// Remote path for a sibling file of the configured path.
    ///
    /// The configured path usually names the merged output file; the
    /// per-source calendars land in the same directory. A configured
    /// path without a file extension is treated as the directory itself.
    pub fn remote_path_for(&self, filename: &str) -> String {
        let path = Path::new(&self.path);
        let dir = if path.extension().is_some() {
            path.parent().unwrap_or_else(|| Path::new(""))
        } else {
            path
        };
        if dir.as_os_str().is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", dir.display(), filename)
        }
    }
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: Option<String>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    message: &'a str,
    branch: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Client for the create-or-update file endpoint.
pub struct Publisher {
    http: reqwest::Client,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(config: PublishConfig) -> CalMergeResult<Publisher> {
        let http = reqwest::Client::builder()
            .user_agent("calmerge/0.1")
            .build()
            .map_err(|e| CalMergeError::Publish(e.to_string()))?;
        Ok(Publisher { http, config })
    }

    /// Publisher from a publish.json path.
    pub fn from_file(path: &Path) -> CalMergeResult<Publisher> {
        Publisher::new(PublishConfig::load(path)?)
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    fn contents_url(&self, remote_path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            API_ROOT,
            self.config.repository,
            remote_path.trim_start_matches('/')
        )
    }

    /// Current SHA of the remote file, when it exists.
    async fn current_sha(&self, url: &str) -> CalMergeResult<Option<String>> {
        let response = self
            .http
            .get(url)
            .query(&[("ref", self.config.branch.as_str())])
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| CalMergeError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }
        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| CalMergeError::Publish(e.to_string()))?;
        Ok(contents.sha)
    }

    /// Create or update one file in the repository.
    pub async fn upsert(
        &self,
        remote_path: &str,
        content: &[u8],
        message: &str,
    ) -> CalMergeResult<()> {
        let url = self.contents_url(remote_path);
        let sha = self.current_sha(&url).await?;

        let body = UpsertRequest {
            message,
            branch: &self.config.branch,
            content: BASE64.encode(content),
            sha,
        };
        let response = self
            .http
            .put(&url)
            .header("Authorization", format!("token {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CalMergeError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CalMergeError::Publish(format!(
                "GitHub API error {}: {}",
                status, text
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str) -> PublishConfig {
        PublishConfig {
            token: "t".to_string(),
            repository: "user/repo".to_string(),
            branch: "main".to_string(),
            path: path.to_string(),
            commit_msg: "msg".to_string(),
        }
    }

    #[test]
    fn sibling_paths_land_in_the_configured_directory() {
        let cfg = config("calendars/combined.ics");
        assert_eq!(cfg.remote_path_for("team.ics"), "calendars/team.ics");
    }

    #[test]
    fn bare_filenames_publish_at_the_repository_root() {
        let cfg = config("combined.ics");
        assert_eq!(cfg.remote_path_for("team.ics"), "team.ics");
    }

    #[test]
    fn contents_url_strips_leading_slashes() {
        let publisher = Publisher::new(config("calendars/combined.ics")).unwrap();
        assert_eq!(
            publisher.contents_url("/calendars/team.ics"),
            "https://api.github.com/repos/user/repo/contents/calendars/team.ics"
        );
    }
}
