use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TransportError;
use crate::model::UploadTarget;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_REMOTE_DIR: &str = "csv-folder";
pub const CREATE_MESSAGE: &str = "Adding converted CSV file";
pub const UPDATE_MESSAGE: &str = "Updating converted CSV file";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("cfe-bill-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ContentMetadata {
    sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub status: u16,
    pub target: UploadTarget,
}

/// `<remote_dir>/<file_name>` with surrounding slashes collapsed.
#[must_use]
pub fn remote_path_for(remote_dir: &str, file_name: &str) -> String {
    let dir = remote_dir.trim_matches('/');
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir}/{file_name}")
    }
}

/// Client for the repository contents endpoint.
#[derive(Debug, Clone)]
pub struct ContentsClient {
    http: Client,
    api_base: String,
    token: String,
}

impl ContentsClient {
    #[must_use]
    pub fn new(http: Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    fn contents_url(&self, repository: &str, remote_path: &str) -> Result<Url, TransportError> {
        let encoded_path = remote_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            repository.trim_matches('/'),
            encoded_path
        );
        Ok(Url::parse(&url)?)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }

    /// Content hash of the file at `remote_path` on `branch`, if it exists.
    pub async fn fetch_existing_sha(
        &self,
        repository: &str,
        branch: &str,
        remote_path: &str,
    ) -> Result<Option<String>, TransportError> {
        let mut url = self.contents_url(repository, remote_path)?;
        url.query_pairs_mut().append_pair("ref", branch);
        let url_text = url.to_string();

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|error| TransportError::request(&url_text, error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path = remote_path, "remote file does not exist yet");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                method: "GET",
                url: url_text,
                status: status.as_u16(),
                body,
            });
        }

        let metadata = response
            .json::<ContentMetadata>()
            .await
            .map_err(|error| TransportError::request(&url_text, error))?;
        tracing::debug!(path = remote_path, sha = %metadata.sha, "remote file exists");
        Ok(Some(metadata.sha))
    }

    /// Writes `bytes` to the target, sending its content hash when present so
    /// the write updates instead of conflicting with an existing file.
    pub async fn put_file(
        &self,
        target: &UploadTarget,
        message: &str,
        bytes: &[u8],
    ) -> Result<u16, TransportError> {
        let url = self.contents_url(&target.repository, &target.remote_path)?;
        let url_text = url.to_string();
        let body = PutContentRequest {
            message,
            content: STANDARD.encode(bytes),
            branch: &target.branch,
            sha: target.existing_content_hash.as_deref(),
        };

        let response = self
            .authorized(self.http.put(url))
            .json(&body)
            .send()
            .await
            .map_err(|error| TransportError::request(&url_text, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                method: "PUT",
                url: url_text,
                status: status.as_u16(),
                body,
            });
        }

        Ok(status.as_u16())
    }

    /// Looks up the current content hash, then creates or updates the file.
    pub async fn upsert(
        &self,
        mut target: UploadTarget,
        message: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadOutcome, TransportError> {
        target.existing_content_hash = self
            .fetch_existing_sha(&target.repository, &target.branch, &target.remote_path)
            .await?;

        let message = message.unwrap_or(if target.existing_content_hash.is_some() {
            UPDATE_MESSAGE
        } else {
            CREATE_MESSAGE
        });

        tracing::info!(
            repository = %target.repository,
            branch = %target.branch,
            path = %target.remote_path,
            update = target.existing_content_hash.is_some(),
            "uploading CSV"
        );
        let status = self.put_file(&target, message, bytes).await?;
        tracing::info!(status, "CSV uploaded");

        Ok(UploadOutcome { status, target })
    }
}
