//! Publishing artifacts to the user's Google Drive.
//!
//! Uploads go through the v3 multipart endpoint with the user's bearer
//! token, get an anyone/reader permission, and come back as a shareable
//! viewer link. Publishing without credentials is a defined no-op, not a
//! failure; everything else propagates.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::session::Credentials;

const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to read artifact: {0}")]
    Read(#[from] std::io::Error),

    #[error("drive request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("drive upload failed ({status}): {body}")]
    Upload {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("drive permission update failed ({status}): {body}")]
    Permission {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    /// Uploads the artifact and returns a shareable viewer link, or `None`
    /// when no credentials are connected.
    async fn publish(
        &self,
        path: &Path,
        filename: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<String>, PublishError>;
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

pub struct DriveClient {
    client: reqwest::Client,
    folder_id: Option<String>,
}

impl DriveClient {
    pub fn new(folder_id: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, folder_id }
    }
}

#[async_trait]
impl ArtifactPublisher for DriveClient {
    async fn publish(
        &self,
        path: &Path,
        filename: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Option<String>, PublishError> {
        // Not connected is a defined state, not an error.
        let Some(creds) = credentials else {
            return Ok(None);
        };

        let content = tokio::fs::read(path).await?;

        let mut metadata = serde_json::json!({ "name": filename });
        if let Some(folder) = &self.folder_id {
            metadata["parents"] = serde_json::json!([folder]);
        }

        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata.to_string())
                    .mime_str("application/json")?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(content).file_name(filename.to_string()),
            );

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&creds.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(PublishError::Upload { status, body });
        }

        let uploaded: UploadedFile = response.json().await?;

        let response = self
            .client
            .post(format!("{}/{}/permissions", FILES_URL, uploaded.id))
            .bearer_auth(&creds.token)
            .json(&serde_json::json!({ "type": "anyone", "role": "reader" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(PublishError::Permission { status, body });
        }

        info!("Uploaded {} to Drive as file {}", filename, uploaded.id);

        Ok(Some(format!(
            "https://drive.google.com/file/d/{}/view?usp=sharing",
            uploaded.id
        )))
    }
}
