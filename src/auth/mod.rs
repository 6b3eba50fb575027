//! OAuth2 authorization-code flow against the provider named in the
//! client-secret descriptor file.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::session::Credentials;

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to load client secret descriptor: {0}")]
    Descriptor(String),

    #[error("invalid authorization endpoint: {0}")]
    AuthUri(String),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token exchange failed ({status}): {body}")]
    Exchange {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// OAuth client identity, in the provider's client-secret descriptor
/// format (a `web` or `installed` object).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    web: Option<ClientSecret>,
    installed: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
}

pub struct OAuthFlow {
    client: reqwest::Client,
    secret: ClientSecret,
    redirect_uri: String,
}

impl OAuthFlow {
    pub fn new(secret: ClientSecret, redirect_uri: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            secret,
            redirect_uri,
        }
    }

    pub fn from_file(path: &Path, redirect_uri: String) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Descriptor(format!("{}: {}", path.display(), e)))?;
        let file: ClientSecretFile = serde_json::from_str(&content)
            .map_err(|e| AuthError::Descriptor(format!("{}: {}", path.display(), e)))?;

        let secret = file.web.or(file.installed).ok_or_else(|| {
            AuthError::Descriptor(format!("{}: no web or installed client", path.display()))
        })?;

        Ok(Self::new(secret, redirect_uri))
    }

    /// Builds the authorization-request URL carrying the CSRF nonce as
    /// `state`. Offline access and the consent prompt keep the refresh
    /// token coming back on repeat logins.
    pub fn authorization_url(&self, nonce: &str) -> Result<String, AuthError> {
        let url = reqwest::Url::parse_with_params(
            &self.secret.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", DRIVE_SCOPE),
                ("state", nonce),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AuthError::AuthUri(e.to_string()))?;

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for the token bundle stored in the
    /// session.
    pub async fn exchange_code(&self, code: &str) -> Result<Credentials, AuthError> {
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(AuthError::Exchange { status, body });
        }

        let token: TokenResponse = response.json().await?;
        info!("Exchanged authorization code for Drive credentials");

        Ok(Credentials {
            token: token.access_token,
            refresh_token: token.refresh_token,
            token_uri: self.secret.token_uri.clone(),
            client_id: self.secret.client_id.clone(),
            client_secret: self.secret.client_secret.clone(),
            scopes: token
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| vec![DRIVE_SCOPE.to_string()]),
        })
    }
}
