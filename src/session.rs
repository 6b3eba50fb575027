//! Per-client session state carried in a signed cookie.
//!
//! There is no server-side session store: the OAuth nonce, the Drive
//! credentials, and the recent-evaluation history all round-trip through an
//! HS256-signed token in the `session` cookie. A cookie that fails to
//! decode for any reason (tampering, expiry, key rotation) is discarded and
//! replaced by a fresh empty session.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const HISTORY_LIMIT: usize = 30;

const COOKIE_TTL_DAYS: i64 = 7;

// Secure + SameSite=None so the cookie survives the cross-site redirect
// back from the authorization endpoint.
const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=None; Path=/";

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// OAuth2 token bundle granting file-scoped Drive access. Lives only in
/// the session cookie, never in durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub drive_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// CSRF nonce tying an authorization request to its callback.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    exp: i64,
    #[serde(flatten)]
    session: Session,
}

impl Session {
    /// Decodes the session cookie from the request headers. Absent or
    /// undecodable cookies yield a fresh empty session.
    pub fn from_headers(headers: &HeaderMap, keys: &SessionKeys) -> Self {
        let Some(token) = cookie_value(headers) else {
            return Self::default();
        };

        match decode::<SessionClaims>(token, &keys.decoding, &Validation::default()) {
            Ok(data) => data.claims.session,
            Err(e) => {
                debug!("Discarding session cookie: {}", e);
                Self::default()
            }
        }
    }

    /// Serializes this session into a full `Set-Cookie` value.
    pub fn to_cookie(&self, keys: &SessionKeys) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = SessionClaims {
            exp: (Utc::now() + Duration::days(COOKIE_TTL_DAYS)).timestamp(),
            session: self.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding)?;

        Ok(format!(
            "session={}; {}; Max-Age={}",
            token,
            COOKIE_ATTRIBUTES,
            Duration::days(COOKIE_TTL_DAYS).num_seconds()
        ))
    }

    /// `Set-Cookie` value that drops the session entirely.
    pub fn clear_cookie() -> String {
        format!("session=; {}; Max-Age=0", COOKIE_ATTRIBUTES)
    }

    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            let overflow = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..overflow);
        }
    }
}

fn cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}
