use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;

pub async fn healthz() -> &'static str {
    "ok"
}

/// Starts the authorization flow: store a fresh nonce in the session and
/// hand the browser to the provider.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let mut session = Session::from_headers(&headers, &state.keys);

    let nonce = Uuid::new_v4().to_string();
    let url = state.oauth.authorization_url(&nonce)?;
    session.state = Some(nonce);

    let cookie = session.to_cookie(&state.keys)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

pub async fn oauth2callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let mut session = Session::from_headers(&headers, &state.keys);

    // A missing or mismatched nonce means this callback belongs to no live
    // flow; restart cleanly instead of failing the request.
    let nonce_ok = matches!(
        (&session.state, &params.state),
        (Some(stored), Some(echoed)) if stored == echoed
    );
    if !nonce_ok {
        return Ok(Redirect::to("/login").into_response());
    }

    let Some(code) = params.code else {
        return Ok(Redirect::to("/login").into_response());
    };

    let credentials = state.oauth.exchange_code(&code).await?;
    session.credentials = Some(credentials);
    session.state = None;

    let cookie = session.to_cookie(&state.keys)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// Drops the whole session: credentials, history, and any pending nonce.
pub async fn logout() -> impl IntoResponse {
    ([(header::SET_COOKIE, Session::clear_cookie())], Redirect::to("/login"))
}
