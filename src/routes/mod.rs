mod auth;
mod pages;

pub use auth::{healthz, login, logout, oauth2callback};
pub use pages::{index, submit};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::session::Session;
use crate::state::AppState;

// Reachable without credentials; everything else bounces to /login.
const OPEN_PATHS: &[&str] = &["/login", "/oauth2callback", "/healthz"];

pub async fn require_login(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let session = Session::from_headers(req.headers(), &state.keys);
    if gate_allows(req.uri().path(), &session) {
        return next.run(req).await;
    }

    Redirect::to("/login").into_response()
}

fn gate_allows(path: &str, session: &Session) -> bool {
    OPEN_PATHS.contains(&path) || path.starts_with("/static") || session.credentials.is_some()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    #[test]
    fn gate_admits_open_paths_without_credentials() {
        let session = Session::default();
        assert!(gate_allows("/login", &session));
        assert!(gate_allows("/oauth2callback", &session));
        assert!(gate_allows("/healthz", &session));
        assert!(gate_allows("/static/style.css", &session));
    }

    #[test]
    fn gate_bounces_everything_else_without_credentials() {
        let session = Session::default();
        assert!(!gate_allows("/", &session));
        assert!(!gate_allows("/logout", &session));
        assert!(!gate_allows("/anything", &session));
    }

    #[test]
    fn gate_admits_authenticated_sessions_everywhere() {
        let session = Session {
            credentials: Some(test_support::credentials()),
            ..Session::default()
        };
        assert!(gate_allows("/", &session));
        assert!(gate_allows("/logout", &session));
    }
}
