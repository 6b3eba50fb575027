use std::sync::Arc;

use crate::agents::IdeaEvaluator;
use crate::auth::OAuthFlow;
use crate::config::Config;
use crate::drive::ArtifactPublisher;
use crate::session::SessionKeys;

/// Shared application state. The evaluator and publisher are trait objects
/// so tests can swap in stubs.
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: SessionKeys,
    pub oauth: OAuthFlow,
    pub evaluator: Arc<dyn IdeaEvaluator>,
    pub publisher: Arc<dyn ArtifactPublisher>,
}
