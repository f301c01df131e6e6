use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    ai::TextGenerator,
    config::Config,
    store::{DocumentStore, PlanStore, UserStore},
    utils::extract::TextExtractor,
};

/// Shared handler state. Every collaborator is injected so tests can swap
/// in the in-memory store and a scripted generator.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub plans: Arc<dyn PlanStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
