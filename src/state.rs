//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::updater::StatusUpdater;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub updater: Arc<StatusUpdater>,
}

impl AppState {
    /// Creates a new application state from the given configuration and updater.
    pub fn new(config: AppConfig, updater: StatusUpdater) -> Self {
        Self {
            config: Arc::new(config),
            updater: Arc::new(updater),
        }
    }
}
