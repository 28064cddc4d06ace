use std::sync::Arc;
use std::time::Instant;

use super::contact::Mailer;
use crate::config::ServerConfig;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    mailer: Arc<dyn Mailer>,
    started: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config: Arc::new(config),
            mailer,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.mailer.clone()
    }

    /// Seconds since the state was created.
    pub fn uptime(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
