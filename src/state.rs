use std::sync::Arc;

use crate::analysis::ResultLoader;
use crate::config::Config;
use crate::mail::{self, Mailer};

/// Everything handlers share. Immutable after startup.
pub struct AppState {
    pub config: Config,
    pub results: ResultLoader,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mailer = mail::from_config(&config.mail);
        Self { config, results: ResultLoader::default(), mailer }
    }

    /// Reads analysis results from somewhere other than the fixed path.
    pub fn with_results(mut self, results: ResultLoader) -> Self {
        self.results = results;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }
}
