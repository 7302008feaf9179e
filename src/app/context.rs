use std::sync::Arc;

use crate::app::error::{MagpieError, Result};
use crate::config::Config;
use crate::pipeline::{EventSender, Pipeline};
use crate::session::BrowserSession;
use crate::store::MarkdownStore;

/// Wires configuration and store together; sessions and pipelines are
/// created per operation so browser lifetime stays bounded.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<MarkdownStore>,
}

impl AppContext {
    /// Load the configuration (creating a default file on first run) and
    /// wire up the store.
    pub fn new() -> Result<Self> {
        let config = Config::load().map_err(|e| MagpieError::Config(e.to_string()))?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MarkdownStore::new(
            config.output_root(),
            config.per_profile_subfolders,
        ));
        Self { config, store }
    }

    pub fn session(&self) -> BrowserSession {
        BrowserSession::new(self.config.browser_state_root(), self.config.headless)
    }

    pub fn pipeline(&self, events: EventSender) -> Pipeline<BrowserSession, MarkdownStore> {
        Pipeline::new(
            self.session(),
            self.store.clone(),
            self.config.clone(),
            events,
        )
    }
}
