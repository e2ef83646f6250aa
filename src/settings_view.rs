use crate::config::{BackendType, Config, ConnectionStatus, validate_base_url};
use crate::error::ApiResult;

/// Draft of the API configuration being edited on the settings screen.
#[derive(Debug, Clone, Default)]
pub struct SettingsView {
    pub draft_url: String,
    pub draft_backend: BackendType,
    pub editing_url: bool,
    pub testing: bool,
    pub connection: Option<ConnectionStatus>,
}

impl SettingsView {
    pub fn from_config(config: &Config) -> Self {
        Self {
            draft_url: config.api_base_url.clone(),
            draft_backend: config.backend_type,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, config: &Config) {
        *self = Self::from_config(config);
    }

    pub fn toggle_backend(&mut self) {
        self.draft_backend = self.draft_backend.toggle();
    }

    pub fn is_dirty(&self, config: &Config) -> bool {
        self.draft_url.trim() != config.api_base_url || self.draft_backend != config.backend_type
    }

    pub fn draft(&self) -> ApiResult<Config> {
        Ok(Config {
            backend_type: self.draft_backend,
            api_base_url: validate_base_url(&self.draft_url)?,
        })
    }
}
