// System settings page controller

use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::api;
use crate::api_models::{CleanLogsResponse, MessageResponse, SystemInfo};
use crate::error::{ConsoleError, Result};
use crate::forms::settings::{parse_retention_days, SettingsForm, DEFAULT_RETENTION_DAYS};
use crate::handlers::report;
use crate::middleware::ConsoleState;
use crate::models::SystemSettings;
use crate::view::Mount;

pub const LOAD_FAILED: &str = "Failed to load system settings";

#[derive(Debug, Default)]
struct Loaded {
    settings: Option<SystemSettings>,
    error: Option<String>,
}

pub struct SettingsPage {
    state: ConsoleState,
    mount: Mount,
    loaded: Mutex<Loaded>,
}

impl SettingsPage {
    pub fn new(state: ConsoleState) -> Self {
        Self {
            state,
            mount: Mount::default(),
            loaded: Mutex::new(Loaded::default()),
        }
    }

    pub fn settings(&self) -> Option<SystemSettings> {
        self.loaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .settings
            .clone()
    }

    pub fn error(&self) -> Option<String> {
        self.loaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .error
            .clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub async fn load(&self) -> Result<SystemSettings> {
        let result = api::system::settings(&self.state.client).await;
        if !self.mount.is_mounted() {
            return Ok(result?);
        }
        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        match result {
            Ok(settings) => {
                loaded.settings = Some(settings.clone());
                loaded.error = None;
                Ok(settings)
            }
            Err(e) => {
                error!(error = %e, "{}", LOAD_FAILED);
                loaded.error = Some(LOAD_FAILED.to_string());
                Err(e.into())
            }
        }
    }

    /// Form over the last loaded settings.
    pub fn form(&self) -> Result<SettingsForm> {
        self.settings()
            .as_ref()
            .map(SettingsForm::from_settings)
            .ok_or(ConsoleError::NoSelection)
    }

    /// Replace the settings wholesale, then reload them.
    pub async fn save(&self, form: &mut SettingsForm) -> Result<SystemSettings> {
        let payload = form.validate_form().map_err(ConsoleError::Validation)?;
        api::system::update_settings(&self.state.client, &payload)
            .await
            .map_err(|e| report(&self.state, e, "Failed to save settings"))?;
        info!(site_name = %payload.site_name, "system settings saved");

        let settings = self.load().await?;
        self.state.interaction.alert("Settings saved");
        Ok(settings)
    }

    pub async fn info(&self) -> Result<SystemInfo> {
        api::system::info(&self.state.client)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load system information"))
    }

    pub async fn backup(&self) -> Result<MessageResponse> {
        if !self
            .state
            .interaction
            .confirm("Back up the database now? This may take a while.")
        {
            return Err(ConsoleError::Cancelled);
        }
        let response = api::system::backup(&self.state.client)
            .await
            .map_err(|e| report(&self.state, e, "Failed to start backup"))?;
        info!("database backup started");
        self.state.interaction.alert("Database backup started");
        Ok(response)
    }

    /// Ask how many days of logs to keep, confirm, then delete the rest.
    pub async fn clean_logs(&self) -> Result<CleanLogsResponse> {
        let input = self
            .state
            .interaction
            .prompt(
                "Days of logs to keep (older entries are deleted)",
                Some(DEFAULT_RETENTION_DAYS),
            )
            .filter(|s| !s.is_empty())
            .ok_or(ConsoleError::Cancelled)?;
        let Some(days) = parse_retention_days(&input) else {
            warn!(input = %input, "rejected retention days");
            self.state.interaction.alert("Please enter a valid number of days");
            return Err(ConsoleError::InvalidInput(format!("invalid day count: {}", input)));
        };

        let message = format!("Delete logs older than {} days? This cannot be undone.", days);
        if !self.state.interaction.confirm(&message) {
            return Err(ConsoleError::Cancelled);
        }
        let response = api::system::clean_logs(&self.state.client, days)
            .await
            .map_err(|e| report(&self.state, e, "Failed to clean logs"))?;
        info!(days, deleted = response.deleted_count, "logs cleaned");
        self.state.interaction.alert("Log cleanup finished");
        Ok(response)
    }
}
