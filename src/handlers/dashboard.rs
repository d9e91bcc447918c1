// Dashboard: overall counters and backend health

use std::sync::Mutex;

use tracing::error;

use crate::api;
use crate::error::Result;
use crate::handlers::report;
use crate::middleware::ConsoleState;
use crate::models::Stats;
use crate::view::Mount;

pub const LOAD_FAILED: &str = "Failed to load statistics";

pub struct DashboardPage {
    state: ConsoleState,
    mount: Mount,
    stats: Mutex<Option<Stats>>,
    error: Mutex<Option<String>>,
}

impl DashboardPage {
    pub fn new(state: ConsoleState) -> Self {
        Self {
            state,
            mount: Mount::default(),
            stats: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    pub fn stats(&self) -> Option<Stats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Also the retry action after a failed load.
    pub async fn load(&self) -> Result<Stats> {
        let result = api::system::overall_stats(&self.state.client).await;
        if !self.mount.is_mounted() {
            return Ok(result?);
        }
        match result {
            Ok(stats) => {
                *self.stats.lock().unwrap_or_else(|e| e.into_inner()) = Some(stats.clone());
                *self.error.lock().unwrap_or_else(|e| e.into_inner()) = None;
                Ok(stats)
            }
            Err(e) => {
                error!(error = %e, "{}", LOAD_FAILED);
                *self.error.lock().unwrap_or_else(|e| e.into_inner()) = Some(LOAD_FAILED.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        api::system::health(&self.state.client)
            .await
            .map_err(|e| report(&self.state, e, "Health check failed"))
    }
}
