// Environments page controller, including start/stop/health-check actions

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::api;
use crate::api_models::{CustomerQuery, EnvironmentQuery, HealthCheckResult};
use crate::error::{ApiError, ConsoleError, Result};
use crate::forms::environment::EnvironmentForm;
use crate::forms::FormWarning;
use crate::handlers::{non_empty, report};
use crate::middleware::ConsoleState;
use crate::models::{Customer, Environment, EnvironmentStatus};
use crate::view::{lock_view, Listing, Mount, ViewError, ViewMode};

pub const LOAD_FAILED: &str = "Failed to load environments";

pub struct EnvironmentsPage {
    state: ConsoleState,
    mount: Mount,
    list: Listing<Environment, EnvironmentQuery>,
    view: Mutex<ViewMode<Environment>>,
    /// Rows with an action in flight.
    busy: Mutex<HashSet<i64>>,
}

/// Clears a row's busy flag when the action finishes, however it finishes.
struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<i64>>,
    id: i64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

impl EnvironmentsPage {
    pub fn new(state: ConsoleState) -> Self {
        let mount = Mount::default();
        Self {
            state,
            list: Listing::new(EnvironmentQuery::default(), mount.clone()),
            mount,
            view: Mutex::new(ViewMode::List),
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn listing(&self) -> &Listing<Environment, EnvironmentQuery> {
        &self.list
    }

    pub fn environments(&self) -> Vec<Environment> {
        self.list.items()
    }

    pub fn view(&self) -> ViewMode<Environment> {
        lock_view(&self.view).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn is_busy(&self, id: i64) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    fn mark_busy(&self, id: i64) -> BusyGuard<'_> {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        BusyGuard {
            busy: &self.busy,
            id,
        }
    }

    pub async fn load(&self) -> Result<()> {
        let client = self.state.client.clone();
        self.list
            .refresh(
                move |query| async move { api::environments::list(&client, &query).await },
                LOAD_FAILED,
            )
            .await?;
        Ok(())
    }

    pub async fn search(&self, term: &str) -> Result<()> {
        if self.list.update_filter(|q| q.search = non_empty(term)) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_status(&self, status: Option<EnvironmentStatus>) -> Result<()> {
        if self.list.update_filter(|q| q.status = status) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_customer(&self, customer: Option<i64>) -> Result<()> {
        if self.list.update_filter(|q| q.customer = customer) {
            self.load().await?;
        }
        Ok(())
    }

    /// Customers offered in the form's customer selector.
    pub async fn customer_choices(&self) -> Result<Vec<Customer>> {
        let page = api::customers::list(&self.state.client, &CustomerQuery::default())
            .await
            .map_err(|e| report(&self.state, e, "Failed to load customers"))?;
        Ok(page.results)
    }

    pub fn open_create(&self) -> Result<EnvironmentForm> {
        lock_view(&self.view).open_create()?;
        Ok(EnvironmentForm::new(self.state.config.environment.clone()))
    }

    pub async fn open_detail(&self, id: i64) -> Result<Environment> {
        let environment = api::environments::get(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load environment"))?;
        if self.mount.is_mounted() {
            lock_view(&self.view).open_detail(environment.clone())?;
        }
        Ok(environment)
    }

    pub fn open_edit(&self, environment: Environment) -> Result<EnvironmentForm> {
        let form = EnvironmentForm::edit(&environment, self.state.config.environment.clone());
        lock_view(&self.view).open_edit(environment)?;
        Ok(form)
    }

    pub fn edit_selected(&self) -> Result<EnvironmentForm> {
        let mut view = lock_view(&self.view);
        view.edit_selected()?;
        view.selected()
            .map(|e| EnvironmentForm::edit(e, self.state.config.environment.clone()))
            .ok_or(ConsoleError::NoSelection)
    }

    pub fn cancel(&self) {
        lock_view(&self.view).cancel();
    }

    /// Validate and save. Warnings that do not block submission are logged
    /// and returned with the saved record.
    pub async fn submit(&self, form: &mut EnvironmentForm) -> Result<(Environment, Vec<FormWarning>)> {
        let (payload, warnings) = form.validate_form().map_err(ConsoleError::Validation)?;
        for warning in &warnings {
            warn!(release_name = %payload.release_name, "{}", warning);
        }

        let editing = {
            let view = lock_view(&self.view);
            match &*view {
                ViewMode::Create => None,
                ViewMode::Edit(environment) => Some(environment.id),
                other => {
                    return Err(ViewError {
                        from: other.name(),
                        action: "submit",
                    }
                    .into())
                }
            }
        };

        let client = &self.state.client;
        let saved = match editing {
            Some(id) => api::environments::update(client, id, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to update environment"))?,
            None => api::environments::create(client, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to create environment"))?,
        };
        info!(id = saved.id, release_name = %saved.release_name, "environment saved");

        let _ = self.load().await;
        if let Err(e) = lock_view(&self.view).submitted() {
            debug!(error = %e, "view changed while saving");
        }
        Ok((saved, warnings))
    }

    pub async fn delete(&self, environment: &Environment) -> Result<()> {
        let message = format!(
            "Delete environment \"{}\"? This cannot be undone.",
            environment.release_name
        );
        if !self.state.interaction.confirm(&message) {
            return Err(ConsoleError::Cancelled);
        }

        api::environments::delete(&self.state.client, environment.id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to delete environment"))?;
        info!(id = environment.id, "environment deleted");

        {
            let mut view = lock_view(&self.view);
            if view.selected().map(|e| e.id) == Some(environment.id) {
                view.cancel();
            }
        }
        let _ = self.load().await;
        Ok(())
    }

    pub async fn start(&self, id: i64) -> Result<Environment> {
        let result = {
            let _busy = self.mark_busy(id);
            api::environments::start(&self.state.client, id).await
        };
        self.finish_action(id, "start", result, "Failed to start environment")
            .await
    }

    /// Stopping asks the operator first; declining sends nothing.
    pub async fn stop(&self, id: i64) -> Result<Environment> {
        if !self
            .state
            .interaction
            .confirm("Stop this environment?")
        {
            return Err(ConsoleError::Cancelled);
        }
        let result = {
            let _busy = self.mark_busy(id);
            api::environments::stop(&self.state.client, id).await
        };
        self.finish_action(id, "stop", result, "Failed to stop environment")
            .await
    }

    pub async fn health_check(&self, id: i64) -> Result<HealthCheckResult> {
        let result = {
            let _busy = self.mark_busy(id);
            api::environments::health_check(&self.state.client, id).await
        };
        self.finish_action(id, "health_check", result, "Health check failed")
            .await
    }

    /// The list is reloaded after every action, successful or not.
    async fn finish_action<T>(
        &self,
        id: i64,
        action: &str,
        result: std::result::Result<T, ApiError>,
        fallback: &str,
    ) -> Result<T> {
        let outcome = match result {
            Ok(value) => {
                info!(id, action, "environment action completed");
                Ok(value)
            }
            Err(e) => Err(report(&self.state, e, fallback)),
        };
        let _ = self.load().await;
        outcome
    }
}
