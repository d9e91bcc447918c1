// Licenses page controller

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::api;
use crate::api_models::{
    ActivateLicenseRequest, LicenseQuery, LicenseRecordQuery, LicenseValidation, MessageResponse,
    ValidateLicenseRequest,
};
use crate::error::{ConsoleError, Result};
use crate::forms::license::LicenseForm;
use crate::handlers::{non_empty, report, today};
use crate::middleware::ConsoleState;
use crate::models::{License, LicenseLog, LicenseStatus, LicenseType, LicenseUsage};
use crate::view::{lock_view, Listing, Mount, ViewError, ViewMode};

pub const LOAD_FAILED: &str = "Failed to load licenses";

pub struct LicensesPage {
    state: ConsoleState,
    mount: Mount,
    list: Listing<License, LicenseQuery>,
    view: Mutex<ViewMode<License>>,
}

impl LicensesPage {
    pub fn new(state: ConsoleState) -> Self {
        let mount = Mount::default();
        Self {
            state,
            list: Listing::new(LicenseQuery::default(), mount.clone()),
            mount,
            view: Mutex::new(ViewMode::List),
        }
    }

    pub fn listing(&self) -> &Listing<License, LicenseQuery> {
        &self.list
    }

    pub fn licenses(&self) -> Vec<License> {
        self.list.items()
    }

    pub fn view(&self) -> ViewMode<License> {
        lock_view(&self.view).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub async fn load(&self) -> Result<()> {
        let client = self.state.client.clone();
        self.list
            .refresh(
                move |query| async move { api::licenses::list(&client, &query).await },
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

    pub async fn filter_status(&self, status: Option<LicenseStatus>) -> Result<()> {
        if self.list.update_filter(|q| q.status = status) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_type(&self, license_type: Option<LicenseType>) -> Result<()> {
        if self.list.update_filter(|q| q.license_type = license_type) {
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

    pub fn open_create(&self) -> Result<LicenseForm> {
        lock_view(&self.view).open_create()?;
        Ok(LicenseForm::new(today()))
    }

    pub async fn open_detail(&self, id: i64) -> Result<License> {
        let license = api::licenses::get(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load license"))?;
        if self.mount.is_mounted() {
            lock_view(&self.view).open_detail(license.clone())?;
        }
        Ok(license)
    }

    pub fn open_edit(&self, license: License) -> Result<LicenseForm> {
        let form = LicenseForm::edit(&license);
        lock_view(&self.view).open_edit(license)?;
        Ok(form)
    }

    pub fn edit_selected(&self) -> Result<LicenseForm> {
        let mut view = lock_view(&self.view);
        view.edit_selected()?;
        view.selected()
            .map(LicenseForm::edit)
            .ok_or(ConsoleError::NoSelection)
    }

    pub fn cancel(&self) {
        lock_view(&self.view).cancel();
    }

    pub async fn submit(&self, form: &mut LicenseForm) -> Result<License> {
        let payload = form.validate_form().map_err(ConsoleError::Validation)?;

        let editing = {
            let view = lock_view(&self.view);
            match &*view {
                ViewMode::Create => None,
                ViewMode::Edit(license) => Some(license.id),
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
            Some(id) => api::licenses::update(client, id, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to update license"))?,
            None => api::licenses::create(client, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to create license"))?,
        };
        info!(id = saved.id, license_key = %saved.license_key, "license saved");

        let _ = self.load().await;
        if let Err(e) = lock_view(&self.view).submitted() {
            debug!(error = %e, "view changed while saving");
        }
        Ok(saved)
    }

    pub async fn delete(&self, license: &License) -> Result<()> {
        if !self
            .state
            .interaction
            .confirm("Delete this license? This cannot be undone.")
        {
            return Err(ConsoleError::Cancelled);
        }
        api::licenses::delete(&self.state.client, license.id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to delete license"))?;
        info!(id = license.id, "license deleted");

        {
            let mut view = lock_view(&self.view);
            if view.selected().map(|l| l.id) == Some(license.id) {
                view.cancel();
            }
        }
        let _ = self.load().await;
        Ok(())
    }

    pub async fn activate(&self, id: i64, request: &ActivateLicenseRequest) -> Result<MessageResponse> {
        let response = api::licenses::activate(&self.state.client, id, request)
            .await
            .map_err(|e| report(&self.state, e, "Failed to activate license"))?;
        info!(id, "license activated");
        let _ = self.load().await;
        Ok(response)
    }

    pub async fn revoke(&self, id: i64) -> Result<MessageResponse> {
        if !self
            .state
            .interaction
            .confirm("Revoke this license? Deployments using it will stop validating.")
        {
            return Err(ConsoleError::Cancelled);
        }
        let response = api::licenses::revoke(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to revoke license"))?;
        info!(id, "license revoked");
        let _ = self.load().await;
        Ok(response)
    }

    /// An unknown key is a normal answer (`valid: false`), not a failure.
    pub async fn validate(&self, request: &ValidateLicenseRequest) -> Result<LicenseValidation> {
        if request.license_key.trim().is_empty() {
            return Err(ConsoleError::InvalidInput("license key is empty".to_string()));
        }
        let validation = api::licenses::validate(&self.state.client, request)
            .await
            .map_err(|e| report(&self.state, e, "Failed to validate license"))?;
        if !validation.valid {
            warn!(
                reason = validation.error.as_deref().unwrap_or("unspecified"),
                "license did not validate"
            );
        }
        Ok(validation)
    }

    pub async fn usage(&self, license: Option<i64>) -> Result<Vec<LicenseUsage>> {
        let query = LicenseRecordQuery {
            license,
            ..Default::default()
        };
        let page = api::licenses::usage(&self.state.client, &query)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load license usage"))?;
        Ok(page.results)
    }

    pub async fn logs(&self, query: &LicenseRecordQuery) -> Result<Vec<LicenseLog>> {
        let page = api::licenses::logs(&self.state.client, query)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load license logs"))?;
        Ok(page.results)
    }
}
