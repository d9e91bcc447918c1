// Customers page controller

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::api;
use crate::api_models::CustomerQuery;
use crate::error::{ConsoleError, Result};
use crate::forms::customer::CustomerForm;
use crate::forms::license::QuickLicense;
use crate::handlers::{non_empty, report, today};
use crate::middleware::ConsoleState;
use crate::models::{Customer, CustomerStatus, DeploymentType, License};
use crate::view::{lock_view, Listing, Mount, ViewError, ViewMode};

pub const LOAD_FAILED: &str = "Failed to load customers";

pub struct CustomersPage {
    state: ConsoleState,
    mount: Mount,
    list: Listing<Customer, CustomerQuery>,
    view: Mutex<ViewMode<Customer>>,
}

impl CustomersPage {
    pub fn new(state: ConsoleState) -> Self {
        let mount = Mount::default();
        Self {
            state,
            list: Listing::new(CustomerQuery::default(), mount.clone()),
            mount,
            view: Mutex::new(ViewMode::List),
        }
    }

    pub fn listing(&self) -> &Listing<Customer, CustomerQuery> {
        &self.list
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.list.items()
    }

    pub fn view(&self) -> ViewMode<Customer> {
        lock_view(&self.view).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Fetch the list with the current filters. Also the retry action
    /// after a failed load.
    pub async fn load(&self) -> Result<()> {
        let client = self.state.client.clone();
        self.list
            .refresh(
                move |query| async move { api::customers::list(&client, &query).await },
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

    pub async fn filter_status(&self, status: Option<CustomerStatus>) -> Result<()> {
        if self.list.update_filter(|q| q.status = status) {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn filter_deployment_type(&self, deployment_type: Option<DeploymentType>) -> Result<()> {
        if self.list.update_filter(|q| q.deployment_type = deployment_type) {
            self.load().await?;
        }
        Ok(())
    }

    pub fn open_create(&self) -> Result<CustomerForm> {
        lock_view(&self.view).open_create()?;
        Ok(CustomerForm::new())
    }

    /// Load the full record and show it.
    pub async fn open_detail(&self, id: i64) -> Result<Customer> {
        let customer = api::customers::get(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load customer"))?;
        if self.mount.is_mounted() {
            lock_view(&self.view).open_detail(customer.clone())?;
        }
        Ok(customer)
    }

    pub fn open_edit(&self, customer: Customer) -> Result<CustomerForm> {
        let form = CustomerForm::edit(&customer);
        lock_view(&self.view).open_edit(customer)?;
        Ok(form)
    }

    pub fn edit_selected(&self) -> Result<CustomerForm> {
        let mut view = lock_view(&self.view);
        view.edit_selected()?;
        view.selected()
            .map(CustomerForm::edit)
            .ok_or(ConsoleError::NoSelection)
    }

    pub fn cancel(&self) {
        lock_view(&self.view).cancel();
    }

    /// Validate, then create or update depending on the current view. An
    /// invalid form never reaches the network.
    pub async fn submit(&self, form: &mut CustomerForm) -> Result<Customer> {
        let payload = form.validate_form().map_err(ConsoleError::Validation)?;

        let editing = {
            let view = lock_view(&self.view);
            match &*view {
                ViewMode::Create => None,
                ViewMode::Edit(customer) => Some(customer.id),
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
            Some(id) => api::customers::update(client, id, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to update customer"))?,
            None => api::customers::create(client, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to create customer"))?,
        };
        info!(id = saved.id, customer_id = %saved.customer_id, "customer saved");

        // A failed reload is recorded on the list itself.
        let _ = self.load().await;
        if let Err(e) = lock_view(&self.view).submitted() {
            debug!(error = %e, "view changed while saving");
        }
        Ok(saved)
    }

    pub async fn delete(&self, customer: &Customer) -> Result<()> {
        let message = format!(
            "Delete customer \"{}\"? This cannot be undone.",
            customer.name
        );
        if !self.state.interaction.confirm(&message) {
            return Err(ConsoleError::Cancelled);
        }

        api::customers::delete(&self.state.client, customer.id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to delete customer"))?;
        info!(id = customer.id, customer_id = %customer.customer_id, "customer deleted");

        {
            let mut view = lock_view(&self.view);
            if view.selected().map(|c| c.id) == Some(customer.id) {
                view.cancel();
            }
        }
        let _ = self.load().await;
        Ok(())
    }

    /// Issue a standard license for the offline customer shown in detail,
    /// valid for an operator-supplied number of days.
    pub async fn generate_license(&self) -> Result<License> {
        let customer = match &*lock_view(&self.view) {
            ViewMode::Detail(customer) => customer.clone(),
            _ => return Err(ConsoleError::NoSelection),
        };
        if customer.deployment_type != DeploymentType::Offline {
            return Err(ConsoleError::InvalidInput(
                "licenses are only generated for offline customers".to_string(),
            ));
        }

        let input = self
            .state
            .interaction
            .prompt("License validity (days)", Some(QuickLicense::DEFAULT_DAYS))
            .ok_or(ConsoleError::Cancelled)?;
        let Some(payload) = QuickLicense::from_days(&customer, &input, today()) else {
            warn!(input = %input, "rejected license validity");
            self.state.interaction.alert("Please enter a valid number of days");
            return Err(ConsoleError::InvalidInput(format!("invalid day count: {}", input)));
        };

        let license = api::licenses::create(&self.state.client, &payload)
            .await
            .map_err(|e| report(&self.state, e, "Failed to generate license"))?;
        info!(
            customer_id = %customer.customer_id,
            license_key = %license.license_key,
            "license generated"
        );
        self.state.interaction.alert("License generated");
        Ok(license)
    }
}
