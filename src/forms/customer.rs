// Customer create/edit form

use chrono::NaiveDate;
use validator::Validate;

use crate::api_models::CustomerPayload;
use crate::forms::FieldErrors;
use crate::models::{Customer, CustomerStatus, DeploymentType};

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerForm {
    data: CustomerPayload,
    errors: FieldErrors,
    editing: bool,
}

impl Default for CustomerForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerForm {
    pub fn new() -> Self {
        Self {
            data: CustomerPayload {
                customer_id: String::new(),
                name: String::new(),
                company: String::new(),
                contact_email: String::new(),
                contact_phone: String::new(),
                deployment_type: DeploymentType::Online,
                status: CustomerStatus::Trial,
                contract_start_date: None,
                contract_end_date: None,
                notes: String::new(),
            },
            errors: FieldErrors::new(),
            editing: false,
        }
    }

    /// Pre-fill from an existing record. The business key is fixed once
    /// created, so `set_customer_id` is ignored while editing.
    pub fn edit(customer: &Customer) -> Self {
        Self {
            data: CustomerPayload {
                customer_id: customer.customer_id.clone(),
                name: customer.name.clone(),
                company: customer.company.clone(),
                contact_email: customer.contact_email.clone(),
                contact_phone: customer.contact_phone.clone(),
                deployment_type: customer.deployment_type,
                status: customer.status,
                contract_start_date: customer.contract_start_date,
                contract_end_date: customer.contract_end_date,
                notes: customer.notes.clone(),
            },
            errors: FieldErrors::new(),
            editing: true,
        }
    }

    pub fn data(&self) -> &CustomerPayload {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_customer_id(&mut self, value: impl Into<String>) {
        if self.editing {
            return;
        }
        self.data.customer_id = value.into();
        self.errors.clear("customer_id");
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.data.name = value.into();
        self.errors.clear("name");
    }

    pub fn set_company(&mut self, value: impl Into<String>) {
        self.data.company = value.into();
        self.errors.clear("company");
    }

    pub fn set_contact_email(&mut self, value: impl Into<String>) {
        self.data.contact_email = value.into();
        self.errors.clear("contact_email");
    }

    pub fn set_contact_phone(&mut self, value: impl Into<String>) {
        self.data.contact_phone = value.into();
        self.errors.clear("contact_phone");
    }

    pub fn set_deployment_type(&mut self, value: DeploymentType) {
        self.data.deployment_type = value;
        self.errors.clear("deployment_type");
    }

    pub fn set_status(&mut self, value: CustomerStatus) {
        self.data.status = value;
        self.errors.clear("status");
    }

    pub fn set_contract_start_date(&mut self, value: Option<NaiveDate>) {
        self.data.contract_start_date = value;
        self.errors.clear("contract_start_date");
    }

    pub fn set_contract_end_date(&mut self, value: Option<NaiveDate>) {
        self.data.contract_end_date = value;
        self.errors.clear("contract_end_date");
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        self.data.notes = value.into();
        self.errors.clear("notes");
    }

    /// Run every rule, replace the error map, and hand back the payload
    /// only when nothing failed.
    pub fn validate_form(&mut self) -> Result<CustomerPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.data.validate() {
            errors.extend_from(&e);
        }

        if let (Some(start), Some(end)) = (self.data.contract_start_date, self.data.contract_end_date) {
            if start >= end {
                errors.add(
                    "contract_end_date",
                    "Contract end date must be after the start date",
                );
            }
        }

        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(self.data.clone())
        } else {
            Err(errors)
        }
    }
}
