// License issuance form, tier defaults and quick generation

use std::collections::BTreeSet;

use chrono::{Duration, Months, NaiveDate};
use validator::Validate;

use crate::api_models::LicensePayload;
use crate::forms::FieldErrors;
use crate::models::{Customer, License, LicenseType};

/// Default resource caps for a license tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseTier {
    pub max_users: u32,
    pub max_companies: u32,
    pub max_storage_gb: u32,
}

impl LicenseTier {
    pub const fn of(license_type: LicenseType) -> Self {
        let (max_users, max_companies, max_storage_gb) = match license_type {
            LicenseType::Trial => (10, 1, 10),
            LicenseType::Standard => (50, 3, 50),
            LicenseType::Professional => (200, 10, 200),
            LicenseType::Enterprise => (1000, 50, 1000),
        };
        Self {
            max_users,
            max_companies,
            max_storage_gb,
        }
    }
}

/// Selectable modules: (id, label).
pub const AVAILABLE_MODULES: &[(&str, &str)] = &[
    ("base", "Base"),
    ("web", "Web client"),
    ("account", "Accounting"),
    ("sales", "Sales"),
    ("purchase", "Purchase"),
    ("stock", "Inventory"),
    ("project", "Project"),
    ("hr", "Human resources"),
    ("manufacturing", "Manufacturing"),
    ("website", "Website"),
    ("ecommerce", "eCommerce"),
    ("pos", "Point of sale"),
];

const DEFAULT_MODULES: &[&str] = &["base", "web"];

#[derive(Debug, Clone, PartialEq)]
pub struct LicenseForm {
    data: LicensePayload,
    errors: FieldErrors,
}

impl LicenseForm {
    /// A blank trial license valid for one year from `today`.
    pub fn new(today: NaiveDate) -> Self {
        let tier = LicenseTier::of(LicenseType::Trial);
        let valid_until = today
            .checked_add_months(Months::new(12))
            .unwrap_or(today + Duration::days(365));
        Self {
            data: LicensePayload {
                license_type: LicenseType::Trial,
                customer: 0,
                max_users: tier.max_users,
                max_companies: tier.max_companies,
                max_storage_gb: tier.max_storage_gb,
                modules_enabled: DEFAULT_MODULES.iter().map(|m| m.to_string()).collect(),
                valid_from: today,
                valid_until,
                notes: String::new(),
            },
            errors: FieldErrors::new(),
        }
    }

    pub fn edit(license: &License) -> Self {
        Self {
            data: LicensePayload {
                license_type: license.license_type,
                customer: license.customer,
                max_users: license.max_users,
                max_companies: license.max_companies,
                max_storage_gb: license.max_storage_gb,
                modules_enabled: license.modules_enabled.clone(),
                valid_from: license.valid_from.date_naive(),
                valid_until: license.valid_until.date_naive(),
                notes: license.notes.clone(),
            },
            errors: FieldErrors::new(),
        }
    }

    pub fn data(&self) -> &LicensePayload {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Switch tier and overwrite the three caps with the tier's defaults.
    /// Modules, dates and customer are left alone.
    pub fn select_type(&mut self, license_type: LicenseType) {
        let tier = LicenseTier::of(license_type);
        self.data.license_type = license_type;
        self.data.max_users = tier.max_users;
        self.data.max_companies = tier.max_companies;
        self.data.max_storage_gb = tier.max_storage_gb;
        for field in ["license_type", "max_users", "max_companies", "max_storage_gb"] {
            self.errors.clear(field);
        }
    }

    /// Flip membership of `module` in the enabled set.
    pub fn toggle_module(&mut self, module: &str) {
        toggle(&mut self.data.modules_enabled, module);
        self.errors.clear("modules_enabled");
    }

    pub fn set_customer(&mut self, customer: i64) {
        self.data.customer = customer;
        self.errors.clear("customer");
    }

    pub fn set_max_users(&mut self, value: u32) {
        self.data.max_users = value;
        self.errors.clear("max_users");
    }

    pub fn set_max_companies(&mut self, value: u32) {
        self.data.max_companies = value;
        self.errors.clear("max_companies");
    }

    pub fn set_max_storage_gb(&mut self, value: u32) {
        self.data.max_storage_gb = value;
        self.errors.clear("max_storage_gb");
    }

    pub fn set_valid_from(&mut self, value: NaiveDate) {
        self.data.valid_from = value;
        self.errors.clear("valid_from");
    }

    pub fn set_valid_until(&mut self, value: NaiveDate) {
        self.data.valid_until = value;
        self.errors.clear("valid_until");
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        self.data.notes = value.into();
        self.errors.clear("notes");
    }

    pub fn validate_form(&mut self) -> Result<LicensePayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.data.validate() {
            errors.extend_from(&e);
        }
        if self.data.valid_from >= self.data.valid_until {
            errors.add("valid_until", "Expiry date must be after the start date");
        }

        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(self.data.clone())
        } else {
            Err(errors)
        }
    }
}

/// Symmetric-difference toggle over a set of module ids.
pub fn toggle(modules: &mut BTreeSet<String>, module: &str) {
    if !modules.remove(module) {
        modules.insert(module.to_string());
    }
}

/// The date `days` after `from`, if chrono can represent it.
pub fn expiry_after(from: NaiveDate, days: u32) -> Option<NaiveDate> {
    from.checked_add_signed(Duration::days(i64::from(days)))
}

/// One-step license issued from a customer's detail view.
pub struct QuickLicense;

impl QuickLicense {
    pub const DEFAULT_DAYS: &'static str = "365";
    const MODULES: &'static [&'static str] = &["sale", "purchase", "inventory"];

    /// Parse the operator's day count; anything that is not a positive
    /// integer is refused before a request is built.
    pub fn parse_days(input: &str) -> Option<u32> {
        match input.trim().parse::<i64>() {
            Ok(days) if days > 0 => u32::try_from(days).ok(),
            _ => None,
        }
    }

    /// `None` when the expiry falls past the last representable date.
    pub fn build(customer: &Customer, days: u32, today: NaiveDate) -> Option<LicensePayload> {
        let valid_until = expiry_after(today, days)?;
        Some(LicensePayload {
            license_type: LicenseType::Standard,
            customer: customer.id,
            max_users: 50,
            max_companies: 3,
            max_storage_gb: 100,
            modules_enabled: Self::MODULES.iter().map(|m| m.to_string()).collect(),
            valid_from: today,
            valid_until,
            notes: format!("Generated for customer {}", customer.name),
        })
    }

    pub fn from_days(customer: &Customer, input: &str, today: NaiveDate) -> Option<LicensePayload> {
        Self::parse_days(input).and_then(|days| Self::build(customer, days, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerStatus, DeploymentType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_new_form_defaults() {
        let form = LicenseForm::new(today());
        let data = form.data();
        assert_eq!(data.license_type, LicenseType::Trial);
        assert_eq!((data.max_users, data.max_companies, data.max_storage_gb), (10, 1, 10));
        assert!(data.modules_enabled.contains("base"));
        assert!(data.modules_enabled.contains("web"));
        assert_eq!(data.valid_until, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    }

    #[test]
    fn test_select_type_overwrites_caps_only() {
        let expected = [
            (LicenseType::Trial, (10, 1, 10)),
            (LicenseType::Standard, (50, 3, 50)),
            (LicenseType::Professional, (200, 10, 200)),
            (LicenseType::Enterprise, (1000, 50, 1000)),
        ];
        for (license_type, caps) in expected {
            let mut form = LicenseForm::new(today());
            form.set_customer(4);
            form.set_max_users(7777);
            form.toggle_module("pos");
            let modules = form.data().modules_enabled.clone();
            let dates = (form.data().valid_from, form.data().valid_until);

            form.select_type(license_type);

            let data = form.data();
            assert_eq!((data.max_users, data.max_companies, data.max_storage_gb), caps);
            assert_eq!(data.license_type, license_type);
            assert_eq!(data.modules_enabled, modules);
            assert_eq!((data.valid_from, data.valid_until), dates);
            assert_eq!(data.customer, 4);
        }
    }

    #[test]
    fn test_caps_can_be_overridden_after_selection() {
        let mut form = LicenseForm::new(today());
        form.set_customer(1);
        form.select_type(LicenseType::Enterprise);
        form.set_max_users(3);
        let payload = form.validate_form().unwrap();
        assert_eq!(payload.max_users, 3);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut form = LicenseForm::new(today());
        let original = form.data().modules_enabled.clone();
        for module in ["base", "hr", "pos"] {
            form.toggle_module(module);
            assert_ne!(form.data().modules_enabled, original);
            form.toggle_module(module);
            assert_eq!(form.data().modules_enabled, original);
        }
    }

    #[test]
    fn test_validation_requires_customer_and_order() {
        let mut form = LicenseForm::new(today());
        form.set_valid_until(today());
        form.set_max_companies(0);
        let errors = form.validate_form().unwrap_err();
        assert_eq!(errors.get("customer"), Some("Select a customer"));
        assert!(errors.contains("valid_until"));
        assert!(errors.contains("max_companies"));
    }

    #[test]
    fn test_quick_license_days() {
        assert_eq!(QuickLicense::parse_days("30"), Some(30));
        assert_eq!(QuickLicense::parse_days(" 365 "), Some(365));
        assert_eq!(QuickLicense::parse_days("0"), None);
        assert_eq!(QuickLicense::parse_days("-5"), None);
        assert_eq!(QuickLicense::parse_days("abc"), None);
        assert_eq!(QuickLicense::parse_days(""), None);
    }

    #[test]
    fn test_quick_license_payload() {
        let customer = Customer {
            id: 12,
            customer_id: "C12".into(),
            name: "Offline Co".into(),
            company: String::new(),
            contact_email: "o@off.co".into(),
            contact_phone: String::new(),
            deployment_type: DeploymentType::Offline,
            status: CustomerStatus::Active,
            contract_start_date: None,
            contract_end_date: None,
            notes: String::new(),
            created_at: None,
            updated_at: None,
            environments_count: 0,
            is_active: true,
        };
        let payload = QuickLicense::from_days(&customer, "30", today()).unwrap();
        assert_eq!(payload.customer, 12);
        assert_eq!(payload.license_type, LicenseType::Standard);
        assert_eq!(payload.valid_until, NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        assert_eq!(payload.modules_enabled.len(), 3);
        assert!(QuickLicense::from_days(&customer, "soon", today()).is_none());
    }

    #[test]
    fn test_day_count_past_calendar_is_refused() {
        assert_eq!(QuickLicense::parse_days("100000000"), Some(100_000_000));
        assert!(expiry_after(today(), 100_000_000).is_none());
        assert_eq!(
            expiry_after(today(), 365),
            NaiveDate::from_ymd_opt(2026, 3, 10)
        );
    }
}
