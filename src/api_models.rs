// API request and response models

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use validator::{Validate, ValidationError};

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{
    BackupFrequency, CustomerStatus, DeploymentType, EnvironmentStatus, GitRepository,
    LicenseAction, LicenseStatus, LicenseType, Role, User,
};

lazy_static! {
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn secret_not_blank(value: &SecretString) -> Result<(), ValidationError> {
    not_blank(value.expose_secret())
}

// Secrets leave memory in clear text only when a request body is written.
fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn expose_optional<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// Login response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

// Customer create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerPayload {
    #[validate(custom(function = "not_blank", message = "Customer ID is required"))]
    pub customer_id: String,
    #[validate(custom(function = "not_blank", message = "Customer name is required"))]
    pub name: String,
    pub company: String,
    #[validate(
        custom(function = "not_blank", message = "Contact email is required"),
        regex(path = *EMAIL_REGEX, message = "Email format is invalid")
    )]
    pub contact_email: String,
    pub contact_phone: String,
    pub deployment_type: DeploymentType,
    pub status: CustomerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_end_date: Option<NaiveDate>,
    pub notes: String,
}

// Environment create/update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnvironmentPayload {
    #[validate(range(min = 1, message = "Select a customer"))]
    pub customer: i64,
    #[validate(custom(function = "not_blank", message = "Release name is required"))]
    pub release_name: String,
    pub namespace: String,
    pub domain: String,

    #[validate(custom(function = "secret_not_blank", message = "Admin password is required"))]
    #[serde(serialize_with = "expose")]
    pub admin_password: SecretString,
    pub odoo_version: String,
    pub workers: u32,
    pub log_level: String,

    pub git_ssh_secret: String,
    pub git_odoo_repository: String,
    pub git_odoo_ref: String,
    pub git_customer_addons: Vec<GitRepository>,

    pub storage_class: String,
    pub storage_size: String,
    pub storage_auto_expand: bool,
    #[validate(range(min = 1, max = 100, message = "Threshold must be between 1 and 100"))]
    pub storage_expand_threshold: u32,
    pub storage_expand_size: String,
    pub storage_max_size: String,

    pub db_enabled: bool,
    pub db_version: String,
    pub db_instances: u32,
    pub db_storage_size: String,
    pub db_cpu_request: String,
    pub db_memory_request: String,
    pub db_cpu_limit: String,
    pub db_memory_limit: String,

    pub external_db_enabled: bool,
    pub external_db_host: String,
    pub external_db_port: u16,
    pub external_db_name: String,
    pub external_db_user: String,

    pub ingress_enabled: bool,
    pub ingress_class: String,
    pub ingress_path: String,
    pub tls_enabled: bool,
    pub tls_secret_name: String,

    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,

    pub limit_request: u32,
    pub limit_memory_hard: String,
    pub limit_memory_soft: String,
    pub proxy_mode: bool,
    pub list_db: bool,
    pub db_filter: String,
}

// License create/update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LicensePayload {
    pub license_type: LicenseType,
    #[validate(range(min = 1, message = "Select a customer"))]
    pub customer: i64,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub max_users: u32,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub max_companies: u32,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub max_storage_gb: u32,
    pub modules_enabled: BTreeSet<String>,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub role: Role,
    pub phone: String,
    pub department: String,
    pub position: String,
    pub can_manage_customers: bool,
    pub can_manage_environments: bool,
    pub can_view_logs: bool,
    pub can_generate_licenses: bool,
}

// User create/update payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(custom(function = "not_blank", message = "Username is required"))]
    pub username: String,
    #[validate(
        custom(function = "not_blank", message = "Email is required"),
        regex(path = *EMAIL_REGEX, message = "Email format is invalid")
    )]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional"
    )]
    pub password: Option<SecretString>,
    pub is_active: bool,
    pub profile: ProfilePayload,
}

// System settings replacement payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SystemSettingsPayload {
    #[validate(custom(function = "not_blank", message = "Site name is required"))]
    pub site_name: String,
    pub site_description: String,
    #[validate(regex(path = *EMAIL_REGEX, message = "Email format is invalid"))]
    pub admin_email: String,
    pub maintenance_mode: bool,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub max_upload_size: u32,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub session_timeout: u32,
    pub backup_enabled: bool,
    pub backup_frequency: BackupFrequency,
    #[validate(range(min = 1, message = "Must be at least 1"))]
    pub log_retention_days: u32,
    pub email_notifications: bool,
    pub smtp_host: String,
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub smtp_port: u16,
    pub smtp_use_tls: bool,
    pub smtp_username: String,
    #[serde(serialize_with = "expose")]
    pub smtp_password: SecretString,
}

// License activation request
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivateLicenseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_ip: Option<String>,
}

// License validation request
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidateLicenseRequest {
    pub license_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_users: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_companies: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_storage_gb: Option<f64>,
}

// License validation response; a 404 also carries `valid: false`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LicenseValidation {
    pub valid: bool,
    pub license_type: Option<LicenseType>,
    pub max_users: Option<u32>,
    pub max_companies: Option<u32>,
    pub max_storage_gb: Option<u32>,
    #[serde(default)]
    pub modules_enabled: BTreeSet<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
    pub error: Option<String>,
}

// Environment health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckResult {
    pub status: EnvironmentStatus,
    #[serde(default)]
    pub message: String,
    pub last_check: Option<DateTime<Utc>>,
}

// Plain `{message}` acknowledgement
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanLogsResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiskUsage {
    pub total: String,
    pub used: String,
    pub available: String,
    pub usage_percent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemInfo {
    pub server_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub database_status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub platform: String,
    pub disk_usage: Option<DiskUsage>,
}

// Paginated response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

// List query parameters. Unset filters are omitted from the query string.

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<DeploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnvironmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LicenseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LicenseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_type: Option<LicenseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LicenseRecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<LicenseAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_REGEX.is_match("a@acme.com"));
        assert!(!EMAIL_REGEX.is_match("a@acme"));
        assert!(!EMAIL_REGEX.is_match("a b@acme.com"));
        assert!(!EMAIL_REGEX.is_match("@acme.com"));
    }

    #[test]
    fn test_secrets_redacted_in_debug_but_sent_on_the_wire() {
        let payload = UserPayload {
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password: Some(SecretString::new("hunter22".to_string())),
            is_active: true,
            profile: ProfilePayload {
                role: Role::Operator,
                phone: String::new(),
                department: String::new(),
                position: String::new(),
                can_manage_customers: false,
                can_manage_environments: false,
                can_view_logs: true,
                can_generate_licenses: false,
            },
        };
        assert!(!format!("{:?}", payload).contains("hunter22"));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["password"], "hunter22");

        let unchanged = UserPayload {
            password: None,
            ..payload
        };
        let value = serde_json::to_value(&unchanged).unwrap();
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_query_omits_unset_filters() {
        let query = CustomerQuery {
            status: Some(CustomerStatus::Trial),
            ..Default::default()
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "trial" }));
    }

    #[test]
    fn test_paginated_decodes_drf_shape() {
        let page: Paginated<serde_json::Value> = serde_json::from_str(
            r#"{"count":1,"next":null,"previous":null,"results":[{"id":1}]}"#,
        )
        .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results.len(), 1);
    }
}
