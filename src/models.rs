// Domain models for the operations console
// These mirror the records served by the operations API; the API owns them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

wire_enum!(DeploymentType {
    Online => "online",
    Offline => "offline",
});

wire_enum!(CustomerStatus {
    Trial => "trial",
    Active => "active",
    Suspended => "suspended",
    Expired => "expired",
});

wire_enum!(EnvironmentStatus {
    Running => "running",
    Stopped => "stopped",
    Error => "error",
    Pending => "pending",
    Unknown => "unknown",
});

wire_enum!(LicenseType {
    Trial => "trial",
    Standard => "standard",
    Professional => "professional",
    Enterprise => "enterprise",
});

wire_enum!(LicenseStatus {
    Active => "active",
    Expired => "expired",
    Revoked => "revoked",
    Pending => "pending",
});

wire_enum!(LicenseAction {
    Generate => "generate",
    Activate => "activate",
    Revoke => "revoke",
    Check => "check",
    Expire => "expire",
});

wire_enum!(Role {
    Admin => "admin",
    Operator => "operator",
    Viewer => "viewer",
});

wire_enum!(BackupFrequency {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub customer_id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    pub deployment_type: DeploymentType,
    pub status: CustomerStatus,
    #[serde(default)]
    pub contract_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub contract_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub environments_count: i64,
    #[serde(default)]
    pub is_active: bool,
}

/// A customer-specific addon repository mounted into an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    pub name: String,
    pub repository: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: String,

    // Identity
    pub release_name: String,
    pub namespace: String,
    #[serde(default)]
    pub domain: String,

    // Odoo runtime
    pub odoo_version: String,
    pub workers: u32,
    pub log_level: String,

    // Source control
    pub git_ssh_secret: String,
    pub git_odoo_repository: String,
    pub git_odoo_ref: String,
    #[serde(default)]
    pub git_customer_addons: Vec<GitRepository>,

    // Storage
    pub storage_class: String,
    pub storage_size: String,
    pub storage_auto_expand: bool,
    pub storage_expand_threshold: u32,
    pub storage_expand_size: String,
    pub storage_max_size: String,

    // Embedded database
    pub db_enabled: bool,
    pub db_version: String,
    pub db_instances: u32,
    pub db_storage_size: String,
    pub db_cpu_request: String,
    pub db_memory_request: String,
    pub db_cpu_limit: String,
    pub db_memory_limit: String,

    // External database
    pub external_db_enabled: bool,
    #[serde(default)]
    pub external_db_host: String,
    pub external_db_port: u16,
    #[serde(default)]
    pub external_db_name: String,
    #[serde(default)]
    pub external_db_user: String,

    // Networking
    pub ingress_enabled: bool,
    pub ingress_class: String,
    pub ingress_path: String,
    pub tls_enabled: bool,
    #[serde(default)]
    pub tls_secret_name: String,

    // Resources
    pub cpu_request: String,
    pub memory_request: String,
    pub cpu_limit: String,
    pub memory_limit: String,

    // Advanced Odoo limits
    pub limit_request: u32,
    pub limit_memory_hard: String,
    pub limit_memory_soft: String,
    pub proxy_mode: bool,
    pub list_db: bool,
    #[serde(default)]
    pub db_filter: String,

    // Backend-owned state
    pub status: EnvironmentStatus,
    pub last_health_check: Option<DateTime<Utc>>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_running: bool,
    pub access_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: i64,
    pub license_key: String,
    pub license_type: LicenseType,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: String,
    pub max_users: u32,
    pub max_companies: u32,
    pub max_storage_gb: u32,
    #[serde(default)]
    pub modules_enabled: BTreeSet<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: LicenseStatus,
    pub activated_at: Option<DateTime<Utc>>,
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hardware_fingerprint: String,
    #[serde(default)]
    pub deployment_domain: String,
    pub deployment_ip: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseUsage {
    pub id: i64,
    pub license: i64,
    #[serde(default)]
    pub license_key: String,
    #[serde(default)]
    pub customer_name: String,
    pub current_users: u32,
    pub current_companies: u32,
    pub current_storage_gb: f64,
    pub access_ip: String,
    #[serde(default)]
    pub user_agent: String,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseLog {
    pub id: i64,
    pub license: i64,
    #[serde(default)]
    pub license_key: String,
    #[serde(default)]
    pub customer_name: String,
    pub action: LicenseAction,
    pub message: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub created_by_name: Option<String>,
}

/// Role and capability flags are both operator-set; neither is derived
/// from the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub role: Role,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    pub can_manage_customers: bool,
    pub can_manage_environments: bool,
    pub can_view_logs: bool,
    pub can_generate_licenses: bool,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_operator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile: Option<UserProfile>,
}

impl User {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user: Option<i64>,
    #[serde(default)]
    pub user_name: String,
    pub action: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default)]
    pub description: String,
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// The SMTP password is read but never written back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    pub id: i64,
    pub site_name: String,
    #[serde(default)]
    pub site_description: String,
    pub admin_email: String,
    pub maintenance_mode: bool,
    pub max_upload_size: u32,
    pub session_timeout: u32,
    pub backup_enabled: bool,
    pub backup_frequency: BackupFrequency,
    pub log_retention_days: u32,
    pub email_notifications: bool,
    #[serde(default)]
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_use_tls: bool,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default = "empty_secret", skip_serializing)]
    pub smtp_password: SecretString,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<i64>,
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

/// Counters merged from the three `stats/` endpoints. Each endpoint fills
/// only its own section, the rest stay zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_customers: u64,
    pub active_customers: u64,
    pub online_customers: u64,
    pub offline_customers: u64,
    pub trial_customers: u64,
    pub expired_customers: u64,

    pub total_environments: u64,
    pub running_environments: u64,
    pub stopped_environments: u64,
    pub error_environments: u64,
    pub pending_environments: u64,

    pub total_licenses: u64,
    pub active_licenses: u64,
    pub expired_licenses: u64,
    pub revoked_licenses: u64,
    pub pending_licenses: u64,
}

impl Stats {
    /// Overlay the non-zero counters of `other` onto `self`.
    pub fn merge(mut self, other: Stats) -> Stats {
        macro_rules! take {
            ($($field:ident),+) => {
                $(if other.$field != 0 { self.$field = other.$field; })+
            };
        }
        take!(
            total_customers, active_customers, online_customers, offline_customers,
            trial_customers, expired_customers, total_environments, running_environments,
            stopped_environments, error_environments, pending_environments, total_licenses,
            active_licenses, expired_licenses, revoked_licenses, pending_licenses
        );
        self
    }
}
