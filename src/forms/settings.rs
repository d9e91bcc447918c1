// System settings form and log-retention input

use validator::Validate;

use crate::api_models::SystemSettingsPayload;
use crate::forms::FieldErrors;
use crate::models::SystemSettings;

pub const DEFAULT_RETENTION_DAYS: &str = "30";

/// Settings are replaced wholesale, so the form always carries every field.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    data: SystemSettingsPayload,
    errors: FieldErrors,
}

impl SettingsForm {
    pub fn from_settings(s: &SystemSettings) -> Self {
        Self {
            data: SystemSettingsPayload {
                site_name: s.site_name.clone(),
                site_description: s.site_description.clone(),
                admin_email: s.admin_email.clone(),
                maintenance_mode: s.maintenance_mode,
                max_upload_size: s.max_upload_size,
                session_timeout: s.session_timeout,
                backup_enabled: s.backup_enabled,
                backup_frequency: s.backup_frequency,
                log_retention_days: s.log_retention_days,
                email_notifications: s.email_notifications,
                smtp_host: s.smtp_host.clone(),
                smtp_port: s.smtp_port,
                smtp_use_tls: s.smtp_use_tls,
                smtp_username: s.smtp_username.clone(),
                smtp_password: s.smtp_password.clone(),
            },
            errors: FieldErrors::new(),
        }
    }

    pub fn data(&self) -> &SystemSettingsPayload {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Edit any field through `f`; errors on `field` are dropped.
    pub fn update(&mut self, field: &str, f: impl FnOnce(&mut SystemSettingsPayload)) {
        f(&mut self.data);
        self.errors.clear(field);
    }

    pub fn validate_form(&mut self) -> Result<SystemSettingsPayload, FieldErrors> {
        let errors = match self.data.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(&e),
        };
        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(self.data.clone())
        } else {
            Err(errors)
        }
    }
}

/// Parse the retention day count for log cleanup; at least one day.
pub fn parse_retention_days(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|d| *d >= 1)
}
