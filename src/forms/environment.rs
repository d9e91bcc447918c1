// Environment configuration form

use rand::Rng;
use secrecy::SecretString;
use validator::Validate;

use crate::api_models::EnvironmentPayload;
use crate::config::EnvironmentSettings;
use crate::forms::{FieldErrors, FormWarning};
use crate::models::{Environment, GitRepository};

/// Which part of an addon entry an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryField {
    Name,
    Repository,
    Ref,
}

#[derive(Debug, Clone)]
pub struct EnvironmentForm {
    data: EnvironmentPayload,
    errors: FieldErrors,
    settings: EnvironmentSettings,
}

impl EnvironmentForm {
    pub fn new(settings: EnvironmentSettings) -> Self {
        let blank_addon = blank_repository(&settings);
        let data = EnvironmentPayload {
            customer: 0,
            release_name: String::new(),
            namespace: "odoo".to_string(),
            domain: String::new(),

            admin_password: SecretString::new(String::new()),
            odoo_version: "18.0".to_string(),
            workers: 0,
            log_level: "info".to_string(),

            git_ssh_secret: "global-git-ssh-key".to_string(),
            git_odoo_repository: "git@github.com:ShanghaiMeowAI/MeowCloud.git".to_string(),
            git_odoo_ref: "18.0".to_string(),
            git_customer_addons: vec![blank_addon],

            storage_class: "longhorn-expandable".to_string(),
            storage_size: "10Gi".to_string(),
            storage_auto_expand: true,
            storage_expand_threshold: 85,
            storage_expand_size: "5Gi".to_string(),
            storage_max_size: "50Gi".to_string(),

            db_enabled: true,
            db_version: "16".to_string(),
            db_instances: 1,
            db_storage_size: "5Gi".to_string(),
            db_cpu_request: "100m".to_string(),
            db_memory_request: "256Mi".to_string(),
            db_cpu_limit: "500m".to_string(),
            db_memory_limit: "512Mi".to_string(),

            external_db_enabled: false,
            external_db_host: String::new(),
            external_db_port: 5432,
            external_db_name: String::new(),
            external_db_user: String::new(),

            ingress_enabled: false,
            ingress_class: "nginx".to_string(),
            ingress_path: "/".to_string(),
            tls_enabled: false,
            tls_secret_name: String::new(),

            cpu_request: "200m".to_string(),
            memory_request: "512Mi".to_string(),
            cpu_limit: "1000m".to_string(),
            memory_limit: "2Gi".to_string(),

            limit_request: 8192,
            limit_memory_hard: "2684354560".to_string(),
            limit_memory_soft: "2147483648".to_string(),
            proxy_mode: false,
            list_db: false,
            db_filter: String::new(),
        };
        Self {
            data,
            errors: FieldErrors::new(),
            settings,
        }
    }

    /// Pre-fill from an existing environment. The admin password is never
    /// echoed back by the API and has to be re-entered.
    pub fn edit(environment: &Environment, settings: EnvironmentSettings) -> Self {
        let mut form = Self::new(settings);
        let e = environment;
        form.data = EnvironmentPayload {
            customer: e.customer,
            release_name: e.release_name.clone(),
            namespace: e.namespace.clone(),
            domain: e.domain.clone(),
            admin_password: SecretString::new(String::new()),
            odoo_version: e.odoo_version.clone(),
            workers: e.workers,
            log_level: e.log_level.clone(),
            git_ssh_secret: e.git_ssh_secret.clone(),
            git_odoo_repository: e.git_odoo_repository.clone(),
            git_odoo_ref: e.git_odoo_ref.clone(),
            git_customer_addons: e.git_customer_addons.clone(),
            storage_class: e.storage_class.clone(),
            storage_size: e.storage_size.clone(),
            storage_auto_expand: e.storage_auto_expand,
            storage_expand_threshold: e.storage_expand_threshold,
            storage_expand_size: e.storage_expand_size.clone(),
            storage_max_size: e.storage_max_size.clone(),
            db_enabled: e.db_enabled,
            db_version: e.db_version.clone(),
            db_instances: e.db_instances,
            db_storage_size: e.db_storage_size.clone(),
            db_cpu_request: e.db_cpu_request.clone(),
            db_memory_request: e.db_memory_request.clone(),
            db_cpu_limit: e.db_cpu_limit.clone(),
            db_memory_limit: e.db_memory_limit.clone(),
            external_db_enabled: e.external_db_enabled,
            external_db_host: e.external_db_host.clone(),
            external_db_port: e.external_db_port,
            external_db_name: e.external_db_name.clone(),
            external_db_user: e.external_db_user.clone(),
            ingress_enabled: e.ingress_enabled,
            ingress_class: e.ingress_class.clone(),
            ingress_path: e.ingress_path.clone(),
            tls_enabled: e.tls_enabled,
            tls_secret_name: e.tls_secret_name.clone(),
            cpu_request: e.cpu_request.clone(),
            memory_request: e.memory_request.clone(),
            cpu_limit: e.cpu_limit.clone(),
            memory_limit: e.memory_limit.clone(),
            limit_request: e.limit_request,
            limit_memory_hard: e.limit_memory_hard.clone(),
            limit_memory_soft: e.limit_memory_soft.clone(),
            proxy_mode: e.proxy_mode,
            list_db: e.list_db,
            db_filter: e.db_filter.clone(),
        };
        form
    }

    pub fn data(&self) -> &EnvironmentPayload {
        &self.data
    }

    /// Direct access for the many plain configuration fields.
    pub fn data_mut(&mut self) -> &mut EnvironmentPayload {
        &mut self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_customer(&mut self, customer: i64) {
        self.data.customer = customer;
        self.errors.clear("customer");
    }

    /// Set the release name; an empty domain is derived from it. An
    /// operator-entered domain is never overwritten.
    pub fn set_release_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() && self.data.domain.is_empty() {
            self.data.domain = format!("{}.{}", value, self.settings.domain_suffix);
        }
        self.data.release_name = value;
        self.errors.clear("release_name");
    }

    pub fn set_domain(&mut self, value: impl Into<String>) {
        self.data.domain = value.into();
        self.errors.clear("domain");
    }

    pub fn set_admin_password(&mut self, value: impl Into<String>) {
        self.data.admin_password = SecretString::new(value.into());
        self.errors.clear("admin_password");
    }

    /// Fill the admin password with a fresh random one and return it.
    pub fn generate_admin_password(&mut self) -> SecretString {
        let password = SecretString::new(generate_admin_password());
        self.data.admin_password = password.clone();
        self.errors.clear("admin_password");
        password
    }

    pub fn repositories(&self) -> &[GitRepository] {
        &self.data.git_customer_addons
    }

    /// Append a blank entry pointing at the organisation prefix.
    pub fn add_repository(&mut self) {
        let repo = blank_repository(&self.settings);
        self.data.git_customer_addons.push(repo);
        self.errors.clear("git_customer_addons");
    }

    /// Remove the entry at `index`; out-of-range positions are ignored.
    pub fn remove_repository(&mut self, index: usize) -> Option<GitRepository> {
        if index >= self.data.git_customer_addons.len() {
            return None;
        }
        self.errors.clear("git_customer_addons");
        Some(self.data.git_customer_addons.remove(index))
    }

    pub fn update_repository(&mut self, index: usize, field: RepositoryField, value: impl Into<String>) {
        if let Some(repo) = self.data.git_customer_addons.get_mut(index) {
            let value = value.into();
            match field {
                RepositoryField::Name => repo.name = value,
                RepositoryField::Repository => repo.repository = value,
                RepositoryField::Ref => repo.git_ref = value,
            }
            self.errors.clear("git_customer_addons");
        }
    }

    /// Validate for submission. An empty addon list is either a warning or
    /// an error depending on `require_customer_addons`.
    pub fn validate_form(&mut self) -> Result<(EnvironmentPayload, Vec<FormWarning>), FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut warnings = Vec::new();
        if let Err(e) = self.data.validate() {
            errors.extend_from(&e);
        }

        if self.data.git_customer_addons.is_empty() {
            if self.settings.require_customer_addons {
                errors.add(
                    "git_customer_addons",
                    "Add at least one customer addon repository",
                );
            } else {
                warnings.push(FormWarning::NoCustomerAddons);
            }
        }

        self.errors = errors.clone();
        if errors.is_empty() {
            Ok((self.data.clone(), warnings))
        } else {
            Err(errors)
        }
    }
}

fn blank_repository(settings: &EnvironmentSettings) -> GitRepository {
    GitRepository {
        name: String::new(),
        repository: settings.addon_repository_prefix.clone(),
        git_ref: "main".to_string(),
    }
}

// Generate a random admin password
pub fn generate_admin_password() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
    let mut rng = rand::thread_rng();

    (0..24)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
