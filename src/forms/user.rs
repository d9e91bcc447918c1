// User account form

use secrecy::SecretString;
use validator::Validate;

use crate::api_models::{ProfilePayload, UserPayload};
use crate::forms::FieldErrors;
use crate::models::{Role, User};

#[derive(Debug, Clone)]
pub struct UserForm {
    data: UserPayload,
    errors: FieldErrors,
    editing: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UserForm {
    pub fn new() -> Self {
        Self {
            data: UserPayload {
                username: String::new(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password: None,
                is_active: true,
                profile: ProfilePayload {
                    role: Role::Viewer,
                    phone: String::new(),
                    department: String::new(),
                    position: String::new(),
                    can_manage_customers: false,
                    can_manage_environments: false,
                    can_view_logs: true,
                    can_generate_licenses: false,
                },
            },
            errors: FieldErrors::new(),
            editing: false,
        }
    }

    pub fn edit(user: &User) -> Self {
        let mut form = Self::new();
        form.editing = true;
        form.data.username = user.username.clone();
        form.data.email = user.email.clone();
        form.data.first_name = user.first_name.clone();
        form.data.last_name = user.last_name.clone();
        form.data.is_active = user.is_active;
        if let Some(p) = &user.profile {
            form.data.profile = ProfilePayload {
                role: p.role,
                phone: p.phone.clone(),
                department: p.department.clone(),
                position: p.position.clone(),
                can_manage_customers: p.can_manage_customers,
                can_manage_environments: p.can_manage_environments,
                can_view_logs: p.can_view_logs,
                can_generate_licenses: p.can_generate_licenses,
            };
        }
        form
    }

    pub fn data(&self) -> &UserPayload {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.data.username = value.into();
        self.errors.clear("username");
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.data.email = value.into();
        self.errors.clear("email");
    }

    pub fn set_names(&mut self, first: impl Into<String>, last: impl Into<String>) {
        self.data.first_name = first.into();
        self.data.last_name = last.into();
    }

    /// An empty password on edit means "leave unchanged".
    pub fn set_password(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.data.password = if value.is_empty() {
            None
        } else {
            Some(SecretString::new(value))
        };
        self.errors.clear("password");
    }

    pub fn set_active(&mut self, active: bool) {
        self.data.is_active = active;
    }

    /// Role is stored as given; capability flags are not touched.
    pub fn set_role(&mut self, role: Role) {
        self.data.profile.role = role;
    }

    pub fn profile_mut(&mut self) -> &mut ProfilePayload {
        &mut self.data.profile
    }

    pub fn validate_form(&mut self) -> Result<UserPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.data.validate() {
            errors.extend_from(&e);
        }
        if !self.editing && self.data.password.is_none() {
            errors.add("password", "Password is required");
        }

        self.errors = errors.clone();
        if errors.is_empty() {
            Ok(self.data.clone())
        } else {
            Err(errors)
        }
    }
}
