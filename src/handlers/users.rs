// Users page controller

use std::sync::Mutex;

use secrecy::SecretString;
use tracing::{debug, info};

use crate::api;
use crate::api_models::{ProfilePayload, UserQuery};
use crate::error::{ConsoleError, Result};
use crate::forms::user::UserForm;
use crate::handlers::{non_empty, report};
use crate::middleware::ConsoleState;
use crate::models::{Role, User};
use crate::view::{lock_view, Listing, Mount, ViewError, ViewMode};

pub const LOAD_FAILED: &str = "Failed to load users";

pub struct UsersPage {
    state: ConsoleState,
    mount: Mount,
    list: Listing<User, UserQuery>,
    view: Mutex<ViewMode<User>>,
}

impl UsersPage {
    pub fn new(state: ConsoleState) -> Self {
        let mount = Mount::default();
        Self {
            state,
            list: Listing::new(UserQuery::default(), mount.clone()),
            mount,
            view: Mutex::new(ViewMode::List),
        }
    }

    pub fn listing(&self) -> &Listing<User, UserQuery> {
        &self.list
    }

    pub fn users(&self) -> Vec<User> {
        self.list.items()
    }

    pub fn view(&self) -> ViewMode<User> {
        lock_view(&self.view).clone()
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub async fn load(&self) -> Result<()> {
        let client = self.state.client.clone();
        self.list
            .refresh(
                move |query| async move { api::users::list(&client, &query).await },
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

    pub async fn filter_role(&self, role: Option<Role>) -> Result<()> {
        if self.list.update_filter(|q| q.role = role) {
            self.load().await?;
        }
        Ok(())
    }

    pub fn open_create(&self) -> Result<UserForm> {
        lock_view(&self.view).open_create()?;
        Ok(UserForm::new())
    }

    pub async fn open_detail(&self, id: i64) -> Result<User> {
        let user = api::users::get(&self.state.client, id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to load user"))?;
        if self.mount.is_mounted() {
            lock_view(&self.view).open_detail(user.clone())?;
        }
        Ok(user)
    }

    pub fn open_edit(&self, user: User) -> Result<UserForm> {
        let form = UserForm::edit(&user);
        lock_view(&self.view).open_edit(user)?;
        Ok(form)
    }

    pub fn edit_selected(&self) -> Result<UserForm> {
        let mut view = lock_view(&self.view);
        view.edit_selected()?;
        view.selected()
            .map(UserForm::edit)
            .ok_or(ConsoleError::NoSelection)
    }

    pub fn cancel(&self) {
        lock_view(&self.view).cancel();
    }

    pub async fn submit(&self, form: &mut UserForm) -> Result<User> {
        let payload = form.validate_form().map_err(ConsoleError::Validation)?;

        let editing = {
            let view = lock_view(&self.view);
            match &*view {
                ViewMode::Create => None,
                ViewMode::Edit(user) => Some(user.id),
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
            Some(id) => api::users::update(client, id, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to update user"))?,
            None => api::users::create(client, &payload)
                .await
                .map_err(|e| report(&self.state, e, "Failed to create user"))?,
        };
        info!(id = saved.id, username = %saved.username, "user saved");

        let _ = self.load().await;
        if let Err(e) = lock_view(&self.view).submitted() {
            debug!(error = %e, "view changed while saving");
        }
        Ok(saved)
    }

    pub async fn delete(&self, user: &User) -> Result<()> {
        if !self
            .state
            .interaction
            .confirm("Delete this user? This cannot be undone.")
        {
            return Err(ConsoleError::Cancelled);
        }
        api::users::delete(&self.state.client, user.id)
            .await
            .map_err(|e| report(&self.state, e, "Failed to delete user"))?;
        info!(id = user.id, username = %user.username, "user deleted");

        {
            let mut view = lock_view(&self.view);
            if view.selected().map(|u| u.id) == Some(user.id) {
                view.cancel();
            }
        }
        let _ = self.load().await;
        Ok(())
    }

    /// Prompt for a new password; an empty or dismissed prompt sends nothing.
    pub async fn reset_password(&self, id: i64) -> Result<()> {
        let password = self
            .state
            .interaction
            .prompt("New password", None)
            .filter(|p| !p.is_empty())
            .ok_or(ConsoleError::Cancelled)?;

        api::users::reset_password(&self.state.client, id, &SecretString::new(password))
            .await
            .map_err(|e| report(&self.state, e, "Failed to reset password"))?;
        info!(id, "password reset");
        self.state.interaction.alert("Password reset");
        Ok(())
    }

    pub async fn update_profile(&self, id: i64, profile: &ProfilePayload) -> Result<()> {
        api::users::update_profile(&self.state.client, id, profile)
            .await
            .map_err(|e| report(&self.state, e, "Failed to update profile"))?;
        info!(id, role = %profile.role, "profile updated");
        let _ = self.load().await;
        Ok(())
    }
}
