// Route protection and the shared console context

use std::sync::Arc;

use crate::auth::{FileTokenStore, Session, TokenStore};
use crate::client::ApiClient;
use crate::config::Config;
use crate::interaction::Interaction;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// What a protected view should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Session restore still in flight; show a loading state.
    Wait,
    Proceed,
    /// Go to the login entry point, remembering where the operator was.
    Redirect { to: &'static str, from: String },
}

pub fn protect(session: &Session, location: &str) -> Navigation {
    if session.is_loading() {
        return Navigation::Wait;
    }
    if !session.is_authenticated() {
        return Navigation::Redirect {
            to: LOGIN_ROUTE,
            from: location.to_string(),
        };
    }
    Navigation::Proceed
}

/// Where to land after a successful login.
pub fn post_login_target(from: Option<&str>) -> String {
    match from {
        Some(path) if !path.is_empty() && path != LOGIN_ROUTE => path.to_string(),
        _ => HOME_ROUTE.to_string(),
    }
}

// Application state handed to every page controller
#[derive(Clone)]
pub struct ConsoleState {
    pub client: ApiClient,
    pub session: Arc<Session>,
    pub interaction: Arc<dyn Interaction>,
    pub config: Arc<Config>,
}

impl ConsoleState {
    pub fn new(config: Config, interaction: Arc<dyn Interaction>) -> Self {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(
            &config.session.token_dir,
            &config.session.token_key,
        ));
        Self::with_store(config, store, interaction)
    }

    pub fn with_store(
        config: Config,
        store: Arc<dyn TokenStore>,
        interaction: Arc<dyn Interaction>,
    ) -> Self {
        let client = ApiClient::new(config.api.base_url.clone());
        let session = Arc::new(Session::new(client.clone(), store));
        Self {
            client,
            session,
            interaction,
            config: Arc::new(config),
        }
    }
}
