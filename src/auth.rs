// Session handling for the console

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::api;
use crate::client::ApiClient;
use crate::error::AuthError;
use crate::models::User;

/// Durable storage for the bearer token, keyed by a fixed name.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> io::Result<Option<SecretString>>;
    fn save(&self, token: &SecretString) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Token kept in `<dir>/<key>`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(key),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<SecretString>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::new(token.to_string())))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &SecretString) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.expose_secret())
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Process-local store, for tests and one-shot scripts.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<SecretString>> {
        let slot = self.slot.lock().map_err(|_| io::Error::other("token store poisoned"))?;
        Ok(slot.clone().map(SecretString::new))
    }

    fn save(&self, token: &SecretString) -> io::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| io::Error::other("token store poisoned"))?;
        *slot = Some(token.expose_secret().clone());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| io::Error::other("token store poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// The signed-in operator. Authentication is the presence of a loaded
/// user, never the mere presence of a token.
pub struct Session {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    user: RwLock<Option<User>>,
    loading: AtomicBool,
}

impl Session {
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            user: RwLock::new(None),
            loading: AtomicBool::new(true),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore a stored token and load the current user. A token the
    /// server no longer accepts is discarded silently.
    pub async fn init(&self) {
        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read stored token");
                None
            }
        };

        if let Some(token) = token {
            self.client.set_token(token);
            match api::users::me(&self.client).await {
                Ok(user) => {
                    info!(username = %user.username, "session restored");
                    self.set_user(Some(user));
                }
                Err(e) => {
                    warn!(error = %e, "stored token rejected, clearing session");
                    self.discard_token();
                }
            }
        }
        self.loading.store(false, Ordering::SeqCst);
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, AuthError> {
        let response = api::auth::login(&self.client, username, password)
            .await
            .map_err(|e| {
                warn!(username, error = %e, "login failed");
                AuthError::LoginFailed(e.user_message("Login failed"))
            })?;

        let token = SecretString::new(response.token);
        self.store.save(&token)?;
        self.client.set_token(token);
        self.set_user(Some(response.user.clone()));
        self.loading.store(false, Ordering::SeqCst);
        info!(username = %response.user.username, "logged in");
        Ok(response.user)
    }

    /// Best-effort server logout; local state is cleared regardless.
    pub async fn logout(&self) {
        if let Err(e) = api::auth::logout(&self.client).await {
            warn!(error = %e, "server logout failed, clearing local session anyway");
        }
        self.discard_token();
        self.set_user(None);
        info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().map(|u| u.is_some()).unwrap_or(false)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    pub fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().ok_or(AuthError::NotAuthenticated)
    }

    fn set_user(&self, user: Option<User>) {
        if let Ok(mut slot) = self.user.write() {
            *slot = user;
        }
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not remove stored token");
        }
        self.client.clear_token();
    }
}
