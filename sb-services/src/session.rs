//! Session management: token persistence and the signed-in user.
//!
//! The session is an explicit value. Front ends read it from
//! `SessionService::state` instead of probing stored tokens themselves.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{info, warn};

use sb_api::ApiClient;
use sb_core::error::{SbError, SbResult};
use sb_models::{Credentials, Registration, SocialLogin, TokenPair, User};

use crate::event_bus::{AppEvent, EventBus, NoticeLevel};

/// File-backed storage for the access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored pair. A missing file means no session; an
    /// unreadable one is logged and treated the same way.
    pub fn load(&self) -> SbResult<Option<TokenPair>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<TokenPair>(&contents) {
            Ok(tokens) if !tokens.access.is_empty() => Ok(Some(tokens)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("ignoring unreadable token file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    pub fn save(&self, tokens: &TokenPair) -> SbResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, contents)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    /// Remove the stored pair. Removing an absent file is not an error.
    pub fn clear(&self) -> SbResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> SbResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> SbResult<()> {
    Ok(())
}

/// Whether someone is signed in, and who.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { user: User },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user } => Some(user),
            Self::Anonymous => None,
        }
    }
}

/// Owns the session lifecycle: restore, login, logout.
pub struct SessionService {
    api: ApiClient,
    store: TokenStore,
    state: RwLock<SessionState>,
    bus: EventBus,
}

impl SessionService {
    pub fn new(api: ApiClient, store: TokenStore, bus: EventBus) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(SessionState::Anonymous),
            bus,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Access token of the current session, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.api.access_token().await
    }

    /// Resume a stored session.
    ///
    /// Stored tokens are installed and checked against `/me/`. If the
    /// server rejects them they are removed and the session is anonymous;
    /// transport failures are returned and the tokens kept.
    pub async fn restore(&self) -> SbResult<SessionState> {
        let Some(tokens) = self.store.load()? else {
            return Ok(SessionState::Anonymous);
        };
        self.api.set_tokens(tokens).await;

        match self.api.me().await {
            Ok(user) => {
                info!("restored session for {}", user.username);
                Ok(self.set_authenticated(user).await)
            }
            Err(e) if e.is_auth_failure() => {
                info!("stored session rejected, signing out");
                self.drop_session().await?;
                Ok(SessionState::Anonymous)
            }
            Err(e) => Err(e),
        }
    }

    /// Sign in with a username and password.
    pub async fn login(&self, credentials: &Credentials) -> SbResult<User> {
        let tokens = self.api.obtain_tokens(credentials).await?;
        self.start_session(tokens).await
    }

    /// Sign in with a third-party access token.
    pub async fn social_login(&self, login: &SocialLogin) -> SbResult<User> {
        let tokens = self.api.social_login(login).await?;
        self.start_session(tokens).await
    }

    /// Create an account, then sign in with it.
    pub async fn register_and_login(&self, registration: &Registration) -> SbResult<User> {
        self.api.register(registration).await?;
        info!("registered {}", registration.username);
        self.login(&Credentials {
            username: registration.username.clone(),
            password: registration.password.clone(),
        })
        .await
    }

    /// End the session and forget the stored tokens.
    pub async fn logout(&self) -> SbResult<()> {
        self.drop_session().await?;
        info!("signed out");
        Ok(())
    }

    /// React to a rejected token elsewhere in the app.
    pub async fn expire(&self) -> SbResult<()> {
        self.drop_session().await?;
        self.bus
            .notice(NoticeLevel::Warning, "Session expired, please sign in again");
        Ok(())
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub async fn require_user(&self) -> SbResult<User> {
        self.state
            .read()
            .await
            .user()
            .cloned()
            .ok_or(SbError::NotAuthenticated)
    }

    async fn start_session(&self, tokens: TokenPair) -> SbResult<User> {
        self.api.set_tokens(tokens.clone()).await;
        let user = match self.api.me().await {
            Ok(user) => user,
            Err(e) => {
                self.api.clear_tokens().await;
                return Err(e);
            }
        };
        self.store.save(&tokens)?;
        info!("signed in as {}", user.username);
        self.set_authenticated(user.clone()).await;
        Ok(user)
    }

    async fn set_authenticated(&self, user: User) -> SessionState {
        let username = user.username.clone();
        let state = SessionState::Authenticated { user };
        *self.state.write().await = state.clone();
        self.bus.emit(AppEvent::SessionChanged {
            authenticated: true,
            username: Some(username),
        });
        state
    }

    async fn drop_session(&self) -> SbResult<()> {
        self.store.clear()?;
        self.api.clear_tokens().await;
        *self.state.write().await = SessionState::Anonymous;
        self.bus.emit(AppEvent::SessionChanged {
            authenticated: false,
            username: None,
        });
        Ok(())
    }
}
