use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::db::SessionStorage;
use crate::error::AppError;
use crate::models::{ProfileUpdate, SignupDraft, User};
use crate::remote::HostelApi;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub identity: Option<User>,
}

/// Authenticated identity and bearer token.
///
/// Dependents subscribe to state changes; the entity cache uses this to clear
/// itself on logout and to refetch when a token shows up.
pub struct SessionStore {
    api: HostelApi,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: HostelApi, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, storage, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn identity(&self) -> Option<User> {
        self.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().identity.is_some()
    }

    /// Picks up a persisted token and refreshes the profile behind it.
    ///
    /// Returns the last-known profile so a caller can render something while the
    /// refresh is in flight. It is never installed as the identity.
    pub async fn restore(&self) -> Result<Option<User>, AppError> {
        let last_known = self.storage.load_profile().await?;
        let Some(token) = self.storage.load_token().await? else {
            return Ok(last_known);
        };

        self.state.send_modify(|s| s.token = Some(token.clone()));
        self.refresh_profile(Some(&token)).await;
        Ok(last_known)
    }

    /// Never fails: a rejected login and an unreachable backend both yield `false`.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let token = match self.api.login(email, password).await {
            Ok(token) => token,
            Err(e) => {
                warn!("login failed for {}: {}", email, e);
                return false;
            }
        };

        if let Err(e) = self.storage.save_token(&token).await {
            error!("failed to persist access token: {}", e);
        }
        self.state.send_modify(|s| s.token = Some(token.clone()));

        self.refresh_profile(Some(&token)).await;
        info!("logged in as {}", email);
        true
    }

    pub async fn signup(&self, draft: &SignupDraft) -> bool {
        match self.api.signup(draft).await {
            Ok(()) => true,
            Err(e) => {
                warn!("signup failed for {}: {}", draft.email, e);
                false
            }
        }
    }

    /// In-memory state is cleared before the first await, so readers observe the
    /// logout immediately. Calling it twice is harmless.
    pub async fn logout(&self) {
        self.state.send_if_modified(|s| {
            let changed = s.token.is_some() || s.identity.is_some();
            *s = SessionState::default();
            changed
        });

        if let Err(e) = self.storage.clear().await {
            error!("failed to clear persisted session: {}", e);
        }
    }

    /// Best-effort: any failure leaves the previous identity in place.
    pub async fn refresh_profile(&self, token: Option<&str>) {
        let token = match token {
            Some(t) => Some(t.to_string()),
            None => match self.token() {
                Some(t) => Some(t),
                None => self.storage.load_token().await.unwrap_or_else(|e| {
                    warn!("failed to read persisted token: {}", e);
                    None
                }),
            },
        };
        let Some(token) = token else {
            return;
        };

        let profile = match self.api.me(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("refresh_profile failed: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.save_profile(&profile).await {
            error!("failed to persist profile: {}", e);
        }
        self.state.send_modify(|s| s.identity = Some(profile));
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), AppError> {
        if update.name.trim().is_empty() || update.email.trim().is_empty() {
            return Err(AppError::BadRequest("Name and email are required".to_string()));
        }
        let token = self
            .token()
            .ok_or_else(|| AppError::Unauthorized("Please login to update your profile".to_string()))?;

        self.api.update_profile(&token, update).await?;
        self.refresh_profile(Some(&token)).await;
        Ok(())
    }
}
