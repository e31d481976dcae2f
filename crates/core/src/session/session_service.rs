use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::watch;

use crate::constants::{AUTH_TOKEN_KEY, AUTH_USER_KEY, TRANSACTIONS_KEY};
use crate::errors::{Result, ValidationError};
use crate::session::session_model::{validate_email, AuthSession, Registration, User};
use crate::session::session_traits::{AuthGateway, SessionServiceTrait};
use crate::settings::StateStoreTrait;

/// One-shot readiness gate for session-dependent caches.
///
/// The gate opens once `restore` has completed (success or failure) or a
/// login/registration has settled the session. It never closes again for the
/// lifetime of the service.
#[derive(Debug, Clone)]
pub struct SessionGate {
    rx: watch::Receiver<bool>,
}

impl SessionGate {
    /// A gate that is already open, for flows that do not go through
    /// `restore` (one-shot tools, tests).
    pub fn open() -> Self {
        let (tx, rx) = watch::channel(true);
        drop(tx);
        SessionGate { rx }
    }

    pub fn is_open(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the session has settled. Returns immediately once open.
    pub async fn ready(&self) {
        let mut rx = self.rx.clone();
        // An Err here means the session service was dropped; there is
        // nothing left to wait for either way.
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Owns the authentication token and current user record.
///
/// The token and user are set and cleared together, never independently:
/// every transition goes through [`SessionService::adopt`] or
/// [`SessionService::clear_local`].
pub struct SessionService {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<dyn StateStoreTrait>,
    user: RwLock<Option<User>>,
    ready_tx: watch::Sender<bool>,
}

impl SessionService {
    pub fn new(gateway: Arc<dyn AuthGateway>, store: Arc<dyn StateStoreTrait>) -> Self {
        let (ready_tx, _) = watch::channel(false);
        SessionService {
            gateway,
            store,
            user: RwLock::new(None),
            ready_tx,
        }
    }

    fn open_gate(&self) {
        // send_replace never fails; receivers may or may not exist yet.
        self.ready_tx.send_replace(true);
    }

    /// Install the session everywhere: bearer on the gateway, user in
    /// memory, token + user in the state store.
    async fn adopt(&self, session: AuthSession) -> User {
        self.gateway.set_bearer_token(Some(&session.token));
        if let Ok(mut slot) = self.user.write() {
            *slot = Some(session.user.clone());
        }
        self.persist(&session).await;
        session.user
    }

    /// Persist token and user together. Storage failures degrade to an
    /// in-memory session and are not surfaced to the caller.
    async fn persist(&self, session: &AuthSession) {
        let serialized = match serde_json::to_string(&session.user) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize user record: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(AUTH_TOKEN_KEY, &session.token).await {
            warn!("Failed to persist auth token: {}", e);
            return;
        }
        if let Err(e) = self.store.set(AUTH_USER_KEY, &serialized).await {
            warn!("Failed to persist user record: {}", e);
        }
    }

    /// Drop the in-memory session, the gateway bearer, and the persisted
    /// keys. Storage failures are logged and swallowed.
    async fn clear_local(&self, keys: &[&str]) {
        self.gateway.set_bearer_token(None);
        if let Ok(mut slot) = self.user.write() {
            *slot = None;
        }
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                warn!("Failed to clear persisted '{}': {}", key, e);
            }
        }
    }

    /// The fallible part of `restore`. Any error means signed-out.
    async fn try_restore(&self) -> Result<Option<User>> {
        let token = self.store.get(AUTH_TOKEN_KEY)?;
        let saved_user = self.store.get(AUTH_USER_KEY)?;
        let (Some(token), Some(saved_user)) = (token, saved_user) else {
            debug!("No persisted session to restore");
            return Ok(None);
        };

        // A corrupt persisted record counts as a failed restore.
        let _cached: User = serde_json::from_str(&saved_user)?;

        self.gateway.set_bearer_token(Some(&token));
        let user = self.gateway.me().await?;

        // Adopt the server's (authoritative) user record, refreshing the
        // persisted copy in case it drifted.
        let user = self.adopt(AuthSession { user, token }).await;
        Ok(Some(user))
    }
}

#[async_trait]
impl SessionServiceTrait for SessionService {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        let session = self.gateway.login(email, password).await.map_err(|e| {
            warn!("Login failed for {}: {}", email, e);
            e
        })?;

        let user = self.adopt(session).await;
        self.open_gate();
        Ok(user)
    }

    async fn register(&self, registration: Registration) -> Result<User> {
        registration.validate()?;

        let session = self
            .gateway
            .register(
                &registration.email,
                &registration.password,
                &registration.name,
            )
            .await
            .map_err(|e| {
                warn!("Registration failed for {}: {}", registration.email, e);
                e
            })?;

        let user = self.adopt(session).await;
        self.open_gate();
        Ok(user)
    }

    async fn restore(&self) -> Option<User> {
        let outcome = self.try_restore().await;
        let user = match outcome {
            Ok(user) => user,
            Err(e) => {
                warn!("Session restore failed, signing out: {}", e);
                self.clear_local(&[AUTH_TOKEN_KEY, AUTH_USER_KEY]).await;
                None
            }
        };
        // The gate opens regardless of outcome so dependent caches can
        // proceed (or observe the signed-out state).
        self.open_gate();
        user
    }

    async fn sign_out(&self) {
        if let Err(e) = self.gateway.logout().await {
            warn!("Server-side logout failed, continuing local cleanup: {}", e);
        }
        // Local cleanup runs unconditionally, whatever the remote outcome.
        self.clear_local(&[AUTH_TOKEN_KEY, AUTH_USER_KEY, TRANSACTIONS_KEY])
            .await;
    }

    fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|slot| slot.clone())
    }

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn gate(&self) -> SessionGate {
        SessionGate {
            rx: self.ready_tx.subscribe(),
        }
    }
}
