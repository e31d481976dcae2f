//! Gateway and service traits for the session store.

use async_trait::async_trait;

use crate::errors::Result;
use crate::session::session_model::{AuthSession, AuthStatus, Registration, User};
use crate::session::session_service::SessionGate;

/// Auth-facing slice of the API gateway.
///
/// The gateway owns the bearer token slot; the session service is the only
/// writer (`set_bearer_token`), downstream caches never touch it.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession>;

    async fn register(&self, email: &str, password: &str, name: &str) -> Result<AuthSession>;

    /// Token verification ("who am I"). Requires a bearer token.
    async fn me(&self) -> Result<User>;

    /// Server-side session invalidation. Best-effort; callers may swallow
    /// the error.
    async fn logout(&self) -> Result<()>;

    async fn auth_status(&self) -> Result<AuthStatus>;

    /// Install or clear the bearer token attached to subsequent requests.
    fn set_bearer_token(&self, token: Option<&str>);
}

/// Service trait for the session store.
#[async_trait]
pub trait SessionServiceTrait: Send + Sync {
    /// Sign in. On success the user and token are adopted and persisted
    /// together; on failure any prior session is left untouched and the
    /// error is returned to the caller.
    async fn login(&self, email: &str, password: &str) -> Result<User>;

    /// Create an account. Same contract as `login`.
    async fn register(&self, registration: Registration) -> Result<User>;

    /// Restore a persisted session, re-verifying the token with the backend.
    /// Runs once at startup. Any failure lands in the signed-out state with
    /// storage cleared; errors are absorbed, never returned. Marks the
    /// readiness gate either way.
    async fn restore(&self) -> Option<User>;

    /// Best-effort server-side invalidation, then unconditional local
    /// cleanup of token, user, and the persisted transaction snapshot.
    async fn sign_out(&self);

    fn current_user(&self) -> Option<User>;

    fn is_authenticated(&self) -> bool;

    /// Handle dependent caches wait on before their initial load.
    fn gate(&self) -> SessionGate;
}
