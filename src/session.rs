//! Session context: who is signed in.
//!
//! The context is an explicit, cloneable handle passed to every view that
//! needs the current identity. It starts in the loading state, is settled by
//! an [`AuthProvider`] callback, and is cleared again on sign-out.

use crate::error::ExamError;
use crate::types::UserId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Signed-in account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            display_name: None,
        }
    }
}

/// The only shape consumed from the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub identity: Option<UserIdentity>,
    pub loading: bool,
}

impl AuthState {
    fn initial() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }
}

/// What the top-level screen should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Loading,
    SignedOut,
    SignedIn(UserId),
}

/// Source of identity changes.
pub trait AuthProvider: Send + Sync {
    /// Resolve the current identity. Called once by [`SessionContext::init`].
    fn current_identity(&self) -> Option<UserIdentity>;
}

/// Identity fixed at construction, e.g. from configuration or a CLI flag.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    identity: Option<UserIdentity>,
}

impl StaticAuthProvider {
    pub fn new(identity: Option<UserIdentity>) -> Self {
        Self { identity }
    }

    pub fn signed_in(uid: impl Into<String>) -> Self {
        Self::new(Some(UserIdentity::new(uid)))
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_identity(&self) -> Option<UserIdentity> {
        self.identity.clone()
    }
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    state: Arc<RwLock<AuthState>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// Fresh context in the loading state.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::initial())),
        }
    }

    /// Create and settle a context from a provider.
    pub fn init(provider: &dyn AuthProvider) -> Self {
        let ctx = Self::new();
        ctx.on_auth_changed(provider.current_identity());
        ctx
    }

    /// Provider callback: identity resolved (or absent). Clears loading.
    pub fn on_auth_changed(&self, identity: Option<UserIdentity>) {
        let mut state = self.state.write();
        match &identity {
            Some(id) => info!(uid = %id.uid, "Session signed in"),
            None => info!("Session has no identity"),
        }
        state.identity = identity;
        state.loading = false;
    }

    /// Tear down the session.
    pub fn sign_out(&self) {
        let mut state = self.state.write();
        if let Some(id) = state.identity.take() {
            info!(uid = %id.uid, "Session signed out");
        }
        state.loading = false;
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn user(&self) -> Option<UserId> {
        self.state.read().identity.as_ref().map(|i| i.uid.clone())
    }

    /// Current user, or `AuthRequired` when nobody is signed in.
    pub fn require_user(&self) -> Result<UserId, ExamError> {
        self.user().ok_or(ExamError::AuthRequired)
    }

    pub fn gate(&self) -> Gate {
        let state = self.state.read();
        if state.loading {
            return Gate::Loading;
        }
        match &state.identity {
            Some(id) => Gate::SignedIn(id.uid.clone()),
            None => Gate::SignedOut,
        }
    }
}
