//! services/api/src/adapters/auth_store.rs
//!
//! Holds the signed-in user as reported by the auth provider. Implements the
//! `AuthContext` port, which the action handler reads synchronously when a
//! dose is about to be written.

use medtrack_core::{AuthContext, User};
use std::sync::{PoisonError, RwLock};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// Flips once the provider has reported for the first time, signed in or not.
    pub is_auth_ready: bool,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Default)]
pub struct AuthStore {
    state: RwLock<AuthState>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on every auth state change from the provider.
    pub fn set_auth(&self, user: Option<User>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match &user {
            Some(user) => info!(uid = %user.uid, "User signed in"),
            None => info!("User signed out"),
        }
        state.user = user;
        state.is_auth_ready = true;
    }

    pub fn snapshot(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_logged_in()
    }
}

impl AuthContext for AuthStore {
    fn current_user(&self) -> Option<User> {
        self.snapshot().user
    }
}
