//! Accounts, bearer tokens and permission checks.

pub mod password;
pub mod roles;
pub mod service;

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::error::StoreError;
use crate::model::User;
use crate::validation::ValidationErrors;

pub use roles::{Permission, Role, effective_permissions};
pub use service::{AuthService, IssuedToken};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Email unknown or password mismatch. Deliberately indistinguishable.
    #[error("The provided credentials are incorrect.")]
    InvalidCredentials,

    /// Missing, unknown or expired bearer token.
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("no user with email '{0}'")]
    UnknownUser(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The caller behind a request, resolved from its bearer token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Role>,
    pub permissions: BTreeSet<Permission>,
    #[serde(skip)]
    pub token_id: i64,
}

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
