use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::password::{hash_password, verify_password};
use super::{AuthError, AuthenticatedUser, Permission, Role, effective_permissions};
use crate::error::StoreError;
use crate::model::User;
use crate::store::UserStore;
use crate::validation::{LoginInput, RegisterInput, ValidationErrors};

/// Length of the plaintext bearer token handed to clients.
pub const TOKEN_LENGTH: usize = 40;

/// A freshly issued token together with its owner.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub user: User,
    pub token: String,
}

/// Registration, login and token resolution over a [`UserStore`].
#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserStore,
    default_role: Role,
    token_ttl: Option<chrono::Duration>,
}

impl AuthService {
    pub fn new(users: UserStore, default_role: Role, token_ttl: Option<chrono::Duration>) -> Self {
        Self {
            users,
            default_role,
            token_ttl,
        }
    }

    pub async fn register(&self, input: &RegisterInput) -> Result<IssuedToken, AuthError> {
        let account = input.validate()?;

        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(email_taken().into());
        }

        let password_hash = hash_blocking(account.password).await?;
        let stored = match self
            .users
            .create_user(
                &account.name,
                &account.email,
                &password_hash,
                self.default_role,
            )
            .await
        {
            Ok(stored) => stored,
            // Lost a race with a concurrent registration.
            Err(StoreError::UniqueViolation(_)) => return Err(email_taken().into()),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = stored.user.id, role = %self.default_role, "user registered");

        self.issue(stored.user).await
    }

    pub async fn login(&self, input: &LoginInput) -> Result<IssuedToken, AuthError> {
        let credentials = input.validate()?;

        let Some(stored) = self.users.find_by_email(&credentials.email).await? else {
            debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let hash = stored.password_hash.clone();
        let password = credentials.password;
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;

        if !valid {
            warn!(user_id = stored.user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = stored.user.id, "user logged in");
        self.issue(stored.user).await
    }

    /// Revoke the token the caller authenticated with.
    pub async fn logout(&self, caller: &AuthenticatedUser) -> Result<(), AuthError> {
        self.users.delete_token(caller.token_id).await?;
        info!(user_id = caller.id(), "user logged out");
        Ok(())
    }

    /// Resolve a plaintext bearer token into its user and effective permissions.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }

        let record = self
            .users
            .find_token(&digest(token))
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if record.is_expired(Utc::now()) {
            debug!(token_id = record.id, "expired token presented");
            return Err(AuthError::Unauthenticated);
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        self.users.touch_token(record.id).await?;

        let roles = self.users.roles(user.id).await?;
        let direct = self.users.direct_permissions(user.id).await?;

        Ok(AuthenticatedUser {
            user,
            permissions: effective_permissions(&roles, &direct),
            roles,
            token_id: record.id,
        })
    }

    /// Assign roles and direct permissions to the account with `email`.
    pub async fn grant(
        &self,
        email: &str,
        roles: &[Role],
        permissions: &[Permission],
    ) -> Result<User, AuthError> {
        let email = email.trim().to_lowercase();
        let stored = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::UnknownUser(email.clone()))?;

        for role in roles {
            self.users.assign_role(stored.user.id, *role).await?;
        }
        for permission in permissions {
            self.users
                .grant_permission(stored.user.id, *permission)
                .await?;
        }

        info!(user_id = stored.user.id, ?roles, ?permissions, "access granted");
        Ok(stored.user)
    }

    async fn issue(&self, user: User) -> Result<IssuedToken, AuthError> {
        let token = generate_token();
        let expires_at: Option<DateTime<Utc>> = self.token_ttl.map(|ttl| Utc::now() + ttl);
        self.users
            .create_token(user.id, &digest(&token), expires_at)
            .await?;
        Ok(IssuedToken { user, token })
    }
}

fn email_taken() -> ValidationErrors {
    ValidationErrors::single("email", "The email has already been taken.")
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex SHA-256 of a plaintext token; the only form that is persisted.
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
