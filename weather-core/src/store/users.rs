//! Users, their roles/permissions, and personal access tokens.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::auth::{Permission, Role};
use crate::error::StoreResult;
use crate::model::User;

/// User row including the credential hash. Never serialized.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Access token row; the plaintext token is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        Self {
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: i64,
    user_id: i64,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user holding `role`, both in one transaction. A taken email
    /// surfaces as `StoreError::UniqueViolation`.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> StoreResult<StoredUser> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?, ?)")
            .bind(row.id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, password_hash, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StoredUser::from(r).user))
    }

    // =========================================================================
    // Roles and permissions
    // =========================================================================

    /// Give `user_id` a role. Assigning a held role is a no-op.
    pub async fn assign_role(&self, user_id: i64, role: Role) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Grant a permission directly. Granting a held permission is a no-op.
    pub async fn grant_permission(&self, user_id: i64, permission: Permission) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO user_permissions (user_id, permission) VALUES (?, ?)")
            .bind(user_id)
            .bind(permission.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn roles(&self, user_id: i64) -> StoreResult<Vec<Role>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(names
            .iter()
            .filter_map(|name| {
                let role = Role::parse(name);
                if role.is_none() {
                    warn!(user_id, role = %name, "ignoring unknown stored role");
                }
                role
            })
            .collect())
    }

    pub async fn direct_permissions(&self, user_id: i64) -> StoreResult<Vec<Permission>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT permission FROM user_permissions WHERE user_id = ? ORDER BY permission",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names
            .iter()
            .filter_map(|name| {
                let permission = Permission::parse(name);
                if permission.is_none() {
                    warn!(user_id, permission = %name, "ignoring unknown stored permission");
                }
                permission
            })
            .collect())
    }

    // =========================================================================
    // Access tokens
    // =========================================================================

    pub async fn create_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO personal_access_tokens (user_id, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_token(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>> {
        let row: Option<TokenRow> = sqlx::query_as(
            "SELECT id, user_id, expires_at FROM personal_access_tokens WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| TokenRecord {
            id: r.id,
            user_id: r.user_id,
            expires_at: r.expires_at,
        }))
    }

    pub async fn touch_token(&self, token_id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE personal_access_tokens SET last_used_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_token(&self, token_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE id = ?")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
impl UserStore {
    pub(crate) async fn count_tokens(&self, user_id: i64) -> StoreResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM personal_access_tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}
