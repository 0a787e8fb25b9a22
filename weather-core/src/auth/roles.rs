//! Roles and permissions for access control
//!
//! Six explicit permissions gate the API. A user holds them directly or
//! through a role.
//!
//! # Roles
//!
//! - `admin` - every permission
//! - `user` - read-only access: view weather, history and favorites

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Named capability gating an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "view weather")]
    ViewWeather,
    #[serde(rename = "view history")]
    ViewHistory,
    #[serde(rename = "clear history")]
    ClearHistory,
    #[serde(rename = "view favorites")]
    ViewFavorites,
    #[serde(rename = "create favorites")]
    CreateFavorites,
    #[serde(rename = "delete favorites")]
    DeleteFavorites,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::ViewWeather,
        Permission::ViewHistory,
        Permission::ClearHistory,
        Permission::ViewFavorites,
        Permission::CreateFavorites,
        Permission::DeleteFavorites,
    ];

    /// Parse permission from its stored name; `-` and `_` are accepted as separators.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Self::ALL.into_iter().find(|p| p.as_str() == normalized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewWeather => "view weather",
            Self::ViewHistory => "view history",
            Self::ClearHistory => "clear history",
            Self::ViewFavorites => "view favorites",
            Self::CreateFavorites => "create favorites",
            Self::DeleteFavorites => "delete favorites",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bundle of permissions assignable to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Admin => &Permission::ALL,
            Self::User => &[
                Permission::ViewWeather,
                Permission::ViewHistory,
                Permission::ViewFavorites,
            ],
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Union of direct permissions and the permissions of every held role.
pub fn effective_permissions(roles: &[Role], direct: &[Permission]) -> BTreeSet<Permission> {
    roles
        .iter()
        .flat_map(|role| role.permissions().iter().copied())
        .chain(direct.iter().copied())
        .collect()
}
