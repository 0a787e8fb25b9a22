//! Authentication and authorization for the HTTP layer.

pub mod middleware;
pub mod permission;

pub use middleware::{AuthUser, require_auth};
pub use permission::{RequirePermissionLayer, RouterExt, require_permission};
