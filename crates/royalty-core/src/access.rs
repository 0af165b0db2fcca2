//! # Access Guards
//!
//! Role and ownership checks applied by every engine operation that acts on
//! an author's data.
//!
//! ```text
//! Caller { user_id, role }
//!    │
//!    ├── require_role(caller, Admin) ──────────► Ok | Forbidden
//!    └── require_owner_or_admin(caller, owner) ► Ok | Forbidden
//!            admin      → always Ok
//!            author     → Ok when caller.user_id == owner
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Caller, Role};

/// Fails with `Forbidden` unless the caller has `role`.
pub fn require_role(caller: &Caller, role: Role) -> CoreResult<()> {
    if caller.role == role {
        return Ok(());
    }
    Err(CoreError::Forbidden(format!(
        "{} role required",
        role.as_str()
    )))
}

/// Fails with `Forbidden` unless the caller owns the resource or is an admin.
pub fn require_owner_or_admin(caller: &Caller, owner_id: &str) -> CoreResult<()> {
    if caller.is_admin() || caller.user_id == owner_id {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "resource belongs to another author".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_role() {
        assert!(require_role(&Caller::admin("a"), Role::Admin).is_ok());
        let err = require_role(&Caller::author("a"), Role::Admin).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_owner_or_admin() {
        assert!(require_owner_or_admin(&Caller::author("u1"), "u1").is_ok());
        assert!(require_owner_or_admin(&Caller::admin("root"), "u1").is_ok());
        assert!(require_owner_or_admin(&Caller::author("u2"), "u1").is_err());
    }
}
