// # Session Resolver Trait
//
// Defines the interface for turning an opaque session token into a caller
// identity. The Access Guard is the only consumer.
//
// ## Implementations
//
// - HTTP identity service: `spindle-identity-http` crate

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Caller role as reported by the identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated role allowed to trigger imports
    Admin,
    /// Any other authenticated user
    #[serde(other)]
    Member,
}

impl Role {
    /// Whether this role may run ingestion batches
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Resolved caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier, stamped on imported releases
    pub id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

/// Trait for session/identity lookups
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Error Contract
///
/// An unknown, invalid or expired token MUST be reported as
/// [`crate::Error::Unauthenticated`]. Any other error (network, decode) is
/// also treated as unauthenticated by the guard, but is logged differently.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve a bare session token (without the `Bearer ` prefix)
    ///
    /// # Returns
    ///
    /// - `Ok(Identity)`: The caller's id and role
    /// - `Err(Error)`: If the token is not a valid session
    async fn resolve(&self, token: &str) -> Result<Identity, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_member() {
        let identity: Identity =
            serde_json::from_value(serde_json::json!({ "id": "u-1", "role": "moderator" }))
                .unwrap();
        assert_eq!(identity.role, Role::Member);
        assert!(!identity.role.is_elevated());

        let admin: Identity =
            serde_json::from_value(serde_json::json!({ "id": "u-2", "role": "admin" })).unwrap();
        assert!(admin.role.is_elevated());
    }
}
