//! Access guard
//!
//! Validates the caller's session and role before any batch work starts.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::{Identity, SessionResolver};

/// Authorization header scheme accepted by the guard
const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from a `Bearer <token>` header value
///
/// The scheme matches case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Checks the `Authorization` header against the session resolver
pub struct AccessGuard<'a> {
    resolver: &'a dyn SessionResolver,
}

impl<'a> AccessGuard<'a> {
    pub fn new(resolver: &'a dyn SessionResolver) -> Self {
        Self { resolver }
    }

    /// Resolve the caller from a raw `Authorization` header value
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`]: header missing, not a bearer header,
    ///   empty token, or the resolver rejected the token
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Identity> {
        let header =
            authorization.ok_or_else(|| Error::unauthenticated("Missing authorization header"))?;

        let token = bearer_token(header)
            .ok_or_else(|| Error::unauthenticated("Authorization header is not a bearer token"))?;

        match self.resolver.resolve(token).await {
            Ok(identity) => Ok(identity),
            Err(Error::Unauthenticated(msg)) => Err(Error::Unauthenticated(msg)),
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                Err(Error::unauthenticated("Session could not be verified"))
            }
        }
    }

    /// Resolve the caller and require the elevated role
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`]: see [`AccessGuard::authenticate`]
    /// - [`Error::Forbidden`]: the caller is not an administrator
    pub async fn authorize_admin(&self, authorization: Option<&str>) -> Result<Identity> {
        let identity = self.authenticate(authorization).await?;

        if !identity.role.is_elevated() {
            debug!("Caller {} lacks admin role", identity.id);
            return Err(Error::forbidden("Administrator role required"));
        }

        Ok(identity)
    }
}
