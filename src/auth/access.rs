//! Role-based access control.
//!
//! Access is decided in two ordered stages. [`identify`] turns the
//! `Authorization` header into verified [`Claims`]; [`authorize`] checks the
//! claimed role against the route's [`RoleSet`]. Either stage may reject the
//! request, and the second never runs without the first.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::token::{Claims, TokenError, TokenService};
use crate::db::Role;

/// Non-empty set of roles allowed on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// Build a set from at least one role. Duplicates are dropped.
    pub fn new(first: Role, rest: impl IntoIterator<Item = Role>) -> Self {
        let mut roles = vec![first];
        for role in rest {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self(roles)
    }

    /// A set holding a single role.
    pub fn only(role: Role) -> Self {
        Self(vec![role])
    }

    /// Every role.
    pub fn all() -> Self {
        Self(Role::ALL.to_vec())
    }

    /// Whether the role is allowed.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Allowed roles, in the order given.
    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", role)?;
        }
        Ok(())
    }
}

/// Access-control rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No `Authorization` header, or one without the bearer scheme.
    #[error("Unauthorized: Token missing or invalid.")]
    MissingCredential,

    /// Bearer scheme present but no token follows it.
    #[error("Unauthorized: Token is missing.")]
    MissingToken,

    /// The token failed verification.
    #[error("Forbidden: Invalid or expired token.")]
    InvalidToken(TokenError),

    /// No verified identity reached the role check.
    #[error("Unauthorized: User information missing.")]
    MissingIdentity,

    /// The caller's role is not in the allowed set.
    #[error("Forbidden: You do not have permission to access this resource.")]
    InsufficientRole {
        /// Roles the route allows.
        required: RoleSet,
        /// Role carried by the caller's token.
        actual: Role,
    },
}

const BEARER_PREFIX: &str = "bearer ";

/// Extract the token from an `Authorization` header value.
///
/// The header must start with `bearer ` (any case). The token is the text
/// between the first and second single space. Returns `Err` when the header
/// is absent or has another prefix, and `Ok(None)` when that text is empty.
pub fn bearer_token(header: Option<&str>) -> Result<Option<&str>, AccessError> {
    let header = header.ok_or(AccessError::MissingCredential)?;

    let has_scheme = header
        .get(..BEARER_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(BEARER_PREFIX));
    if !has_scheme {
        return Err(AccessError::MissingCredential);
    }

    Ok(header.split(' ').nth(1).filter(|token| !token.is_empty()))
}

/// Establish the caller's identity from an `Authorization` header value.
///
/// Only the token is consulted; the credential store is not.
pub fn identify(header: Option<&str>, tokens: &TokenService) -> Result<Claims, AccessError> {
    let token = bearer_token(header)?.ok_or(AccessError::MissingToken)?;
    tokens.verify(token).map_err(AccessError::InvalidToken)
}

/// Check a verified identity against the allowed roles.
pub fn authorize(identity: Option<&Claims>, allowed: &RoleSet) -> Result<(), AccessError> {
    let claims = identity.ok_or(AccessError::MissingIdentity)?;

    if allowed.contains(claims.role) {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole {
            required: allowed.clone(),
            actual: claims.role,
        })
    }
}
