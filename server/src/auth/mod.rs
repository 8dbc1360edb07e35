//! Authentication
//!
//! Bearer-token validation against the external identity boundary. The
//! token carries the caller's id and role; everything else about identity
//! (signup, login, approval) lives outside this server.

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::utils::AppError;

const USER_TABLE: &str = "user";

/// Caller role as asserted by the identity boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Farmer,
    Admin,
}

/// The authenticated caller, extracted from a validated token
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: RecordId,
    pub role: Role,
}

impl CurrentUser {
    /// Reject callers that are not farmers (admin passes too)
    pub fn require_farmer(&self) -> Result<(), AppError> {
        match self.role {
            Role::Farmer | Role::Admin => Ok(()),
            Role::Customer => Err(AppError::forbidden("Farmer access required")),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let key = claims
            .sub
            .strip_prefix("user:")
            .unwrap_or(claims.sub.as_str());
        if key.is_empty() {
            return Err("empty subject".to_string());
        }
        Ok(CurrentUser {
            id: RecordId::from_table_key(USER_TABLE, key),
            role: claims.role,
        })
    }
}
