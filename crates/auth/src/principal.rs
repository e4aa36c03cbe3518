use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scopegate_core::PrincipalId;

use crate::Role;

/// The account record behind a credential, as seen for one request.
///
/// The gate only reads it; `username` and `email` are carried for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    /// Absent in a record means confirmed, as with [`Principal::new`].
    #[serde(default = "confirmed_by_default")]
    pub confirmed: bool,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn confirmed_by_default() -> bool {
    true
}

impl Principal {
    /// A confirmed, unblocked principal.
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            confirmed: true,
            blocked: false,
            username: None,
            email: None,
        }
    }

    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("principal store unavailable: {0}")]
    Unavailable(String),
}

/// Loads the principal a credential's subject refers to.
///
/// `Ok(None)` means no such account exists.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn fetch_principal(&self, id: PrincipalId) -> Result<Option<Principal>, ResolveError>;
}
