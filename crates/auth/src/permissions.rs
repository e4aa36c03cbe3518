use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scopegate_core::RoleId;

use crate::{Action, RoleType};

/// A grant of one action to one role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub role: RoleId,
    pub action: Action,
}

impl Permission {
    pub fn new(role: RoleId, action: Action) -> Self {
        Self { role, action }
    }
}

/// Which role's permissions to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionFilter {
    /// A specific role, by id.
    Role(RoleId),
    /// Every role carrying the given type tag (in practice: `public`).
    RoleType(RoleType),
}

impl PermissionFilter {
    pub fn public() -> Self {
        Self::RoleType(RoleType::Public)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionStoreError {
    #[error("permission store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only query interface over the role → action table.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn find_permissions(
        &self,
        filter: PermissionFilter,
    ) -> Result<Vec<Permission>, PermissionStoreError>;
}

/// Collapse a permission list into the set of actions it grants.
pub fn allowed_actions<'a>(
    permissions: impl IntoIterator<Item = &'a Permission>,
) -> BTreeSet<Action> {
    permissions.into_iter().map(|p| p.action.clone()).collect()
}
