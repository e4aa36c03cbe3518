//! In-memory collaborators.
//!
//! Intended for tests/dev. Lookups are linear scans.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use scopegate_core::{PrincipalId, RoleId};

use crate::permissions::{Permission, PermissionFilter, PermissionStore, PermissionStoreError};
use crate::principal::{Principal, PrincipalResolver, ResolveError};
use crate::{Action, Role, RoleType};

/// Role table plus role → action grants.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    roles: RwLock<HashMap<RoleId, Role>>,
    permissions: RwLock<Vec<Permission>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_role(&self, role: Role) -> Result<(), PermissionStoreError> {
        self.roles
            .write()
            .map_err(|_| poisoned())?
            .insert(role.id, role);
        Ok(())
    }

    pub fn role(&self, id: RoleId) -> Result<Option<Role>, PermissionStoreError> {
        Ok(self.roles.read().map_err(|_| poisoned())?.get(&id).cloned())
    }

    pub fn grant(&self, role: RoleId, action: Action) -> Result<(), PermissionStoreError> {
        self.permissions
            .write()
            .map_err(|_| poisoned())?
            .push(Permission::new(role, action));
        Ok(())
    }

    pub fn revoke(&self, role: RoleId, action: &Action) -> Result<(), PermissionStoreError> {
        self.permissions
            .write()
            .map_err(|_| poisoned())?
            .retain(|p| !(p.role == role && &p.action == action));
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find_permissions(
        &self,
        filter: PermissionFilter,
    ) -> Result<Vec<Permission>, PermissionStoreError> {
        let permissions = self.permissions.read().map_err(|_| poisoned())?;

        match filter {
            PermissionFilter::Role(role_id) => Ok(permissions
                .iter()
                .filter(|p| p.role == role_id)
                .cloned()
                .collect()),
            PermissionFilter::RoleType(kind) => {
                let roles = self.roles.read().map_err(|_| poisoned())?;
                Ok(permissions
                    .iter()
                    .filter(|p| roles.get(&p.role).is_some_and(|r| r.kind == kind))
                    .cloned()
                    .collect())
            }
        }
    }
}

fn poisoned() -> PermissionStoreError {
    PermissionStoreError::Unavailable("lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    principals: RwLock<HashMap<PrincipalId, Principal>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, principal: Principal) -> Result<(), ResolveError> {
        self.principals
            .write()
            .map_err(|_| ResolveError::Unavailable("lock poisoned".to_string()))?
            .insert(principal.id, principal);
        Ok(())
    }
}

#[async_trait]
impl PrincipalResolver for InMemoryPrincipalStore {
    async fn fetch_principal(&self, id: PrincipalId) -> Result<Option<Principal>, ResolveError> {
        let principals = self
            .principals
            .read()
            .map_err(|_| ResolveError::Unavailable("lock poisoned".to_string()))?;
        Ok(principals.get(&id).cloned())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// A principal carries a role whose type disagrees with the registered one.
    #[error("role {id} is registered as '{registered}' but a principal carries it as '{carried}'")]
    ConflictingRole {
        id: RoleId,
        registered: RoleType,
        carried: RoleType,
    },

    #[error(transparent)]
    Permissions(#[from] PermissionStoreError),

    #[error(transparent)]
    Principals(#[from] ResolveError),
}

/// Seed document for the in-memory collaborators.
///
/// ```json
/// { "roles": [...], "principals": [...], "permissions": [...] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub roles: Vec<Role>,
    pub principals: Vec<Principal>,
    pub permissions: Vec<Permission>,
}

impl Seed {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load into fresh stores. Principal roles are registered as well, so the
    /// `roles` list only needs roles no principal carries (e.g. `public`).
    ///
    /// A principal never redefines a registered role: a carried role whose
    /// type differs from the registered one rejects the whole seed.
    pub fn into_stores(
        self,
    ) -> Result<(InMemoryPermissionStore, InMemoryPrincipalStore), SeedError> {
        let permissions = InMemoryPermissionStore::new();
        let principals = InMemoryPrincipalStore::new();

        for role in self.roles {
            permissions.insert_role(role)?;
        }
        for principal in self.principals {
            match permissions.role(principal.role.id)? {
                None => permissions.insert_role(principal.role.clone())?,
                Some(registered) if registered.kind != principal.role.kind => {
                    return Err(SeedError::ConflictingRole {
                        id: registered.id,
                        registered: registered.kind,
                        carried: principal.role.kind,
                    });
                }
                Some(_) => {}
            }
            principals.insert(principal)?;
        }
        for grant in self.permissions {
            permissions.grant(grant.role, grant.action)?;
        }

        Ok((permissions, principals))
    }
}
