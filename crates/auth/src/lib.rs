//! `scopegate-auth`: request authentication and scope authorization.
//!
//! Decoupled from HTTP frameworks and storage: requests are seen only as a
//! header map, and accounts, settings and permissions arrive through the
//! collaborator traits defined here.

pub mod action;
pub mod authenticate;
pub mod claims;
pub mod credential;
pub mod memory;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod settings;
pub mod verify;

pub use action::{AccessConfig, Action, InvalidAction, Scope};
pub use authenticate::{AuthResult, AuthenticationError, Authenticator, Ineligibility};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credential::{CredentialError, CredentialExtractor, Hs256CredentialExtractor};
pub use permissions::{Permission, PermissionFilter, PermissionStore, PermissionStoreError};
pub use principal::{Principal, PrincipalResolver, ResolveError};
pub use roles::{Role, RoleType};
pub use settings::{AdvancedSettings, SettingsError, SettingsProvider, StaticSettings};
pub use verify::{
    AccessPath, AuthorizationHook, DenialKind, Explanation, HookRejection, Verifier, VerifyError,
};

pub use scopegate_core::{PrincipalId, RoleId};
