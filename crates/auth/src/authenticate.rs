//! Request authentication: who is calling?
//!
//! Every failure inside this module ends as [`AuthResult::Unauthenticated`].
//! Nothing here returns an error to the caller.

use std::sync::Arc;

use http::HeaderMap;
use thiserror::Error;
use tracing::{debug, warn};

use scopegate_core::PrincipalId;

use crate::credential::{CredentialError, CredentialExtractor};
use crate::permissions::{PermissionFilter, PermissionStore, PermissionStoreError};
use crate::principal::{Principal, PrincipalResolver, ResolveError};
use crate::settings::{AdvancedSettings, SettingsError, SettingsProvider};

/// Outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// No usable identity. Callers must refuse the request.
    Unauthenticated,
    /// Anonymous caller, evaluated against the `public` role.
    Public,
    /// A resolved, eligible principal.
    Authenticated(Principal),
}

impl AuthResult {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthResult::Unauthenticated)
    }

    /// The principal, if any. `None` for both public and unauthenticated.
    pub fn credentials(&self) -> Option<&Principal> {
        match self {
            AuthResult::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, AuthResult::Public)
    }
}

/// Why an account was refused after it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Unconfirmed,
    Blocked,
}

impl core::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Ineligibility::Unconfirmed => f.write_str("email not confirmed"),
            Ineligibility::Blocked => f.write_str("account blocked"),
        }
    }
}

/// Internal authentication failures. Logged, then absorbed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    #[error("unknown principal {0}")]
    UnknownPrincipal(PrincipalId),

    #[error("principal {id} not eligible: {reason}")]
    AccountNotEligible { id: PrincipalId, reason: Ineligibility },

    #[error("public access disabled (public role has no permissions)")]
    PublicAccessDisabled,

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    PermissionStore(#[from] PermissionStoreError),
}

impl AuthenticationError {
    /// Collaborator outages, as opposed to ordinary refusals.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            AuthenticationError::Resolve(_)
                | AuthenticationError::Settings(_)
                | AuthenticationError::PermissionStore(_)
        )
    }
}

/// Check account-state flags against settings.
///
/// Unconfirmed is reported before blocked; either one refuses the account.
pub fn check_account_state(
    principal: &Principal,
    settings: &AdvancedSettings,
) -> Result<(), AuthenticationError> {
    let reason = if settings.email_confirmation && !principal.confirmed {
        Some(Ineligibility::Unconfirmed)
    } else if principal.blocked {
        Some(Ineligibility::Blocked)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AuthenticationError::AccountNotEligible {
            id: principal.id,
            reason,
        }),
        None => Ok(()),
    }
}

/// Resolves the caller of a request.
///
/// Steps run strictly in order: validate credential → resolve principal →
/// check account state. A request with no credential header skips all three
/// and is evaluated against the public role instead.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialExtractor>,
    principals: Arc<dyn PrincipalResolver>,
    settings: Arc<dyn SettingsProvider>,
    permissions: Arc<dyn PermissionStore>,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialExtractor>,
        principals: Arc<dyn PrincipalResolver>,
        settings: Arc<dyn SettingsProvider>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            credentials,
            principals,
            settings,
            permissions,
        }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthResult {
        match self.try_authenticate(headers).await {
            Ok(result) => result,
            Err(err) if err.is_collaborator_failure() => {
                warn!(error = %err, "authentication failed closed");
                AuthResult::Unauthenticated
            }
            Err(err) => {
                debug!(reason = %err, "request not authenticated");
                AuthResult::Unauthenticated
            }
        }
    }

    /// Same decision as [`Self::authenticate`], with the refusal reason kept.
    pub async fn try_authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<AuthResult, AuthenticationError> {
        let Some(subject) = self.credentials.extract(headers).await? else {
            return self.public_access().await;
        };

        let principal = self
            .principals
            .fetch_principal(subject)
            .await?
            .ok_or(AuthenticationError::UnknownPrincipal(subject))?;

        let settings = self.settings.advanced_settings().await?;
        check_account_state(&principal, &settings)?;

        debug!(principal_id = %principal.id, role = %principal.role.kind, "principal authenticated");
        Ok(AuthResult::Authenticated(principal))
    }

    async fn public_access(&self) -> Result<AuthResult, AuthenticationError> {
        let permissions = self
            .permissions
            .find_permissions(PermissionFilter::public())
            .await?;

        if permissions.is_empty() {
            return Err(AuthenticationError::PublicAccessDisabled);
        }
        Ok(AuthResult::Public)
    }
}

impl core::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use http::header::AUTHORIZATION;

    use super::*;
    use crate::memory::{InMemoryPermissionStore, InMemoryPrincipalStore};
    use crate::permissions::Permission;
    use crate::settings::StaticSettings;
    use crate::{Action, Role, RoleType};
    use scopegate_core::RoleId;

    /// Extractor that trusts the header value as a raw principal id.
    struct RawIdExtractor;

    #[async_trait]
    impl CredentialExtractor for RawIdExtractor {
        async fn extract(
            &self,
            headers: &HeaderMap,
        ) -> Result<Option<PrincipalId>, CredentialError> {
            match crate::credential::bearer_token(headers)? {
                None => Ok(None),
                Some(raw) => raw
                    .parse()
                    .map(Some)
                    .map_err(|_| CredentialError::InvalidToken("not an id".into())),
            }
        }
    }

    #[derive(Default)]
    struct Counting<T> {
        inner: T,
        calls: AtomicUsize,
    }

    impl<T> Counting<T> {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PrincipalResolver for Counting<InMemoryPrincipalStore> {
        async fn fetch_principal(
            &self,
            id: PrincipalId,
        ) -> Result<Option<Principal>, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_principal(id).await
        }
    }

    #[async_trait]
    impl PermissionStore for Counting<InMemoryPermissionStore> {
        async fn find_permissions(
            &self,
            filter: PermissionFilter,
        ) -> Result<Vec<Permission>, PermissionStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_permissions(filter).await
        }
    }

    struct Down;

    #[async_trait]
    impl PrincipalResolver for Down {
        async fn fetch_principal(&self, _: PrincipalId) -> Result<Option<Principal>, ResolveError> {
            Err(ResolveError::Unavailable("timed out".into()))
        }
    }

    #[async_trait]
    impl SettingsProvider for Down {
        async fn advanced_settings(&self) -> Result<AdvancedSettings, SettingsError> {
            Err(SettingsError::Unavailable("timed out".into()))
        }
    }

    #[async_trait]
    impl PermissionStore for Down {
        async fn find_permissions(
            &self,
            _: PermissionFilter,
        ) -> Result<Vec<Permission>, PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("timed out".into()))
        }
    }

    struct Fixture {
        principals: Arc<Counting<InMemoryPrincipalStore>>,
        permissions: Arc<Counting<InMemoryPermissionStore>>,
        member_role: Role,
    }

    impl Fixture {
        fn new(public_actions: &[&'static str]) -> Self {
            let permissions = Arc::new(Counting::<InMemoryPermissionStore>::default());
            let public = Role::public(RoleId::new());
            let member_role = Role::new(RoleId::new(), RoleType::Authenticated);
            permissions.inner.insert_role(public.clone()).unwrap();
            permissions.inner.insert_role(member_role.clone()).unwrap();
            for action in public_actions {
                permissions
                    .inner
                    .grant(public.id, Action::new(*action).unwrap())
                    .unwrap();
            }

            Self {
                principals: Arc::new(Counting::default()),
                permissions,
                member_role,
            }
        }

        fn add_principal(&self, confirmed: bool, blocked: bool) -> PrincipalId {
            let principal = Principal::new(PrincipalId::new(), self.member_role.clone())
                .with_confirmed(confirmed)
                .with_blocked(blocked);
            let id = principal.id;
            self.principals.inner.insert(principal).unwrap();
            id
        }

        fn authenticator(&self, email_confirmation: bool) -> Authenticator {
            Authenticator::new(
                Arc::new(RawIdExtractor),
                self.principals.clone(),
                Arc::new(StaticSettings::new(
                    AdvancedSettings::default().with_email_confirmation(email_confirmation),
                )),
                self.permissions.clone(),
            )
        }
    }

    fn bearer(value: impl core::fmt::Display) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {value}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn no_header_only_evaluates_public_role() {
        let fx = Fixture::new(&["read"]);
        let result = fx.authenticator(false).authenticate(&HeaderMap::new()).await;

        assert_eq!(result, AuthResult::Public);
        assert!(result.is_authenticated());
        assert!(result.credentials().is_none());
        assert_eq!(fx.principals.calls(), 0);
        assert_eq!(fx.permissions.calls(), 1);
    }

    #[tokio::test]
    async fn empty_public_role_disables_anonymous_access() {
        let fx = Fixture::new(&[]);
        let auth = fx.authenticator(false);

        assert_eq!(auth.authenticate(&HeaderMap::new()).await, AuthResult::Unauthenticated);
        assert_eq!(
            auth.try_authenticate(&HeaderMap::new()).await,
            Err(AuthenticationError::PublicAccessDisabled)
        );
    }

    #[tokio::test]
    async fn invalid_credential_never_falls_back_to_public() {
        let fx = Fixture::new(&["read"]);
        let auth = fx.authenticator(false);

        for headers in [bearer("garbage"), {
            let mut h = HeaderMap::new();
            h.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
            h
        }] {
            let result = auth.authenticate(&headers).await;
            assert_eq!(result, AuthResult::Unauthenticated);
        }
        assert_eq!(fx.permissions.calls(), 0);
        assert_eq!(fx.principals.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_principal_is_unauthenticated() {
        let fx = Fixture::new(&["read"]);
        let ghost = PrincipalId::new();

        let err = fx
            .authenticator(false)
            .try_authenticate(&bearer(ghost))
            .await
            .unwrap_err();
        assert_eq!(err, AuthenticationError::UnknownPrincipal(ghost));
        assert_eq!(fx.permissions.calls(), 0);
    }

    #[tokio::test]
    async fn eligible_principal_is_authenticated() {
        let fx = Fixture::new(&[]);
        let id = fx.add_principal(true, false);

        let result = fx.authenticator(true).authenticate(&bearer(id)).await;
        assert_eq!(result.credentials().map(|p| p.id), Some(id));
        assert_eq!(fx.principals.calls(), 1);
    }

    #[tokio::test]
    async fn unconfirmed_is_denied_when_confirmation_required_regardless_of_blocked() {
        let fx = Fixture::new(&["read"]);
        let auth = fx.authenticator(true);

        for blocked in [false, true] {
            let id = fx.add_principal(false, blocked);
            assert_eq!(
                auth.try_authenticate(&bearer(id)).await,
                Err(AuthenticationError::AccountNotEligible {
                    id,
                    reason: Ineligibility::Unconfirmed
                })
            );
        }
    }

    #[tokio::test]
    async fn unconfirmed_is_accepted_when_confirmation_disabled() {
        let fx = Fixture::new(&[]);
        let id = fx.add_principal(false, false);

        let result = fx.authenticator(false).authenticate(&bearer(id)).await;
        assert!(result.credentials().is_some());
    }

    #[tokio::test]
    async fn blocked_is_denied_regardless_of_confirmed() {
        let fx = Fixture::new(&["read"]);

        for confirmed in [false, true] {
            let id = fx.add_principal(confirmed, true);
            let result = fx.authenticator(false).authenticate(&bearer(id)).await;
            assert_eq!(result, AuthResult::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn collaborator_failures_fail_closed() {
        let fx = Fixture::new(&["read"]);
        let id = fx.add_principal(true, false);
        let settings: Arc<dyn SettingsProvider> = Arc::new(StaticSettings::default());

        let resolver_down = Authenticator::new(
            Arc::new(RawIdExtractor),
            Arc::new(Down),
            settings.clone(),
            fx.permissions.clone(),
        );
        assert_eq!(resolver_down.authenticate(&bearer(id)).await, AuthResult::Unauthenticated);

        let settings_down = Authenticator::new(
            Arc::new(RawIdExtractor),
            fx.principals.clone(),
            Arc::new(Down),
            fx.permissions.clone(),
        );
        assert_eq!(settings_down.authenticate(&bearer(id)).await, AuthResult::Unauthenticated);

        let store_down = Authenticator::new(
            Arc::new(RawIdExtractor),
            fx.principals.clone(),
            settings,
            Arc::new(Down),
        );
        let err = store_down.try_authenticate(&HeaderMap::new()).await.unwrap_err();
        assert!(err.is_collaborator_failure());
        assert_eq!(store_down.authenticate(&HeaderMap::new()).await, AuthResult::Unauthenticated);
    }
}
