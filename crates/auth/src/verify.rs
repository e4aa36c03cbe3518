//! Scope authorization: may this caller run this route?

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use scopegate_core::PrincipalId;

use crate::authenticate::AuthResult;
use crate::permissions::{PermissionFilter, PermissionStore, PermissionStoreError, allowed_actions};
use crate::{AccessConfig, Action};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No session, or an anonymous caller on a route without a scope (401).
    Unauthorized,
    /// Session present but the role lacks a required action (403).
    Forbidden,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: missing {}", join(.missing))]
    Forbidden { missing: Vec<Action> },

    #[error(transparent)]
    Store(#[from] PermissionStoreError),

    #[error("rejected by authorization hook: {0}")]
    Hook(#[from] HookRejection),
}

impl VerifyError {
    /// The denial kind, for errors that are policy denials.
    pub fn denial_kind(&self) -> Option<DenialKind> {
        match self {
            VerifyError::Unauthorized => Some(DenialKind::Unauthorized),
            VerifyError::Forbidden { .. } | VerifyError::Hook(_) => Some(DenialKind::Forbidden),
            VerifyError::Store(_) => None,
        }
    }
}

fn join(actions: &[Action]) -> String {
    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HookRejection(pub String);

/// Runs after a request has been allowed, and may still veto it.
#[async_trait]
pub trait AuthorizationHook: Send + Sync {
    async fn after_allow(
        &self,
        auth: &AuthResult,
        config: &AccessConfig,
    ) -> Result<(), HookRejection>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision
// ─────────────────────────────────────────────────────────────────────────────

/// Whose permissions were evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    Unauthenticated,
    Public,
    Principal(PrincipalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    Allow,
    Deny(VerifyError),
}

/// Pure scope check. Starts from deny; only the two explicit allow branches
/// below may change that.
fn decide(path: AccessPath, allowed: &BTreeSet<Action>, config: &AccessConfig) -> Decision {
    let mut decision = Decision::Deny(VerifyError::Unauthorized);

    match (path, config.required_actions()) {
        (AccessPath::Unauthenticated, _) => {}
        (AccessPath::Public, None) => {}
        (AccessPath::Principal(_), None) => decision = Decision::Allow,
        (_, Some(required)) => {
            let missing = missing_actions(allowed, required);
            decision = if missing.is_empty() {
                Decision::Allow
            } else {
                Decision::Deny(VerifyError::Forbidden { missing })
            };
        }
    }

    decision
}

fn missing_actions(allowed: &BTreeSet<Action>, required: &[Action]) -> Vec<Action> {
    required
        .iter()
        .filter(|action| !allowed.contains(*action))
        .cloned()
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Explanation (audit trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Auditable account of a scope decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub granted: bool,
    pub path: AccessPath,
    /// `None` when the route declared no scope.
    pub required: Option<Vec<Action>>,
    pub allowed_actions: Vec<Action>,
    pub missing: Vec<Action>,
    pub denial: Option<DenialKind>,
    pub reason: String,
}

impl Explanation {
    fn new(path: AccessPath, allowed: BTreeSet<Action>, config: &AccessConfig) -> Self {
        let decision = decide(path, &allowed, config);
        let required = config.required_actions().map(<[Action]>::to_vec);

        let (granted, denial, missing) = match &decision {
            Decision::Allow => (true, None, Vec::new()),
            Decision::Deny(VerifyError::Forbidden { missing }) => {
                (false, Some(DenialKind::Forbidden), missing.clone())
            }
            Decision::Deny(_) => (false, Some(DenialKind::Unauthorized), Vec::new()),
        };

        let reason = match (path, &required, granted) {
            (AccessPath::Unauthenticated, _, _) => "caller is not authenticated".to_string(),
            (AccessPath::Public, None, _) => {
                "anonymous callers cannot access routes without a declared scope".to_string()
            }
            (AccessPath::Principal(_), None, _) => {
                "authenticated principals may access unscoped routes".to_string()
            }
            (_, Some(_), true) => "role grants every required action".to_string(),
            (_, Some(_), false) => format!("role lacks required action(s): {}", join(&missing)),
        };

        Self {
            granted,
            path,
            required,
            allowed_actions: allowed.into_iter().collect(),
            missing,
            denial,
            reason,
        }
    }

    fn into_result(self) -> Result<(), VerifyError> {
        match self.denial {
            None if self.granted => Ok(()),
            Some(DenialKind::Forbidden) => Err(VerifyError::Forbidden {
                missing: self.missing,
            }),
            _ => Err(VerifyError::Unauthorized),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verifier
// ─────────────────────────────────────────────────────────────────────────────

/// Decides whether an [`AuthResult`] satisfies a route's [`AccessConfig`].
///
/// Scope entries are ALL-of: every listed action must be granted to the
/// caller's role.
#[derive(Clone)]
pub struct Verifier {
    permissions: Arc<dyn PermissionStore>,
    hook: Option<Arc<dyn AuthorizationHook>>,
}

impl Verifier {
    pub fn new(permissions: Arc<dyn PermissionStore>) -> Self {
        Self {
            permissions,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn AuthorizationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub async fn verify(&self, auth: &AuthResult, config: &AccessConfig) -> Result<(), VerifyError> {
        let explanation = self.explain(auth, config).await?;
        debug!(
            granted = explanation.granted,
            path = ?explanation.path,
            reason = %explanation.reason,
            "scope decision"
        );
        explanation.into_result()?;

        if let Some(hook) = &self.hook {
            hook.after_allow(auth, config).await?;
        }
        Ok(())
    }

    /// Evaluate without enforcing. Uses the same rules as [`Self::verify`],
    /// minus the hook.
    pub async fn explain(
        &self,
        auth: &AuthResult,
        config: &AccessConfig,
    ) -> Result<Explanation, VerifyError> {
        let (path, filter) = match auth {
            AuthResult::Unauthenticated => {
                return Ok(Explanation::new(
                    AccessPath::Unauthenticated,
                    BTreeSet::new(),
                    config,
                ));
            }
            AuthResult::Public => (AccessPath::Public, PermissionFilter::public()),
            AuthResult::Authenticated(principal) => (
                AccessPath::Principal(principal.id),
                PermissionFilter::Role(principal.role.id),
            ),
        };

        let permissions = self.permissions.find_permissions(filter).await?;
        Ok(Explanation::new(path, allowed_actions(&permissions), config))
    }
}

impl core::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Verifier")
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}
