use scopegate_auth::{AuthResult, Principal, PrincipalId};

/// The caller of a request that passed the gate.
///
/// Inserted into request extensions by [`crate::middleware::gate`]; never
/// holds [`AuthResult::Unauthenticated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    auth: AuthResult,
}

impl CallerContext {
    pub(crate) fn new(auth: AuthResult) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &AuthResult {
        &self.auth
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.auth.credentials()
    }

    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.principal().map(|p| p.id)
    }

    pub fn is_public(&self) -> bool {
        self.auth.is_public()
    }
}
