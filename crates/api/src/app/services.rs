//! Collaborator wiring: seed data, in-memory stores, HS256 credentials.

use std::sync::Arc;

use scopegate_auth::memory::Seed;
use scopegate_auth::{
    Action, AdvancedSettings, Authenticator, Hs256CredentialExtractor, InvalidAction, Permission,
    Role, RoleId, RoleType, StaticSettings, Verifier,
};

use crate::config::{ApiConfig, ConfigError};
use crate::middleware::GateState;

pub const ARTICLE_FIND: &str = "api::article.find";
pub const ARTICLE_CREATE: &str = "api::article.create";

/// Load the configured seed (or the built-in one) and wire the gate.
pub fn build_gate(config: &ApiConfig) -> Result<GateState, ConfigError> {
    let seed = match &config.seed_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedRead {
                path: path.clone(),
                source,
            })?;
            Seed::from_json(&raw).map_err(|source| ConfigError::SeedParse {
                path: path.clone(),
                source,
            })?
        }
        None => {
            tracing::info!("no seed file configured; using built-in roles");
            default_seed().map_err(|e| ConfigError::SeedLoad(e.to_string()))?
        }
    };

    build_gate_from_seed(config, seed)
}

pub fn build_gate_from_seed(config: &ApiConfig, seed: Seed) -> Result<GateState, ConfigError> {
    tracing::info!(
        roles = seed.roles.len(),
        principals = seed.principals.len(),
        permissions = seed.permissions.len(),
        "loading seed"
    );

    let (permissions, principals) = seed.into_stores()?;
    let permissions = Arc::new(permissions);

    let settings = AdvancedSettings::default().with_email_confirmation(config.email_confirmation);

    let authenticator = Authenticator::new(
        Arc::new(Hs256CredentialExtractor::new(&config.jwt_secret)),
        Arc::new(principals),
        Arc::new(StaticSettings::new(settings)),
        permissions.clone(),
    );
    let verifier = Verifier::new(permissions);

    Ok(GateState::new(authenticator, verifier))
}

/// Anonymous callers may list articles; authenticated ones may also create.
/// No principals: tokens only resolve once a seed file provides them.
pub fn default_seed() -> Result<Seed, InvalidAction> {
    let public = Role::public(RoleId::new()).with_name("Public");
    let authenticated = Role::new(RoleId::new(), RoleType::Authenticated).with_name("Authenticated");

    let find = Action::new(ARTICLE_FIND)?;
    let create = Action::new(ARTICLE_CREATE)?;
    let permissions = vec![
        Permission::new(public.id, find.clone()),
        Permission::new(authenticated.id, find),
        Permission::new(authenticated.id, create),
    ];

    Ok(Seed {
        roles: vec![public, authenticated],
        principals: Vec::new(),
        permissions,
    })
}
