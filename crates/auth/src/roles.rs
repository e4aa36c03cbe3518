use serde::{Deserialize, Serialize};

use scopegate_core::RoleId;

/// Role type tag.
///
/// `public` is the built-in role evaluated for anonymous callers; every other
/// tag is treated alike by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleType {
    Public,
    Authenticated,
    Custom(String),
}

impl RoleType {
    pub fn as_str(&self) -> &str {
        match self {
            RoleType::Public => "public",
            RoleType::Authenticated => "authenticated",
            RoleType::Custom(name) => name,
        }
    }
}

impl From<String> for RoleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "public" => RoleType::Public,
            "authenticated" => RoleType::Authenticated,
            _ => RoleType::Custom(value),
        }
    }
}

impl From<RoleType> for String {
    fn from(value: RoleType) -> Self {
        match value {
            RoleType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for RoleType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role as attached to a principal. Permissions are looked up by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(rename = "type")]
    pub kind: RoleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Role {
    pub fn new(id: RoleId, kind: RoleType) -> Self {
        Self {
            id,
            kind,
            name: None,
        }
    }

    pub fn public(id: RoleId) -> Self {
        Self::new(id, RoleType::Public)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_public(&self) -> bool {
        self.kind == RoleType::Public
    }
}
