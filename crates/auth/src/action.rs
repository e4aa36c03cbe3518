use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted action identifier, in bytes.
pub const MAX_ACTION_LEN: usize = 256;

/// Action identifier (e.g. `"content.create"`, `"plugin::upload.read"`).
///
/// Actions are opaque at this layer but always validated on construction, so a
/// route scope and a granted permission can only match when both were spelled
/// with the same well-formed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Action(Cow<'static, str>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("action is empty")]
    Empty,

    #[error("action is {len} bytes long (max {MAX_ACTION_LEN})")]
    TooLong { len: usize },

    #[error("action '{action}' contains invalid character {ch:?}")]
    InvalidCharacter { action: String, ch: char },
}

impl Action {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Result<Self, InvalidAction> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), InvalidAction> {
    if name.is_empty() {
        return Err(InvalidAction::Empty);
    }
    if name.len() > MAX_ACTION_LEN {
        return Err(InvalidAction::TooLong { len: name.len() });
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-' | '_')))
    {
        return Err(InvalidAction::InvalidCharacter {
            action: name.to_string(),
            ch,
        });
    }
    Ok(())
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for Action {
    type Err = InvalidAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for Action {
    type Error = InvalidAction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&'static str> for Action {
    type Error = InvalidAction;

    fn try_from(value: &'static str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        value.0.into_owned()
    }
}

/// The action(s) a route requires. Always evaluated as ALL-of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scope {
    One(Action),
    All(Vec<Action>),
}

impl Scope {
    /// Normalized view: a single action becomes a one-element slice.
    pub fn actions(&self) -> &[Action] {
        match self {
            Scope::One(action) => core::slice::from_ref(action),
            Scope::All(actions) => actions,
        }
    }
}

impl From<Action> for Scope {
    fn from(value: Action) -> Self {
        Scope::One(value)
    }
}

impl From<Vec<Action>> for Scope {
    fn from(value: Vec<Action>) -> Self {
        Scope::All(value)
    }
}

/// Per-route access declaration, owned by the routing layer.
///
/// `scope: None` means the route declared no required action. Anonymous
/// callers are refused on such routes; authenticated callers are let through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub scope: Option<Scope>,
}

impl AccessConfig {
    pub fn unscoped() -> Self {
        Self { scope: None }
    }

    pub fn require(action: Action) -> Self {
        Self {
            scope: Some(Scope::One(action)),
        }
    }

    pub fn require_all(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            scope: Some(Scope::All(actions.into_iter().collect())),
        }
    }

    /// Parse-and-build helper for route registration.
    pub fn parse_scope<I, S>(actions: I) -> Result<Self, InvalidAction>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let actions = actions
            .into_iter()
            .map(Action::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::require_all(actions))
    }

    pub fn required_actions(&self) -> Option<&[Action]> {
        self.scope.as_ref().map(Scope::actions)
    }
}
