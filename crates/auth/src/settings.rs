//! Advanced account settings consulted during authentication.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account settings owned by the surrounding application.
///
/// Only `email_confirmation` affects the gate. The remaining fields exist so a
/// settings document can be loaded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub unique_email: bool,
    pub allow_register: bool,
    /// Reject principals whose `confirmed` flag is false.
    pub email_confirmation: bool,
    pub email_reset_password: Option<String>,
    pub email_confirmation_redirection: Option<String>,
    pub default_role: String,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            unique_email: true,
            allow_register: true,
            email_confirmation: false,
            email_reset_password: None,
            email_confirmation_redirection: None,
            default_role: "authenticated".to_string(),
        }
    }
}

impl AdvancedSettings {
    pub fn with_email_confirmation(mut self, enabled: bool) -> Self {
        self.email_confirmation = enabled;
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn advanced_settings(&self) -> Result<AdvancedSettings, SettingsError>;
}

/// Fixed settings, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(AdvancedSettings);

impl StaticSettings {
    pub fn new(settings: AdvancedSettings) -> Self {
        Self(settings)
    }
}

#[async_trait]
impl SettingsProvider for StaticSettings {
    async fn advanced_settings(&self) -> Result<AdvancedSettings, SettingsError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let settings: AdvancedSettings =
            serde_json::from_str(r#"{"email_confirmation": true}"#).unwrap();
        assert!(settings.email_confirmation);
        assert!(settings.unique_email);
        assert_eq!(settings.default_role, "authenticated");
    }

    #[test]
    fn email_confirmation_is_off_by_default() {
        assert!(!AdvancedSettings::default().email_confirmation);
    }
}
