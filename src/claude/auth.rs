//! API key management using system keyring
//!
//! The environment variable wins over the keyring so a key can be supplied
//! for a single run without touching stored credentials.

use keyring::Entry;

use super::error::ClaudeError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "tubequiz";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "anthropic-api-key";
/// Environment variable checked before the keyring
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Where a resolved key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

/// Manages Claude API key storage in system keyring
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Resolve the API key from the environment, falling back to the keyring
    pub fn resolve() -> Result<(String, KeySource), ClaudeError> {
        if let Some(key) = Self::from_env_value(std::env::var(API_KEY_ENV).ok()) {
            return Ok((key, KeySource::Environment));
        }
        Self::get_api_key().map(|key| (key, KeySource::Keyring))
    }

    /// Resolve the key, treating every failure as "no credential"
    pub fn resolve_optional() -> Option<String> {
        match Self::resolve() {
            Ok((key, source)) => {
                tracing::debug!("Using API key from {:?}", source);
                Some(key)
            }
            Err(ClaudeError::ApiKeyNotFound) => None,
            Err(e) => {
                tracing::warn!("Could not read API key: {}", e);
                None
            }
        }
    }

    /// Get the API key from system keyring
    pub fn get_api_key() -> Result<String, ClaudeError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| ClaudeError::KeyringError(e.to_string()))?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => ClaudeError::ApiKeyNotFound,
            _ => ClaudeError::KeyringError(e.to_string()),
        })
    }

    /// Store the API key in system keyring
    pub fn set_api_key(key: &str) -> Result<(), ClaudeError> {
        if !Self::validate_key_format(key) {
            return Err(ClaudeError::InvalidApiKey);
        }

        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| ClaudeError::KeyringError(e.to_string()))?;

        entry.set_password(key).map_err(|e| ClaudeError::KeyringError(e.to_string()))
    }

    /// Delete the stored API key
    pub fn delete_api_key() -> Result<(), ClaudeError> {
        let entry = Entry::new(SERVICE_NAME, API_KEY_ENTRY)
            .map_err(|e| ClaudeError::KeyringError(e.to_string()))?;

        entry.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => ClaudeError::ApiKeyNotFound,
            _ => ClaudeError::KeyringError(e.to_string()),
        })
    }

    /// Blank values in the environment count as unset
    fn from_env_value(value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    /// Validate API key format
    fn validate_key_format(key: &str) -> bool {
        // Anthropic API keys start with "sk-ant-"
        key.starts_with("sk-ant-") && key.len() > 20
    }

    /// Mask an API key for display (show first 8 and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        let len = key.chars().count();
        if len <= 12 {
            return "*".repeat(len);
        }
        let prefix: String = key.chars().take(8).collect();
        let suffix: String = key.chars().skip(len - 4).collect();
        format!("{}...{}", prefix, suffix)
    }
}
