//! API key management using the environment and system keyring

use keyring::Entry;

use super::error::TutorError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "studyhub";
/// Entry name for the API key
const API_KEY_ENTRY: &str = "tutor-api-key";
/// Environment variable checked before the keyring
pub const API_KEY_ENV: &str = "STUDYHUB_API_KEY";

/// Where the active key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

/// Manages the tutor API key
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Find the API key, preferring the environment over the keyring
    ///
    /// Returns `None` when no key is stored; some self-hosted endpoints need
    /// none.
    pub fn find_api_key() -> Option<(String, KeySource)> {
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
            return Some((key.trim().to_string(), KeySource::Environment));
        }

        match Self::get_api_key() {
            Ok(key) => Some((key, KeySource::Keyring)),
            Err(TutorError::NotConfigured) => None,
            Err(e) => {
                tracing::warn!("Could not read API key from keyring: {}", e);
                None
            }
        }
    }

    /// Get the API key from system keyring
    pub fn get_api_key() -> Result<String, TutorError> {
        let entry = Self::entry()?;

        entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => TutorError::NotConfigured,
            _ => TutorError::KeyringError(e.to_string()),
        })
    }

    /// Store the API key in system keyring
    pub fn set_api_key(key: &str) -> Result<(), TutorError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(TutorError::InvalidApiKey);
        }

        Self::entry()?.set_password(key).map_err(|e| TutorError::KeyringError(e.to_string()))
    }

    /// Delete the stored API key
    pub fn delete_api_key() -> Result<(), TutorError> {
        Self::entry()?.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => TutorError::NotConfigured,
            _ => TutorError::KeyringError(e.to_string()),
        })
    }

    fn entry() -> Result<Entry, TutorError> {
        Entry::new(SERVICE_NAME, API_KEY_ENTRY).map_err(|e| TutorError::KeyringError(e.to_string()))
    }

    /// Validate API key format
    fn validate_key_format(key: &str) -> bool {
        key.len() >= 20 && !key.chars().any(char::is_whitespace)
    }

    /// Mask an API key for display (show first 8 and last 4 chars)
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 || !key.is_ascii() {
            return "*".repeat(key.chars().count());
        }
        let prefix = &key[..8];
        let suffix = &key[key.len() - 4..];
        format!("{}...{}", prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_key_format() {
        assert!(ApiKeyManager::validate_key_format("sk-or-v1-abcdefghijklmnop"));
        assert!(!ApiKeyManager::validate_key_format("short-key"));
        assert!(!ApiKeyManager::validate_key_format("has whitespace in the middle of it"));
    }

    #[test]
    fn mask_key() {
        let masked = ApiKeyManager::mask_key("sk-or-v1-abcdefghijklmnopqrstuvwxyz");
        assert!(masked.starts_with("sk-or-v1"));
        assert!(masked.ends_with("wxyz"));
        assert!(masked.contains("..."));
    }

    #[test]
    fn mask_short_key_fully() {
        assert_eq!(ApiKeyManager::mask_key("abc"), "***");
    }
}
