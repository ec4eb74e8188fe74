use serde::Deserialize;

use crate::error::TagKitError;

/// Scheme prepended to URLs that do not carry one.
pub const DEFAULT_SCHEME: &str = "https://";

/// URL offered for writing before the user enters one.
pub const DEFAULT_WRITE_URL: &str = "https://example.com";

/// Technology requests issued by a write before it gives up.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// Tunables for a tag session and the prompt around it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct SessionConfig {
    /// Technology requests issued by a write before reporting an acquisition failure.
    pub max_write_attempts: u32,
    /// Scheme prefix enforced on every URL.
    pub default_scheme: String,
    /// URL seeded into the write prompt.
    pub default_write_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            default_scheme: DEFAULT_SCHEME.to_string(),
            default_write_url: DEFAULT_WRITE_URL.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json(json: &str) -> Result<Self, TagKitError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TagKitError::SerializationError {
                error: format!("Failed to parse session config: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can drive a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no write attempt would be made or the scheme
    /// is not of the form `name://`.
    pub fn validate(&self) -> Result<(), TagKitError> {
        if self.max_write_attempts == 0 {
            return Err(TagKitError::InvalidInput {
                error: "max_write_attempts must be at least 1".to_string(),
            });
        }
        let scheme_name = self.default_scheme.strip_suffix("://").unwrap_or_default();
        if scheme_name.is_empty() {
            return Err(TagKitError::InvalidInput {
                error: format!("invalid default scheme `{}`", self.default_scheme),
            });
        }
        Ok(())
    }

    /// Prepends the configured scheme unless `url` already starts with it.
    #[must_use]
    pub fn normalize_url(&self, url: &str) -> String {
        normalize_with_scheme(&self.default_scheme, url)
    }
}

/// Loads a [`SessionConfig`] from JSON shipped with the host app.
///
/// # Errors
///
/// See [`SessionConfig::from_json`].
#[uniffi::export]
pub fn session_config_from_json(json: &str) -> Result<SessionConfig, TagKitError> {
    SessionConfig::from_json(json)
}

/// Prepends `https://` unless `url` already starts with it.
///
/// Applying it twice yields the same string as applying it once.
#[uniffi::export]
#[must_use]
pub fn normalize_url(url: &str) -> String {
    normalize_with_scheme(DEFAULT_SCHEME, url)
}

fn normalize_with_scheme(scheme: &str, url: &str) -> String {
    if url.starts_with(scheme) {
        url.to_string()
    } else {
        format!("{scheme}{url}")
    }
}
