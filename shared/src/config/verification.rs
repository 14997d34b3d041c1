//! Token and phone verification configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{env_list, env_parse, ConfigError};

/// Minimum length of the phone hashing key in bytes
pub const MIN_HASH_KEY_LEN: usize = 32;

/// Countries whose mobile numbers may receive codes (ISO 3166 alpha-2)
pub const DEFAULT_ALLOWED_COUNTRIES: &[&str] = &[
    "AT", "BE", "BG", "CY", "DK", "DE", "EE", "FI", "FR", "GR", "HU", "IE", "IS", "IT", "HR",
    "LV", "LT", "LI", "LU", "MT", "MC", "NL", "NO", "PL", "PT", "RO", "SI", "SK", "ES", "CZ",
    "GB", "SE", "CH",
];

/// Verification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Seconds a generated code stays valid
    #[serde(default = "default_token_validity_seconds")]
    pub token_validity_seconds: i64,

    /// Wrong guesses tolerated before a code is locked
    #[serde(default = "default_max_verify_tries")]
    pub max_verify_tries: u32,

    /// Approved countries for phone canonicalization
    #[serde(default = "default_allowed_countries")]
    pub allowed_countries: Vec<String>,

    /// HMAC key used to derive phone keys; raw numbers are never stored
    #[serde(default)]
    pub phone_hash_key: String,

    /// SMS body per language; `%token%` and `%phone%` are substituted
    #[serde(default = "default_sms_templates")]
    pub sms_templates: HashMap<String, String>,

    /// Template used when the requested language has none
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Number shown to the user as the sender of the code
    #[serde(default)]
    pub sender_number: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            token_validity_seconds: default_token_validity_seconds(),
            max_verify_tries: default_max_verify_tries(),
            allowed_countries: default_allowed_countries(),
            phone_hash_key: String::new(),
            sms_templates: default_sms_templates(),
            default_language: default_language(),
            sender_number: String::new(),
        }
    }
}

impl VerificationConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut sms_templates = defaults.sms_templates.clone();
        for (language, template) in std::env::vars()
            .filter_map(|(name, value)| {
                name.strip_prefix("SMS_TEMPLATE_")
                    .map(|lang| (lang.to_lowercase(), value))
            })
        {
            sms_templates.insert(language, template);
        }

        Ok(Self {
            token_validity_seconds: env_parse("TOKEN_VALIDITY_SECONDS")?
                .unwrap_or(defaults.token_validity_seconds),
            max_verify_tries: env_parse("MAX_VERIFY_TRIES")?.unwrap_or(defaults.max_verify_tries),
            allowed_countries: env_list("ALLOWED_COUNTRIES").unwrap_or(defaults.allowed_countries),
            phone_hash_key: std::env::var("PHONE_HASH_KEY").unwrap_or_default(),
            sms_templates,
            default_language: env_parse("SMS_DEFAULT_LANGUAGE")?
                .unwrap_or(defaults.default_language),
            sender_number: std::env::var("SMS_SENDER_NUMBER").unwrap_or_default(),
        })
    }

    /// Validate key length, validity window and the country list
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phone_hash_key.is_empty() {
            return Err(ConfigError::Missing {
                field: "PHONE_HASH_KEY".to_string(),
            });
        }
        if self.phone_hash_key.len() < MIN_HASH_KEY_LEN {
            return Err(ConfigError::InvalidValue {
                field: "PHONE_HASH_KEY".to_string(),
                reason: format!("must be at least {} bytes", MIN_HASH_KEY_LEN),
            });
        }
        if self.token_validity_seconds <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "TOKEN_VALIDITY_SECONDS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.allowed_countries.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_COUNTRIES".to_string(),
                reason: "at least one country is required".to_string(),
            });
        }
        if !self.sms_templates.contains_key(&self.default_language) {
            return Err(ConfigError::InvalidValue {
                field: "SMS_DEFAULT_LANGUAGE".to_string(),
                reason: format!("no template for '{}'", self.default_language),
            });
        }
        Ok(())
    }

    /// Token validity in milliseconds
    pub fn token_validity_ms(&self) -> i64 {
        self.token_validity_seconds * 1_000
    }
}

fn default_token_validity_seconds() -> i64 {
    1_800
}

fn default_max_verify_tries() -> u32 {
    3
}

fn default_allowed_countries() -> Vec<String> {
    DEFAULT_ALLOWED_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

fn default_language() -> String {
    String::from("en")
}

fn default_sms_templates() -> HashMap<String, String> {
    let mut templates = HashMap::new();
    templates.insert(
        "en".to_string(),
        "Your verification code is %token%".to_string(),
    );
    templates.insert(
        "nl".to_string(),
        "Uw verificatiecode is %token%".to_string(),
    );
    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> VerificationConfig {
        VerificationConfig {
            phone_hash_key: "0123456789abcdef0123456789abcdef".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.max_verify_tries, 3);
        assert_eq!(config.token_validity_ms(), 1_800_000);
        assert!(config.allowed_countries.contains(&"NL".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_hash_key_rejected() {
        let config = VerificationConfig {
            phone_hash_key: "too-short".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_hash_key_rejected() {
        assert!(matches!(
            VerificationConfig::default().validate(),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_empty_country_list_rejected() {
        let config = VerificationConfig {
            allowed_countries: vec![],
            ..valid()
        };
        assert!(config.validate().is_err());
    }
}
