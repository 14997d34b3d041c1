//! Configuration for the verification flow

use std::collections::HashMap;
use sv_shared::VerificationConfig;

/// Configuration for the verification flow
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// SMS body per language; `%token%` and `%phone%` are substituted
    pub sms_templates: HashMap<String, String>,
    /// Language used when the requested one has no template
    pub default_language: String,
    /// Number shown to the user as the sender of the code
    pub sender_number: String,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl VerificationServiceConfig {
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            sms_templates: config.sms_templates.clone(),
            default_language: config.default_language.clone(),
            sender_number: config.sender_number.clone(),
        }
    }

    /// Template for `language`, falling back to the default language
    pub fn template(&self, language: Option<&str>) -> Option<&str> {
        language
            .and_then(|lang| self.sms_templates.get(&lang.to_lowercase()))
            .or_else(|| self.sms_templates.get(&self.default_language))
            .map(String::as_str)
    }

    /// SMS body for `token` sent to `phone`
    pub fn render(&self, language: Option<&str>, token: &str, phone: &str) -> Option<String> {
        self.template(language)
            .map(|template| template.replace("%token%", token).replace("%phone%", phone))
    }
}
