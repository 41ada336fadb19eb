//! Settings documents describing configurations and rules.
//!
//! ```json
//! {
//!   "configurations": {
//!     "mail": { "name": "alice", "password": "secret", "mechanisms": { "allow": ["PLAIN"] } },
//!     "guest": { "anonymous": true }
//!   },
//!   "rules": [
//!     { "match": { "schemes": ["imap", "imaps"], "host": "*.example.com" }, "configuration": "mail" },
//!     { "configuration": "guest" }
//!   ]
//! }
//! ```
//!
//! A rule without a `match` block matches every URI. Unknown keys are rejected at every
//! level, so a misspelled condition cannot widen a rule.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::auth::{AuthenticationConfiguration, MechanismSelector};
use crate::context::{AuthenticationContext, MatchRule};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextSettings {
    #[serde(default)]
    pub configurations: HashMap<String, ConfigurationSettings>,

    /// Ordered; the first matching rule wins.
    #[serde(default)]
    pub rules: Vec<RuleSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    #[serde(default, rename = "match")]
    pub rule: MatchRule,

    /// Name of the configuration applied when the rule matches.
    pub configuration: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationSettings {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub anonymous: bool,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,

    #[serde(default)]
    pub realm: Option<String>,

    #[serde(default, rename = "authorizationId", alias = "authorization_id")]
    pub authorization_id: Option<String>,

    #[serde(default)]
    pub mechanisms: MechanismSelector,

    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl ConfigurationSettings {
    fn to_configuration(&self, key: &str) -> ConfigResult<AuthenticationConfiguration> {
        if self.anonymous && self.name.is_some() {
            return Err(ConfigError::InvalidValue {
                key: format!("configurations.{}", key),
                message: "a configuration cannot be both named and anonymous".to_string(),
            });
        }
        if self.port == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: format!("configurations.{}.port", key),
                message: "port must be non-zero".to_string(),
            });
        }

        let mut builder = AuthenticationConfiguration::builder().selector(self.mechanisms.clone());
        if let Some(host) = &self.host {
            builder = builder.host(host);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        if self.anonymous {
            builder = builder.anonymous();
        }
        if let Some(password) = &self.password {
            builder = builder.secret(password.clone());
        }
        if let Some(realm) = &self.realm {
            builder = builder.realm(realm);
        }
        if let Some(authorization_id) = &self.authorization_id {
            builder = builder.authorization_id(authorization_id);
        }
        for (k, v) in &self.properties {
            builder = builder.mechanism_property(k, v);
        }
        Ok(builder.build())
    }
}

impl ContextSettings {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge a later settings document into this one.
    ///
    /// Configurations with the same name are replaced; rules are appended after the
    /// existing ones.
    pub fn merge(&mut self, other: ContextSettings) {
        self.configurations.extend(other.configurations);
        self.rules.extend(other.rules);
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty() && self.rules.is_empty()
    }

    /// Compile the settings into an [`AuthenticationContext`].
    ///
    /// Each named configuration is built once and shared by every rule that refers to it.
    pub fn build(&self) -> ConfigResult<AuthenticationContext> {
        let mut errors = Vec::new();
        let mut built: HashMap<&str, Arc<AuthenticationConfiguration>> = HashMap::new();

        for (name, settings) in &self.configurations {
            match settings.to_configuration(name) {
                Ok(config) => {
                    built.insert(name.as_str(), Arc::new(config));
                }
                Err(e) => errors.push(e),
            }
        }

        let mut builder = AuthenticationContext::builder();
        for (index, rule) in self.rules.iter().enumerate() {
            match built.get(rule.configuration.as_str()) {
                Some(config) => {
                    builder = builder.shared_rule(rule.rule.clone(), Arc::clone(config));
                }
                None if self.configurations.contains_key(&rule.configuration) => {}
                None => errors.push(ConfigError::UnknownConfiguration {
                    rule: index,
                    name: rule.configuration.clone(),
                }),
            }
        }

        match errors.len() {
            0 => {
                let context = builder.build()?;
                tracing::debug!(
                    configurations = built.len(),
                    rules = context.len(),
                    "Authentication context built from settings"
                );
                Ok(context)
            }
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::ValidationErrors(ValidationErrors(errors))),
        }
    }
}
