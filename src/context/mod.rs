//! Rule-based authentication contexts.
//!
//! An [`AuthenticationContext`] is an ordered list of ([`MatchRule`], configuration)
//! pairs. Resolving a URI returns the configuration of the first rule that matches it.

mod rule;

use std::fmt;
use std::sync::Arc;

pub use rule::MatchRule;

use crate::auth::AuthenticationConfiguration;
use crate::config::{ConfigError, ConfigResult, ValidationErrors};
use crate::uri::TargetUri;

/// Immutable, ordered rule set mapping target URIs to configurations.
///
/// Rule indices are stable for the lifetime of the context. Resolution never mutates the
/// context, so a context can be shared freely across threads.
pub struct AuthenticationContext<C = AuthenticationConfiguration> {
    rules: Vec<(MatchRule, Arc<C>)>,
}

impl<C> AuthenticationContext<C> {
    /// Context without rules; resolves nothing.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn builder() -> AuthenticationContextBuilder<C> {
        AuthenticationContextBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &MatchRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Index of the first rule matching `uri`.
    pub fn rule_matching(&self, uri: &TargetUri) -> Option<usize> {
        self.rules.iter().position(|(rule, _)| rule.matches(uri))
    }

    /// Configuration attached to the rule at `index`.
    pub fn configuration(&self, index: usize) -> Option<&Arc<C>> {
        self.rules.get(index).map(|(_, config)| config)
    }

    /// Configuration of the first rule matching `uri`, if any.
    pub fn resolve(&self, uri: &TargetUri) -> Option<Arc<C>> {
        match self.rule_matching(uri) {
            Some(index) => {
                tracing::debug!(uri = %uri, rule = index, "Authentication rule matched");
                self.configuration(index).cloned()
            }
            None => {
                tracing::debug!(
                    uri = %uri,
                    rules = self.rules.len(),
                    "No authentication rule matched"
                );
                None
            }
        }
    }
}

impl<C> Default for AuthenticationContext<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> Clone for AuthenticationContext<C> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<C: fmt::Debug> fmt::Debug for AuthenticationContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationContext")
            .field("rules", &self.rules)
            .finish()
    }
}

/// Builder for [`AuthenticationContext`]. Rules keep the order they are added in.
pub struct AuthenticationContextBuilder<C = AuthenticationConfiguration> {
    rules: Vec<(MatchRule, Arc<C>)>,
}

impl<C> AuthenticationContextBuilder<C> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule(self, rule: MatchRule, configuration: C) -> Self {
        self.shared_rule(rule, Arc::new(configuration))
    }

    /// Add a rule whose configuration is shared with other rules or contexts.
    pub fn shared_rule(mut self, rule: MatchRule, configuration: Arc<C>) -> Self {
        self.rules.push((rule, configuration));
        self
    }

    /// Compile every rule and freeze the context.
    ///
    /// All invalid patterns are reported together.
    pub fn build(self) -> ConfigResult<AuthenticationContext<C>> {
        let mut errors = Vec::new();
        let mut rules = Vec::with_capacity(self.rules.len());

        for (index, (mut rule, config)) in self.rules.into_iter().enumerate() {
            if let Err(e) = rule.compile() {
                errors.push(match e {
                    ConfigError::InvalidValue { key, message } => ConfigError::InvalidValue {
                        key: format!("rules[{}].{}", index, key),
                        message,
                    },
                    other => other,
                });
                continue;
            }
            rules.push((rule, config));
        }

        match errors.len() {
            0 => Ok(AuthenticationContext { rules }),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::ValidationErrors(ValidationErrors(errors))),
        }
    }
}

impl<C> Default for AuthenticationContextBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
