//! URI match rules.

use std::net::Ipv6Addr;
use std::sync::OnceLock;

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};
use crate::uri::TargetUri;

const HOST_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

const PATH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Predicate over the components of a target URI.
///
/// Every condition that is set must hold; a rule with no conditions matches every URI.
///
/// | Condition     | Matches against                        |
/// |---------------|----------------------------------------|
/// | `schemes`     | scheme, case-insensitive, any of       |
/// | `host`        | host, glob, case-insensitive           |
/// | `port`        | effective port (explicit or default)   |
/// | `path`        | path, glob, `*` stops at `/`           |
/// | `user`        | user-info, exact                       |
/// | `no_user`     | absence of user-info                   |
/// | `uri_pattern` | whole URI string, regex                |
///
/// IPv6 hosts are matched without their brackets, so `::1` and `[::1]` both match
/// `https://[::1]/`. Unknown keys are rejected when a rule is deserialized.
///
/// ```rust
/// use auth_context::{MatchRule, TargetUri};
///
/// let mut rule = MatchRule::new().with_scheme("https").with_host("*.example.com");
/// rule.compile().unwrap();
///
/// assert!(rule.matches(&TargetUri::parse("https://api.example.com/v1").unwrap()));
/// assert!(!rule.matches(&TargetUri::parse("http://api.example.com/v1").unwrap()));
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_user: bool,

    #[serde(default, alias = "pattern", skip_serializing_if = "Option::is_none")]
    pub uri_pattern: Option<String>,

    /// `None` once set means the patterns do not compile.
    #[serde(skip)]
    compiled: OnceLock<Option<CompiledRule>>,
}

#[derive(Clone, Debug, Default)]
struct CompiledRule {
    host: Option<Pattern>,
    path: Option<Pattern>,
    uri: Option<Regex>,
}

impl MatchRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule that matches every URI.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.schemes.push(scheme.into());
        self.compiled = OnceLock::new();
        self
    }

    pub fn with_host(mut self, pattern: impl Into<String>) -> Self {
        self.host = Some(pattern.into());
        self.compiled = OnceLock::new();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_path(mut self, pattern: impl Into<String>) -> Self {
        self.path = Some(pattern.into());
        self.compiled = OnceLock::new();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.no_user = false;
        self
    }

    pub fn without_user(mut self) -> Self {
        self.user = None;
        self.no_user = true;
        self
    }

    pub fn with_uri_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.uri_pattern = Some(pattern.into());
        self.compiled = OnceLock::new();
        self
    }

    /// Compile glob and regex conditions.
    pub fn compile(&mut self) -> ConfigResult<()> {
        self.compiled = OnceLock::from(Some(self.build_patterns()?));
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some_and(Option::is_some)
    }

    pub fn is_match_all(&self) -> bool {
        self.schemes.is_empty()
            && self.host.is_none()
            && self.port.is_none()
            && self.path.is_none()
            && self.user.is_none()
            && !self.no_user
            && self.uri_pattern.is_none()
    }

    /// Whether `uri` satisfies every condition of this rule.
    ///
    /// Uncompiled rules compile their patterns on first use; a rule whose patterns do
    /// not compile matches nothing.
    pub fn matches(&self, uri: &TargetUri) -> bool {
        let compiled = self.compiled.get_or_init(|| {
            self.build_patterns()
                .inspect_err(|e| tracing::warn!(error = %e, "Skipping rule with invalid pattern"))
                .ok()
        });
        compiled
            .as_ref()
            .is_some_and(|compiled| self.matches_with(compiled, uri))
    }

    fn matches_with(&self, compiled: &CompiledRule, uri: &TargetUri) -> bool {
        if !self.schemes.is_empty()
            && !self
                .schemes
                .iter()
                .any(|s| s.eq_ignore_ascii_case(uri.scheme()))
        {
            return false;
        }

        if let Some(pattern) = &compiled.host {
            match uri.host().map(unbracket) {
                Some(host) if pattern.matches_with(host, HOST_OPTIONS) => {}
                _ => return false,
            }
        }

        if let Some(port) = self.port
            && uri.port() != Some(port)
        {
            return false;
        }

        if let Some(pattern) = &compiled.path
            && !pattern.matches_with(uri.path(), PATH_OPTIONS)
        {
            return false;
        }

        if let Some(user) = &self.user
            && uri.user() != Some(user.as_str())
        {
            return false;
        }

        if self.no_user && uri.user().is_some() {
            return false;
        }

        compiled
            .uri
            .as_ref()
            .is_none_or(|regex| regex.is_match(uri.as_str()))
    }

    fn build_patterns(&self) -> ConfigResult<CompiledRule> {
        let glob = |key: &str, pattern: &Option<String>| -> ConfigResult<Option<Pattern>> {
            pattern
                .as_deref()
                .map(Pattern::new)
                .transpose()
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("Invalid glob pattern: {}", e),
                })
        };

        let uri = self
            .uri_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: "uri_pattern".to_string(),
                message: format!("Invalid regex pattern: {}", e),
            })?;

        Ok(CompiledRule {
            host: glob("host", &self.host.as_deref().map(host_pattern))?,
            path: glob("path", &self.path)?,
            uri,
        })
    }
}

fn unbracket(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Bracketed IPv6 literals lose their brackets, which glob reads as a character class.
fn host_pattern(pattern: &str) -> String {
    let inner = unbracket(pattern);
    if inner.len() != pattern.len() && inner.parse::<Ipv6Addr>().is_ok() {
        inner.to_string()
    } else {
        pattern.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> TargetUri {
        TargetUri::parse(s).unwrap()
    }

    fn compiled(mut rule: MatchRule) -> MatchRule {
        rule.compile().unwrap();
        rule
    }

    #[test]
    fn test_match_all() {
        let rule = compiled(MatchRule::all());
        assert!(rule.is_match_all());
        assert!(rule.matches(&uri("https://a.example.com/x")));
        assert!(rule.matches(&uri("urn:example:thing")));
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let rule = compiled(MatchRule::new().with_scheme("IMAP").with_scheme("imaps"));
        assert!(rule.matches(&uri("imap://mail.example.com")));
        assert!(rule.matches(&uri("imaps://mail.example.com")));
        assert!(!rule.matches(&uri("smtp://mail.example.com")));
    }

    #[test]
    fn test_host_glob() {
        let rule = compiled(MatchRule::new().with_host("*.Example.com"));
        assert!(rule.matches(&uri("https://a.example.com/x")));
        assert!(!rule.matches(&uri("https://example.org/x")));
        assert!(!rule.matches(&uri("urn:example:thing")));
    }

    #[test]
    fn test_exact_host() {
        let rule = compiled(MatchRule::new().with_host("a.example.com"));
        assert!(rule.matches(&uri("https://a.example.com/x")));
        assert!(!rule.matches(&uri("https://b.example.com/x")));
    }

    #[test]
    fn test_effective_port() {
        let rule = compiled(MatchRule::new().with_port(443));
        assert!(rule.matches(&uri("https://example.com")));
        assert!(rule.matches(&uri("http://example.com:443")));
        assert!(!rule.matches(&uri("https://example.com:8443")));
    }

    #[test]
    fn test_path_glob() {
        let rule = compiled(MatchRule::new().with_path("/api/*"));
        assert!(rule.matches(&uri("https://example.com/api/users")));
        assert!(!rule.matches(&uri("https://example.com/api/users/1")));

        let deep = compiled(MatchRule::new().with_path("/api/**"));
        assert!(deep.matches(&uri("https://example.com/api/users/1")));
    }

    #[test]
    fn test_user_conditions() {
        let rule = compiled(MatchRule::new().with_user("bob"));
        assert!(rule.matches(&uri("imap://bob@mail.example.com")));
        assert!(!rule.matches(&uri("imap://alice@mail.example.com")));
        assert!(!rule.matches(&uri("imap://mail.example.com")));

        let anonymous = compiled(MatchRule::new().without_user());
        assert!(anonymous.matches(&uri("imap://mail.example.com")));
        assert!(!anonymous.matches(&uri("imap://bob@mail.example.com")));
    }

    #[test]
    fn test_uri_pattern() {
        let rule = compiled(MatchRule::new().with_uri_pattern(r"^urn:example:"));
        assert!(rule.matches(&uri("urn:example:thing")));
        assert!(!rule.matches(&uri("urn:other:thing")));
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        let mut rule = MatchRule::new().with_uri_pattern("[unclosed");
        let err = rule.compile().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "uri_pattern"));

        let mut rule = MatchRule::new().with_host("[a-");
        assert!(rule.compile().is_err());
        assert!(!rule.matches(&uri("https://a.example.com")));
    }

    #[test]
    fn test_uncompiled_rule_compiles_once() {
        let rule = MatchRule::new().with_host("*.example.com");
        assert!(!rule.is_compiled());
        assert!(rule.matches(&uri("https://a.example.com")));
        assert!(rule.is_compiled());
        assert!(!rule.matches(&uri("https://example.org")));

        let invalid = MatchRule::new().with_path("[a-");
        assert!(!invalid.matches(&uri("https://a.example.com/a")));
        assert!(!invalid.matches(&uri("https://a.example.com/a")));
        assert!(!invalid.is_compiled());
    }

    #[test]
    fn test_builder_resets_compiled_patterns() {
        let rule = compiled(MatchRule::new().with_host("a.example.com"));
        let rule = rule.with_host("b.example.com");
        assert!(!rule.is_compiled());
        assert!(rule.matches(&uri("https://b.example.com")));
    }

    #[test]
    fn test_ipv6_host() {
        let target = uri("https://[::1]:8443/");
        for pattern in ["[::1]", "::1"] {
            let rule = compiled(MatchRule::new().with_host(pattern));
            assert!(rule.matches(&target), "{pattern}");
            assert!(!rule.matches(&uri("https://[::2]:8443/")), "{pattern}");
        }
        assert!(compiled(MatchRule::new().with_host("*")).matches(&target));
        assert!(!compiled(MatchRule::new().with_host("[ab]")).matches(&target));
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let err = serde_json::from_str::<MatchRule>(r#"{"hostname": "a.example.com"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn test_serde() {
        let rule: MatchRule = serde_json::from_str(
            r#"{"schemes": ["https"], "host": "*.example.com", "pattern": "/v1/"}"#,
        )
        .unwrap();
        assert_eq!(rule.uri_pattern.as_deref(), Some("/v1/"));
        assert!(!rule.no_user);

        let json = serde_json::to_string(&MatchRule::all()).unwrap();
        assert_eq!(json, "{}");
    }
}
