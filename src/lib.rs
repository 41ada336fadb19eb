//! # auth-context
//!
//! Rule-based authentication context resolution and SASL-style mechanism negotiation.
//!
//! An [`AuthenticationContext`] maps target URIs to [`AuthenticationConfiguration`]s
//! through an ordered list of match rules. A [`ConfigurationClient`] resolves the
//! configuration for a URI and negotiates a [`NegotiatedClient`] from the mechanisms a
//! server offers and the providers a [`ProviderSource`] discovers.
//!
//! ## Quick Start
//!
//! ```rust
//! use auth_context::{
//!     AuthenticationConfiguration, AuthenticationContext, Capability, ConfigurationClient,
//!     MatchRule, TargetUri,
//! };
//!
//! # fn main() -> Result<(), auth_context::Error> {
//! let context = AuthenticationContext::builder()
//!     .rule(
//!         MatchRule::all().with_host("*.example.com"),
//!         AuthenticationConfiguration::builder()
//!             .name("alice")
//!             .password("secret")
//!             .build(),
//!     )
//!     .build()?;
//!
//! let client = ConfigurationClient::new(&Capability::unrestricted())?;
//! let uri = TargetUri::parse("imap://mail.example.com")?;
//!
//! let configuration = client
//!     .authentication_configuration(&uri, &context)
//!     .expect("rule matches");
//!
//! let negotiated = client.create_client(&uri, &*configuration, &["SCRAM-SHA-256", "PLAIN"])?;
//! assert_eq!(negotiated.map(|c| c.mechanism().to_string()).as_deref(), Some("PLAIN"));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod mechanism;
pub mod permissions;
pub mod uri;

pub use auth::{
    AuthenticationConfiguration, AuthenticationConfigurationBuilder, Callback, CallbackError,
    CallbackHandler, CallbackHandlerSource, ClientBuilder, HostResolver, MechanismSelector,
    Principal, PrincipalSource,
};
pub use client::{ConfigurationClient, negotiate, resolve};
pub use config::{ConfigError, ContextSettings, SettingsLoader};
pub use context::{AuthenticationContext, AuthenticationContextBuilder, MatchRule};
pub use mechanism::{
    BuiltinProvider, ClientRequest, MechanismClient, MechanismError, MechanismProvider,
    NegotiatedClient, ProviderRegistry, ProviderScope, ProviderSequence, ProviderSource,
};
pub use permissions::{Capability, Permission, SecurityPolicy};
pub use uri::TargetUri;

/// Error type for auth-context operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The target URI is empty or malformed.
    #[error("Invalid URI '{input}': {reason}")]
    InvalidUri { input: String, reason: String },

    /// The presented capability does not grant the required permission.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider sequence could not be produced.
    #[error("Provider discovery failed: {0}")]
    Discovery(String),

    /// A mechanism provider hit an unexpected fault while constructing a client.
    #[error("Mechanism {mechanism} via provider '{provider}' failed: {message}")]
    Mechanism {
        mechanism: String,
        provider: String,
        message: String,
    },

    /// A credential callback could not be satisfied.
    #[error("Callback failed: {0}")]
    Callback(#[from] auth::CallbackError),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Capability gate rejected the caller
    Authorization,
    /// Configuration, settings, or rule compilation errors
    Configuration,
    /// Caller supplied malformed input
    InvalidInput,
    /// Provider discovery, mechanism faults, IO
    Internal,
}

impl Error {
    pub fn invalid_uri(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidUri {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Permission(_) => ErrorCategory::Authorization,
            Error::Config(_) | Error::Json(_) => ErrorCategory::Configuration,
            Error::InvalidUri { .. } => ErrorCategory::InvalidInput,
            Error::Discovery(_) | Error::Mechanism { .. } | Error::Callback(_) | Error::Io(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn is_authorization_error(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_invalid_input(&self) -> bool {
        self.category() == ErrorCategory::InvalidInput
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::UnknownConfiguration { rule, name } => Error::Config(format!(
                "Rule {} references undefined configuration '{}'",
                rule, name
            )),
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::ValidationErrors(errors) => Error::Config(errors.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
