//! Context settings.
//!
//! ```rust,no_run
//! use auth_context::config::SettingsLoader;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut loader = SettingsLoader::new();
//! loader.load("/etc/auth-context/base.json").await?;
//! loader.load_env().await?;
//! let context = loader.build()?;
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod settings;

pub use loader::{CONFIG_ENV, SettingsLoader};
pub use settings::{ConfigurationSettings, ContextSettings, RuleSettings};

use thiserror::Error;

/// Errors that can occur while loading settings or compiling rules
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key not found
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// A rule names a configuration that is not defined
    #[error("Rule {rule} references undefined configuration '{name}'")]
    UnknownConfiguration {
        /// Index of the offending rule
        rule: usize,
        /// Configuration name the rule refers to
        name: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
