//! File and environment loading for context settings.

use std::path::Path;

use super::{ConfigResult, ContextSettings};
use crate::context::AuthenticationContext;

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "AUTH_CONTEXT_CONFIG";

/// Settings loader that merges documents in load order.
///
/// Later documents replace same-named configurations and append their rules after the
/// rules already loaded.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    settings: ContextSettings,
    loaded: usize,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge one settings file.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> ConfigResult<&ContextSettings> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let settings = ContextSettings::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            configurations = settings.configurations.len(),
            rules = settings.rules.len(),
            "Loaded context settings"
        );
        self.settings.merge(settings);
        self.loaded += 1;
        Ok(&self.settings)
    }

    /// Load and merge an optional file; a missing file is skipped.
    pub async fn load_if_exists(&mut self, path: impl AsRef<Path>) -> ConfigResult<bool> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            tracing::trace!(path = %path.display(), "Settings file not present");
            return Ok(false);
        }
        self.load(path).await?;
        Ok(true)
    }

    /// Load the file named by [`CONFIG_ENV`], if the variable is set.
    pub async fn load_env(&mut self) -> ConfigResult<bool> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                self.load(&path).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Load a single file and compile it.
    pub async fn from_file(path: impl AsRef<Path>) -> ConfigResult<AuthenticationContext> {
        let mut loader = Self::new();
        loader.load(path).await?;
        loader.build()
    }

    /// Compile the file named by [`CONFIG_ENV`]; an unset variable yields an empty
    /// context.
    pub async fn from_env() -> ConfigResult<AuthenticationContext> {
        let mut loader = Self::new();
        loader.load_env().await?;
        loader.build()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    pub fn into_settings(self) -> ContextSettings {
        self.settings
    }

    pub fn build(&self) -> ConfigResult<AuthenticationContext> {
        self.settings.build()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::ConfigError;
    use crate::uri::TargetUri;

    fn settings_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_file() {
        let file = settings_file(
            r#"{
                "configurations": { "mail": { "name": "alice" } },
                "rules": [ { "match": { "schemes": ["imap"] }, "configuration": "mail" } ]
            }"#,
        );

        let context = SettingsLoader::from_file(file.path()).await.unwrap();
        let uri = TargetUri::parse("imap://mail.example.com").unwrap();
        assert_eq!(context.rule_matching(&uri), Some(0));
    }

    #[tokio::test]
    async fn test_merge_in_load_order() {
        let base = settings_file(
            r#"{
                "configurations": { "default": { "name": "alice" } },
                "rules": [ { "match": { "host": "a.example.com" }, "configuration": "default" } ]
            }"#,
        );
        let overlay = settings_file(
            r#"{ "rules": [ { "configuration": "default" } ] }"#,
        );

        let mut loader = SettingsLoader::new();
        loader.load(base.path()).await.unwrap();
        loader.load(overlay.path()).await.unwrap();
        assert_eq!(loader.loaded(), 2);

        let context = loader.build().unwrap();
        let uri = TargetUri::parse("https://b.example.com").unwrap();
        assert_eq!(context.rule_matching(&uri), Some(1));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let mut loader = SettingsLoader::new();
        assert!(!loader.load_if_exists(&path).await.unwrap());
        assert!(matches!(
            loader.load(&path).await.unwrap_err(),
            ConfigError::Io(_)
        ));
        assert!(loader.settings().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_file() {
        let file = settings_file("{ \"rules\": 42 }");
        let err = SettingsLoader::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }
}
