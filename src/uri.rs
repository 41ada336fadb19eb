//! Validated target URIs.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::{Error, Result};

/// An absolute URI naming an authentication target.
///
/// Construction validates the input, so every `TargetUri` is well-formed. Components are
/// exposed the way match rules consume them: scheme, user-info, host, effective port and
/// path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetUri {
    url: Url,
}

impl TargetUri {
    /// Parse and validate a URI string.
    ///
    /// Empty input and relative references are rejected with [`Error::InvalidUri`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_uri(input, "URI is empty"));
        }
        Url::parse(trimmed)
            .map(|url| Self { url })
            .map_err(|e| Error::invalid_uri(input, e.to_string()))
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// User-info name, if the URI carries one.
    pub fn user(&self) -> Option<&str> {
        let user = self.url.username();
        (!user.is_empty()).then_some(user)
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str().filter(|h| !h.is_empty())
    }

    /// Explicit port, falling back to the well-known default for the scheme.
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    pub fn explicit_port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl FromStr for TargetUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for TargetUri {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Url> for TargetUri {
    fn from(url: Url) -> Self {
        Self { url }
    }
}

impl AsRef<str> for TargetUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TargetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
