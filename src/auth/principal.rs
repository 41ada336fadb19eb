//! Principal types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity a configuration authenticates as.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Principal {
    /// Named identity (authentication id).
    Named(String),
    /// Anonymous identity.
    Anonymous,
}

impl Principal {
    /// Create a named principal.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Get the principal name. Anonymous principals report `"anonymous"`.
    pub fn name(&self) -> &str {
        match self {
            Principal::Named(name) => name,
            Principal::Anonymous => "anonymous",
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Principal::Anonymous)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
