//! Capability gate for privileged construction.

mod capability;
mod modes;

pub use capability::Capability;
pub use modes::SecurityPolicy;

use serde::{Deserialize, Serialize};

/// Permissions a [`Capability`] can grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Construct a [`ConfigurationClient`](crate::ConfigurationClient).
    #[serde(rename = "createAuthenticationContextConfigurationClient")]
    CreateConfigurationClient,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateConfigurationClient => {
                "createAuthenticationContextConfigurationClient"
            }
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createAuthenticationContextConfigurationClient" => {
                Ok(Permission::CreateConfigurationClient)
            }
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_name() {
        let permission = Permission::CreateConfigurationClient;
        assert_eq!(
            permission.to_string(),
            "createAuthenticationContextConfigurationClient"
        );
        assert_eq!(permission.as_str().parse::<Permission>().unwrap(), permission);
        assert!("readSecrets".parse::<Permission>().is_err());
    }
}
