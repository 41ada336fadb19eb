//! Security policies for capability checks.

use serde::{Deserialize, Serialize};

/// Whether capability checks are enforced.
///
/// - **Unrestricted**: no enforcer is installed; every check passes.
/// - **Enforcing**: a check passes only when the permission was granted.
///
/// ```rust
/// use auth_context::SecurityPolicy;
///
/// let policy: SecurityPolicy = "enforcing".parse().unwrap();
/// assert!(policy.is_enforcing());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityPolicy {
    #[default]
    Unrestricted,
    Enforcing,
}

impl SecurityPolicy {
    pub fn is_enforcing(&self) -> bool {
        matches!(self, SecurityPolicy::Enforcing)
    }

    pub fn description(&self) -> &'static str {
        match self {
            SecurityPolicy::Unrestricted => "All capability checks pass",
            SecurityPolicy::Enforcing => "Capability checks require an explicit grant",
        }
    }
}

impl std::fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityPolicy::Unrestricted => write!(f, "unrestricted"),
            SecurityPolicy::Enforcing => write!(f, "enforcing"),
        }
    }
}

impl std::str::FromStr for SecurityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unrestricted" | "none" | "off" => Ok(SecurityPolicy::Unrestricted),
            "enforcing" | "enforce" | "on" => Ok(SecurityPolicy::Enforcing),
            _ => Err(format!("Unknown security policy: {}", s)),
        }
    }
}
