//! Capability tokens.

use std::collections::HashSet;

use super::{Permission, SecurityPolicy};
use crate::{Error, Result};

/// Token presented to privileged constructors.
///
/// Under [`SecurityPolicy::Unrestricted`] every check passes. Under
/// [`SecurityPolicy::Enforcing`] only granted permissions pass.
#[derive(Clone, Debug, Default)]
pub struct Capability {
    policy: SecurityPolicy,
    granted: HashSet<Permission>,
}

impl Capability {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Enforcing token with no grants.
    pub fn enforcing() -> Self {
        Self {
            policy: SecurityPolicy::Enforcing,
            granted: HashSet::new(),
        }
    }

    pub fn grant(mut self, permission: Permission) -> Self {
        self.granted.insert(permission);
        self
    }

    pub fn policy(&self) -> SecurityPolicy {
        self.policy
    }

    pub fn is_granted(&self, permission: Permission) -> bool {
        !self.policy.is_enforcing() || self.granted.contains(&permission)
    }

    /// Fail with [`Error::Permission`] unless `permission` is granted.
    pub fn check(&self, permission: Permission) -> Result<()> {
        if self.is_granted(permission) {
            Ok(())
        } else {
            tracing::warn!(permission = %permission, "Capability check failed");
            Err(Error::Permission(permission.to_string()))
        }
    }
}
