//! Mechanism selection policy.

use serde::{Deserialize, Serialize};

/// Decides which offered mechanisms a configuration is willing to try, and in what order.
///
/// - Forbidden mechanisms are never tried.
/// - An empty allow list admits every offered mechanism in the order it was offered.
/// - A non-empty allow list admits only the listed mechanisms, ordered by their position
///   in the list.
///
/// Mechanism names compare case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechanismSelector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbid: Vec<String>,
}

impl MechanismSelector {
    /// Selector admitting every offered mechanism.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn allow(mut self, mechanism: impl Into<String>) -> Self {
        self.allow.push(mechanism.into());
        self
    }

    pub fn forbid(mut self, mechanism: impl Into<String>) -> Self {
        self.forbid.push(mechanism.into());
        self
    }

    pub fn is_forbidden(&self, mechanism: &str) -> bool {
        self.forbid.iter().any(|m| m.eq_ignore_ascii_case(mechanism))
    }

    pub fn is_allowed(&self, mechanism: &str) -> bool {
        !self.is_forbidden(mechanism)
            && (self.allow.is_empty() || self.allow.iter().any(|m| m.eq_ignore_ascii_case(mechanism)))
    }

    /// Filter and order offered mechanism names into the candidates to try.
    ///
    /// Duplicate offers collapse onto their first occurrence.
    pub fn candidates<'a>(&self, offered: &[&'a str]) -> Vec<&'a str> {
        let mut candidates: Vec<&'a str> = Vec::with_capacity(offered.len());
        for &mechanism in offered {
            if self.is_allowed(mechanism)
                && !candidates.iter().any(|c| c.eq_ignore_ascii_case(mechanism))
            {
                candidates.push(mechanism);
            }
        }

        if !self.allow.is_empty() {
            candidates.sort_by_key(|c| {
                self.allow
                    .iter()
                    .position(|m| m.eq_ignore_ascii_case(c))
                    .unwrap_or(usize::MAX)
            });
        }
        candidates
    }
}
