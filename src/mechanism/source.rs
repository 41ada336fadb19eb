//! Provider discovery.

use std::fmt;
use std::sync::Arc;

use super::MechanismProvider;
use crate::Result;

pub const DEFAULT_SCOPE: &str = "default";

/// Named subset of registered providers a caller searches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderScope(String);

impl ProviderScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProviderScope {
    fn default() -> Self {
        Self(DEFAULT_SCOPE.to_string())
    }
}

impl fmt::Display for ProviderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderScope {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

type ProviderIter = Box<dyn Iterator<Item = Result<Arc<dyn MechanismProvider>>> + Send>;

/// Ordered, lazily produced, finite sequence of providers.
///
/// Each negotiation consumes its own sequence. An `Err` item is a discovery fault and
/// aborts the negotiation that reads it.
pub struct ProviderSequence {
    inner: ProviderIter,
}

impl ProviderSequence {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Arc<dyn MechanismProvider>>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn from_providers(providers: Vec<Arc<dyn MechanismProvider>>) -> Self {
        Self::new(providers.into_iter().map(Ok))
    }
}

impl Iterator for ProviderSequence {
    type Item = Result<Arc<dyn MechanismProvider>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for ProviderSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSequence").finish_non_exhaustive()
    }
}

/// Source of mechanism providers.
pub trait ProviderSource: Send + Sync {
    /// Produce a fresh provider sequence.
    ///
    /// With `include_global = false` only providers registered for `scope` are yielded;
    /// otherwise globally registered providers follow them.
    fn providers(&self, scope: &ProviderScope, include_global: bool) -> Result<ProviderSequence>;
}

impl<F> ProviderSource for F
where
    F: Fn(&ProviderScope, bool) -> Result<ProviderSequence> + Send + Sync,
{
    fn providers(&self, scope: &ProviderScope, include_global: bool) -> Result<ProviderSequence> {
        self(scope, include_global)
    }
}
