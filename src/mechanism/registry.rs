//! In-process provider registry.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use super::{BuiltinProvider, MechanismProvider, ProviderScope, ProviderSequence, ProviderSource};
use crate::{Error, Result};

/// Provider registry with named scopes and a global fallback list.
///
/// Registration order is iteration order. Lists are snapshotted when a sequence is
/// produced, so registrations made during a negotiation do not affect it.
#[derive(Default)]
pub struct ProviderRegistry {
    scoped: RwLock<HashMap<ProviderScope, Vec<Arc<dyn MechanismProvider>>>>,
    global: RwLock<Vec<Arc<dyn MechanismProvider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with [`BuiltinProvider`] registered globally.
    pub fn with_builtin() -> Self {
        let builtin: Arc<dyn MechanismProvider> = Arc::new(BuiltinProvider::new());
        Self {
            scoped: RwLock::default(),
            global: RwLock::new(vec![builtin]),
        }
    }

    /// Register a provider for a scope.
    pub fn register(
        &self,
        scope: impl Into<ProviderScope>,
        provider: Arc<dyn MechanismProvider>,
    ) -> Result<()> {
        let scope = scope.into();
        tracing::debug!(
            scope = %scope,
            provider = provider.name(),
            "Registering mechanism provider"
        );
        self.scoped
            .write()
            .map_err(|_| Error::Discovery("provider registry lock poisoned".into()))?
            .entry(scope)
            .or_default()
            .push(provider);
        Ok(())
    }

    /// Register a provider visible to every global-fallback search.
    pub fn register_global(&self, provider: Arc<dyn MechanismProvider>) -> Result<()> {
        tracing::debug!(
            provider = provider.name(),
            "Registering global mechanism provider"
        );
        self.global
            .write()
            .map_err(|_| Error::Discovery("provider registry lock poisoned".into()))?
            .push(provider);
        Ok(())
    }

    /// Names of providers a search would yield, in order.
    pub fn provider_names(
        &self,
        scope: &ProviderScope,
        include_global: bool,
    ) -> Result<Vec<String>> {
        Ok(self
            .providers(scope, include_global)?
            .filter_map(|p| p.ok().map(|p| p.name().to_string()))
            .collect())
    }

    fn snapshot(
        &self,
        scope: &ProviderScope,
        include_global: bool,
    ) -> Result<Vec<Arc<dyn MechanismProvider>>> {
        let mut providers = self
            .scoped
            .read()
            .map_err(|_| Error::Discovery("provider registry lock poisoned".into()))?
            .get(scope)
            .cloned()
            .unwrap_or_default();

        if include_global {
            let global = self
                .global
                .read()
                .map_err(|_| Error::Discovery("provider registry lock poisoned".into()))?;
            providers.extend(global.iter().cloned());
        }
        Ok(providers)
    }
}

impl ProviderSource for ProviderRegistry {
    fn providers(&self, scope: &ProviderScope, include_global: bool) -> Result<ProviderSequence> {
        let providers = self.snapshot(scope, include_global)?;
        let mut seen = HashSet::new();
        Ok(ProviderSequence::new(
            providers
                .into_iter()
                .filter(move |p| seen.insert(p.name().to_string()))
                .map(Ok),
        ))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes: Vec<String> = self
            .scoped
            .read()
            .map(|s| s.keys().map(|k| k.to_string()).collect())
            .unwrap_or_default();
        let global: Vec<String> = self
            .global
            .read()
            .map(|g| g.iter().map(|p| p.name().to_string()).collect())
            .unwrap_or_default();
        f.debug_struct("ProviderRegistry")
            .field("scopes", &scopes)
            .field("global", &global)
            .finish()
    }
}
