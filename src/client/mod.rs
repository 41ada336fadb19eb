//! Capability-gated facade over context resolution and mechanism negotiation.

mod negotiate;

pub use negotiate::{negotiate, resolve};

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::Result;
use crate::auth::{
    CallbackHandler, CallbackHandlerSource, ClientBuilder, HostResolver, Principal,
    PrincipalSource,
};
use crate::context::AuthenticationContext;
use crate::mechanism::{NegotiatedClient, ProviderRegistry, ProviderScope, ProviderSource};
use crate::permissions::{Capability, Permission};
use crate::uri::TargetUri;

/// Entry point for resolving configurations and negotiating mechanism clients.
///
/// Construction requires a [`Capability`] granting
/// [`Permission::CreateConfigurationClient`]. Providers come from an injected
/// [`ProviderSource`]; [`ConfigurationClient::new`] uses a [`ProviderRegistry`] holding
/// the built-in mechanisms.
#[derive(Clone)]
pub struct ConfigurationClient {
    source: Arc<dyn ProviderSource>,
    default_scope: ProviderScope,
}

impl ConfigurationClient {
    pub fn new(capability: &Capability) -> Result<Self> {
        Self::with_source(capability, Arc::new(ProviderRegistry::with_builtin()))
    }

    pub fn with_source(capability: &Capability, source: Arc<dyn ProviderSource>) -> Result<Self> {
        capability.check(Permission::CreateConfigurationClient)?;
        Ok(Self {
            source,
            default_scope: ProviderScope::default(),
        })
    }

    /// Scope searched by [`create_client`](Self::create_client).
    pub fn with_default_scope(mut self, scope: impl Into<ProviderScope>) -> Self {
        self.default_scope = scope.into();
        self
    }

    pub fn default_scope(&self) -> &ProviderScope {
        &self.default_scope
    }

    pub fn authentication_configuration<C>(
        &self,
        uri: &TargetUri,
        context: &AuthenticationContext<C>,
    ) -> Option<Arc<C>> {
        resolve(uri, context)
    }

    pub fn callback_handler<C>(&self, configuration: &C) -> Arc<dyn CallbackHandler>
    where
        C: CallbackHandlerSource + ?Sized,
    {
        configuration.callback_handler()
    }

    pub fn real_host<C>(&self, uri: &TargetUri, configuration: &C) -> Option<String>
    where
        C: HostResolver + ?Sized,
    {
        configuration.host(uri)
    }

    pub fn real_port<C>(&self, uri: &TargetUri, configuration: &C) -> Option<u16>
    where
        C: HostResolver + ?Sized,
    {
        configuration.port(uri)
    }

    pub fn principal<C>(&self, configuration: &C) -> Option<Principal>
    where
        C: PrincipalSource + ?Sized,
    {
        configuration.principal()
    }

    /// Negotiate against the default scope with global providers as fallback.
    pub fn create_client<C>(
        &self,
        uri: &TargetUri,
        configuration: &C,
        offered: &[&str],
    ) -> Result<Option<NegotiatedClient>>
    where
        C: ClientBuilder + ?Sized,
    {
        self.create_client_in(uri, configuration, offered, &self.default_scope, true)
    }

    /// Negotiate against `scope`, optionally falling back to global providers.
    pub fn create_client_in<C>(
        &self,
        uri: &TargetUri,
        configuration: &C,
        offered: &[&str],
        scope: &ProviderScope,
        use_global: bool,
    ) -> Result<Option<NegotiatedClient>>
    where
        C: ClientBuilder + ?Sized,
    {
        self.create_client_with_addresses(
            uri,
            None,
            None,
            configuration,
            offered,
            scope,
            use_global,
        )
    }

    /// Negotiate with the connection's local and peer addresses passed to providers.
    #[allow(clippy::too_many_arguments)]
    pub fn create_client_with_addresses<C>(
        &self,
        uri: &TargetUri,
        local_address: Option<SocketAddr>,
        peer_address: Option<SocketAddr>,
        configuration: &C,
        offered: &[&str],
        scope: &ProviderScope,
        use_global: bool,
    ) -> Result<Option<NegotiatedClient>>
    where
        C: ClientBuilder + ?Sized,
    {
        if offered.is_empty() {
            tracing::debug!(uri = %uri, "Server offered no mechanisms");
            return Ok(None);
        }

        let providers = self.source.providers(scope, use_global)?;
        tracing::trace!(
            uri = %uri,
            scope = %scope,
            use_global,
            offered = ?offered,
            "Negotiating mechanism client"
        );
        configuration.create_client(uri, local_address, peer_address, providers, offered)
    }
}

impl fmt::Debug for ConfigurationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationClient")
            .field("default_scope", &self.default_scope)
            .finish_non_exhaustive()
    }
}
