//! Capability interfaces implemented by authentication configurations.

use std::net::SocketAddr;
use std::sync::Arc;

use super::{CallbackHandler, Principal};
use crate::Result;
use crate::mechanism::{NegotiatedClient, ProviderSequence};
use crate::uri::TargetUri;

/// Yields the handler that answers credential callbacks.
pub trait CallbackHandlerSource {
    fn callback_handler(&self) -> Arc<dyn CallbackHandler>;
}

/// Computes the effective endpoint for a target URI.
pub trait HostResolver {
    /// Host to connect to; the configured override or the URI's own host.
    fn host(&self, uri: &TargetUri) -> Option<String>;

    /// Port to connect to; the configured override or the URI's effective port.
    fn port(&self, uri: &TargetUri) -> Option<u16>;
}

/// Yields the principal a configuration authenticates as.
pub trait PrincipalSource {
    fn principal(&self) -> Option<Principal>;
}

/// Builds a negotiated mechanism client from a provider sequence.
pub trait ClientBuilder {
    /// Try providers and offered mechanisms until one yields a client.
    ///
    /// Returns `Ok(None)` when nothing could be constructed. Errors are reserved for
    /// discovery faults and unexpected provider faults.
    fn create_client(
        &self,
        uri: &TargetUri,
        local_address: Option<SocketAddr>,
        peer_address: Option<SocketAddr>,
        providers: ProviderSequence,
        offered: &[&str],
    ) -> Result<Option<NegotiatedClient>>;
}

impl<T: CallbackHandlerSource + ?Sized> CallbackHandlerSource for Arc<T> {
    fn callback_handler(&self) -> Arc<dyn CallbackHandler> {
        (**self).callback_handler()
    }
}

impl<T: HostResolver + ?Sized> HostResolver for Arc<T> {
    fn host(&self, uri: &TargetUri) -> Option<String> {
        (**self).host(uri)
    }

    fn port(&self, uri: &TargetUri) -> Option<u16> {
        (**self).port(uri)
    }
}

impl<T: PrincipalSource + ?Sized> PrincipalSource for Arc<T> {
    fn principal(&self) -> Option<Principal> {
        (**self).principal()
    }
}

impl<T: ClientBuilder + ?Sized> ClientBuilder for Arc<T> {
    fn create_client(
        &self,
        uri: &TargetUri,
        local_address: Option<SocketAddr>,
        peer_address: Option<SocketAddr>,
        providers: ProviderSequence,
        offered: &[&str],
    ) -> Result<Option<NegotiatedClient>> {
        (**self).create_client(uri, local_address, peer_address, providers, offered)
    }
}
