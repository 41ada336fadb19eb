//! Provider × mechanism negotiation loop.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use super::{ClientRequest, MechanismProvider, NegotiatedClient, ProviderSequence};
use crate::auth::CallbackHandler;
use crate::uri::TargetUri;
use crate::{Error, Result};

/// One negotiation attempt over a provider sequence.
///
/// Providers are visited in sequence order; for each provider, the candidate mechanisms
/// it supports are attempted in candidate order. The first client built wins. A
/// (provider, mechanism) pair that fails is never attempted again within the same run.
/// Providers are told apart by identity, not by name.
pub struct Negotiation<'a> {
    uri: &'a TargetUri,
    server_name: &'a str,
    candidates: Vec<&'a str>,
    callback_handler: &'a dyn CallbackHandler,
    properties: &'a HashMap<String, String>,
    authorization_id: Option<&'a str>,
    local_address: Option<SocketAddr>,
    peer_address: Option<SocketAddr>,
}

impl<'a> Negotiation<'a> {
    pub fn new(
        uri: &'a TargetUri,
        candidates: Vec<&'a str>,
        callback_handler: &'a dyn CallbackHandler,
        properties: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            uri,
            server_name: uri.host().unwrap_or_default(),
            candidates,
            callback_handler,
            properties,
            authorization_id: None,
            local_address: None,
            peer_address: None,
        }
    }

    pub fn server_name(mut self, server_name: &'a str) -> Self {
        self.server_name = server_name;
        self
    }

    pub fn authorization_id(mut self, authorization_id: Option<&'a str>) -> Self {
        self.authorization_id = authorization_id;
        self
    }

    pub fn addresses(
        mut self,
        local_address: Option<SocketAddr>,
        peer_address: Option<SocketAddr>,
    ) -> Self {
        self.local_address = local_address;
        self.peer_address = peer_address;
        self
    }

    pub fn candidates(&self) -> &[&'a str] {
        &self.candidates
    }

    fn request(&self, mechanism: &'a str) -> ClientRequest<'_> {
        ClientRequest {
            mechanism,
            uri: self.uri,
            protocol: self.uri.scheme(),
            server_name: self.server_name,
            local_address: self.local_address,
            peer_address: self.peer_address,
            authorization_id: self.authorization_id,
            properties: self.properties,
            callback_handler: self.callback_handler,
        }
    }

    /// Walk the provider sequence until a client is bound or the sequence is exhausted.
    ///
    /// Returns `Ok(None)` when no client could be built. A discovery fault in the
    /// sequence, or a non-recoverable provider error, aborts with `Err`.
    pub fn run(&self, providers: ProviderSequence) -> Result<Option<NegotiatedClient>> {
        if self.candidates.is_empty() {
            tracing::debug!(uri = %self.uri, "No candidate mechanisms to negotiate");
            return Ok(None);
        }

        let mut failed = FailedAttempts::default();

        for provider in providers {
            let provider = provider?;
            let supported = provider.mechanism_names(self.properties);

            for &mechanism in &self.candidates {
                if !supported.iter().any(|m| m.eq_ignore_ascii_case(mechanism)) {
                    continue;
                }

                if failed.contains(&provider, mechanism) {
                    continue;
                }

                tracing::trace!(
                    uri = %self.uri,
                    provider = provider.name(),
                    mechanism,
                    "Attempting mechanism"
                );

                match provider.create_client(&self.request(mechanism)) {
                    Ok(Some(mut client)) => {
                        if !client.mechanism_name().eq_ignore_ascii_case(mechanism) {
                            tracing::warn!(
                                provider = provider.name(),
                                requested = mechanism,
                                returned = client.mechanism_name(),
                                "Provider returned a client for the wrong mechanism"
                            );
                            client.dispose();
                            failed.insert(&provider, mechanism);
                            continue;
                        }

                        tracing::debug!(
                            uri = %self.uri,
                            provider = provider.name(),
                            mechanism,
                            "Mechanism client negotiated"
                        );
                        return Ok(Some(NegotiatedClient::bind(
                            client,
                            mechanism,
                            provider.name(),
                        )));
                    }
                    Ok(None) => {
                        tracing::trace!(provider = provider.name(), mechanism, "Provider declined");
                        failed.insert(&provider, mechanism);
                    }
                    Err(e) if e.is_recoverable() => {
                        tracing::debug!(
                            provider = provider.name(),
                            mechanism,
                            error = %e,
                            "Mechanism unavailable, trying next candidate"
                        );
                        failed.insert(&provider, mechanism);
                    }
                    Err(e) => {
                        return Err(Error::Mechanism {
                            mechanism: mechanism.to_string(),
                            provider: provider.name().to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            uri = %self.uri,
            candidates = ?self.candidates,
            "No mechanism client available"
        );
        Ok(None)
    }
}

/// Failed (provider, mechanism) pairs of one run.
///
/// Holds the providers so an address cannot be reused by a later provider in the
/// same run.
#[derive(Default)]
struct FailedAttempts(Vec<(Arc<dyn MechanismProvider>, String)>);

impl FailedAttempts {
    fn contains(&self, provider: &Arc<dyn MechanismProvider>, mechanism: &str) -> bool {
        self.0
            .iter()
            .any(|(p, m)| Arc::ptr_eq(p, provider) && m.eq_ignore_ascii_case(mechanism))
    }

    fn insert(&mut self, provider: &Arc<dyn MechanismProvider>, mechanism: &str) {
        self.0.push((Arc::clone(provider), mechanism.to_ascii_uppercase()));
    }
}
