//! Mechanism provider trait.

use std::collections::HashMap;
use std::net::SocketAddr;

use super::{MechanismClient, MechanismError};
use crate::auth::CallbackHandler;
use crate::uri::TargetUri;

/// Everything a provider needs to build a client for one mechanism.
pub struct ClientRequest<'a> {
    /// Mechanism being attempted.
    pub mechanism: &'a str,
    pub uri: &'a TargetUri,
    /// Protocol name; the URI scheme.
    pub protocol: &'a str,
    /// Effective server host, after configuration overrides.
    pub server_name: &'a str,
    pub local_address: Option<SocketAddr>,
    pub peer_address: Option<SocketAddr>,
    pub authorization_id: Option<&'a str>,
    pub properties: &'a HashMap<String, String>,
    pub callback_handler: &'a dyn CallbackHandler,
}

/// Named factory for mechanism clients.
pub trait MechanismProvider: Send + Sync {
    /// Provider name for logging and de-duplication.
    fn name(&self) -> &str;

    /// Mechanisms this provider can build under the given properties.
    fn mechanism_names(&self, properties: &HashMap<String, String>) -> Vec<String>;

    /// Whether the provider supports `mechanism` under the given properties.
    fn supports(&self, mechanism: &str, properties: &HashMap<String, String>) -> bool {
        self.mechanism_names(properties)
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mechanism))
    }

    /// Build a client for `request.mechanism`.
    ///
    /// `Ok(None)` declines the request. [`MechanismError::Unavailable`] reports that this
    /// provider cannot serve it; any other error is treated as a provider fault.
    fn create_client(
        &self,
        request: &ClientRequest<'_>,
    ) -> Result<Option<Box<dyn MechanismClient>>, MechanismError>;
}
