//! Built-in mechanisms.
//!
//! - **PLAIN** (RFC 4616): authzid, authcid and password in a single message
//! - **ANONYMOUS** (RFC 4505): optional trace token
//! - **EXTERNAL** (RFC 4422 appendix A): credentials come from the transport

mod anonymous;
mod external;
mod plain;

use std::collections::HashMap;

pub use anonymous::AnonymousClient;
pub use external::ExternalClient;
pub use plain::PlainClient;

use super::{
    ANONYMOUS, ClientRequest, EXTERNAL, MechanismClient, MechanismError, MechanismProvider,
    PLAIN, PROP_NO_ANONYMOUS, PROP_NO_PLAINTEXT, property_enabled,
};

/// Provider for the built-in mechanisms.
#[derive(Debug, Clone)]
pub struct BuiltinProvider {
    name: String,
}

impl BuiltinProvider {
    pub fn new() -> Self {
        Self::named("builtin")
    }

    /// Builtin provider registered under a different name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for BuiltinProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MechanismProvider for BuiltinProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn mechanism_names(&self, properties: &HashMap<String, String>) -> Vec<String> {
        let mut names = Vec::with_capacity(3);
        if !property_enabled(properties, PROP_NO_PLAINTEXT) {
            names.push(PLAIN.to_string());
        }
        if !property_enabled(properties, PROP_NO_ANONYMOUS) {
            names.push(ANONYMOUS.to_string());
        }
        names.push(EXTERNAL.to_string());
        names
    }

    fn create_client(
        &self,
        request: &ClientRequest<'_>,
    ) -> Result<Option<Box<dyn MechanismClient>>, MechanismError> {
        let mechanism = request.mechanism.to_ascii_uppercase();
        let client: Box<dyn MechanismClient> = match mechanism.as_str() {
            PLAIN => {
                if property_enabled(request.properties, PROP_NO_PLAINTEXT) {
                    return Err(MechanismError::unavailable(
                        "PLAIN refused by no_plaintext property",
                    ));
                }
                Box::new(PlainClient::from_request(request)?)
            }
            ANONYMOUS => {
                if property_enabled(request.properties, PROP_NO_ANONYMOUS) {
                    return Err(MechanismError::unavailable(
                        "ANONYMOUS refused by no_anonymous property",
                    ));
                }
                Box::new(AnonymousClient::from_request(request))
            }
            EXTERNAL => Box::new(ExternalClient::new(
                request.authorization_id.map(String::from),
            )),
            _ => return Ok(None),
        };
        Ok(Some(client))
    }
}
