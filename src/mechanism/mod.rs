//! Negotiated mechanism clients and the providers that build them.
//!
//! - [`MechanismProvider`]: named factory for one or more mechanisms
//! - [`ProviderSource`]: discovers an ordered [`ProviderSequence`] for a scope
//! - [`Negotiation`]: walks providers × candidate mechanisms until a client is built
//! - [`NegotiatedClient`]: the winning client, bound to one mechanism and one provider

mod builtin;
mod client;
mod error;
mod negotiation;
mod provider;
mod registry;
mod source;

use std::collections::HashMap;

pub use builtin::{AnonymousClient, BuiltinProvider, ExternalClient, PlainClient};
pub use client::{MechanismClient, NegotiatedClient};
pub use error::MechanismError;
pub use negotiation::Negotiation;
pub use provider::{ClientRequest, MechanismProvider};
pub use registry::ProviderRegistry;
pub use source::{ProviderScope, ProviderSequence, ProviderSource};

pub const PLAIN: &str = "PLAIN";
pub const ANONYMOUS: &str = "ANONYMOUS";
pub const EXTERNAL: &str = "EXTERNAL";

/// Mechanism property: refuse mechanisms that send the password in clear.
pub const PROP_NO_PLAINTEXT: &str = "no_plaintext";
/// Mechanism property: refuse anonymous mechanisms.
pub const PROP_NO_ANONYMOUS: &str = "no_anonymous";

/// Whether a boolean mechanism property is set to `true`.
pub fn property_enabled(properties: &HashMap<String, String>, key: &str) -> bool {
    properties
        .get(key)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
