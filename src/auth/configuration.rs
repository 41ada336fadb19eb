//! Authentication configuration and its builder.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;

use super::{
    CallbackHandler, CallbackHandlerSource, ClientBuilder, ConfiguredCallbackHandler,
    HostResolver, MechanismSelector, Principal, PrincipalSource,
};
use crate::Result;
use crate::mechanism::{ANONYMOUS, NegotiatedClient, Negotiation, ProviderSequence};
use crate::uri::TargetUri;

/// Immutable description of how to authenticate toward a target.
///
/// Credentials are answered through the configuration's [`CallbackHandler`]. Unless a
/// handler is supplied, one is built from the principal, password, realm and
/// authorization id.
///
/// # Example
///
/// ```rust
/// use auth_context::{AuthenticationConfiguration, HostResolver, TargetUri};
///
/// let config = AuthenticationConfiguration::builder()
///     .host("10.0.0.5")
///     .port(1143)
///     .name("alice")
///     .password("secret")
///     .build();
///
/// let uri = TargetUri::parse("imap://mail.example.com").unwrap();
/// assert_eq!(config.host(&uri).as_deref(), Some("10.0.0.5"));
/// assert_eq!(config.port(&uri), Some(1143));
/// ```
#[derive(Clone)]
pub struct AuthenticationConfiguration {
    host: Option<String>,
    port: Option<u16>,
    principal: Option<Principal>,
    realm: Option<String>,
    authorization_id: Option<String>,
    selector: MechanismSelector,
    properties: HashMap<String, String>,
    callback_handler: Arc<dyn CallbackHandler>,
}

impl AuthenticationConfiguration {
    pub fn builder() -> AuthenticationConfigurationBuilder {
        AuthenticationConfigurationBuilder::default()
    }

    pub fn host_override(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port_override(&self) -> Option<u16> {
        self.port
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn authorization_id(&self) -> Option<&str> {
        self.authorization_id.as_deref()
    }

    pub fn selector(&self) -> &MechanismSelector {
        &self.selector
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Offered mechanisms this configuration is willing to try, in attempt order.
    ///
    /// A named principal never negotiates `ANONYMOUS`; an anonymous principal negotiates
    /// nothing else.
    pub fn candidates<'a>(&self, offered: &[&'a str]) -> Vec<&'a str> {
        let mut candidates = self.selector.candidates(offered);
        match &self.principal {
            Some(Principal::Anonymous) => {
                candidates.retain(|m| m.eq_ignore_ascii_case(ANONYMOUS));
            }
            Some(Principal::Named(_)) => {
                candidates.retain(|m| !m.eq_ignore_ascii_case(ANONYMOUS));
            }
            None => {}
        }
        candidates
    }
}

impl Default for AuthenticationConfiguration {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CallbackHandlerSource for AuthenticationConfiguration {
    fn callback_handler(&self) -> Arc<dyn CallbackHandler> {
        Arc::clone(&self.callback_handler)
    }
}

impl HostResolver for AuthenticationConfiguration {
    fn host(&self, uri: &TargetUri) -> Option<String> {
        self.host.clone().or_else(|| uri.host().map(String::from))
    }

    fn port(&self, uri: &TargetUri) -> Option<u16> {
        self.port.or_else(|| uri.port())
    }
}

impl PrincipalSource for AuthenticationConfiguration {
    fn principal(&self) -> Option<Principal> {
        self.principal.clone()
    }
}

impl ClientBuilder for AuthenticationConfiguration {
    fn create_client(
        &self,
        uri: &TargetUri,
        local_address: Option<SocketAddr>,
        peer_address: Option<SocketAddr>,
        providers: ProviderSequence,
        offered: &[&str],
    ) -> Result<Option<NegotiatedClient>> {
        let server_name = self.host(uri).unwrap_or_default();
        Negotiation::new(
            uri,
            self.candidates(offered),
            self.callback_handler.as_ref(),
            &self.properties,
        )
        .server_name(&server_name)
        .authorization_id(self.authorization_id.as_deref())
        .addresses(local_address, peer_address)
        .run(providers)
    }
}

impl fmt::Debug for AuthenticationConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationConfiguration")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("principal", &self.principal)
            .field("realm", &self.realm)
            .field("authorization_id", &self.authorization_id)
            .field("selector", &self.selector)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AuthenticationConfiguration`].
#[derive(Default)]
pub struct AuthenticationConfigurationBuilder {
    host: Option<String>,
    port: Option<u16>,
    principal: Option<Principal>,
    password: Option<SecretString>,
    realm: Option<String>,
    authorization_id: Option<String>,
    selector: MechanismSelector,
    properties: HashMap<String, String>,
    callback_handler: Option<Arc<dyn CallbackHandler>>,
}

impl AuthenticationConfigurationBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.principal = Some(Principal::named(name));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.principal = Some(Principal::Anonymous);
        self
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn secret(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn authorization_id(mut self, authorization_id: impl Into<String>) -> Self {
        self.authorization_id = Some(authorization_id.into());
        self
    }

    pub fn allow_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.selector = self.selector.allow(mechanism);
        self
    }

    pub fn allow_mechanisms(
        mut self,
        mechanisms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.selector
            .allow
            .extend(mechanisms.into_iter().map(Into::into));
        self
    }

    pub fn forbid_mechanisms(
        mut self,
        mechanisms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.selector
            .forbid
            .extend(mechanisms.into_iter().map(Into::into));
        self
    }

    pub fn selector(mut self, selector: MechanismSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn mechanism_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Replace the handler built from the configured credentials.
    pub fn callback_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callback_handler = Some(handler);
        self
    }

    pub fn build(self) -> AuthenticationConfiguration {
        let callback_handler = self.callback_handler.unwrap_or_else(|| {
            let name = match &self.principal {
                Some(Principal::Named(name)) => Some(name.clone()),
                _ => None,
            };
            Arc::new(ConfiguredCallbackHandler::new(
                name,
                self.password,
                self.realm.clone(),
                self.authorization_id.clone(),
            ))
        });

        AuthenticationConfiguration {
            host: self.host,
            port: self.port,
            principal: self.principal,
            realm: self.realm,
            authorization_id: self.authorization_id,
            selector: self.selector,
            properties: self.properties,
            callback_handler,
        }
    }
}
