//! Mechanism client trait and the negotiated client wrapper.

use std::fmt;

use super::MechanismError;

/// A client-side instance of one authentication mechanism.
pub trait MechanismClient: Send {
    /// Mechanism name this client speaks (e.g. `"PLAIN"`).
    fn mechanism_name(&self) -> &str;

    /// Whether the client sends data before the first server challenge.
    fn has_initial_response(&self) -> bool {
        false
    }

    /// Produce the response to a server challenge. The initial response is produced by
    /// evaluating an empty challenge.
    fn evaluate_challenge(&mut self, challenge: &[u8]) -> Result<Vec<u8>, MechanismError>;

    /// Whether the exchange has finished from the client's point of view.
    fn is_complete(&self) -> bool;

    /// Authorization id negotiated by the exchange, if any.
    fn authorization_id(&self) -> Option<&str> {
        None
    }

    /// Release credentials and other held resources.
    fn dispose(&mut self) {}
}

/// Result of a successful negotiation.
///
/// Bound to exactly one mechanism and one provider for its whole lifetime. The inner
/// client is disposed when the wrapper is dropped.
pub struct NegotiatedClient {
    client: Box<dyn MechanismClient>,
    mechanism: String,
    provider: String,
    disposed: bool,
}

impl NegotiatedClient {
    pub(crate) fn bind(
        client: Box<dyn MechanismClient>,
        mechanism: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            client,
            mechanism: mechanism.into(),
            provider: provider.into(),
            disposed: false,
        }
    }

    pub fn mechanism(&self) -> &str {
        &self.mechanism
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn has_initial_response(&self) -> bool {
        self.client.has_initial_response()
    }

    /// Initial response, for mechanisms that send one.
    pub fn initial_response(&mut self) -> Result<Option<Vec<u8>>, MechanismError> {
        if !self.has_initial_response() {
            return Ok(None);
        }
        self.evaluate_challenge(&[]).map(Some)
    }

    pub fn evaluate_challenge(&mut self, challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        if self.disposed {
            return Err(MechanismError::exchange(format!(
                "{} client has been disposed",
                self.mechanism
            )));
        }
        self.client.evaluate_challenge(challenge)
    }

    pub fn is_complete(&self) -> bool {
        self.client.is_complete()
    }

    pub fn authorization_id(&self) -> Option<&str> {
        self.client.authorization_id()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if !self.disposed {
            self.client.dispose();
            self.disposed = true;
        }
    }
}

impl Drop for NegotiatedClient {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for NegotiatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiatedClient")
            .field("mechanism", &self.mechanism)
            .field("provider", &self.provider)
            .field("complete", &self.client.is_complete())
            .field("disposed", &self.disposed)
            .finish()
    }
}
