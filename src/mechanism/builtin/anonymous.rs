//! ANONYMOUS mechanism.

use crate::auth::Callback;
use crate::mechanism::{ANONYMOUS, ClientRequest, MechanismClient, MechanismError};

#[derive(Debug, Clone)]
pub struct AnonymousClient {
    trace: String,
    complete: bool,
}

impl AnonymousClient {
    pub fn new(trace: impl Into<String>) -> Self {
        Self {
            trace: trace.into(),
            complete: false,
        }
    }

    /// The trace token is taken from the name callback when the handler answers it.
    pub(crate) fn from_request(request: &ClientRequest<'_>) -> Self {
        let mut callbacks = [Callback::name("ANONYMOUS trace information")];
        let trace = match request.callback_handler.handle(&mut callbacks) {
            Ok(()) => callbacks[0].text_response().unwrap_or_default().to_string(),
            Err(e) => {
                tracing::trace!(error = %e, "No trace token for ANONYMOUS");
                String::new()
            }
        };
        Self::new(trace)
    }
}

impl MechanismClient for AnonymousClient {
    fn mechanism_name(&self) -> &str {
        ANONYMOUS
    }

    fn has_initial_response(&self) -> bool {
        true
    }

    fn evaluate_challenge(&mut self, _challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        if self.complete {
            return Err(MechanismError::exchange(
                "ANONYMOUS exchange already complete",
            ));
        }
        self.complete = true;
        Ok(self.trace.as_bytes().to_vec())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}
