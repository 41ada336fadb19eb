//! EXTERNAL mechanism.

use crate::mechanism::{EXTERNAL, MechanismClient, MechanismError};

#[derive(Debug, Clone)]
pub struct ExternalClient {
    authorization_id: Option<String>,
    complete: bool,
}

impl ExternalClient {
    pub fn new(authorization_id: Option<String>) -> Self {
        Self {
            authorization_id,
            complete: false,
        }
    }
}

impl MechanismClient for ExternalClient {
    fn mechanism_name(&self) -> &str {
        EXTERNAL
    }

    fn has_initial_response(&self) -> bool {
        true
    }

    fn evaluate_challenge(&mut self, _challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        if self.complete {
            return Err(MechanismError::exchange("EXTERNAL exchange already complete"));
        }
        self.complete = true;
        Ok(self
            .authorization_id
            .as_deref()
            .unwrap_or_default()
            .as_bytes()
            .to_vec())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn authorization_id(&self) -> Option<&str> {
        self.authorization_id.as_deref()
    }
}
