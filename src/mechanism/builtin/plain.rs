//! PLAIN mechanism.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::auth::Callback;
use crate::mechanism::{ClientRequest, MechanismClient, MechanismError, PLAIN};

pub struct PlainClient {
    authorization_id: Option<String>,
    authentication_id: String,
    password: SecretString,
    complete: bool,
}

impl PlainClient {
    pub fn new(
        authorization_id: Option<String>,
        authentication_id: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, MechanismError> {
        let authentication_id = authentication_id.into();
        if authentication_id.is_empty() {
            return Err(MechanismError::unavailable("PLAIN requires a name"));
        }
        if authentication_id.contains('\0')
            || authorization_id.as_deref().is_some_and(|a| a.contains('\0'))
            || password.expose_secret().contains('\0')
        {
            return Err(MechanismError::unavailable(
                "PLAIN credentials must not contain NUL",
            ));
        }
        Ok(Self {
            authorization_id,
            authentication_id,
            password,
            complete: false,
        })
    }

    /// Gather name and password through the request's callback handler.
    ///
    /// The URI's user-info is offered as the default name.
    pub(crate) fn from_request(request: &ClientRequest<'_>) -> Result<Self, MechanismError> {
        let mut callbacks = [
            Callback::Name {
                prompt: "PLAIN authentication name".into(),
                default: request.uri.user().map(String::from),
                response: None,
            },
            Callback::password("PLAIN password"),
        ];
        request.callback_handler.handle(&mut callbacks)?;

        let name = callbacks[0]
            .text_response()
            .map(String::from)
            .ok_or_else(|| MechanismError::unavailable("no name available for PLAIN"))?;
        let password = callbacks[1]
            .password_response()
            .cloned()
            .ok_or_else(|| MechanismError::unavailable("no password available for PLAIN"))?;

        Self::new(request.authorization_id.map(String::from), name, password)
    }

    fn message(&self) -> Vec<u8> {
        let authzid = self.authorization_id.as_deref().unwrap_or_default();
        let password = self.password.expose_secret();
        let mut message =
            Vec::with_capacity(authzid.len() + self.authentication_id.len() + password.len() + 2);
        message.extend_from_slice(authzid.as_bytes());
        message.push(0);
        message.extend_from_slice(self.authentication_id.as_bytes());
        message.push(0);
        message.extend_from_slice(password.as_bytes());
        message
    }
}

impl MechanismClient for PlainClient {
    fn mechanism_name(&self) -> &str {
        PLAIN
    }

    fn has_initial_response(&self) -> bool {
        true
    }

    fn evaluate_challenge(&mut self, _challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        if self.complete {
            return Err(MechanismError::exchange("PLAIN exchange already complete"));
        }
        self.complete = true;
        Ok(self.message())
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn authorization_id(&self) -> Option<&str> {
        self.authorization_id
            .as_deref()
            .or(Some(self.authentication_id.as_str()))
    }

    fn dispose(&mut self) {
        self.password = SecretString::from(String::new());
    }
}

impl fmt::Debug for PlainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainClient")
            .field("authorization_id", &self.authorization_id)
            .field("authentication_id", &self.authentication_id)
            .field("password", &"[redacted]")
            .field("complete", &self.complete)
            .finish()
    }
}
