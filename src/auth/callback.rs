//! Credential callbacks.
//!
//! Mechanisms ask for credentials by handing a slice of [`Callback`]s to a
//! [`CallbackHandler`], which fills in the responses it can answer.

use std::fmt;

use secrecy::SecretString;
use thiserror::Error;

/// A single credential request.
#[derive(Clone, Debug)]
pub enum Callback {
    /// Authentication name.
    Name {
        prompt: String,
        default: Option<String>,
        response: Option<String>,
    },
    /// Password for the authentication name.
    Password {
        prompt: String,
        response: Option<SecretString>,
    },
    /// Realm selection.
    Realm {
        choices: Vec<String>,
        response: Option<String>,
    },
    /// Authorization id to act as, if different from the authentication name.
    AuthorizationId { response: Option<String> },
}

impl Callback {
    pub fn name(prompt: impl Into<String>) -> Self {
        Self::Name {
            prompt: prompt.into(),
            default: None,
            response: None,
        }
    }

    pub fn password(prompt: impl Into<String>) -> Self {
        Self::Password {
            prompt: prompt.into(),
            response: None,
        }
    }

    pub fn realm(choices: Vec<String>) -> Self {
        Self::Realm {
            choices,
            response: None,
        }
    }

    pub fn authorization_id() -> Self {
        Self::AuthorizationId { response: None }
    }

    /// Callback kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Callback::Name { .. } => "name",
            Callback::Password { .. } => "password",
            Callback::Realm { .. } => "realm",
            Callback::AuthorizationId { .. } => "authorization_id",
        }
    }

    /// Text response of a name, realm or authorization id callback.
    pub fn text_response(&self) -> Option<&str> {
        match self {
            Callback::Name {
                response, default, ..
            } => response.as_deref().or(default.as_deref()),
            Callback::Realm { response, .. } | Callback::AuthorizationId { response } => {
                response.as_deref()
            }
            Callback::Password { .. } => None,
        }
    }

    pub fn password_response(&self) -> Option<&SecretString> {
        match self {
            Callback::Password { response, .. } => response.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("unsupported callback: {0}")]
    Unsupported(&'static str),

    #[error("no value available for {0} callback")]
    Unavailable(&'static str),

    #[error("callback handler failed: {0}")]
    Handler(String),
}

/// Answers credential callbacks on behalf of a configuration.
pub trait CallbackHandler: Send + Sync {
    /// Fill in the responses for `callbacks`.
    ///
    /// Handlers should fail with [`CallbackError::Unsupported`] for callback kinds they
    /// never answer, and leave the response empty when they answer the kind but have no
    /// value.
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError>;
}

impl<F> CallbackHandler for F
where
    F: Fn(&mut [Callback]) -> Result<(), CallbackError> + Send + Sync,
{
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError> {
        self(callbacks)
    }
}

/// Callback handler answering from a configuration's own fields.
#[derive(Clone, Default)]
pub struct ConfiguredCallbackHandler {
    name: Option<String>,
    password: Option<SecretString>,
    realm: Option<String>,
    authorization_id: Option<String>,
}

impl ConfiguredCallbackHandler {
    pub fn new(
        name: Option<String>,
        password: Option<SecretString>,
        realm: Option<String>,
        authorization_id: Option<String>,
    ) -> Self {
        Self {
            name,
            password,
            realm,
            authorization_id,
        }
    }
}

impl CallbackHandler for ConfiguredCallbackHandler {
    fn handle(&self, callbacks: &mut [Callback]) -> Result<(), CallbackError> {
        for callback in callbacks.iter_mut() {
            match callback {
                Callback::Name { response, .. } => {
                    if let Some(name) = &self.name {
                        *response = Some(name.clone());
                    }
                }
                Callback::Password { response, .. } => {
                    if let Some(password) = &self.password {
                        *response = Some(password.clone());
                    }
                }
                Callback::Realm { choices, response } => {
                    *response = match &self.realm {
                        Some(realm) => Some(realm.clone()),
                        None => choices.first().cloned(),
                    };
                }
                Callback::AuthorizationId { response } => {
                    *response = self.authorization_id.clone();
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ConfiguredCallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredCallbackHandler")
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("realm", &self.realm)
            .field("authorization_id", &self.authorization_id)
            .finish()
    }
}
