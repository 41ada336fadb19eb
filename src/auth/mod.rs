//! Authentication configurations and the capability interfaces they expose.
//!
//! A configuration describes how to authenticate toward a target:
//! - **Host/port overrides**: the real endpoint behind a matched URI
//! - **Principal & credentials**: answered through a [`CallbackHandler`]
//! - **Mechanism policy**: which offered mechanisms may be tried, in what order
//!
//! The resolver and negotiator only depend on the traits in this module, so any type
//! implementing them can stand in for [`AuthenticationConfiguration`].

mod callback;
mod configuration;
mod principal;
mod selector;
mod traits;

pub use callback::{Callback, CallbackError, CallbackHandler, ConfiguredCallbackHandler};
pub use configuration::{AuthenticationConfiguration, AuthenticationConfigurationBuilder};
pub use principal::Principal;
pub use selector::MechanismSelector;
pub use traits::{CallbackHandlerSource, ClientBuilder, HostResolver, PrincipalSource};
