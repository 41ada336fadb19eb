//! Free-standing resolution and negotiation entry points.

use std::sync::Arc;

use crate::Result;
use crate::auth::ClientBuilder;
use crate::context::AuthenticationContext;
use crate::mechanism::{NegotiatedClient, ProviderSequence};
use crate::uri::TargetUri;

/// Configuration of the first rule in `context` matching `uri`.
pub fn resolve<C>(uri: &TargetUri, context: &AuthenticationContext<C>) -> Option<Arc<C>> {
    context.resolve(uri)
}

/// Build a mechanism client for `uri` from an explicit provider sequence.
///
/// No local or peer address is passed to providers.
pub fn negotiate<C>(
    uri: &TargetUri,
    configuration: &C,
    offered: &[&str],
    providers: ProviderSequence,
) -> Result<Option<NegotiatedClient>>
where
    C: ClientBuilder + ?Sized,
{
    configuration.create_client(uri, None, None, providers, offered)
}
