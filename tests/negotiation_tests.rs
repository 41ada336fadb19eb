//! Mechanism Negotiation Tests
//!
//! End-to-end negotiation through the public API: custom providers, provider
//! registries, scopes and the configuration client facade.
//!
//! Run: cargo nextest run --test negotiation_tests

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use auth_context::{ClientRequest, MechanismClient, MechanismError, MechanismProvider, TargetUri};

/// Single-step test mechanism that answers with a fixed token.
struct TokenClient {
    mechanism: String,
    complete: bool,
}

impl MechanismClient for TokenClient {
    fn mechanism_name(&self) -> &str {
        &self.mechanism
    }

    fn evaluate_challenge(&mut self, challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        self.complete = true;
        let mut response = b"token:".to_vec();
        response.extend_from_slice(challenge);
        Ok(response)
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Provider "X" supporting a fixed mechanism set with a configurable outcome.
struct ProviderX {
    name: &'static str,
    mechanisms: Vec<&'static str>,
    succeed: bool,
    attempts: AtomicUsize,
}

impl ProviderX {
    fn new(name: &'static str, mechanisms: Vec<&'static str>, succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            mechanisms,
            succeed,
            attempts: AtomicUsize::new(0),
        })
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl MechanismProvider for ProviderX {
    fn name(&self) -> &str {
        self.name
    }

    fn mechanism_names(&self, _properties: &HashMap<String, String>) -> Vec<String> {
        self.mechanisms.iter().map(|m| m.to_string()).collect()
    }

    fn create_client(
        &self,
        request: &ClientRequest<'_>,
    ) -> Result<Option<Box<dyn MechanismClient>>, MechanismError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.succeed {
            return Err(MechanismError::unavailable("no digest credentials"));
        }
        Ok(Some(Box::new(TokenClient {
            mechanism: request.mechanism.to_string(),
            complete: false,
        })))
    }
}

fn uri(s: &str) -> TargetUri {
    TargetUri::parse(s).unwrap()
}

/// Negotiation logs are visible with `RUST_LOG=auth_context=trace`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Negotiation over explicit provider sequences
// =============================================================================

mod sequence_tests {
    use super::*;
    use auth_context::{AuthenticationConfiguration, BuiltinProvider, ProviderSequence, negotiate};

    fn sequence(providers: Vec<Arc<dyn MechanismProvider>>) -> ProviderSequence {
        ProviderSequence::from_providers(providers)
    }

    #[test]
    fn test_empty_offered_set() {
        let config = AuthenticationConfiguration::default();
        let x = ProviderX::new("X", vec!["DIGEST-MD5"], true);
        let result = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &[],
            sequence(vec![x.clone()]),
        )
        .unwrap();
        assert!(result.is_none());
        assert_eq!(x.attempts(), 0);
    }

    #[test]
    fn test_empty_provider_sequence() {
        let config = AuthenticationConfiguration::default();
        let result = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["PLAIN", "DIGEST-MD5"],
            ProviderSequence::empty(),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_provider_x_success() {
        init_tracing();
        let config = AuthenticationConfiguration::default();
        let x = ProviderX::new("X", vec!["DIGEST-MD5"], true);

        let mut client = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["PLAIN", "DIGEST-MD5"],
            sequence(vec![x.clone()]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(client.mechanism(), "DIGEST-MD5");
        assert_eq!(client.provider(), "X");
        assert_eq!(x.attempts(), 1);
        assert_eq!(client.evaluate_challenge(b"nonce").unwrap(), b"token:nonce");
        assert!(client.is_complete());
    }

    #[test]
    fn test_provider_x_failure() {
        init_tracing();
        let config = AuthenticationConfiguration::default();
        let x = ProviderX::new("X", vec!["DIGEST-MD5"], false);

        let result = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["PLAIN", "DIGEST-MD5"],
            sequence(vec![x.clone()]),
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(x.attempts(), 1);
    }

    #[test]
    fn test_sequence_order_breaks_ties() {
        let config = AuthenticationConfiguration::default();
        let first = ProviderX::new("first", vec!["DIGEST-MD5"], true);
        let second = ProviderX::new("second", vec!["DIGEST-MD5"], true);

        let client = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["DIGEST-MD5"],
            sequence(vec![first.clone(), second.clone()]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(client.provider(), "first");
        assert_eq!(second.attempts(), 0);
    }

    #[test]
    fn test_failed_provider_falls_through_to_builtin() {
        init_tracing();
        let config = AuthenticationConfiguration::builder()
            .name("tim")
            .password("tanstaaftanstaaf")
            .build();
        let x = ProviderX::new("X", vec!["DIGEST-MD5", "PLAIN"], false);

        let mut client = negotiate(
            &uri("imap://mail.example.com"),
            &config,
            &["DIGEST-MD5", "PLAIN"],
            sequence(vec![x.clone(), Arc::new(BuiltinProvider::new())]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(client.provider(), "builtin");
        assert_eq!(client.mechanism(), "PLAIN");
        assert_eq!(x.attempts(), 2);
        assert_eq!(
            client.initial_response().unwrap().unwrap(),
            b"\0tim\0tanstaaftanstaaf"
        );
    }

    #[test]
    fn test_selector_preference_within_provider() {
        let config = AuthenticationConfiguration::builder()
            .allow_mechanisms(["DIGEST-MD5", "GSSAPI"])
            .build();
        let x = ProviderX::new("X", vec!["GSSAPI", "DIGEST-MD5"], true);

        let client = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["GSSAPI", "DIGEST-MD5"],
            sequence(vec![x]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(client.mechanism(), "DIGEST-MD5");
    }

    #[test]
    fn test_forbidden_mechanism_never_attempted() {
        let config = AuthenticationConfiguration::builder()
            .forbid_mechanisms(["DIGEST-MD5"])
            .build();
        let x = ProviderX::new("X", vec!["DIGEST-MD5"], true);

        let result = negotiate(
            &uri("ldap://dir.example.com"),
            &config,
            &["DIGEST-MD5"],
            sequence(vec![x.clone()]),
        )
        .unwrap();

        assert!(result.is_none());
        assert_eq!(x.attempts(), 0);
    }
}

// =============================================================================
// Registry and facade
// =============================================================================

mod facade_tests {
    use super::*;
    use auth_context::{
        AuthenticationConfiguration, AuthenticationContext, Capability, ConfigurationClient,
        Error, MatchRule, Permission, ProviderRegistry, ProviderScope,
    };

    fn client_with(registry: Arc<ProviderRegistry>) -> ConfigurationClient {
        ConfigurationClient::with_source(&Capability::unrestricted(), registry).unwrap()
    }

    #[test]
    fn test_enforcing_capability_without_grant() {
        let err = ConfigurationClient::new(&Capability::enforcing()).unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
        assert!(err.is_authorization_error());
    }

    #[test]
    fn test_resolve_then_negotiate() {
        init_tracing();
        let registry = Arc::new(ProviderRegistry::with_builtin());
        registry
            .register("directory", ProviderX::new("X", vec!["DIGEST-MD5"], true))
            .unwrap();

        let granted = Capability::enforcing().grant(Permission::CreateConfigurationClient);
        let client = ConfigurationClient::with_source(&granted, registry)
            .unwrap()
            .with_default_scope("directory");

        let context = AuthenticationContext::builder()
            .rule(
                MatchRule::new().with_scheme("ldap"),
                AuthenticationConfiguration::builder().name("cn=admin").build(),
            )
            .build()
            .unwrap();

        let target = uri("ldap://dir.example.com");
        let config = client.authentication_configuration(&target, &context).unwrap();
        let negotiated = client
            .create_client(&target, &*config, &["PLAIN", "DIGEST-MD5"])
            .unwrap()
            .unwrap();

        assert_eq!(negotiated.mechanism(), "DIGEST-MD5");
        assert_eq!(negotiated.provider(), "X");
    }

    #[test]
    fn test_scoped_only_search() {
        init_tracing();
        let registry = Arc::new(ProviderRegistry::with_builtin());
        registry
            .register("directory", ProviderX::new("X", vec!["DIGEST-MD5"], false))
            .unwrap();
        let client = client_with(registry);
        let config = AuthenticationConfiguration::builder()
            .authorization_id("admin")
            .build();
        let target = uri("ldaps://dir.example.com");
        let scope = ProviderScope::new("directory");

        let scoped = client
            .create_client_in(&target, &config, &["DIGEST-MD5", "EXTERNAL"], &scope, false)
            .unwrap();
        assert!(scoped.is_none());

        let with_global = client
            .create_client_in(&target, &config, &["DIGEST-MD5", "EXTERNAL"], &scope, true)
            .unwrap()
            .unwrap();
        assert_eq!(with_global.mechanism(), "EXTERNAL");
        assert_eq!(with_global.provider(), "builtin");
    }

    #[test]
    fn test_addresses_reach_provider() {
        struct AddressCheck;

        impl MechanismProvider for AddressCheck {
            fn name(&self) -> &str {
                "address-check"
            }

            fn mechanism_names(&self, _properties: &HashMap<String, String>) -> Vec<String> {
                vec!["CHANNEL".to_string()]
            }

            fn create_client(
                &self,
                request: &ClientRequest<'_>,
            ) -> Result<Option<Box<dyn MechanismClient>>, MechanismError> {
                if request.local_address.is_none() || request.peer_address.is_none() {
                    return Err(MechanismError::unavailable("channel binding needs addresses"));
                }
                Ok(Some(Box::new(TokenClient {
                    mechanism: "CHANNEL".to_string(),
                    complete: false,
                })))
            }
        }

        let registry = Arc::new(ProviderRegistry::new());
        registry.register_global(Arc::new(AddressCheck)).unwrap();
        let client = client_with(registry);
        let config = AuthenticationConfiguration::default();
        let target = uri("xmpp://chat.example.com");
        let scope = ProviderScope::default();

        assert!(client
            .create_client(&target, &config, &["CHANNEL"])
            .unwrap()
            .is_none());

        let local = "127.0.0.1:40000".parse().ok();
        let peer = "192.0.2.10:5222".parse().ok();
        let negotiated = client
            .create_client_with_addresses(&target, local, peer, &config, &["CHANNEL"], &scope, true)
            .unwrap()
            .unwrap();
        assert_eq!(negotiated.mechanism(), "CHANNEL");
    }

    #[test]
    fn test_internal_fault_surfaces() {
        init_tracing();
        struct Broken;

        impl MechanismProvider for Broken {
            fn name(&self) -> &str {
                "broken"
            }

            fn mechanism_names(&self, _properties: &HashMap<String, String>) -> Vec<String> {
                vec!["PLAIN".to_string()]
            }

            fn create_client(
                &self,
                _request: &ClientRequest<'_>,
            ) -> Result<Option<Box<dyn MechanismClient>>, MechanismError> {
                Err(MechanismError::internal("provider state corrupted"))
            }
        }

        let registry = Arc::new(ProviderRegistry::with_builtin());
        registry.register("default", Arc::new(Broken)).unwrap();
        let client = client_with(registry);
        let config = AuthenticationConfiguration::builder()
            .name("tim")
            .password("pw")
            .build();

        let err = client
            .create_client(&uri("imap://mail.example.com"), &config, &["PLAIN"])
            .unwrap_err();
        match err {
            Error::Mechanism {
                mechanism,
                provider,
                message,
            } => {
                assert_eq!(mechanism, "PLAIN");
                assert_eq!(provider, "broken");
                assert!(message.contains("provider state corrupted"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dropped_client_is_disposed() {
        let client = ConfigurationClient::new(&Capability::unrestricted()).unwrap();
        let config = AuthenticationConfiguration::builder()
            .name("tim")
            .password("pw")
            .build();

        let mut negotiated = client
            .create_client(&uri("imap://mail.example.com"), &config, &["PLAIN"])
            .unwrap()
            .unwrap();
        negotiated.dispose();
        assert!(negotiated.is_disposed());
        assert!(negotiated.evaluate_challenge(&[]).is_err());
    }
}
