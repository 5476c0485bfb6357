//! RPC and Notification Integration Tests
//!
//! These tests validate software connections end to end:
//! - Fan-in on plural sides
//! - Cardinality failures
//! - Type checking and its absence

use core_types::{BaseKind, Endpoint, EndpointRole};
use resolver::{validate, BlockingContract, ValidationError};
use tests_connections::{declare, standard_resolver};

#[test]
fn test_two_clients_one_server() {
    let resolver = standard_resolver();
    let declaration = declare(
        "echo",
        "seL4RPCCall",
        &[("client_a", "Procedure"), ("client_b", "Procedure")],
        &[("server", "Procedure")],
    );

    let connection = resolver.validate_declaration(&declaration).unwrap();
    assert_eq!(connection.from.len(), 2);
    assert_eq!(connection.to.len(), 1);
    assert!(connection.fictitious_components().is_empty());
    assert!(connection.resource_claims().is_empty());
    assert!(connection.policy.to_string().contains("from->to"));
}

#[test]
fn test_rpc_without_server_is_rejected() {
    let resolver = standard_resolver();
    let declaration = declare("echo", "seL4RPCCall", &[("client", "Procedure")], &[]);

    let err = resolver.validate_declaration(&declaration).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::Cardinality {
            role: EndpointRole::To,
            ..
        }
    ));
}

#[test]
fn test_rpc_with_two_servers_is_rejected() {
    let resolver = standard_resolver();
    let declaration = declare(
        "echo",
        "seL4RPCSimple",
        &[("client", "Procedure")],
        &[("server_a", "Procedure"), ("server_b", "Procedure")],
    );
    assert!(matches!(
        resolver.validate_declaration(&declaration),
        Err(ValidationError::Cardinality { .. })
    ));
}

#[test]
fn test_event_on_procedure_connector_is_rejected() {
    let resolver = standard_resolver();
    let declaration = declare(
        "echo",
        "seL4RPCCall",
        &[("client", "Event")],
        &[("server", "Procedure")],
    );
    assert!(matches!(
        resolver.validate_declaration(&declaration),
        Err(ValidationError::KindMismatch {
            expected: BaseKind::Procedure,
            found: BaseKind::Event,
            ..
        })
    ));
}

#[test]
fn test_untyped_call_admits_other_kinds() {
    let resolver = standard_resolver();
    let typed = resolver.table().lookup("seL4RPCCall").unwrap();
    let untyped = resolver.table().lookup("seL4RPCCallNoType").unwrap();

    let from = [Endpoint::new("client", "raw", BaseKind::Event)];
    let to = [Endpoint::new("server", "raw", BaseKind::Procedure)];

    assert!(validate(typed, "typed", &from, &to).is_err());
    let connection = validate(untyped, "untyped", &from, &to).unwrap();
    assert!(!connection.type_checked);
    // Same call transport as the typed connector.
    assert_eq!(
        connection.threading,
        validate(typed, "typed", &[Endpoint::new("client", "raw", BaseKind::Procedure)], &to)
            .unwrap()
            .threading
    );
}

#[test]
fn test_notification_fan_in() {
    let resolver = standard_resolver();
    let declaration = declare(
        "tick",
        "seL4Notification",
        &[("timer", "Event"), ("watchdog", "Event"), ("uart", "Event")],
        &[("scheduler", "Event")],
    );

    let connection = resolver.validate_declaration(&declaration).unwrap();
    assert_eq!(connection.from.len(), 3);
    assert!(connection.threading.coalescing);
    assert_eq!(
        connection.threading.from.contract,
        BlockingContract::NonBlocking
    );
}

#[test]
fn test_shared_data_accepts_many_on_both_sides() {
    let resolver = standard_resolver();
    let declaration = declare(
        "buffer",
        "seL4SharedData",
        &[("producer_a", "Dataport"), ("producer_b", "Dataport")],
        &[("consumer_a", "Dataport"), ("consumer_b", "Dataport")],
    );
    let connection = resolver.validate_declaration(&declaration).unwrap();
    assert_eq!(
        connection.threading.to.contract,
        BlockingContract::SharedWindow
    );
}

#[test]
fn test_rpc_event_is_composed() {
    let resolver = standard_resolver();
    let declaration = declare(
        "evt",
        "seL4RPCEvent",
        &[("source", "Event")],
        &[("sink", "Event")],
    );
    let connection = resolver.validate_declaration(&declaration).unwrap();
    assert_eq!(
        connection.realization,
        connectors::Realization::ComposedFromPrimitive {
            primitive: "seL4RPCCall".to_string()
        }
    );
}
