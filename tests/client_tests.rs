//! Connector Tests
//!
//! Every operation against a store double over real TCP connections.

mod common;

use common::{closed_port, Reply, StoreDouble};
use serde::{Deserialize, Serialize};
use thot::protocol::{MatchKind, Operation, Payload, Response, Value};
use thot::{Config, Connector, StoreConnector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
}

fn ann() -> User {
    User {
        name: "Ann".to_string(),
    }
}

fn unreachable_connector() -> Connector {
    Connector::new(
        Config::builder()
            .port(closed_port())
            .connect_timeout_ms(500)
            .build(),
    )
}

// =============================================================================
// Create
// =============================================================================

#[test]
fn test_create_success() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::ok())]);
    let connector = Connector::new(store.config());

    assert!(connector.create("users", 10, true));

    let command = store.next_command();
    assert_eq!(command.operation(), Operation::Create);
    assert_eq!(command.bucket_name(), Some("users"));
    match command.payload() {
        Payload::Create(create) => {
            assert_eq!(create.bucket_name, "users");
            assert_eq!(create.max_keys, 10);
            assert!(create.is_volatile);
        }
        other => panic!("Expected CREATE payload, got {:?}", other),
    }
}

#[test]
fn test_create_default_parameters() {
    let store = StoreDouble::scripted(vec![
        Reply::Respond(Response::ok()),
        Reply::Respond(Response::ok()),
    ]);
    let connector = Connector::new(store.config());

    assert!(connector.create_default("a"));
    assert!(connector.create_with_max_keys("b", 7));

    match store.next_command().payload() {
        Payload::Create(create) => {
            assert_eq!(create.max_keys, 100);
            assert!(!create.is_volatile);
        }
        other => panic!("Expected CREATE payload, got {:?}", other),
    }
    match store.next_command().payload() {
        Payload::Create(create) => {
            assert_eq!(create.max_keys, 7);
            assert!(!create.is_volatile);
        }
        other => panic!("Expected CREATE payload, got {:?}", other),
    }
}

#[test]
fn test_create_store_error() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::error("bucket exists"))]);
    let connector = Connector::new(store.config());

    assert!(!connector.create("users", 10, false));
}

#[test]
fn test_create_severed_connection() {
    let store = StoreDouble::scripted(vec![Reply::Hangup]);
    let connector = Connector::new(store.config());

    assert!(!connector.create("users", 10, false));
}

#[test]
fn test_create_unreachable_store() {
    assert!(!unreachable_connector().create("users", 10, false));
}

#[test]
fn test_create_rejects_zero_max_keys() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::ok())]);
    let connector = Connector::new(store.config());

    assert!(!connector.create("users", 0, false));
    assert!(store.received_nothing());
}

// =============================================================================
// Write / Read
// =============================================================================

#[test]
fn test_write_read_round_trip() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("users"));
    assert!(connector.write("users", "u1", &ann()));
    assert!(connector.write("users", "count", &42i64));

    assert_eq!(connector.read::<User>("users", "u1"), Some(ann()));
    assert_eq!(connector.read::<i64>("users", "count"), Some(42));
}

#[test]
fn test_large_unsigned_round_trip() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("nums"));
    assert!(connector.write("nums", "big", &u64::MAX));
    assert!(connector.write("nums", "edge", &(i64::MAX as u64 + 1)));

    assert_eq!(connector.read::<u64>("nums", "big"), Some(u64::MAX));
    assert_eq!(connector.read::<u64>("nums", "edge"), Some(i64::MAX as u64 + 1));
    assert_eq!(connector.read::<i64>("nums", "big"), None);
}

#[test]
fn test_read_type_mismatch_is_absent() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("users"));
    assert!(connector.write("users", "u1", &ann()));

    assert_eq!(connector.read::<i64>("users", "u1"), None);
    assert_eq!(connector.read::<Vec<String>>("users", "u1"), None);
    // The key is still there
    assert_eq!(connector.read::<User>("users", "u1"), Some(ann()));
}

#[test]
fn test_write_into_missing_bucket_fails() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(!connector.write("nowhere", "k", "v"));
}

#[test]
fn test_write_create_volatile() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.write_create_volatile("sessions", "s1", "token"));
    assert_eq!(connector.read::<String>("sessions", "s1"), Some("token".to_string()));

    match store.next_command().payload() {
        Payload::Write(write) => {
            assert_eq!(write.key, "s1");
            assert_eq!(write.value, Value::from("token"));
            assert!(write.create_volatile_if_missing);
        }
        other => panic!("Expected WRITE payload, got {:?}", other),
    }
}

#[test]
fn test_write_and_read_soft_fail_when_unreachable() {
    let connector = unreachable_connector();

    assert!(!connector.write("users", "u1", &ann()));
    assert_eq!(connector.read::<User>("users", "u1"), None);
}

#[test]
fn test_read_store_error_is_absent() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::error("no key u1"))]);
    let connector = Connector::new(store.config());

    assert_eq!(connector.read::<User>("users", "u1"), None);
    match store.next_command().payload() {
        Payload::Read(read) => {
            assert_eq!(read.key_or_pattern, "u1");
            assert_eq!(read.match_kind, MatchKind::Absolute);
        }
        other => panic!("Expected READ payload, got {:?}", other),
    }
}

#[test]
fn test_garbage_response_is_soft_failure() {
    let store = StoreDouble::scripted(vec![Reply::Garbage(vec![0xFF; 12])]);
    let connector = Connector::new(store.config());

    assert_eq!(connector.read::<User>("users", "u1"), None);
}

// =============================================================================
// Pattern Reads
// =============================================================================

#[test]
fn test_read_pattern_empty_is_empty_sequence() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::success(Value::List(vec![])))]);
    let connector = Connector::new(store.config());

    assert_eq!(connector.read_pattern::<User>("users", "u.*"), Some(vec![]));
    match store.next_command().payload() {
        Payload::Read(read) => assert_eq!(read.match_kind, MatchKind::Regex),
        other => panic!("Expected READ payload, got {:?}", other),
    }
}

#[test]
fn test_read_pattern_first_element_mismatch_is_absent() {
    let values = Value::List(vec![
        Value::Int(1),
        Value::from("later"),
        Value::from("strings"),
    ]);
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::success(values))]);
    let connector = Connector::new(store.config());

    assert_eq!(connector.read_pattern::<String>("bucket", ".*"), None);
}

#[test]
fn test_read_pattern_matches() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("users"));
    assert!(connector.write("users", "u1", &ann()));
    assert!(connector.write("users", "u2", &User { name: "Bo".into() }));
    assert!(connector.write("users", "admin", &User { name: "Root".into() }));

    let users = connector.read_pattern::<User>("users", "^u\\d$").unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bo"]);
}

#[test]
fn test_read_pattern_unreachable_is_absent() {
    assert_eq!(unreachable_connector().read_pattern::<User>("users", ".*"), None);
}

// =============================================================================
// Listings
// =============================================================================

#[test]
fn test_get_keys_and_buckets() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("users"));
    assert!(connector.create_default("groups"));
    assert!(connector.write("users", "u2", "x"));
    assert!(connector.write("users", "u1", "y"));

    assert_eq!(connector.get_keys("users"), vec!["u1", "u2"]);
    assert_eq!(connector.get_buckets(), vec!["groups", "users"]);
}

#[test]
fn test_listings_soft_fail_to_empty() {
    let store = StoreDouble::scripted(vec![
        Reply::Respond(Response::error("no bucket users")),
        Reply::Hangup,
        Reply::Respond(Response::error("store is shutting down")),
    ]);
    let connector = Connector::new(store.config());

    assert!(connector.get_keys("users").is_empty());
    assert!(connector.get_keys("users").is_empty());
    assert!(connector.get_buckets().is_empty());
    assert!(unreachable_connector().get_buckets().is_empty());
}

#[test]
fn test_get_buckets_sends_no_bucket_name() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::success(Value::List(vec![
        Value::from("users"),
    ])))]);
    let connector = Connector::new(store.config());

    assert_eq!(connector.get_buckets(), vec!["users"]);

    let command = store.next_command();
    assert_eq!(command.operation(), Operation::Buckets);
    assert_eq!(command.bucket_name(), None);
    assert_eq!(command.payload(), &Payload::Buckets);
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_and_delete_pattern() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create_default("users"));
    for key in ["u1", "u2", "admin"] {
        assert!(connector.write("users", key, &ann()));
    }

    assert!(connector.delete("users", "admin"));
    assert!(!connector.delete("users", "admin"));
    assert!(connector.delete_pattern("users", "^u"));
    assert!(connector.get_keys("users").is_empty());
}

#[test]
fn test_delete_match_kinds() {
    let store = StoreDouble::scripted(vec![
        Reply::Respond(Response::ok()),
        Reply::Respond(Response::error("no key")),
    ]);
    let connector = Connector::new(store.config());

    assert!(connector.delete("users", "u1"));
    assert!(!connector.delete_pattern("users", "u.*"));

    match store.next_command().payload() {
        Payload::Delete(delete) => assert_eq!(delete.match_kind, MatchKind::Absolute),
        other => panic!("Expected DELETE payload, got {:?}", other),
    }
    match store.next_command().payload() {
        Payload::Delete(delete) => {
            assert_eq!(delete.key_or_pattern, "u.*");
            assert_eq!(delete.match_kind, MatchKind::Regex);
        }
        other => panic!("Expected DELETE payload, got {:?}", other),
    }
}

// =============================================================================
// Addressing
// =============================================================================

#[test]
fn test_dev_mode_ignores_configured_host() {
    let store = StoreDouble::scripted(vec![Reply::Respond(Response::ok())]);
    let config = Config::builder()
        .db_host("store.invalid")
        .port(store.port())
        .read_timeout_ms(5000)
        .build();
    let connector = Connector::new(config);

    assert!(connector.create_default("users"));
}

// =============================================================================
// End to End
// =============================================================================

#[test]
fn test_end_to_end_scenario() {
    let store = StoreDouble::in_memory();
    let connector = Connector::new(store.config());

    assert!(connector.create("users", 10, false));
    assert!(connector.write("users", "u1", &ann()));
    assert_eq!(connector.read::<User>("users", "u1"), Some(ann()));
    assert!(connector.delete("users", "u1"));
    assert_eq!(connector.read::<User>("users", "u1"), None);
}
