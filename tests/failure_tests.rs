//! Behaviour when the database cannot be reached: every operation answers 500
//! with its own error string and the server keeps serving.

mod common;

use common::http::{delete, get, post_json, put_json};
use common::test_server::TestServer;
use form_builder::storage::{MongoFormStore, PooledStore};
use std::sync::Arc;

const SOME_ID: &str = "64b7f0c2a1b2c3d4e5f60718";

fn unreachable_db() -> TestServer {
    TestServer::start(Arc::new(MongoFormStore::unavailable(
        "server selection timeout",
    )))
}

#[test]
fn test_every_operation_reports_its_failure() {
    let server = unreachable_db();

    let cases = [
        (post_json(&server.addr, "/api/forms", r#"{"name":"a"}"#), "Failed to submit form"),
        (get(&server.addr, "/api/forms"), "Failed to get forms"),
        (
            put_json(&server.addr, &format!("/api/forms/{SOME_ID}"), r#"{"name":"b"}"#),
            "Failed to update form",
        ),
        (delete(&server.addr, &format!("/api/forms/{SOME_ID}")), "Failed to delete form"),
    ];

    for (resp, expected) in cases {
        assert_eq!(resp.status, 500, "{expected}");
        let body = resp.json();
        assert_eq!(body["error"], expected);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("server selection timeout"));
    }
}

#[test]
fn test_health_stays_up_without_database() {
    let server = unreachable_db();
    assert_eq!(get(&server.addr, "/api/forms").status, 500);
    assert_eq!(get(&server.addr, "/health").status, 200);
}

#[test]
fn test_unparsable_connection_string_degrades() {
    let store = MongoFormStore::connect("not a mongodb uri", "FORM_BUILDER");
    assert!(!store.is_available());
    let server = TestServer::start(Arc::new(store));
    let resp = get(&server.addr, "/api/forms");
    assert_eq!(resp.status, 500);
    assert_eq!(resp.json()["error"], "Failed to get forms");
}

#[test]
fn test_driver_errors_from_unreachable_server() {
    let store = MongoFormStore::connect(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500",
        "FORM_BUILDER",
    );
    assert!(store.is_available());
    let server = TestServer::start(Arc::new(PooledStore::new(Arc::new(store), 2).unwrap()));

    let cases = [
        (post_json(&server.addr, "/api/forms", r#"{"name":"a"}"#), "Failed to submit form"),
        (get(&server.addr, "/api/forms"), "Failed to get forms"),
        (
            put_json(&server.addr, &format!("/api/forms/{SOME_ID}"), r#"{"name":"b"}"#),
            "Failed to update form",
        ),
        (delete(&server.addr, &format!("/api/forms/{SOME_ID}")), "Failed to delete form"),
    ];

    for (resp, expected) in cases {
        assert_eq!(resp.status, 500, "{expected}");
        let body = resp.json();
        assert_eq!(body["error"], expected);
        let message = body["message"].as_str().unwrap();
        assert!(!message.is_empty());
        assert!(!message.starts_with("Database unavailable"), "{message}");
    }
    assert_eq!(get(&server.addr, "/health").status, 200);
}
