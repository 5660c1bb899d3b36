//! Tests for Client
//!
//! These tests verify, against a loopback fake server:
//! - Call and notification frame construction
//! - Result / error / empty response resolution
//! - Transport and decode failures
//! - Responses larger than a single receive
//! - Independent concurrent calls

#[path = "../support/mod.rs"]
mod support;

use std::thread;
use std::time::{Duration, Instant};

use kvrpc::protocol::{ResponseFrame, DEFAULT_REQUEST_ID};
use kvrpc::{params, Client, KeyValues, KvRpcError};
use support::{dead_addr, FakeServer, Reply};

// =============================================================================
// Request Construction Tests
// =============================================================================

#[test]
fn test_call_frame_on_the_wire() {
    let server = FakeServer::echo();
    let client = server.client();

    let params = params! {
        "a" => 1,
        "name" => "widget",
        "nested" => params! { "depth" => 2 },
    };
    client.call("add_my_numbers", params.clone()).unwrap();

    let frame = server.next_request();
    assert_eq!(frame.method, "add_my_numbers");
    assert_eq!(frame.id.as_deref(), Some(DEFAULT_REQUEST_ID));
    assert_eq!(frame.params, params.normalized());
}

#[test]
fn test_call_with_custom_id() {
    let server = FakeServer::echo();
    let client = server.client();

    client.call_with_id("engine_time", KeyValues::new(), "req-7").unwrap();

    assert_eq!(server.next_request().id.as_deref(), Some("req-7"));
}

#[test]
fn test_configured_request_id() {
    let server = FakeServer::echo();
    let client = Client::new(server.config().request_id("abc").build()).unwrap();

    client.call("engine_time", KeyValues::new()).unwrap();

    assert_eq!(server.next_request().id.as_deref(), Some("abc"));
}

#[test]
fn test_notify_frame_has_no_id() {
    let server = FakeServer::echo();
    let client = server.client();

    client.notify("log_line", params! { "text" => "hello" }).unwrap();

    let frame = server.next_request();
    assert!(frame.is_notification());
    assert_eq!(frame.method, "log_line");
    assert_eq!(frame.params.get_str("text"), Some("hello"));
}

// =============================================================================
// Response Resolution Tests
// =============================================================================

#[test]
fn test_call_returns_result() {
    let server = FakeServer::start(|_| Reply::Frame(ResponseFrame::success(params! { "seconds" => 123 })));
    let client = server.client();

    let result = client.call("engine_time", KeyValues::new()).unwrap().unwrap();

    assert_eq!(result.get_i64("seconds"), Some(123));
    assert_eq!(result, params! { "seconds" => "123" });
}

#[test]
fn test_call_returns_rpc_error() {
    let server = FakeServer::start(|_| Reply::Frame(ResponseFrame::failure("boom", "42")));
    let client = server.client();

    let err = client.call("give_me_a_failure", KeyValues::new()).unwrap_err();

    assert!(err.is_rpc());
    assert!(!err.is_transport());
    assert_eq!(err.rpc_code(), Some(42));
    match err {
        KvRpcError::Rpc { message, code } => {
            assert_eq!(message, "boom");
            assert_eq!(code, "42");
        }
        other => panic!("expected rpc error, got {:?}", other),
    }
}

#[test]
fn test_call_with_neither_result_nor_error() {
    let server = FakeServer::start(|_| Reply::Frame(ResponseFrame::default()));
    let client = server.client();

    assert_eq!(client.call("noop", KeyValues::new()).unwrap(), None);
}

#[test]
fn test_call_with_empty_result() {
    let server = FakeServer::start(|_| Reply::Frame(ResponseFrame::success(KeyValues::new())));
    let client = server.client();

    assert_eq!(client.call("noop", KeyValues::new()).unwrap(), None);
}

#[test]
fn test_large_result_spans_many_receives() {
    let blob = "x".repeat(64 * 1024);
    let expected = blob.clone();
    let server = FakeServer::start(move |_| {
        Reply::Trickle(ResponseFrame::success(params! { "blob" => blob.as_str() }), 1500)
    });
    let client = server.client();

    let result = client.call("big", KeyValues::new()).unwrap().unwrap();

    assert_eq!(result.get_str("blob"), Some(expected.as_str()));
}

#[test]
fn test_response_over_limit_is_rejected() {
    let server = FakeServer::start(|_| {
        Reply::Frame(ResponseFrame::success(params! { "blob" => "y".repeat(8192) }))
    });
    let client = Client::new(
        server
            .config()
            .recv_chunk_size(1024)
            .max_response_size(4096)
            .build(),
    )
    .unwrap();

    let err = client.call("big", KeyValues::new()).unwrap_err();
    assert!(err.is_decode());
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_connect_failure() {
    let client = Client::connect_to(dead_addr()).unwrap();

    let err = client.call("engine_time", KeyValues::new()).unwrap_err();
    assert!(matches!(err, KvRpcError::Connect { .. }));
    assert!(err.is_transport());

    let err = client.notify("log_line", KeyValues::new()).unwrap_err();
    assert!(matches!(err, KvRpcError::Connect { .. }));
}

#[test]
fn test_unresolvable_address() {
    let client = Client::connect_to("not an address").unwrap();
    let err = client.call("engine_time", KeyValues::new()).unwrap_err();
    assert!(matches!(err, KvRpcError::Connect { .. }));
}

#[test]
fn test_server_closes_without_reply() {
    let server = FakeServer::start(|_| Reply::Close);
    let client = server.client();

    // EOF or a reset, depending on timing; either way a transport failure
    let err = client.call("engine_time", KeyValues::new()).unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn test_malformed_response() {
    let server = FakeServer::start(|_| Reply::Raw(b"not a kv document {".to_vec()));
    let client = server.client();

    let err = client.call("engine_time", KeyValues::new()).unwrap_err();
    assert!(err.is_decode());
    assert!(!err.is_rpc());
}

#[test]
fn test_response_missing_protocol_tag() {
    let server = FakeServer::start(|_| Reply::Raw(b"\"other\"\n{\n\t\"result\" \"1\"\n}\n".to_vec()));
    let client = server.client();

    let err = client.call("engine_time", KeyValues::new()).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("keyvalues_rpc"));
}

#[test]
fn test_silent_server_times_out() {
    let server = FakeServer::start(|_| Reply::Silent);
    let client = Client::new(server.config().read_timeout_ms(200).build()).unwrap();

    let started = Instant::now();
    let err = client.call("engine_time", KeyValues::new()).unwrap_err();

    assert!(matches!(err, KvRpcError::Io(_)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_notify_does_not_wait_for_reply() {
    // A server that would never answer anything
    let server = FakeServer::start(|_| Reply::Silent);
    let client = Client::new(server.config().timeout_ms(0).build()).unwrap();

    client.notify("fire_and_forget", params! { "n" => 1 }).unwrap();

    assert_eq!(server.next_request().method, "fire_and_forget");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_calls_are_independent() {
    let server = FakeServer::echo();
    let client = server.client();

    thread::scope(|s| {
        for i in 0..16 {
            let client = &client;
            s.spawn(move || {
                let tag = format!("caller-{}", i);
                let result = client
                    .call("echo", params! { "tag" => tag.as_str(), "i" => i })
                    .unwrap()
                    .unwrap();
                assert_eq!(result.get_str("tag"), Some(tag.as_str()));
                assert_eq!(result.get_i64("i"), Some(i64::from(i)));
            });
        }
    });

    assert_eq!(server.requests().len(), 16);
}

#[test]
fn test_separate_clients_target_separate_servers() {
    let first = FakeServer::start(|_| Reply::Frame(ResponseFrame::success(params! { "who" => "first" })));
    let second = FakeServer::start(|_| Reply::Frame(ResponseFrame::success(params! { "who" => "second" })));

    let a = first.client().call("whoami", KeyValues::new()).unwrap().unwrap();
    let b = second.client().call("whoami", KeyValues::new()).unwrap().unwrap();

    assert_eq!(a.get_str("who"), Some("first"));
    assert_eq!(b.get_str("who"), Some("second"));
}
