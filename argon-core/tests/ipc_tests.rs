//! Integration tests for the IPC transport

mod mocks;

use std::sync::Arc;
use std::time::Duration;

use argon_core::capture::SourceCoalescer;
use argon_core::ipc::{IpcClient, IpcMessage, IpcResponse, IpcServer};
use mocks::{raw_source, test_options, MockBackend};
use tokio::io::AsyncWriteExt;

// Protocol serialization

#[test]
fn test_message_ping_serialization() {
    let msg = IpcMessage::Ping;
    let bytes = msg.to_bytes();
    let parsed = IpcMessage::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    assert!(matches!(parsed, IpcMessage::Ping));
}

#[test]
fn test_message_sources_serialization() {
    let options = test_options();
    let msg = IpcMessage::Sources {
        options: options.clone(),
    };
    let bytes = msg.to_bytes();
    let parsed = IpcMessage::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    match parsed {
        IpcMessage::Sources { options: parsed } => assert_eq!(parsed, options),
        _ => panic!("Expected Sources message"),
    }
}

#[test]
fn test_message_status_serialization() {
    let msg = IpcMessage::Status;
    let bytes = msg.to_bytes();
    let parsed = IpcMessage::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    assert!(matches!(parsed, IpcMessage::Status));
}

#[test]
fn test_message_stop_serialization() {
    let msg = IpcMessage::Stop;
    let bytes = msg.to_bytes();
    let parsed = IpcMessage::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    assert!(matches!(parsed, IpcMessage::Stop));
}

#[test]
fn test_response_sources_serialization() {
    let resp = IpcResponse::Sources {
        sources: vec![argon_core::types::SourceEntry {
            id: "window:1".into(),
            name: "Terminal".into(),
            thumbnail: "data:image/png;base64,AAAA".into(),
            display_id: None,
            app_icon: None,
        }],
    };
    let bytes = resp.to_bytes();
    let parsed = IpcResponse::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    match parsed {
        IpcResponse::Sources { sources } => {
            assert_eq!(sources.len(), 1);
            assert_eq!(sources[0].id, "window:1");
            assert!(sources[0].app_icon.is_none());
        }
        _ => panic!("Expected Sources response"),
    }
}

#[test]
fn test_response_error_serialization() {
    let resp = IpcResponse::error("permission-denied");
    let bytes = resp.to_bytes();
    let parsed = IpcResponse::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    match parsed {
        IpcResponse::Error { message } => assert_eq!(message, "permission-denied"),
        _ => panic!("Expected Error response"),
    }
}

#[test]
fn test_response_stopping_serialization() {
    let resp = IpcResponse::Stopping;
    let bytes = resp.to_bytes();
    let parsed = IpcResponse::from_bytes(&bytes[..bytes.len() - 1]).expect("Should parse");
    assert!(matches!(parsed, IpcResponse::Stopping));
}

#[test]
fn test_invalid_message_parsing() {
    let result = IpcMessage::from_bytes(b"not valid json");
    assert!(result.is_err());
}

#[test]
fn test_message_json_format() {
    let msg = IpcMessage::Status;
    let bytes = msg.to_bytes();
    let json_str = std::str::from_utf8(&bytes[..bytes.len() - 1]).expect("Should be valid UTF-8");
    assert!(json_str.contains("\"type\":\"Status\""));
}

#[test]
fn test_bytes_have_newline_terminator() {
    let msg = IpcMessage::Ping;
    let bytes = msg.to_bytes();
    assert_eq!(bytes.last(), Some(&b'\n'));

    let resp = IpcResponse::Pong;
    let bytes = resp.to_bytes();
    assert_eq!(bytes.last(), Some(&b'\n'));
}

// Live server

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 1s");
}

async fn start_server(
    backend: Arc<MockBackend>,
    socket: std::path::PathBuf,
) -> (Arc<SourceCoalescer>, tokio::task::JoinHandle<argon_core::Result<()>>) {
    let coalescer = Arc::new(SourceCoalescer::new(backend));
    let mut server =
        IpcServer::with_socket(Arc::clone(&coalescer), socket).expect("Should create server");
    server.start().await.expect("Should bind socket");
    let handle = tokio::spawn(async move { server.run().await });
    (coalescer, handle)
}

#[tokio::test]
async fn test_server_sources_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("argon.sock");
    let backend = MockBackend::new();
    let (_coalescer, _server) = start_server(backend.clone(), socket.clone()).await;

    let mut client = IpcClient::connect_to(&socket).await.unwrap();
    assert!(client.ping().await.unwrap());

    let request = tokio::spawn(async move { client.sources(test_options()).await });

    let backend_probe = backend.clone();
    wait_for(move || backend_probe.started_count() == 1).await;
    backend
        .last_session()
        .finished(vec![raw_source("w1", "Terminal", false)], false);

    let sources = request.await.unwrap().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, "w1");
    assert!(sources[0].thumbnail.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_server_status_reports_in_flight() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("argon.sock");
    let backend = MockBackend::new();
    let (_coalescer, _server) = start_server(backend.clone(), socket.clone()).await;

    let mut requester = IpcClient::connect_to(&socket).await.unwrap();
    let request = tokio::spawn(async move { requester.sources(test_options()).await });

    let backend_probe = backend.clone();
    wait_for(move || backend_probe.started_count() == 1).await;

    let mut client = IpcClient::connect_to(&socket).await.unwrap();
    let status = client.status().await.unwrap();
    assert_eq!(status.pid, std::process::id());
    assert_eq!(status.in_flight, 1);

    backend.last_session().finished(Vec::new(), false);
    assert!(request.await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_disconnect_cancels_enumeration() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("argon.sock");
    let backend = MockBackend::new();
    let (coalescer, _server) = start_server(backend.clone(), socket.clone()).await;

    let mut stream = tokio::net::UnixStream::connect(&socket).await.unwrap();
    let msg = IpcMessage::Sources {
        options: test_options(),
    };
    stream.write_all(&msg.to_bytes()).await.unwrap();

    let backend_probe = backend.clone();
    wait_for(move || backend_probe.started_count() == 1).await;
    assert_eq!(coalescer.in_flight(), 1);

    // The connection is the caller session; closing it is the teardown
    // notification for the enumeration it originated.
    drop(stream);

    let coalescer_probe = Arc::clone(&coalescer);
    wait_for(move || coalescer_probe.in_flight() == 0).await;
    assert!(backend.last_session().is_terminal());

    // A late backend signal on the discarded session has no effect.
    backend.last_session().finished(Vec::new(), false);
}

#[tokio::test]
async fn test_stop_shuts_down_server() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("argon.sock");
    let backend = MockBackend::new();
    let (_coalescer, server) = start_server(backend, socket.clone()).await;

    let mut client = IpcClient::connect_to(&socket).await.unwrap();
    client.stop().await.unwrap();

    server.await.unwrap().unwrap();
}
