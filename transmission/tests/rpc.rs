//! RPC behaviour against a mock daemon.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pretty_assertions::assert_eq;
use serde_json::json;
use torrent_handler_transmission::{
    SESSION_ID_HEADER, SubmissionConfig, SubmissionReceipt, TorrentSubmitter, TransmissionClient,
    TransmissionError,
};
use wiremock::matchers::{basic_auth, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RPC_PATH: &str = "/transmission/rpc";

fn config_for(server: &MockServer) -> SubmissionConfig {
    let address = server.address();
    SubmissionConfig::new(address.ip().to_string(), address.port(), "/downloads")
}

/// Mount the 409 handshake: requests without the token get one back.
async fn mount_handshake(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(409).insert_header(SESSION_ID_HEADER, token))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_performs_session_handshake() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header(SESSION_ID_HEADER, "token-1"))
        .and(body_partial_json(json!({ "method": "session-get" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": { "version": "4.0.5", "rpc-version": 17 }
        })))
        .expect(2)
        .mount(&server)
        .await;
    mount_handshake(&server, "token-1").await;

    let client = TransmissionClient::connect(config_for(&server)).await.unwrap();
    let session = client.session().await.unwrap();

    assert_eq!(session.version.as_deref(), Some("4.0.5"));
    assert_eq!(session.rpc_version, Some(17));
}

#[tokio::test]
async fn test_submit_sends_base64_metainfo_and_download_dir() {
    let server = MockServer::start().await;
    let metainfo = b"d8:announce3:url4:infod4:name5:hello";

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(header(SESSION_ID_HEADER, "abc"))
        .and(body_partial_json(json!({
            "method": "torrent-add",
            "arguments": {
                "metainfo": STANDARD.encode(metainfo),
                "download-dir": "/downloads"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": {
                "torrent-added": { "id": 3, "name": "hello", "hashString": "deadbeef" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_handshake(&server, "abc").await;

    let client = TransmissionClient::new(config_for(&server)).unwrap();
    let receipt = client.submit(metainfo, "/downloads").await.unwrap();

    assert!(!receipt.is_duplicate());
    assert_eq!(receipt.torrent().id, Some(3));
    assert_eq!(receipt.torrent().name.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_duplicate_is_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": { "torrent-duplicate": { "id": 9, "name": "dup" } }
        })))
        .mount(&server)
        .await;

    let client = TransmissionClient::new(config_for(&server)).unwrap();
    let receipt = client.submit(b"bytes", "/downloads").await.unwrap();

    assert!(matches!(receipt, SubmissionReceipt::Duplicate(_)));
}

#[tokio::test]
async fn test_daemon_rejection_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "invalid or corrupt torrent file"
        })))
        .mount(&server)
        .await;

    let client = TransmissionClient::new(config_for(&server)).unwrap();
    let err = client.submit(b"not a torrent", "/downloads").await.unwrap_err();

    match err {
        TransmissionError::Rejected(reason) => {
            assert_eq!(reason, "invalid or corrupt torrent file");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_credentials_are_sent_and_401_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "arguments": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(10)
        .mount(&server)
        .await;

    let good = config_for(&server)
        .with_credentials(Some("admin".to_string()), Some("secret".to_string()));
    assert!(TransmissionClient::connect(good).await.is_ok());

    let bad = config_for(&server)
        .with_credentials(Some("admin".to_string()), Some("wrong".to_string()));
    let err = TransmissionClient::connect(bad).await.err().unwrap();
    assert!(matches!(err, TransmissionError::Unauthorized));
}

#[tokio::test]
async fn test_repeated_conflict_is_session_rejected() {
    let server = MockServer::start().await;
    mount_handshake(&server, "never-accepted").await;

    let client = TransmissionClient::new(config_for(&server)).unwrap();
    let err = client.session().await.unwrap_err();

    assert!(matches!(err, TransmissionError::SessionRejected));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = SubmissionConfig::new("127.0.0.1", port, "/downloads");
    let err = TransmissionClient::connect(config).await.err().unwrap();

    assert!(matches!(err, TransmissionError::Http(_)));
}
