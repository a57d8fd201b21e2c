//! Shared utilities for integration testing.
#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// RFC 8032 test vector seeds, valid ed25519 private keys.
pub const APP_PRIVATE_KEY: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
pub const SIGNER_PRIVATE_KEY: &str =
    "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

pub const HEIGHT: u64 = 74213;
pub const TX_HASH: &str = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
pub const RELAY_RESULT: &str = r#"{"id":1,"jsonrpc":"2.0","result":"0x64"}"#;

/// Start a mock Pocket node that serves height, rawtx, dispatch and relay.
///
/// The dispatched session lists the same server as its only serving node.
pub async fn start_pocket_node() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/query/height"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "height": HEIGHT })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/client/rawtx"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "height": 0, "txhash": TX_HASH })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/client/dispatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "block_height": HEIGHT,
            "session": {
                "header": {
                    "app_public_key": "",
                    "chain": "005A",
                    "session_height": HEIGHT - 1
                },
                "key": "c2Vzc2lvbi1rZXk=",
                "nodes": [{
                    "address": "f5c6c79a2a3fe7a3e2e8e4c3a6f2e1a7d9b0c4e2",
                    "chains": ["005A"],
                    "jailed": false,
                    "public_key": "11".repeat(32),
                    "service_url": server.uri(),
                    "status": 2,
                    "tokens": "15000000000"
                }]
            }
        })))
        .mount(&server)
        .await;

    mount_relay(&server, ResponseTemplate::new(200).set_body_json(json!({
        "response": RELAY_RESULT,
        "signature": "ab".repeat(64)
    })))
    .await;

    server
}

/// Mount a relay responder on `server`.
pub async fn mount_relay(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/client/relay"))
        .respond_with(response)
        .mount(server)
        .await;
}
