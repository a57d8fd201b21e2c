//! Pocket RPC provider with timeout and error handling.
//!
//! # Responsibilities
//! - Query chain state (current height)
//! - Dispatch sessions
//! - Broadcast signed transactions
//! - Deliver signed relays to serving nodes

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

#[cfg(test)]
use mockall::automock;

use crate::config::schema::{DemoConfig, ProviderConfig};
use crate::observability::metrics;
use crate::pocket::types::{
    DispatchRequest, DispatchResponse, HeightResponse, Node, PocketError, PocketResult,
    RawTxRequest, Relay, RelayOptions, RelayResponse, TransactionResponse,
};
use crate::resilience::with_timeout;

const HEIGHT_PATH: &str = "/v1/query/height";
const DISPATCH_PATH: &str = "/v1/client/dispatch";
const RAW_TX_PATH: &str = "/v1/client/rawtx";
const RELAY_PATH: &str = "/v1/client/relay";

/// RPC communication with Pocket nodes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Current chain height.
    async fn get_block_number(&self) -> PocketResult<u64>;

    /// Request a session assignment.
    async fn dispatch(&self, request: &DispatchRequest) -> PocketResult<DispatchResponse>;

    /// Broadcast a signed, encoded transaction.
    async fn send_transaction(&self, request: &RawTxRequest) -> PocketResult<TransactionResponse>;

    /// Deliver a signed relay to one serving node.
    async fn relay(
        &self,
        node: &Node,
        relay: &Relay,
        options: &RelayOptions,
    ) -> PocketResult<RelayResponse>;
}

/// HTTP JSON provider bound to one Pocket endpoint.
///
/// The endpoint serves height queries, transaction broadcasts and dispatch.
#[derive(Clone)]
pub struct JsonRpcProvider {
    rpc_url: String,
    client: reqwest::Client,
    /// Client used for relays when self-signed servicer certificates are allowed.
    permissive_client: reqwest::Client,
    timeout_duration: Duration,
}

impl JsonRpcProvider {
    /// Create a provider.
    ///
    /// # Arguments
    /// * `rpc_url` - Endpoint for height, dispatch and transaction calls
    /// * `config` - Provider settings
    pub fn new(rpc_url: &str, config: &ProviderConfig) -> PocketResult<Self> {
        let rpc_url = normalize_url(rpc_url)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PocketError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        let permissive_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| PocketError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(rpc_url = %rpc_url, "Provider initialized");

        Ok(Self {
            rpc_url,
            client,
            permissive_client,
            timeout_duration: Duration::from_millis(config.request_timeout_ms),
        })
    }

    pub fn from_config(config: &DemoConfig) -> PocketResult<Self> {
        Self::new(&config.endpoint, &config.provider)
    }

    async fn post_json<B, R>(
        &self,
        client: &reqwest::Client,
        url: &str,
        body: &B,
        operation: &'static str,
        deadline: Duration,
    ) -> PocketResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let result = with_timeout(
            deadline,
            async {
                let response = client.post(url).json(body).send().await?;
                let status = response.status();
                let text = response.text().await?;
                if !status.is_success() {
                    return Err(PocketError::Http {
                        url: url.to_string(),
                        status: status.as_u16(),
                        body: text,
                    });
                }
                serde_json::from_str::<R>(&text)
                    .map_err(|e| PocketError::InvalidResponse(format!("{}: {}", operation, e)))
            },
            || PocketError::Timeout {
                target: url.to_string(),
                timeout_ms: deadline.as_millis() as u64,
            },
        )
        .await;

        metrics::record_rpc_call(operation, result.is_ok(), started.elapsed());
        if let Err(e) = &result {
            tracing::debug!(operation, url, error = %e, "RPC call failed");
        }
        result
    }
}

#[async_trait]
impl Provider for JsonRpcProvider {
    async fn get_block_number(&self) -> PocketResult<u64> {
        let url = format!("{}{}", self.rpc_url, HEIGHT_PATH);
        let response: HeightResponse = self
            .post_json(&self.client, &url, &serde_json::json!({}), "height", self.timeout_duration)
            .await?;
        Ok(response.height)
    }

    async fn dispatch(&self, request: &DispatchRequest) -> PocketResult<DispatchResponse> {
        let url = format!("{}{}", self.rpc_url, DISPATCH_PATH);
        let response: DispatchResponse = self
            .post_json(
                &self.client,
                &url,
                &request.session_header,
                "dispatch",
                self.timeout_duration,
            )
            .await?;

        tracing::info!(
            chain = %response.session.header.chain,
            session_height = response.session.header.session_height,
            nodes = response.session.nodes.len(),
            "Session dispatched"
        );
        Ok(response)
    }

    async fn send_transaction(&self, request: &RawTxRequest) -> PocketResult<TransactionResponse> {
        let url = format!("{}{}", self.rpc_url, RAW_TX_PATH);
        self.post_json(&self.client, &url, request, "rawtx", self.timeout_duration)
            .await
    }

    async fn relay(
        &self,
        node: &Node,
        relay: &Relay,
        options: &RelayOptions,
    ) -> PocketResult<RelayResponse> {
        let base = normalize_url(&node.service_url)?;
        let url = format!("{}{}", base, RELAY_PATH);
        let client = if options.reject_self_signed_certificates {
            &self.client
        } else {
            &self.permissive_client
        };
        self.post_json(
            client,
            &url,
            relay,
            "relay",
            Duration::from_millis(options.timeout_ms),
        )
        .await
    }
}

impl std::fmt::Debug for JsonRpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcProvider")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}

fn normalize_url(raw: &str) -> PocketResult<String> {
    let url = url::Url::parse(raw)
        .map_err(|e| PocketError::Rpc(format!("Invalid URL '{}': {}", raw, e)))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
