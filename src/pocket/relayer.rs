//! Relaying application payloads through session nodes.
//!
//! # Responsibilities
//! - Generate AATs for the client key
//! - Build and sign relay proofs
//! - Pick a serving node per attempt and deliver within the relay timeout
//! - Retry transport failures, timeouts and 5xx answers

use async_trait::async_trait;
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::config::schema::BackoffConfig;
use crate::observability::metrics;
use crate::pocket::aat::{aat_hash, generate_aat, verify_aat};
use crate::pocket::keys::KeyManager;
use crate::pocket::provider::Provider;
use crate::pocket::types::{
    Aat, Node, PocketError, PocketResult, Relay, RelayMeta, RelayPayload, RelayProof,
    RelayRequest, RelayResponse,
};
use crate::resilience::{retry_with_backoff, RetryError, RetryPolicy};

/// Relay entropy stays below 2^53 so every JSON consumer reads it exactly.
const MAX_ENTROPY: u64 = (1 << 53) - 1;

/// Forwards payloads through the network on behalf of an application.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RelayService: Send + Sync {
    /// Generate an AAT binding `app_signer` to `client_pub_key`.
    async fn generate_aat(&self, app_signer: &KeyManager, client_pub_key: &str)
        -> PocketResult<Aat>;

    /// Send a relay through the request's session.
    async fn relay(&self, request: RelayRequest) -> PocketResult<RelayResponse>;
}

/// Relayer signing proofs with an ephemeral client key.
pub struct Relayer {
    key_manager: KeyManager,
    provider: Arc<dyn Provider>,
    backoff: BackoffConfig,
}

#[derive(Serialize)]
struct RequestHashInput<'a> {
    payload: &'a RelayPayload,
    meta: &'a RelayMeta,
}

#[derive(Serialize)]
struct ProofSigningDoc<'a> {
    entropy: u64,
    session_block_height: u64,
    servicer_pub_key: &'a str,
    blockchain: &'a str,
    signature: &'a str,
    token: String,
    request_hash: &'a str,
}

impl Relayer {
    /// Create a relayer.
    ///
    /// # Arguments
    /// * `key_manager` - Client key the AAT authorizes
    /// * `provider` - Provider delivering relays
    /// * `backoff` - Delay between attempts
    pub fn new(key_manager: KeyManager, provider: Arc<dyn Provider>, backoff: BackoffConfig) -> Self {
        Self {
            key_manager,
            provider,
            backoff,
        }
    }

    /// Build a signed relay for `node`.
    pub fn build_relay(&self, request: &RelayRequest, node: &Node, entropy: u64) -> PocketResult<Relay> {
        let payload = RelayPayload {
            data: request.data.clone(),
            method: request.method.clone().unwrap_or_default(),
            path: request.path.clone().unwrap_or_default(),
            headers: request.headers.clone(),
        };
        let meta = RelayMeta {
            block_height: request.session.header.session_height,
        };
        let request_hash = hex::encode(Sha3_256::digest(serde_json::to_vec(
            &RequestHashInput {
                payload: &payload,
                meta: &meta,
            },
        )?));

        let signing_doc = ProofSigningDoc {
            entropy,
            session_block_height: request.session.header.session_height,
            servicer_pub_key: &node.public_key,
            blockchain: &request.blockchain,
            signature: "",
            token: aat_hash(&request.aat)?,
            request_hash: &request_hash,
        };
        let digest = Sha3_256::digest(serde_json::to_vec(&signing_doc)?);
        let signature = self.key_manager.sign(&digest);

        Ok(Relay {
            payload,
            meta,
            proof: RelayProof {
                entropy,
                session_block_height: request.session.header.session_height,
                servicer_pub_key: node.public_key.clone(),
                blockchain: request.blockchain.clone(),
                aat: request.aat.clone(),
                signature,
                request_hash,
            },
        })
    }

    fn check_request(&self, request: &RelayRequest) -> PocketResult<()> {
        if request.data.is_empty() {
            return Err(PocketError::EmptyPayload);
        }
        if request.session.nodes.is_empty() {
            return Err(PocketError::NoServingNodes(request.blockchain.clone()));
        }
        if request.aat.client_pub_key != self.key_manager.public_key() {
            return Err(PocketError::InvalidAat(
                "token is bound to a different client key".to_string(),
            ));
        }
        verify_aat(&request.aat)
    }

    async fn attempt(&self, request: &RelayRequest, attempt: u32) -> PocketResult<RelayResponse> {
        let nodes = &request.session.nodes;
        let node = &nodes[fastrand::usize(..nodes.len())];
        let relay = self.build_relay(request, node, fastrand::u64(..=MAX_ENTROPY))?;

        tracing::debug!(
            attempt,
            node = %node.address,
            service_url = %node.service_url,
            "Sending relay"
        );

        // The provider enforces the per-attempt deadline
        let result = self.provider.relay(node, &relay, &request.options).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_retryable() => "retry",
            Err(_) => "failure",
        };
        metrics::record_relay_attempt(&request.blockchain, outcome);
        result
    }
}

#[async_trait]
impl RelayService for Relayer {
    async fn generate_aat(
        &self,
        app_signer: &KeyManager,
        client_pub_key: &str,
    ) -> PocketResult<Aat> {
        generate_aat(app_signer, client_pub_key)
    }

    async fn relay(&self, request: RelayRequest) -> PocketResult<RelayResponse> {
        self.check_request(&request)?;

        let policy = RetryPolicy {
            max_retries: request.options.retry_attempts,
            backoff: self.backoff.clone(),
        };

        let result = retry_with_backoff(&policy, "relay", PocketError::is_retryable, |attempt| {
            self.attempt(&request, attempt)
        })
        .await;

        match result {
            Ok(response) => {
                tracing::info!(chain = %request.blockchain, "Relay succeeded");
                Ok(response)
            }
            Err(RetryError::Aborted { error, .. }) => Err(error),
            Err(RetryError::Exhausted { attempts, last }) => Err(PocketError::RelayExhausted {
                attempts,
                last: Box::new(last),
            }),
        }
    }
}
