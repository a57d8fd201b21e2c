//! Configuration schema definitions.
//!
//! The three secrets and the endpoint come from the environment; everything
//! else describes the fixed transfer-and-relay scenario and carries defaults.

/// Root configuration for a scenario run.
#[derive(Clone, Default)]
pub struct DemoConfig {
    /// Pocket RPC endpoint, also the sole dispatcher.
    pub endpoint: String,

    /// Hex-encoded application private key.
    pub app_private_key: String,

    /// Hex-encoded private key of the transaction signer.
    pub signer_private_key: String,

    /// HTTP provider settings.
    pub provider: ProviderConfig,

    /// Token transfer settings.
    pub transfer: TransferConfig,

    /// Relay settings.
    pub relay: RelayConfig,
}

impl std::fmt::Debug for DemoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoConfig")
            .field("endpoint", &self.endpoint)
            .field("app_private_key", &"<redacted>")
            .field("signer_private_key", &"<redacted>")
            .field("provider", &self.provider)
            .field("transfer", &self.transfer)
            .field("relay", &self.relay)
            .finish()
    }
}

/// HTTP provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Timeout for height, dispatch and transaction calls in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 20_000,
        }
    }
}

/// Token transfer configuration.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Network identifier the transaction is signed for.
    pub chain_id: String,

    /// Recipient address (40 hex chars).
    pub recipient: String,

    /// Amount in uPOKT (1 POKT = 1_000_000 uPOKT).
    pub amount: String,

    /// Transaction memo.
    pub memo: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chain_id: "testnet".to_string(),
            recipient: "07a6fca4dea9f01e4c19f301df0d0afac128561b".to_string(),
            amount: "1000000".to_string(),
            memo: "POKT Payment".to_string(),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay chain identifier.
    pub chain: String,

    /// JSON-RPC payload forwarded to the relay chain.
    pub payload: String,

    /// Per-call relay options.
    pub options: RelayOptions,

    /// Backoff between relay attempts.
    pub backoff: BackoffConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chain: "005A".to_string(),
            payload: r#"{"id":1,"jsonrpc":"2.0","method":"eth_chainId"}"#.to_string(),
            options: RelayOptions::default(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Options attached to a single relay call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    /// Additional attempts after the first failure.
    pub retry_attempts: u32,

    /// Deadline for each attempt in milliseconds.
    pub timeout_ms: u64,

    /// Reject servicers presenting self-signed TLS certificates.
    pub reject_self_signed_certificates: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            retry_attempts: 5,
            timeout_ms: 8000,
            reject_self_signed_certificates: false,
        }
    }
}

/// Exponential backoff configuration.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}
