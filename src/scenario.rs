//! The transfer-and-relay scenario.
//!
//! A fixed, linear sequence: connect, derive keys, generate an AAT, print the
//! chain height, submit a transfer and print its hash, dispatch a session,
//! relay a JSON-RPC payload and print the response. Any failing step aborts
//! the run; only the relay retries, inside the relayer.
//!
//! Collaborators are obtained through [`Toolkit`] so the sequence can be
//! driven against mocks.

use std::io::Write;
use std::sync::Arc;

use crate::config::schema::{BackoffConfig, DemoConfig};
use crate::error::DemoResult;
use crate::pocket::types::{DispatchRequest, PocketResult, RelayRequest, SessionHeader};
use crate::pocket::{
    Ed25519KeyStore, JsonRpcProvider, KeyManager, KeyStore, Provider, RelayService, Relayer,
    TransactionBuilder, TransactionSender,
};

/// Factory for the four collaborators the scenario drives.
pub trait Toolkit: Send + Sync {
    /// Provider bound to the configured endpoint.
    fn connect(&self, config: &DemoConfig) -> PocketResult<Arc<dyn Provider>>;

    fn key_store(&self) -> &dyn KeyStore;

    /// Relayer signing with `client_signer`.
    fn relayer(
        &self,
        client_signer: KeyManager,
        provider: Arc<dyn Provider>,
    ) -> Box<dyn RelayService>;

    /// Transaction builder for `signer` on network `chain_id`.
    fn transaction_builder(
        &self,
        signer: KeyManager,
        provider: Arc<dyn Provider>,
        chain_id: &str,
    ) -> Box<dyn TransactionSender>;
}

/// Production toolkit talking to a real Pocket endpoint.
#[derive(Debug, Clone, Default)]
pub struct PocketToolkit {
    key_store: Ed25519KeyStore,
    backoff: BackoffConfig,
}

impl PocketToolkit {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            key_store: Ed25519KeyStore,
            backoff: config.relay.backoff.clone(),
        }
    }
}

impl Toolkit for PocketToolkit {
    fn connect(&self, config: &DemoConfig) -> PocketResult<Arc<dyn Provider>> {
        Ok(Arc::new(JsonRpcProvider::from_config(config)?))
    }

    fn key_store(&self) -> &dyn KeyStore {
        &self.key_store
    }

    fn relayer(
        &self,
        client_signer: KeyManager,
        provider: Arc<dyn Provider>,
    ) -> Box<dyn RelayService> {
        Box::new(Relayer::new(client_signer, provider, self.backoff.clone()))
    }

    fn transaction_builder(
        &self,
        signer: KeyManager,
        provider: Arc<dyn Provider>,
        chain_id: &str,
    ) -> Box<dyn TransactionSender> {
        Box::new(TransactionBuilder::new(provider, signer, chain_id))
    }
}

/// Values printed by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub height: u64,
    pub tx_hash: String,
    pub relay_response: String,
}

/// Run the scenario, writing height, transaction hash and relay response to
/// `out`, one per line.
pub async fn run_scenario<W: Write>(
    config: &DemoConfig,
    toolkit: &dyn Toolkit,
    out: &mut W,
) -> DemoResult<ScenarioReport> {
    let provider = toolkit.connect(config)?;
    let keys = toolkit.key_store();

    let client_signer = keys.generate()?;
    let app_signer = keys.load(&config.app_private_key)?;
    let client_pub_key = client_signer.public_key();
    let relayer = toolkit.relayer(client_signer, provider.clone());
    let aat = relayer.generate_aat(&app_signer, &client_pub_key).await?;

    let height = provider.get_block_number().await?;
    tracing::info!(height, "Fetched chain height");
    writeln!(out, "{}", height)?;
    out.flush()?;

    let tx_signer = keys.load(&config.signer_private_key)?;
    let from_address = tx_signer.address();
    let builder =
        toolkit.transaction_builder(tx_signer, provider.clone(), &config.transfer.chain_id);
    let msg = builder.send(
        &from_address,
        &config.transfer.recipient,
        &config.transfer.amount,
    )?;
    let tx = builder.submit(&config.transfer.memo, msg).await?;
    writeln!(out, "{}", tx.tx_hash)?;
    out.flush()?;

    let dispatch = provider
        .dispatch(&DispatchRequest {
            session_header: SessionHeader {
                app_public_key: app_signer.public_key(),
                chain: config.relay.chain.clone(),
                session_height: 0,
            },
        })
        .await?;

    let response = relayer
        .relay(RelayRequest {
            blockchain: config.relay.chain.clone(),
            data: config.relay.payload.clone(),
            method: None,
            path: None,
            headers: None,
            aat,
            session: dispatch.session,
            options: config.relay.options,
        })
        .await?;
    writeln!(out, "{}", response.response)?;
    out.flush()?;

    Ok(ScenarioReport {
        height,
        tx_hash: tx.tx_hash,
        relay_response: response.response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RelayOptions;
    use crate::error::DemoError;
    use crate::pocket::aat::generate_aat;
    use crate::pocket::keys::MockKeyStore;
    use crate::pocket::provider::MockProvider;
    use crate::pocket::relayer::MockRelayService;
    use crate::pocket::transaction::{MockTransactionSender, MsgSend};
    use crate::pocket::types::{
        DispatchResponse, Node, PocketError, RelayResponse, Session, TransactionResponse,
    };
    use crate::pocket::KeyManager;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::Mutex;

    const APP_KEY: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const SIGNER_KEY: &str = "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";
    const RECIPIENT: &str = "07a6fca4dea9f01e4c19f301df0d0afac128561b";
    const PAYLOAD: &str = r#"{"id":1,"jsonrpc":"2.0","method":"eth_chainId"}"#;
    const RELAY_RESULT: &str = r#"{"id":1,"jsonrpc":"2.0","result":"0x64"}"#;

    struct TestToolkit {
        provider: Arc<MockProvider>,
        key_store: Box<dyn KeyStore>,
        relayer: Mutex<Option<MockRelayService>>,
        builder: Mutex<Option<MockTransactionSender>>,
    }

    impl TestToolkit {
        fn new(
            provider: MockProvider,
            relayer: MockRelayService,
            builder: MockTransactionSender,
        ) -> Self {
            Self {
                provider: Arc::new(provider),
                key_store: Box::new(Ed25519KeyStore),
                relayer: Mutex::new(Some(relayer)),
                builder: Mutex::new(Some(builder)),
            }
        }

        fn with_key_store(mut self, key_store: MockKeyStore) -> Self {
            self.key_store = Box::new(key_store);
            self
        }
    }

    impl Toolkit for TestToolkit {
        fn connect(&self, _config: &DemoConfig) -> PocketResult<Arc<dyn Provider>> {
            let provider: Arc<dyn Provider> = self.provider.clone();
            Ok(provider)
        }

        fn key_store(&self) -> &dyn KeyStore {
            self.key_store.as_ref()
        }

        fn relayer(&self, _client: KeyManager, _provider: Arc<dyn Provider>) -> Box<dyn RelayService> {
            Box::new(self.relayer.lock().unwrap().take().expect("relayer built once"))
        }

        fn transaction_builder(
            &self,
            _signer: KeyManager,
            _provider: Arc<dyn Provider>,
            chain_id: &str,
        ) -> Box<dyn TransactionSender> {
            assert_eq!(chain_id, "testnet");
            Box::new(self.builder.lock().unwrap().take().expect("builder built once"))
        }
    }

    fn test_config(app_private_key: &str) -> DemoConfig {
        DemoConfig {
            endpoint: "http://localhost:8081".to_string(),
            app_private_key: app_private_key.to_string(),
            signer_private_key: SIGNER_KEY.to_string(),
            ..Default::default()
        }
    }

    fn session() -> Session {
        Session {
            header: SessionHeader {
                app_public_key: KeyManager::from_private_key(APP_KEY).unwrap().public_key(),
                chain: "005A".into(),
                session_height: 1201,
            },
            key: "key".into(),
            nodes: vec![Node {
                address: "node1".into(),
                service_url: "https://node1.example".into(),
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_runs_steps_once_in_order() {
        let mut seq = Sequence::new();
        let mut provider = MockProvider::new();
        let mut relayer = MockRelayService::new();
        let mut builder = MockTransactionSender::new();

        let app_pub_key = KeyManager::from_private_key(APP_KEY).unwrap().public_key();
        let signer_address = KeyManager::from_private_key(SIGNER_KEY).unwrap().address();

        let expected_app = app_pub_key.clone();
        relayer
            .expect_generate_aat()
            .withf(move |app, client| app.public_key() == expected_app && client.len() == 64)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|app, client| generate_aat(app, client));

        provider
            .expect_get_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(74213));

        builder
            .expect_send()
            .with(eq(signer_address.clone()), eq(RECIPIENT), eq("1000000"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|from, to, amount| {
                Ok(MsgSend {
                    from_address: from.to_string(),
                    to_address: to.to_string(),
                    amount: amount.to_string(),
                })
            });

        builder
            .expect_submit()
            .withf(|memo, msg| memo == "POKT Payment" && msg.to_address == RECIPIENT)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(TransactionResponse {
                    tx_hash: "E3B0C44298FC1C149AFBF4C8996FB924".into(),
                    ..Default::default()
                })
            });

        let expected_app = app_pub_key.clone();
        provider
            .expect_dispatch()
            .withf(move |req| {
                req.session_header.app_public_key == expected_app
                    && req.session_header.chain == "005A"
                    && req.session_header.session_height == 0
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(DispatchResponse {
                    block_height: 1201,
                    session: session(),
                })
            });

        relayer
            .expect_relay()
            .withf(|req| {
                req.blockchain == "005A"
                    && req.data == PAYLOAD
                    && req.options
                        == RelayOptions {
                            retry_attempts: 5,
                            timeout_ms: 8000,
                            reject_self_signed_certificates: false,
                        }
                    && req.session == session()
                    && req.aat.version == "0.0.1"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(RelayResponse {
                    response: RELAY_RESULT.into(),
                    signature: "ff".into(),
                })
            });

        let toolkit = TestToolkit::new(provider, relayer, builder);
        let mut out = Vec::new();
        let report = run_scenario(&test_config(APP_KEY), &toolkit, &mut out)
            .await
            .unwrap();

        assert_eq!(report.height, 74213);
        let stdout = String::from_utf8(out).unwrap();
        let lines: Vec<_> = stdout.lines().collect();
        assert_eq!(
            lines,
            vec!["74213", "E3B0C44298FC1C149AFBF4C8996FB924", RELAY_RESULT]
        );
    }

    #[tokio::test]
    async fn test_malformed_app_key_stops_before_network() {
        let mut provider = MockProvider::new();
        provider.expect_get_block_number().never();
        provider.expect_dispatch().never();
        let mut relayer = MockRelayService::new();
        relayer.expect_generate_aat().never();
        relayer.expect_relay().never();
        let mut builder = MockTransactionSender::new();
        builder.expect_submit().never();

        let toolkit = TestToolkit::new(provider, relayer, builder);
        let mut out = Vec::new();
        let err = run_scenario(&test_config("not-a-key"), &toolkit, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, DemoError::Pocket(PocketError::InvalidKey(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_prints_nothing() {
        let mut provider = MockProvider::new();
        provider
            .expect_get_block_number()
            .times(1)
            .returning(|| Err(PocketError::Transport("connection refused".into())));
        provider.expect_dispatch().never();
        let mut relayer = MockRelayService::new();
        relayer
            .expect_generate_aat()
            .returning(|app, client| generate_aat(app, client));
        relayer.expect_relay().never();
        let mut builder = MockTransactionSender::new();
        builder.expect_send().never();
        builder.expect_submit().never();

        let toolkit = TestToolkit::new(provider, relayer, builder);
        let mut out = Vec::new();
        let err = run_scenario(&test_config(APP_KEY), &toolkit, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_relay_failure_after_transaction() {
        let mut provider = MockProvider::new();
        provider.expect_get_block_number().returning(|| Ok(10));
        provider.expect_dispatch().returning(|_| {
            Ok(DispatchResponse {
                block_height: 10,
                session: session(),
            })
        });
        let mut relayer = MockRelayService::new();
        relayer
            .expect_generate_aat()
            .returning(|app, client| generate_aat(app, client));
        relayer.expect_relay().times(1).returning(|_| {
            Err(PocketError::RelayExhausted {
                attempts: 6,
                last: Box::new(PocketError::Transport("reset".into())),
            })
        });
        let mut builder = MockTransactionSender::new();
        builder.expect_send().returning(|from, to, amount| {
            Ok(MsgSend {
                from_address: from.to_string(),
                to_address: to.to_string(),
                amount: amount.to_string(),
            })
        });
        builder.expect_submit().returning(|_, _| {
            Ok(TransactionResponse {
                tx_hash: "AB".into(),
                ..Default::default()
            })
        });

        let toolkit = TestToolkit::new(provider, relayer, builder);
        let mut out = Vec::new();
        let err = run_scenario(&test_config(APP_KEY), &toolkit, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DemoError::Pocket(PocketError::RelayExhausted { attempts: 6, .. })
        ));
        assert_eq!(String::from_utf8(out).unwrap(), "10\nAB\n");
    }

    #[tokio::test]
    async fn test_app_key_loaded_before_height_and_signer_after() {
        let mut seq = Sequence::new();
        let mut key_store = MockKeyStore::new();
        let mut provider = MockProvider::new();
        let mut relayer = MockRelayService::new();
        let mut builder = MockTransactionSender::new();

        key_store
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(KeyManager::create_random()));
        key_store
            .expect_load()
            .withf(|key| key == APP_KEY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|key| KeyManager::from_private_key(key));
        relayer
            .expect_generate_aat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|app, client| generate_aat(app, client));
        provider
            .expect_get_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(74213));
        key_store
            .expect_load()
            .withf(|key| key == SIGNER_KEY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(PocketError::InvalidKey("locked".into())));
        builder.expect_send().never();
        builder.expect_submit().never();
        provider.expect_dispatch().never();
        relayer.expect_relay().never();

        let toolkit = TestToolkit::new(provider, relayer, builder).with_key_store(key_store);
        let mut out = Vec::new();
        let err = run_scenario(&test_config(APP_KEY), &toolkit, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, DemoError::Pocket(PocketError::InvalidKey(_))));
        assert_eq!(String::from_utf8(out).unwrap(), "74213\n");
    }
}
