//! Key management and signing.
//!
//! # Security
//! - Private keys are loaded ONLY from configuration sourced from the environment
//! - Keys are never logged; Debug shows the address only
//! - Signing keys are zeroized on drop by ed25519-dalek

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

#[cfg(test)]
use mockall::automock;

use crate::pocket::types::{PocketError, PocketResult};

/// Length in bytes of an account address.
pub const ADDRESS_LEN: usize = 20;

/// An ed25519 key pair used to sign AATs, relay proofs and transactions.
#[derive(Clone)]
pub struct KeyManager {
    signing_key: SigningKey,
}

impl KeyManager {
    /// Generate a fresh random key pair.
    pub fn create_random() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let key = Self { signing_key };
        tracing::debug!(address = %key.address(), "Generated ephemeral key pair");
        key
    }

    /// Load a key pair from a hex-encoded private key.
    ///
    /// Accepts the 32-byte seed or the 64-byte `seed || public key` export
    /// format, with or without a `0x` prefix.
    pub fn from_private_key(private_key_hex: &str) -> PocketResult<Self> {
        let key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);

        let bytes = hex::decode(key_hex)
            .map_err(|e| PocketError::InvalidKey(format!("Invalid private key format: {}", e)))?;

        let seed: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .map_err(|_| PocketError::InvalidKey("Invalid private key seed".to_string()))?,
            n => {
                return Err(PocketError::InvalidKey(format!(
                    "Invalid private key length: expected 32 or 64 bytes, got {}",
                    n
                )))
            }
        };

        let signing_key = SigningKey::from_bytes(&seed);
        if bytes.len() == 64 && bytes[32..] != signing_key.verifying_key().to_bytes() {
            return Err(PocketError::InvalidKey(
                "Private key public half does not match its seed".to_string(),
            ));
        }

        let key = Self { signing_key };
        tracing::info!(address = %key.address(), "Key pair loaded");
        Ok(key)
    }

    /// Hex-encoded 32-byte public key.
    pub fn public_key(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Hex-encoded address: the first 20 bytes of SHA-256 over the public key.
    pub fn address(&self) -> String {
        address_from_public_key(&self.public_key_bytes())
    }

    /// Sign `message`, returning the raw 64-byte signature.
    pub fn sign_bytes(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Sign `message`, returning the hex-encoded signature.
    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.sign_bytes(message))
    }

    /// Export the private key in the 64-byte `seed || public key` hex format.
    pub fn export_private_key(&self) -> String {
        hex::encode(self.signing_key.to_keypair_bytes())
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("address", &self.address())
            .finish()
    }
}

/// Derive the hex address for a raw public key.
pub fn address_from_public_key(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    hex::encode(&digest[..ADDRESS_LEN])
}

/// Verify a hex signature over `message` against a hex public key.
pub fn verify_signature(
    public_key_hex: &str,
    message: &[u8],
    signature_hex: &str,
) -> PocketResult<()> {
    let pk_bytes: [u8; 32] = hex::decode(public_key_hex)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| PocketError::InvalidKey(format!("Invalid public key '{}'", public_key_hex)))?;
    let verifying_key = VerifyingKey::from_bytes(&pk_bytes)
        .map_err(|e| PocketError::InvalidKey(format!("Invalid public key: {}", e)))?;

    let sig_bytes: [u8; 64] = hex::decode(signature_hex)
        .ok()
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| PocketError::InvalidKey("Malformed signature".to_string()))?;

    verifying_key
        .verify(message, &Signature::from_bytes(&sig_bytes))
        .map_err(|_| PocketError::InvalidKey("Signature verification failed".to_string()))
}

/// Source of key pairs for a scenario run.
#[cfg_attr(test, automock)]
pub trait KeyStore: Send + Sync {
    /// Create a random ephemeral key pair.
    fn generate(&self) -> PocketResult<KeyManager>;

    /// Load a key pair from hex-encoded private key material.
    fn load(&self, private_key: &str) -> PocketResult<KeyManager>;
}

/// Key store backed by in-process ed25519 keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyStore;

impl KeyStore for Ed25519KeyStore {
    fn generate(&self) -> PocketResult<KeyManager> {
        Ok(KeyManager::create_random())
    }

    fn load(&self, private_key: &str) -> PocketResult<KeyManager> {
        KeyManager::from_private_key(private_key)
    }
}
