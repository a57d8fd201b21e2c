//! Application Authentication Tokens.
//!
//! The application key signs SHA3-256 over the token's JSON with an empty
//! signature field; servicers recompute the same digest to validate it.

use sha3::{Digest, Sha3_256};

use crate::pocket::keys::{verify_signature, KeyManager};
use crate::pocket::types::{Aat, PocketError, PocketResult};

/// Token format version understood by the network.
pub const AAT_VERSION: &str = "0.0.1";

/// Generate an AAT authorizing `client_pub_key` to relay for `app_signer`.
pub fn generate_aat(app_signer: &KeyManager, client_pub_key: &str) -> PocketResult<Aat> {
    if !matches!(hex::decode(client_pub_key), Ok(bytes) if bytes.len() == 32) {
        return Err(PocketError::InvalidAat(format!(
            "client public key '{}' is not 32 hex-encoded bytes",
            client_pub_key
        )));
    }

    let mut aat = Aat {
        version: AAT_VERSION.to_string(),
        app_pub_key: app_signer.public_key(),
        client_pub_key: client_pub_key.to_string(),
        signature: String::new(),
    };
    aat.signature = app_signer.sign(&signing_digest(&aat)?);

    tracing::info!(
        app_address = %app_signer.address(),
        client_pub_key = %aat.client_pub_key,
        "Generated AAT"
    );

    Ok(aat)
}

/// Check the token's version and the application's signature.
pub fn verify_aat(aat: &Aat) -> PocketResult<()> {
    if aat.version != AAT_VERSION {
        return Err(PocketError::InvalidAat(format!(
            "unsupported version '{}'",
            aat.version
        )));
    }
    if aat.signature.is_empty() {
        return Err(PocketError::InvalidAat("missing signature".to_string()));
    }

    verify_signature(&aat.app_pub_key, &signing_digest(aat)?, &aat.signature)
        .map_err(|e| PocketError::InvalidAat(e.to_string()))
}

/// Hex SHA3-256 of the complete token, used as the proof's `token` field.
pub fn aat_hash(aat: &Aat) -> PocketResult<String> {
    Ok(hex::encode(Sha3_256::digest(serde_json::to_vec(aat)?)))
}

fn signing_digest(aat: &Aat) -> PocketResult<Vec<u8>> {
    let unsigned = Aat {
        signature: String::new(),
        ..aat.clone()
    };
    Ok(Sha3_256::digest(serde_json::to_vec(&unsigned)?).to_vec())
}
