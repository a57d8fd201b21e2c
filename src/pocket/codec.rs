//! Protobuf encoding for signed transactions.
//!
//! Only the handful of messages a `send` transaction needs are encoded, so a
//! small proto3 writer is enough. Default-valued fields are omitted, matching
//! proto3 serializers.

use crate::pocket::types::{PocketError, PocketResult};

/// `type_url` of the wrapped send message.
pub const MSG_SEND_TYPE_URL: &str = "/x.nodes.MsgSend";

const WIRE_VARINT: u8 = 0;
const WIRE_LEN: u8 = 2;

/// Append-only proto3 writer.
#[derive(Debug, Default, Clone)]
pub struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    fn put_key(&mut self, field: u32, wire_type: u8) {
        self.put_varint(((field as u64) << 3) | wire_type as u64);
    }

    /// Length-delimited bytes field.
    pub fn bytes(&mut self, field: u32, value: &[u8]) -> &mut Self {
        if !value.is_empty() {
            self.put_key(field, WIRE_LEN);
            self.put_varint(value.len() as u64);
            self.buf.extend_from_slice(value);
        }
        self
    }

    pub fn string(&mut self, field: u32, value: &str) -> &mut Self {
        self.bytes(field, value.as_bytes())
    }

    /// `int64` field; negative values take ten bytes, as in proto3.
    pub fn int64(&mut self, field: u32, value: i64) -> &mut Self {
        if value != 0 {
            self.put_key(field, WIRE_VARINT);
            self.put_varint(value as u64);
        }
        self
    }

    /// Embedded message field. Empty messages are still written, so repeated
    /// entries keep their position.
    pub fn message(&mut self, field: u32, inner: &ProtoWriter) -> &mut Self {
        self.put_key(field, WIRE_LEN);
        self.put_varint(inner.buf.len() as u64);
        self.buf.extend_from_slice(&inner.buf);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A fee or amount denomination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// Fields of a signed send transaction, already validated.
#[derive(Debug, Clone)]
pub struct SignedSendTx<'a> {
    pub from_address: &'a str,
    pub to_address: &'a str,
    pub amount: &'a str,
    pub fee: &'a [Coin],
    pub public_key: &'a [u8],
    pub signature: &'a [u8],
    pub memo: &'a str,
    pub entropy: i64,
}

/// Encode a `ProtoStdTx` wrapping a `MsgSend`.
pub fn encode_send_tx(tx: &SignedSendTx<'_>) -> PocketResult<Vec<u8>> {
    let from = decode_address(tx.from_address)?;
    let to = decode_address(tx.to_address)?;

    let mut msg_send = ProtoWriter::new();
    msg_send
        .bytes(1, &from)
        .bytes(2, &to)
        .string(3, tx.amount);

    let mut any = ProtoWriter::new();
    any.string(1, MSG_SEND_TYPE_URL)
        .bytes(2, &msg_send.into_bytes());

    let mut signature = ProtoWriter::new();
    signature.bytes(1, tx.public_key).bytes(2, tx.signature);

    let mut std_tx = ProtoWriter::new();
    std_tx.message(1, &any);
    for coin in tx.fee {
        let mut c = ProtoWriter::new();
        c.string(1, &coin.denom).string(2, &coin.amount);
        std_tx.message(2, &c);
    }
    std_tx
        .message(3, &signature)
        .string(4, tx.memo)
        .int64(5, tx.entropy);

    Ok(std_tx.into_bytes())
}

fn decode_address(address: &str) -> PocketResult<Vec<u8>> {
    match hex::decode(address) {
        Ok(bytes) if bytes.len() == 20 => Ok(bytes),
        _ => Err(PocketError::InvalidAddress(address.to_string())),
    }
}
