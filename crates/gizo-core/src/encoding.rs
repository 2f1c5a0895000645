//! Hex / base64 helpers for values exchanged with dispatchers.
//!
//! Exec hashes travel as byte arrays, block hashes as hex, and some payloads
//! as standard (padded) base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(hex::decode(value)?)
}

pub fn bytes_to_b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn b64_to_bytes(value: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(STANDARD.decode(value)?)
}

pub fn b64_to_hex(value: &str) -> Result<String, EncodingError> {
    Ok(bytes_to_hex(&b64_to_bytes(value)?))
}
