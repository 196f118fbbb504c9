//! Contains simplified access to the `bech32`, `bs58` and `base64` encoders, the cb58
//! checksummed-ID encoding, and the checksummed hex used by node APIs. Also defines common
//! encoder errors.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bech32::{FromBase32, ToBase32, Variant};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of the checksum appended by `encode_cb58` and `encode_hex_checksummed`.
pub const CHECKSUM_LENGTH: usize = 4;

/// Errors that can be returned by the encoders.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Returned when a hex string contains non-hex characters or has odd length.
    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Bubbled up from `bs58`.
    #[error(transparent)]
    Base58(#[from] bs58::decode::Error),

    /// Bubbled up from `base64`.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Bubbled up from `bech32`.
    #[error(transparent)]
    BechError(#[from] bech32::Error),

    /// The trailing 4 bytes do not match the checksum of the payload.
    #[error("Invalid checksum")]
    InvalidChecksum,

    /// Bech32 HRP does not match the expected HRP.
    #[error("Expected a bech32 HRP of {expected:?}. Got {got:?}")]
    WrongHrp {
        /// The actual HRP.
        got: String,
        /// The expected HRP.
        expected: String,
    },

    /// The chain alias before the `-` separator does not match the expected chain.
    #[error("Expected chain alias {expected:?}. Got {got:?}")]
    WrongChain {
        /// The actual chain alias.
        got: String,
        /// The expected chain alias.
        expected: String,
    },

    /// An address string has no `<chain>-` prefix.
    #[error("Address {0:?} is missing the chain separator")]
    MissingSeparator(String),

    /// Decoded payload has the wrong length.
    #[error("Expected {expected} bytes. Got {got}")]
    InvalidSize {
        /// The actual length.
        got: usize,
        /// The expected length.
        expected: usize,
    },
}

/// A simple result type alias
pub type EncodingResult<T> = Result<T, EncodingError>;

/// The checksum used by cb58 and checksummed hex: the last 4 bytes of `sha256(payload)`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
    out
}

fn with_checksum(payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(payload.len() + CHECKSUM_LENGTH);
    v.extend_from_slice(payload);
    v.extend_from_slice(&checksum(payload));
    v
}

fn strip_checksum(mut v: Vec<u8>) -> EncodingResult<Vec<u8>> {
    if v.len() < CHECKSUM_LENGTH {
        return Err(EncodingError::InvalidSize {
            got: v.len(),
            expected: CHECKSUM_LENGTH,
        });
    }
    let split = v.len() - CHECKSUM_LENGTH;
    if checksum(&v[..split]) != v[split..] {
        return Err(EncodingError::InvalidChecksum);
    }
    v.truncate(split);
    Ok(v)
}

/// Encode bytes as plain base58 (no checksum).
pub fn encode_base58(v: &[u8]) -> String {
    bs58::encode(v).into_string()
}

/// Decode plain base58 (no checksum).
pub fn decode_base58(s: &str) -> EncodingResult<Vec<u8>> {
    Ok(bs58::decode(s).into_vec()?)
}

/// Encode bytes as cb58: `base58(payload || checksum(payload))`.
pub fn encode_cb58(v: &[u8]) -> String {
    encode_base58(&with_checksum(v))
}

/// Decode a cb58 string, verifying and removing the checksum.
pub fn decode_cb58(s: &str) -> EncodingResult<Vec<u8>> {
    strip_checksum(decode_base58(s)?)
}

/// Decode a hex string, accepting an optional `0x` prefix.
pub fn decode_hex(s: &str) -> EncodingResult<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

/// Encode bytes as `0x`-prefixed hex with a trailing checksum, as node APIs do.
pub fn encode_hex_checksummed(v: &[u8]) -> String {
    format!("0x{}", hex::encode(with_checksum(v)))
}

/// Decode `0x`-prefixed hex with a trailing checksum, verifying and removing the checksum.
pub fn decode_hex_checksummed(s: &str) -> EncodingResult<Vec<u8>> {
    strip_checksum(decode_hex(s)?)
}

/// Encode bytes as standard base64.
pub fn encode_base64(v: &[u8]) -> String {
    STANDARD.encode(v)
}

/// Decode standard base64.
pub fn decode_base64(s: &str) -> EncodingResult<Vec<u8>> {
    Ok(STANDARD.decode(s)?)
}

/// Encode a payload as bech32 under `hrp`.
pub fn encode_bech32(hrp: &str, v: &[u8]) -> EncodingResult<String> {
    Ok(bech32::encode(hrp, v.to_base32(), Variant::Bech32)?)
}

/// Decode a bech32 string. Caller specifies an expected HRP. If a different HRP is found,
/// returns `WrongHrp`.
pub fn decode_bech32(expected_hrp: &str, s: &str) -> EncodingResult<Vec<u8>> {
    let (hrp, data, _variant) = bech32::decode(s)?;
    if hrp != expected_hrp {
        return Err(EncodingError::WrongHrp {
            got: hrp,
            expected: expected_hrp.to_owned(),
        });
    }
    Ok(Vec::<u8>::from_base32(&data)?)
}

/// Decode a bech32 string without checking its HRP. Returns the HRP and the payload.
pub fn decode_bech32_any(s: &str) -> EncodingResult<(String, Vec<u8>)> {
    let (hrp, data, _variant) = bech32::decode(s)?;
    Ok((hrp, Vec::<u8>::from_base32(&data)?))
}
