//! Compact JWS decoding.
//!
//! Splits the three-segment compact serialization and base64url-decodes
//! each segment. Decoding is purely structural: nothing here makes a trust
//! decision.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::error::VerificationError;

/// Header fields this library reads. Unknown header members are ignored.
#[derive(Debug, Clone, Deserialize)]
struct RawHeader {
    alg: Option<String>,
    x5c: Option<Vec<String>>,
}

/// A structurally decoded compact JWS.
///
/// The raw header and payload segments are kept verbatim so the signing
/// input can later be reconstructed byte for byte, without re-encoding.
#[derive(Debug, Clone)]
pub struct DecodedJws {
    /// First segment exactly as received.
    pub header_segment: String,
    /// Second segment exactly as received.
    pub payload_segment: String,
    /// Declared signing algorithm from the header.
    pub algorithm: String,
    /// Base64 (standard) DER certificates from the header, leaf first.
    pub certificate_chain: Vec<String>,
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
    /// Decoded signature bytes.
    pub signature: Vec<u8>,
}

fn format_error(reason: impl Into<String>) -> VerificationError {
    VerificationError::InvalidJwsFormat {
        reason: reason.into(),
    }
}

/// Decode a compact-serialization JWS string.
pub fn decode(signed_payload: &str) -> Result<DecodedJws, VerificationError> {
    let segments: Vec<&str> = signed_payload.split('.').collect();
    if segments.len() != 3 {
        return Err(format_error(format!(
            "expected 3 dot-separated segments, found {}",
            segments.len()
        )));
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(format_error("empty segment"));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| format_error(format!("header segment is not base64url: {e}")))?;
    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| format_error(format!("payload segment is not base64url: {e}")))?;
    let signature = URL_SAFE_NO_PAD
        .decode(segments[2])
        .map_err(|e| format_error(format!("signature segment is not base64url: {e}")))?;

    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| format_error(format!("header is not valid JSON: {e}")))?;

    let algorithm = header
        .alg
        .ok_or_else(|| format_error("header is missing the alg field"))?;
    let certificate_chain = header
        .x5c
        .ok_or_else(|| format_error("header is missing the x5c field"))?;
    if certificate_chain.is_empty() {
        return Err(format_error("header x5c field is empty"));
    }

    Ok(DecodedJws {
        header_segment: segments[0].to_owned(),
        payload_segment: segments[1].to_owned(),
        algorithm,
        certificate_chain,
        payload,
        signature,
    })
}
