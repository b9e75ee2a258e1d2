//! JWS signature verification against the validated leaf certificate.
//!
//! Runs strictly after chain validation: a public key is only used here
//! once the chain it came from has been accepted.

use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use p256::pkcs8::DecodePublicKey as _;
use signature::Verifier as _;

use crate::chain::ParsedCertificate;
use crate::error::VerificationError;

/// The only JWS signing algorithm this library accepts.
pub const EXPECTED_ALGORITHM: &str = "ES256";

/// Verify the JWS signature over the exact signing input.
///
/// The signing input is the ASCII bytes of
/// `"<header segment>.<payload segment>"` as received; segments are never
/// re-encoded. The signature is the raw 64-byte `r || s` form required by
/// ES256.
pub fn verify(
    leaf: &ParsedCertificate,
    algorithm: &str,
    header_segment: &str,
    payload_segment: &str,
    signature: &[u8],
) -> Result<(), VerificationError> {
    if algorithm != EXPECTED_ALGORITHM {
        return Err(VerificationError::UnsupportedAlgorithm {
            algorithm: algorithm.to_owned(),
        });
    }

    let public_key = p256::PublicKey::from_public_key_der(&leaf.spki_der)
        .map_err(|_| VerificationError::InvalidSignature)?;
    let point = public_key.to_encoded_point(false);
    let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes())
        .map_err(|_| VerificationError::InvalidSignature)?;

    let parsed_signature = p256::ecdsa::Signature::from_slice(signature)
        .map_err(|_| VerificationError::InvalidSignature)?;

    let signing_input = format!("{header_segment}.{payload_segment}");
    verifying_key
        .verify(signing_input.as_bytes(), &parsed_signature)
        .map_err(|_| VerificationError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unexpected_algorithm() {
        // The algorithm gate runs before any key material is touched, so a
        // placeholder record is enough here.
        let leaf = crate::chain::ParsedCertificate {
            der: Vec::new(),
            subject: String::new(),
            issuer: String::new(),
            subject_raw: Vec::new(),
            issuer_raw: Vec::new(),
            spki_der: Vec::new(),
            public_key_bits: Vec::new(),
            tbs_der: Vec::new(),
            signature_oid: String::new(),
            signature: Vec::new(),
            serial: Vec::new(),
            not_before: 0,
            not_after: 0,
            is_ca: None,
            path_len: None,
            ocsp_responder: None,
        };

        let result = verify(&leaf, "RS256", "a", "b", &[0u8; 64]);
        assert!(matches!(
            result,
            Err(VerificationError::UnsupportedAlgorithm { algorithm }) if algorithm == "RS256"
        ));
    }
}
