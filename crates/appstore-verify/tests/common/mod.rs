//! Shared fixtures: a generated root/intermediate/leaf PKI and an ES256
//! JWS signer, so every test controls exactly what it verifies.
#![allow(dead_code)]

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::pkcs8::DecodePrivateKey as _;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, SerialNumber,
    PKCS_ECDSA_P256_SHA256,
};

/// A self-contained test PKI: root R, intermediate I signed by R, leaf L
/// signed by I, plus the leaf's signing key.
pub struct TestPki {
    pub root_der: Vec<u8>,
    pub intermediate_der: Vec<u8>,
    pub leaf_der: Vec<u8>,
    pub leaf_key: SigningKey,
}

fn ca_params(common_name: &str, constraint: BasicConstraints, serial: u8) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.is_ca = IsCa::Ca(constraint);
    params.not_before = rcgen::date_time_ymd(2024, 1, 1);
    params.not_after = rcgen::date_time_ymd(2035, 1, 1);
    params.serial_number = Some(SerialNumber::from(vec![serial]));
    params
}

fn leaf_params(not_before: (i32, u8, u8), not_after: (i32, u8, u8)) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, "Test Signing Leaf");
    params.distinguished_name = dn;
    params.is_ca = IsCa::ExplicitNoCa;
    params.not_before = rcgen::date_time_ymd(not_before.0, not_before.1, not_before.2);
    params.not_after = rcgen::date_time_ymd(not_after.0, not_after.1, not_after.2);
    params.serial_number = Some(SerialNumber::from(vec![0x42]));
    params
}

/// Build a PKI whose certificates are all valid 2024-2035.
pub fn build_pki() -> TestPki {
    build_pki_with_leaf_window((2024, 1, 1), (2035, 1, 1))
}

/// Build a PKI with an explicit leaf validity window; the root and
/// intermediate stay valid 2024-2035.
pub fn build_pki_with_leaf_window(
    not_before: (i32, u8, u8),
    not_after: (i32, u8, u8),
) -> TestPki {
    let root_key = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let root = ca_params("Test Root CA", BasicConstraints::Unconstrained, 0x01)
        .self_signed(&root_key)
        .unwrap();

    let intermediate_key = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let intermediate = ca_params("Test Intermediate CA", BasicConstraints::Constrained(0), 0x02)
        .signed_by(&intermediate_key, &root, &root_key)
        .unwrap();

    let leaf_key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let leaf = leaf_params(not_before, not_after)
        .signed_by(&leaf_key_pair, &intermediate, &intermediate_key)
        .unwrap();

    let leaf_key = SigningKey::from_pkcs8_der(&leaf_key_pair.serialize_der()).unwrap();

    TestPki {
        root_der: root.der().as_ref().to_vec(),
        intermediate_der: intermediate.der().as_ref().to_vec(),
        leaf_der: leaf.der().as_ref().to_vec(),
        leaf_key,
    }
}

impl TestPki {
    /// The chain as carried in a JWS header: leaf first, no root.
    pub fn header_chain(&self) -> Vec<&[u8]> {
        vec![&self.leaf_der, &self.intermediate_der]
    }
}

/// Sign `payload` as a compact ES256 JWS carrying `chain` in the header.
pub fn sign_jws(chain: &[&[u8]], payload: &serde_json::Value, key: &SigningKey) -> String {
    sign_jws_with_alg(chain, payload, key, "ES256")
}

/// Same as [`sign_jws`] but with an arbitrary declared algorithm, for
/// algorithm-confusion tests. The signature is still ES256.
pub fn sign_jws_with_alg(
    chain: &[&[u8]],
    payload: &serde_json::Value,
    key: &SigningKey,
    alg: &str,
) -> String {
    let x5c: Vec<String> = chain.iter().map(|der| STANDARD.encode(der)).collect();
    let header = serde_json::json!({ "alg": alg, "x5c": x5c });
    let header_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
    let payload_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    let signing_input = format!("{header_segment}.{payload_segment}");
    let signature: Signature = key.sign(signing_input.as_bytes());
    let signature_segment = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    format!("{signing_input}.{signature_segment}")
}

/// A structurally valid JWS whose signature is garbage. Useful for the
/// developer-local trust paths, which never check it.
pub fn unsigned_jws(chain: &[&[u8]], payload: &serde_json::Value) -> String {
    let x5c: Vec<String> = chain.iter().map(|der| STANDARD.encode(der)).collect();
    let header = serde_json::json!({ "alg": "ES256", "x5c": x5c });
    let header_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
    let payload_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    let signature_segment = URL_SAFE_NO_PAD.encode([0x5au8; 64]);
    format!("{header_segment}.{payload_segment}.{signature_segment}")
}

/// Replace the payload segment with one whose decoded bytes differ by a
/// single byte, leaving everything else intact.
pub fn tamper_payload(signed: &str) -> String {
    let segments: Vec<&str> = signed.split('.').collect();
    assert_eq!(segments.len(), 3);
    let mut payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();
    payload[0] ^= 0x01;
    format!(
        "{}.{}.{}",
        segments[0],
        URL_SAFE_NO_PAD.encode(payload),
        segments[2]
    )
}
