//! Certificate chain extraction and validation.
//!
//! The JWS header carries the signer's certificate chain (`x5c`), leaf
//! first. This module decodes that chain into owned records and validates
//! the path from the leaf to one of the verifier's pinned trust anchors:
//! adjacent issuer/subject linking, per-link signature verification,
//! basic-constraints, validity windows, and a signature-algorithm
//! allowlist.
//!
//! The chain is an explicit ordered sequence with index-based adjacency
//! checks; no object graph with back-references is built.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use p256::pkcs8::DecodePublicKey as _;
use sha2::{Digest, Sha256, Sha384};
use signature::hazmat::PrehashVerifier as _;
use signature::Verifier as _;
use x509_parser::extensions::{GeneralName, ParsedExtension};

use crate::error::{ChainFailure, VerificationError};

/// Accepted number of certificates in a header chain. The lower bound
/// guarantees a leaf exists; the upper bound rejects resource-abuse input.
pub const MIN_CHAIN_LEN: usize = 1;
pub const MAX_CHAIN_LEN: usize = 5;

// ecdsa-with-SHA256 / ecdsa-with-SHA384
const OID_ECDSA_SHA256: &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_SHA384: &str = "1.2.840.10045.4.3.3";

// id-ad-ocsp
const OID_AD_OCSP: &str = "1.3.6.1.5.5.7.48.1";

/// An X.509 certificate parsed into owned fields, so nothing borrows from
/// the decoded header.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    /// Full certificate DER.
    pub der: Vec<u8>,
    /// Subject distinguished name, display form (diagnostics only).
    pub subject: String,
    /// Issuer distinguished name, display form (diagnostics only).
    pub issuer: String,
    /// Raw DER of the subject name; used for linking comparisons.
    pub subject_raw: Vec<u8>,
    /// Raw DER of the issuer name; used for linking comparisons.
    pub issuer_raw: Vec<u8>,
    /// SubjectPublicKeyInfo DER.
    pub spki_der: Vec<u8>,
    /// Raw public key bits from the SPKI (no tag/length/unused bits).
    pub public_key_bits: Vec<u8>,
    /// Raw DER of the TBSCertificate; the bytes the issuer signed.
    pub tbs_der: Vec<u8>,
    /// Signature algorithm OID, dotted form.
    pub signature_oid: String,
    /// Signature bytes (DER-encoded ECDSA).
    pub signature: Vec<u8>,
    /// Serial number, big-endian.
    pub serial: Vec<u8>,
    /// Validity window, Unix seconds.
    pub not_before: i64,
    pub not_after: i64,
    /// Basic-constraints CA flag; `None` when the extension is absent.
    pub is_ca: Option<bool>,
    /// Basic-constraints path length, when constrained.
    pub path_len: Option<u32>,
    /// OCSP responder URL from authority-info-access, when present.
    pub ocsp_responder: Option<String>,
}

/// Parse a DER certificate into an owned record.
pub fn parse_certificate(der: &[u8]) -> Result<ParsedCertificate, String> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| format!("invalid certificate DER: {e}"))?;

    let mut is_ca = None;
    let mut path_len = None;
    let mut ocsp_responder = None;
    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => {
                is_ca = Some(bc.ca);
                path_len = bc.path_len_constraint;
            }
            ParsedExtension::AuthorityInfoAccess(aia) => {
                for desc in &aia.accessdescs {
                    if desc.access_method.to_id_string() == OID_AD_OCSP {
                        if let GeneralName::URI(uri) = &desc.access_location {
                            ocsp_responder = Some((*uri).to_owned());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ParsedCertificate {
        der: der.to_vec(),
        subject: cert.tbs_certificate.subject.to_string(),
        issuer: cert.tbs_certificate.issuer.to_string(),
        subject_raw: cert.tbs_certificate.subject.as_raw().to_vec(),
        issuer_raw: cert.tbs_certificate.issuer.as_raw().to_vec(),
        spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
        public_key_bits: cert
            .tbs_certificate
            .subject_pki
            .subject_public_key
            .data
            .to_vec(),
        tbs_der: cert.tbs_certificate.as_ref().to_vec(),
        signature_oid: cert.signature_algorithm.algorithm.to_id_string(),
        signature: cert.signature_value.data.to_vec(),
        serial: cert.tbs_certificate.serial.to_bytes_be(),
        not_before: cert.validity().not_before.timestamp(),
        not_after: cert.validity().not_after.timestamp(),
        is_ca,
        path_len,
        ocsp_responder,
    })
}

/// Decode the `x5c` entries (standard base64, leaf first) into parsed
/// certificates, preserving header order.
pub fn extract_chain(x5c: &[String]) -> Result<Vec<ParsedCertificate>, VerificationError> {
    if x5c.len() < MIN_CHAIN_LEN || x5c.len() > MAX_CHAIN_LEN {
        return Err(VerificationError::MalformedCertificate {
            reason: format!(
                "certificate chain has {} entries, accepted range is {}..={}",
                x5c.len(),
                MIN_CHAIN_LEN,
                MAX_CHAIN_LEN
            ),
        });
    }

    let mut chain = Vec::with_capacity(x5c.len());
    for (index, entry) in x5c.iter().enumerate() {
        let der = BASE64_STANDARD
            .decode(entry)
            .map_err(|e| VerificationError::MalformedCertificate {
                reason: format!("x5c entry #{index} is not base64: {e}"),
            })?;
        let cert =
            parse_certificate(&der).map_err(|reason| VerificationError::MalformedCertificate {
                reason: format!("x5c entry #{index}: {reason}"),
            })?;
        chain.push(cert);
    }
    Ok(chain)
}

/// Validates certificate chains against a pinned set of trust anchors.
///
/// The anchor set is immutable after construction; one verifier instance's
/// anchors never interfere with another's.
#[derive(Debug, Clone)]
pub struct ChainVerifier {
    anchors: Vec<ParsedCertificate>,
}

impl ChainVerifier {
    /// Parse the pinned root certificates. Called once per verifier
    /// instance; a malformed anchor is rejected eagerly.
    pub fn new(root_certificates: &[Vec<u8>]) -> Result<Self, crate::error::ConfigError> {
        if root_certificates.is_empty() {
            return Err(crate::error::ConfigError::NoTrustAnchors);
        }
        let mut anchors = Vec::with_capacity(root_certificates.len());
        for (index, der) in root_certificates.iter().enumerate() {
            let anchor = parse_certificate(der).map_err(|reason| {
                crate::error::ConfigError::MalformedTrustAnchor { index, reason }
            })?;
            anchors.push(anchor);
        }
        Ok(Self { anchors })
    }

    /// Validate a leaf-first chain at the given verification instant.
    ///
    /// Check order: algorithm allowlist, validity windows, leaf/CA basic
    /// constraints, adjacent links, trust-anchor termination.
    pub fn verify(
        &self,
        chain: &[ParsedCertificate],
        at: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        if chain.is_empty() {
            return Err(VerificationError::MalformedCertificate {
                reason: "empty certificate chain".to_owned(),
            });
        }

        // Only the expected ECDSA algorithms are accepted anywhere in the
        // chain; anything else is an algorithm-substitution attempt.
        for cert in chain {
            if cert.signature_oid != OID_ECDSA_SHA256 && cert.signature_oid != OID_ECDSA_SHA384 {
                return Err(VerificationError::UnsupportedAlgorithm {
                    algorithm: cert.signature_oid.clone(),
                });
            }
        }

        let ts = at.timestamp();
        for cert in chain {
            if ts < cert.not_before || ts > cert.not_after {
                return Err(chain_error(
                    ChainFailure::ExpiredCertificate,
                    format!(
                        "certificate '{}' is not valid at the verification instant",
                        cert.subject
                    ),
                ));
            }
        }

        if chain[0].is_ca == Some(true) {
            return Err(chain_error(
                ChainFailure::BrokenChain,
                "leaf certificate is marked as a CA".to_owned(),
            ));
        }

        for i in 0..chain.len() - 1 {
            let cert = &chain[i];
            let issuer = &chain[i + 1];

            if issuer.is_ca != Some(true) {
                return Err(chain_error(
                    ChainFailure::BrokenChain,
                    format!("certificate '{}' is not a CA", issuer.subject),
                ));
            }
            // `issuer` sits above i intermediate CAs in this chain.
            if let Some(path_len) = issuer.path_len {
                if (path_len as usize) < i {
                    return Err(chain_error(
                        ChainFailure::BrokenChain,
                        format!(
                            "certificate '{}' exceeds its path length constraint",
                            issuer.subject
                        ),
                    ));
                }
            }
            if cert.issuer_raw != issuer.subject_raw {
                return Err(chain_error(
                    ChainFailure::BrokenChain,
                    format!(
                        "issuer of '{}' does not match subject of '{}'",
                        cert.subject, issuer.subject
                    ),
                ));
            }
            verify_certificate_signature(cert, issuer).map_err(|reason| {
                chain_error(
                    ChainFailure::BrokenChain,
                    format!("signature of '{}' does not verify: {reason}", cert.subject),
                )
            })?;
        }

        // The top of the chain must reach a pinned anchor: either it is an
        // anchor, or an anchor signed it. Anchors are matched by content,
        // never by position.
        let top = &chain[chain.len() - 1];
        if self.is_anchor(top) {
            return Ok(());
        }
        for anchor in &self.anchors {
            if top.issuer_raw == anchor.subject_raw
                && verify_certificate_signature(top, anchor).is_ok()
            {
                return Ok(());
            }
        }

        Err(chain_error(
            ChainFailure::UntrustedRoot,
            format!(
                "chain terminates at '{}', which does not reach a pinned trust anchor",
                top.subject
            ),
        ))
    }

    fn is_anchor(&self, cert: &ParsedCertificate) -> bool {
        self.anchors.iter().any(|anchor| {
            anchor.der == cert.der
                || (anchor.subject_raw == cert.subject_raw && anchor.spki_der == cert.spki_der)
        })
    }
}

fn chain_error(kind: ChainFailure, reason: String) -> VerificationError {
    VerificationError::InvalidCertificateChain { kind, reason }
}

/// Issuer public key decoded onto its curve.
enum EcPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

fn issuer_public_key(issuer: &ParsedCertificate) -> Result<EcPublicKey, String> {
    if let Ok(pk) = p256::PublicKey::from_public_key_der(&issuer.spki_der) {
        let point = pk.to_encoded_point(false);
        return p256::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes())
            .map(EcPublicKey::P256)
            .map_err(|e| format!("bad P-256 issuer public key: {e}"));
    }
    if let Ok(pk) = p384::PublicKey::from_public_key_der(&issuer.spki_der) {
        let point = pk.to_encoded_point(false);
        return p384::ecdsa::VerifyingKey::from_sec1_bytes(point.as_bytes())
            .map(EcPublicKey::P384)
            .map_err(|e| format!("bad P-384 issuer public key: {e}"));
    }
    Err("issuer public key is not an EC key on a supported curve".to_owned())
}

/// Verify `cert`'s signature against `issuer`'s public key, hashing per
/// the certificate's declared algorithm OID.
pub fn verify_certificate_signature(
    cert: &ParsedCertificate,
    issuer: &ParsedCertificate,
) -> Result<(), String> {
    let key = issuer_public_key(issuer)?;
    match (cert.signature_oid.as_str(), key) {
        (OID_ECDSA_SHA256, EcPublicKey::P256(vk)) => {
            let sig = p256::ecdsa::Signature::from_der(&cert.signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(&cert.tbs_der, &sig)
                .map_err(|_| "certificate signature verification failed".to_owned())
        }
        (OID_ECDSA_SHA256, EcPublicKey::P384(vk)) => {
            let sig = p384::ecdsa::Signature::from_der(&cert.signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            let digest = Sha256::digest(&cert.tbs_der);
            vk.verify_prehash(&digest, &sig)
                .map_err(|_| "certificate signature verification failed".to_owned())
        }
        (OID_ECDSA_SHA384, EcPublicKey::P384(vk)) => {
            let sig = p384::ecdsa::Signature::from_der(&cert.signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(&cert.tbs_der, &sig)
                .map_err(|_| "certificate signature verification failed".to_owned())
        }
        (OID_ECDSA_SHA384, EcPublicKey::P256(vk)) => {
            let sig = p256::ecdsa::Signature::from_der(&cert.signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            let digest = Sha384::digest(&cert.tbs_der);
            vk.verify_prehash(&digest, &sig)
                .map_err(|_| "certificate signature verification failed".to_owned())
        }
        (oid, _) => Err(format!("unsupported certificate signature algorithm: {oid}")),
    }
}
