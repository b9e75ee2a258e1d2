//! Online revocation checking through the full pipeline, with an
//! injected status provider.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use appstore_verify::models::Environment;
use appstore_verify::{
    CertStatus, ChainFailure, FailureMode, OnlineCheckPolicy, RevocationStatusProvider,
    SignedDataVerifier, StatusError, StatusRequest, VerificationError, VerificationWarning,
};

use common::{build_pki, sign_jws, TestPki};

struct FixedProvider {
    status: Result<CertStatus, StatusError>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(status: Result<CertStatus, StatusError>) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
        })
    }
}

impl RevocationStatusProvider for FixedProvider {
    fn status(&self, _request: &StatusRequest) -> Result<CertStatus, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status.clone()
    }
}

fn verifier_with_provider(
    pki: &TestPki,
    provider: Arc<dyn RevocationStatusProvider>,
    failure_mode: FailureMode,
) -> SignedDataVerifier {
    SignedDataVerifier::builder()
        .root_certificates(vec![pki.root_der.clone()])
        .bundle_id("com.example.app")
        .environment(Environment::Sandbox)
        .verification_time(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        .online_checks(OnlineCheckPolicy {
            enabled: true,
            failure_mode,
            ..OnlineCheckPolicy::default()
        })
        .status_provider(provider)
        .build()
        .unwrap()
}

fn signed_transaction(pki: &TestPki) -> String {
    let payload = serde_json::json!({
        "bundleId": "com.example.app",
        "environment": "Sandbox",
        "transactionId": "1"
    });
    sign_jws(&pki.header_chain(), &payload, &pki.leaf_key)
}

#[test]
fn good_status_verifies_without_warnings() {
    let pki = build_pki();
    let provider = FixedProvider::new(Ok(CertStatus::Good));
    let verifier = verifier_with_provider(&pki, provider.clone(), FailureMode::SoftWarn);

    let verified = verifier
        .verify_and_decode_transaction(&signed_transaction(&pki))
        .unwrap();
    assert!(verified.warnings.is_empty());
    // Chain [leaf, intermediate]: only the leaf has its issuer in the
    // supplied chain.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn revoked_certificate_fails_the_chain() {
    let pki = build_pki();
    let provider = FixedProvider::new(Ok(CertStatus::Revoked));
    let verifier = verifier_with_provider(&pki, provider, FailureMode::SoftWarn);

    assert!(matches!(
        verifier.verify_and_decode_transaction(&signed_transaction(&pki)),
        Err(VerificationError::InvalidCertificateChain {
            kind: ChainFailure::RevokedCertificate,
            ..
        })
    ));
}

#[test]
fn connectivity_failure_soft_warns_by_default() {
    let pki = build_pki();
    let provider = FixedProvider::new(Err(StatusError("connection refused".to_owned())));
    let verifier = verifier_with_provider(&pki, provider, FailureMode::SoftWarn);

    let verified = verifier
        .verify_and_decode_transaction(&signed_transaction(&pki))
        .unwrap();
    assert_eq!(verified.warnings.len(), 1);
    assert!(matches!(
        &verified.warnings[0],
        VerificationWarning::RevocationUnavailable { reason, .. }
            if reason.contains("connection refused")
    ));
}

#[test]
fn connectivity_failure_hard_fails_when_configured() {
    let pki = build_pki();
    let provider = FixedProvider::new(Err(StatusError("connection refused".to_owned())));
    let verifier = verifier_with_provider(&pki, provider, FailureMode::HardFail);

    assert!(matches!(
        verifier.verify_and_decode_transaction(&signed_transaction(&pki)),
        Err(VerificationError::Internal { .. })
    ));
}

#[test]
fn statuses_are_cached_across_verifications() {
    let pki = build_pki();
    let provider = FixedProvider::new(Ok(CertStatus::Good));
    let verifier = verifier_with_provider(&pki, provider.clone(), FailureMode::SoftWarn);
    let signed = signed_transaction(&pki);

    verifier.verify_and_decode_transaction(&signed).unwrap();
    verifier.verify_and_decode_transaction(&signed).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_status_warns_but_is_not_cached() {
    let pki = build_pki();
    let provider = FixedProvider::new(Ok(CertStatus::Unknown));
    let verifier = verifier_with_provider(&pki, provider.clone(), FailureMode::SoftWarn);
    let signed = signed_transaction(&pki);

    let verified = verifier.verify_and_decode_transaction(&signed).unwrap();
    assert_eq!(verified.warnings.len(), 1);

    verifier.verify_and_decode_transaction(&signed).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
