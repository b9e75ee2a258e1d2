//! Online certificate status checking.
//!
//! Optional, best-effort revocation: when enabled, each certificate whose
//! issuer is present in the chain is looked up by (issuer, serial number)
//! against the issuing authority. Statuses are cached for the process
//! lifetime with per-key locking so concurrent verifications of different
//! certificates never serialize behind each other; the cache bounds
//! network cost and never changes a verification outcome, only its
//! latency.
//!
//! A definitive "revoked" answer fails the chain. A connectivity failure
//! is, by default, attached to an otherwise-successful result as a
//! warning; [`FailureMode::HardFail`] escalates it instead.

#[cfg(feature = "online-checks")]
mod ocsp;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::chain::ParsedCertificate;
use crate::error::{ChainFailure, VerificationError, VerificationWarning};

/// Upper bound on retained cache entries. Statuses computed past the
/// bound are still returned, just not retained.
const CACHE_CAPACITY: usize = 1024;

/// Status of a certificate as reported by the issuing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertStatus {
    Good,
    Revoked,
    /// The authority does not know the certificate.
    Unknown,
}

/// Identifies the certificate whose status is being queried.
#[derive(Debug, Clone)]
pub struct StatusRequest {
    /// SHA-256 of the issuer's subject name DER.
    pub issuer_name_hash: [u8; 32],
    /// SHA-256 of the issuer's public key bits.
    pub issuer_key_hash: [u8; 32],
    /// Serial number of the certificate, big-endian.
    pub serial: Vec<u8>,
    /// Responder URL from the certificate's authority-info-access
    /// extension, when present.
    pub responder_url: Option<String>,
}

impl StatusRequest {
    pub fn for_certificate(cert: &ParsedCertificate, issuer: &ParsedCertificate) -> Self {
        Self {
            issuer_name_hash: Sha256::digest(&issuer.subject_raw).into(),
            issuer_key_hash: Sha256::digest(&issuer.public_key_bits).into(),
            serial: cert.serial.clone(),
            responder_url: cert.ocsp_responder.clone(),
        }
    }
}

/// A status could not be obtained: connectivity failure, timeout, missing
/// responder URL, or an unparseable response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct StatusError(pub String);

/// Source of certificate statuses. The default implementation talks OCSP
/// over HTTP; tests inject deterministic providers.
pub trait RevocationStatusProvider: Send + Sync {
    fn status(&self, request: &StatusRequest) -> Result<CertStatus, StatusError>;
}

/// What to do when a status cannot be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Attach a warning to the successful result. Best-effort posture.
    #[default]
    SoftWarn,
    /// Fail the verification.
    HardFail,
}

/// Construction-time policy for online revocation checking.
#[derive(Debug, Clone)]
pub struct OnlineCheckPolicy {
    pub enabled: bool,
    pub failure_mode: FailureMode,
    /// Timeout for a single status fetch; the only blocking step in a
    /// verification.
    pub timeout: Duration,
}

impl Default for OnlineCheckPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            failure_mode: FailureMode::SoftWarn,
            timeout: Duration::from_secs(5),
        }
    }
}

type CacheKey = ([u8; 32], Vec<u8>);
type CacheSlot = Arc<Mutex<Option<CertStatus>>>;

/// Process-lifetime status cache keyed by (issuer key hash, serial).
///
/// The outer map lock is held only to look up or insert a slot; the fetch
/// itself runs under the per-key slot lock.
struct StatusCache {
    slots: RwLock<HashMap<CacheKey, CacheSlot>>,
    capacity: usize,
}

impl StatusCache {
    fn new(capacity: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    fn slot(&self, key: &CacheKey) -> Option<CacheSlot> {
        if let Some(slot) = self.slots.read().get(key) {
            return Some(slot.clone());
        }
        let mut slots = self.slots.write();
        if slots.len() >= self.capacity && !slots.contains_key(key) {
            return None;
        }
        Some(slots.entry(key.clone()).or_default().clone())
    }
}

/// Checks chain certificates against a status provider, with caching and
/// the configured failure policy.
pub struct RevocationChecker {
    provider: Arc<dyn RevocationStatusProvider>,
    policy: OnlineCheckPolicy,
    cache: StatusCache,
}

impl std::fmt::Debug for RevocationChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationChecker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RevocationChecker {
    pub fn new(provider: Arc<dyn RevocationStatusProvider>, policy: OnlineCheckPolicy) -> Self {
        Self {
            provider,
            policy,
            cache: StatusCache::new(CACHE_CAPACITY),
        }
    }

    /// Build the default HTTP-backed checker.
    #[cfg(feature = "online-checks")]
    pub fn http(policy: OnlineCheckPolicy) -> Result<Self, StatusError> {
        let provider = ocsp::OcspStatusProvider::new(policy.timeout)?;
        Ok(Self::new(Arc::new(provider), policy))
    }

    /// Check every certificate whose issuer is present in the chain
    /// (leaf-first order). Returns the warnings to attach to a successful
    /// verification.
    pub fn check_chain(
        &self,
        chain: &[ParsedCertificate],
    ) -> Result<Vec<VerificationWarning>, VerificationError> {
        let mut warnings = Vec::new();
        for pair in chain.windows(2) {
            let request = StatusRequest::for_certificate(&pair[0], &pair[1]);
            let serial = hex::encode(&request.serial);
            match self.cached_status(&request) {
                Ok(CertStatus::Good) => {}
                Ok(CertStatus::Revoked) => {
                    return Err(VerificationError::InvalidCertificateChain {
                        kind: ChainFailure::RevokedCertificate,
                        reason: format!("certificate serial {serial} reported revoked"),
                    });
                }
                Ok(CertStatus::Unknown) => {
                    self.unavailable(&mut warnings, serial, "status unknown to the authority")?;
                }
                Err(StatusError(reason)) => {
                    self.unavailable(&mut warnings, serial, &reason)?;
                }
            }
        }
        Ok(warnings)
    }

    fn unavailable(
        &self,
        warnings: &mut Vec<VerificationWarning>,
        serial: String,
        reason: &str,
    ) -> Result<(), VerificationError> {
        match self.policy.failure_mode {
            FailureMode::SoftWarn => {
                warn!(serial = %serial, reason = %reason, "revocation status unavailable");
                warnings.push(VerificationWarning::RevocationUnavailable {
                    serial,
                    reason: reason.to_owned(),
                });
                Ok(())
            }
            FailureMode::HardFail => Err(VerificationError::Internal {
                reason: format!("revocation status unavailable for serial {serial}: {reason}"),
            }),
        }
    }

    /// Definitive statuses (good/revoked) are cached; unknown statuses and
    /// fetch failures are not, so a later call may still succeed.
    fn cached_status(&self, request: &StatusRequest) -> Result<CertStatus, StatusError> {
        let key: CacheKey = (request.issuer_key_hash, request.serial.clone());
        let Some(slot) = self.cache.slot(&key) else {
            // Cache full: fetch without retaining.
            return self.provider.status(request);
        };

        let mut guard = slot.lock();
        if let Some(status) = *guard {
            return Ok(status);
        }
        let status = self.provider.status(request)?;
        if matches!(status, CertStatus::Good | CertStatus::Revoked) {
            *guard = Some(status);
        }
        Ok(status)
    }
}

#[cfg(feature = "online-checks")]
pub use ocsp::OcspStatusProvider;
