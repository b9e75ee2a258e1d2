//! Verification failure taxonomy.
//!
//! Every failure is terminal for the call that produced it: the verifier
//! never retries and never returns partially populated payload data. All
//! checks are fail-closed except the online revocation check, whose
//! connectivity failures surface as [`VerificationWarning`]s under the
//! default policy.

use appstore_models::Environment;

/// Reason a certificate chain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFailure {
    /// A certificate's validity window does not contain the verification
    /// instant.
    ExpiredCertificate,
    /// The chain does not terminate at a pinned trust anchor.
    UntrustedRoot,
    /// Adjacent certificates do not link: issuer/subject mismatch, a
    /// signature that does not verify against the issuer key, or a
    /// basic-constraints violation.
    BrokenChain,
    /// The online status check reported the certificate revoked.
    RevokedCertificate,
}

impl std::fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Typed verification failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerificationError {
    #[error("invalid JWS format: {reason}")]
    InvalidJwsFormat { reason: String },

    #[error("malformed certificate: {reason}")]
    MalformedCertificate { reason: String },

    #[error("invalid certificate chain ({kind}): {reason}")]
    InvalidCertificateChain { kind: ChainFailure, reason: String },

    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("bundle id mismatch: expected {expected:?}, payload carries {found:?}")]
    BundleIdMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("app identifier mismatch: expected {expected}, payload carries {found:?}")]
    AppAppleIdMismatch { expected: i64, found: Option<i64> },

    #[error("environment mismatch: expected {expected}, payload claims {found:?}")]
    EnvironmentMismatch {
        expected: Environment,
        found: Option<Environment>,
    },

    #[error("internal verification failure: {reason}")]
    Internal { reason: String },
}

/// Non-fatal finding attached to an otherwise successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationWarning {
    /// The online revocation status of a certificate could not be
    /// determined (connectivity failure, timeout, or no responder URL).
    RevocationUnavailable {
        /// Hex-encoded serial number of the certificate in question.
        serial: String,
        reason: String,
    },
}

/// Rejected construction-time configuration.
///
/// Configuration is validated eagerly so a misconfigured verifier is never
/// instantiated.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one trust anchor certificate is required")]
    NoTrustAnchors,

    #[error("trust anchor #{index} is not a valid DER certificate: {reason}")]
    MalformedTrustAnchor { index: usize, reason: String },

    #[error("an expected bundle id is required")]
    MissingBundleId,

    #[error("an expected environment is required")]
    MissingEnvironment,

    #[error("expected environment must be a recognized value, got {value:?}")]
    UnrecognizedEnvironment { value: String },

    #[error("an app identifier is required when the expected environment is Production")]
    MissingAppAppleId,

    #[error("revocation status provider unavailable: {reason}")]
    StatusProvider { reason: String },
}
