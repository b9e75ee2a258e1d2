//! Pipeline orchestration and construction-time configuration.
//!
//! [`SignedDataVerifier`] is built once with immutable configuration and
//! reused for the process lifetime. Each call independently replays the
//! full pipeline: decode, extract chain, verify chain, verify signature,
//! validate payload. No call depends on a previous one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use appstore_models::{
    AppTransaction, Environment, NotificationPayload, RenewalInfo, TransactionInfo,
};

use crate::chain::{self, ChainVerifier};
use crate::error::{ConfigError, VerificationError, VerificationWarning};
use crate::jws;
use crate::payload::{self, IdentityClaims};
use crate::revocation::{OnlineCheckPolicy, RevocationChecker, RevocationStatusProvider};
use crate::signature;

/// How a successful verification established trust in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBasis {
    /// The certificate chain was validated against a pinned anchor and
    /// the signature verified with the leaf key.
    ChainVerified,
    /// Developer-local environment (Xcode / LocalTesting): structural and
    /// identity checks only, no chain of trust exists.
    LocallyTrusted,
}

/// A successfully verified and decoded payload.
#[derive(Debug, Clone)]
pub struct Verified<T> {
    pub payload: T,
    pub trust: TrustBasis,
    /// Non-fatal findings, e.g. an unreachable revocation responder.
    pub warnings: Vec<VerificationWarning>,
}

/// Verifies signed payloads against immutable, per-instance configuration.
///
/// Safe for concurrent use from multiple threads; no call blocks on
/// another except inside the bounded per-key revocation cache.
#[derive(Debug)]
pub struct SignedDataVerifier {
    chain_verifier: ChainVerifier,
    bundle_id: String,
    app_apple_id: Option<i64>,
    environment: Environment,
    revocation: Option<RevocationChecker>,
    verification_time: Option<DateTime<Utc>>,
}

impl SignedDataVerifier {
    pub fn builder() -> SignedDataVerifierBuilder {
        SignedDataVerifierBuilder::default()
    }

    /// Verify a signed transaction and decode its payload.
    pub fn verify_and_decode_transaction(
        &self,
        signed_transaction: &str,
    ) -> Result<Verified<TransactionInfo>, VerificationError> {
        let outcome = self.verify_signed_payload(signed_transaction)?;
        let info: TransactionInfo = payload::decode(&outcome.payload)?;
        self.check_identity(&payload::transaction_claims(&info))?;
        Ok(outcome.with_payload(info))
    }

    /// Verify signed renewal info and decode its payload.
    pub fn verify_and_decode_renewal_info(
        &self,
        signed_renewal_info: &str,
    ) -> Result<Verified<RenewalInfo>, VerificationError> {
        let outcome = self.verify_signed_payload(signed_renewal_info)?;
        let info: RenewalInfo = payload::decode(&outcome.payload)?;
        self.check_identity(&payload::renewal_claims(&info))?;
        Ok(outcome.with_payload(info))
    }

    /// Verify a signed server notification and decode its payload.
    pub fn verify_and_decode_notification(
        &self,
        signed_payload: &str,
    ) -> Result<Verified<NotificationPayload>, VerificationError> {
        let outcome = self.verify_signed_payload(signed_payload)?;
        let notification: NotificationPayload = payload::decode(&outcome.payload)?;
        self.check_identity(&payload::notification_claims(&notification))?;
        Ok(outcome.with_payload(notification))
    }

    /// Verify a signed app transaction and decode its payload.
    pub fn verify_and_decode_app_transaction(
        &self,
        signed_app_transaction: &str,
    ) -> Result<Verified<AppTransaction>, VerificationError> {
        let outcome = self.verify_signed_payload(signed_app_transaction)?;
        let app: AppTransaction = payload::decode(&outcome.payload)?;
        self.check_identity(&payload::app_transaction_claims(&app))?;
        Ok(outcome.with_payload(app))
    }

    fn now(&self) -> DateTime<Utc> {
        self.verification_time.unwrap_or_else(Utc::now)
    }

    fn check_identity(&self, claims: &IdentityClaims) -> Result<(), VerificationError> {
        payload::check_identity(
            claims,
            &self.bundle_id,
            self.app_apple_id,
            &self.environment,
        )
    }

    /// Run decode -> chain -> revocation -> signature and hand back the raw
    /// payload bytes for kind-specific decoding.
    fn verify_signed_payload(&self, raw: &str) -> Result<RawOutcome, VerificationError> {
        let decoded = jws::decode(raw)?;

        // No production signing infrastructure exists in developer-local
        // environments; structural decoding and identity checks still run.
        if self.environment.is_local() {
            debug!(environment = %self.environment, "skipping chain verification for local environment");
            return Ok(RawOutcome {
                payload: decoded.payload,
                trust: TrustBasis::LocallyTrusted,
                warnings: Vec::new(),
            });
        }

        let certs = chain::extract_chain(&decoded.certificate_chain)?;
        let at = self.now();
        self.chain_verifier.verify(&certs, at)?;
        debug!(chain_len = certs.len(), "certificate chain accepted");

        let warnings = match &self.revocation {
            Some(checker) => checker.check_chain(&certs)?,
            None => Vec::new(),
        };

        signature::verify(
            &certs[0],
            &decoded.algorithm,
            &decoded.header_segment,
            &decoded.payload_segment,
            &decoded.signature,
        )?;
        debug!("signature verified");

        Ok(RawOutcome {
            payload: decoded.payload,
            trust: TrustBasis::ChainVerified,
            warnings,
        })
    }
}

struct RawOutcome {
    payload: Vec<u8>,
    trust: TrustBasis,
    warnings: Vec<VerificationWarning>,
}

impl RawOutcome {
    fn with_payload<T>(self, payload: T) -> Verified<T> {
        Verified {
            payload,
            trust: self.trust,
            warnings: self.warnings,
        }
    }
}

/// Builder for [`SignedDataVerifier`]. Configuration is validated eagerly
/// in [`build`](Self::build); a misconfigured verifier is never
/// constructed.
#[derive(Default)]
pub struct SignedDataVerifierBuilder {
    root_certificates: Vec<Vec<u8>>,
    bundle_id: Option<String>,
    app_apple_id: Option<i64>,
    environment: Option<Environment>,
    online_checks: OnlineCheckPolicy,
    status_provider: Option<Arc<dyn RevocationStatusProvider>>,
    verification_time: Option<DateTime<Utc>>,
}

impl SignedDataVerifierBuilder {
    /// Pinned root certificates (DER) of the issuing authority.
    pub fn root_certificates(mut self, root_certificates: Vec<Vec<u8>>) -> Self {
        self.root_certificates = root_certificates;
        self
    }

    /// Bundle identifier every payload must carry.
    pub fn bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    /// App identifier checked in Production payloads.
    pub fn app_apple_id(mut self, app_apple_id: i64) -> Self {
        self.app_apple_id = Some(app_apple_id);
        self
    }

    /// Environment payloads are expected to originate from.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Online revocation checking policy; disabled by default.
    pub fn online_checks(mut self, policy: OnlineCheckPolicy) -> Self {
        self.online_checks = policy;
        self
    }

    /// Replace the HTTP status provider, e.g. with a deterministic one in
    /// tests.
    pub fn status_provider(mut self, provider: Arc<dyn RevocationStatusProvider>) -> Self {
        self.status_provider = Some(provider);
        self
    }

    /// Fix the verification instant instead of using the current time.
    /// Intended for deterministic tests of certificate validity windows.
    pub fn verification_time(mut self, at: DateTime<Utc>) -> Self {
        self.verification_time = Some(at);
        self
    }

    pub fn build(self) -> Result<SignedDataVerifier, ConfigError> {
        let environment = self.environment.ok_or(ConfigError::MissingEnvironment)?;
        if let Environment::Unrecognized(value) = &environment {
            return Err(ConfigError::UnrecognizedEnvironment {
                value: value.clone(),
            });
        }

        let bundle_id = self.bundle_id.ok_or(ConfigError::MissingBundleId)?;
        if bundle_id.is_empty() {
            return Err(ConfigError::MissingBundleId);
        }

        if environment == Environment::Production && self.app_apple_id.is_none() {
            return Err(ConfigError::MissingAppAppleId);
        }

        let chain_verifier = ChainVerifier::new(&self.root_certificates)?;

        let revocation = if self.online_checks.enabled {
            Some(match self.status_provider {
                Some(provider) => RevocationChecker::new(provider, self.online_checks),
                None => Self::default_checker(self.online_checks)?,
            })
        } else {
            None
        };

        Ok(SignedDataVerifier {
            chain_verifier,
            bundle_id,
            app_apple_id: self.app_apple_id,
            environment,
            revocation,
            verification_time: self.verification_time,
        })
    }

    #[cfg(feature = "online-checks")]
    fn default_checker(policy: OnlineCheckPolicy) -> Result<RevocationChecker, ConfigError> {
        RevocationChecker::http(policy).map_err(|e| ConfigError::StatusProvider {
            reason: e.to_string(),
        })
    }

    #[cfg(not(feature = "online-checks"))]
    fn default_checker(_policy: OnlineCheckPolicy) -> Result<RevocationChecker, ConfigError> {
        Err(ConfigError::StatusProvider {
            reason: "online checks require the `online-checks` feature or an explicit provider"
                .to_owned(),
        })
    }
}
