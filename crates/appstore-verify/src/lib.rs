//! Verification engine for App Store signed data.
//!
//! Validates compact JWS objects describing transactions, subscription
//! renewal state, server notifications, and app transactions. Each
//! verification runs a strictly linear pipeline: decode the JWS,
//! reconstruct the certificate chain from the header, validate the chain
//! against pinned trust anchors, verify the ES256 signature with the leaf
//! key, then decode the payload and enforce the configured identity. No
//! stage's output is trusted before the previous stage succeeds, and the
//! payload is never consulted for trust decisions before the signature is
//! verified.
//!
//! ```no_run
//! use appstore_verify::{models::Environment, SignedDataVerifier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let root_der: Vec<u8> = Vec::new();
//! # let signed_transaction = "";
//! let verifier = SignedDataVerifier::builder()
//!     .root_certificates(vec![root_der])
//!     .bundle_id("com.example.app")
//!     .environment(Environment::Sandbox)
//!     .build()?;
//!
//! let verified = verifier.verify_and_decode_transaction(signed_transaction)?;
//! println!("{:?}", verified.payload.transaction_id);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod error;
pub mod jws;
pub mod payload;
pub mod revocation;
pub mod signature;
pub mod verifier;

// Convenience re-exports
pub use error::{ChainFailure, ConfigError, VerificationError, VerificationWarning};
#[cfg(feature = "online-checks")]
pub use revocation::OcspStatusProvider;
pub use revocation::{
    CertStatus, FailureMode, OnlineCheckPolicy, RevocationStatusProvider, StatusError,
    StatusRequest,
};
pub use verifier::{SignedDataVerifier, SignedDataVerifierBuilder, TrustBasis, Verified};

/// Payload model types, re-exported for downstream convenience.
pub use appstore_models as models;
