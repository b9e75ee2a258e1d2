//! Payload decoding and identity validation.
//!
//! Only reached after the signature stage has succeeded (or, for
//! developer-local environments, after structural decoding). Decodes the
//! payload JSON into the caller-requested type and enforces the verifier's
//! configured identity: bundle identifier, app identifier, and
//! environment.

use appstore_models::{
    AppTransaction, Environment, NotificationPayload, RenewalInfo, TransactionInfo,
};
use serde::de::DeserializeOwned;

use crate::error::VerificationError;

/// Identity fields extracted from a decoded payload.
///
/// Which JSON object they come from depends on the payload kind; the
/// checks applied to them do not.
#[derive(Debug, Clone, Default)]
pub struct IdentityClaims {
    pub bundle_id: Option<String>,
    pub app_apple_id: Option<i64>,
    pub environment: Option<Environment>,
}

/// Decode a payload segment into the requested type.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, VerificationError> {
    serde_json::from_slice(payload).map_err(|e| VerificationError::InvalidJwsFormat {
        reason: format!("payload is not a valid payload object: {e}"),
    })
}

/// Enforce the configured identity against the payload's claims.
///
/// The app identifier is only checked in Production, and only when the
/// payload carries one; the field is legitimately absent elsewhere.
pub fn check_identity(
    claims: &IdentityClaims,
    expected_bundle_id: &str,
    expected_app_apple_id: Option<i64>,
    expected_environment: &Environment,
) -> Result<(), VerificationError> {
    if claims.bundle_id.as_deref() != Some(expected_bundle_id) {
        return Err(VerificationError::BundleIdMismatch {
            expected: expected_bundle_id.to_owned(),
            found: claims.bundle_id.clone(),
        });
    }

    if *expected_environment == Environment::Production {
        if let (Some(expected), Some(found)) = (expected_app_apple_id, claims.app_apple_id) {
            if expected != found {
                return Err(VerificationError::AppAppleIdMismatch {
                    expected,
                    found: Some(found),
                });
            }
        }
    }

    if claims.environment.as_ref() != Some(expected_environment) {
        return Err(VerificationError::EnvironmentMismatch {
            expected: expected_environment.clone(),
            found: claims.environment.clone(),
        });
    }

    Ok(())
}

pub fn transaction_claims(info: &TransactionInfo) -> IdentityClaims {
    IdentityClaims {
        bundle_id: info.bundle_id.clone(),
        app_apple_id: None,
        environment: info.environment.clone(),
    }
}

pub fn renewal_claims(info: &RenewalInfo) -> IdentityClaims {
    IdentityClaims {
        bundle_id: info.bundle_id.clone(),
        app_apple_id: None,
        environment: info.environment.clone(),
    }
}

/// Notifications carry their identity in exactly one of three places:
/// `data`, `summary`, or `externalPurchaseToken`.
pub fn notification_claims(payload: &NotificationPayload) -> IdentityClaims {
    if let Some(data) = &payload.data {
        return IdentityClaims {
            bundle_id: data.bundle_id.clone(),
            app_apple_id: data.app_apple_id,
            environment: data.environment.clone(),
        };
    }
    if let Some(summary) = &payload.summary {
        return IdentityClaims {
            bundle_id: summary.bundle_id.clone(),
            app_apple_id: summary.app_apple_id,
            environment: summary.environment.clone(),
        };
    }
    if let Some(token) = &payload.external_purchase_token {
        return IdentityClaims {
            bundle_id: token.bundle_id.clone(),
            app_apple_id: token.app_apple_id,
            environment: Some(token.environment()),
        };
    }
    IdentityClaims::default()
}

pub fn app_transaction_claims(app: &AppTransaction) -> IdentityClaims {
    IdentityClaims {
        bundle_id: app.bundle_id.clone(),
        app_apple_id: app.app_apple_id,
        environment: app.receipt_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(
        bundle_id: Option<&str>,
        app_apple_id: Option<i64>,
        environment: Option<Environment>,
    ) -> IdentityClaims {
        IdentityClaims {
            bundle_id: bundle_id.map(str::to_owned),
            app_apple_id,
            environment,
        }
    }

    #[test]
    fn accepts_matching_identity() {
        let claims = claims(Some("com.example.app"), None, Some(Environment::Sandbox));
        check_identity(&claims, "com.example.app", None, &Environment::Sandbox).unwrap();
    }

    #[test]
    fn rejects_bundle_mismatch_case_sensitively() {
        let claims = claims(Some("com.example.App"), None, Some(Environment::Sandbox));
        let result = check_identity(&claims, "com.example.app", None, &Environment::Sandbox);
        assert!(matches!(
            result,
            Err(VerificationError::BundleIdMismatch { .. })
        ));
    }

    #[test]
    fn rejects_missing_bundle_id() {
        let claims = claims(None, None, Some(Environment::Sandbox));
        assert!(matches!(
            check_identity(&claims, "com.example.app", None, &Environment::Sandbox),
            Err(VerificationError::BundleIdMismatch { found: None, .. })
        ));
    }

    #[test]
    fn app_identifier_checked_only_in_production() {
        let mismatched = claims(
            Some("com.example.app"),
            Some(99),
            Some(Environment::Sandbox),
        );
        // Sandbox: the mismatch is ignored.
        check_identity(&mismatched, "com.example.app", Some(1), &Environment::Sandbox).unwrap();

        let mismatched = claims(
            Some("com.example.app"),
            Some(99),
            Some(Environment::Production),
        );
        assert!(matches!(
            check_identity(
                &mismatched,
                "com.example.app",
                Some(1),
                &Environment::Production
            ),
            Err(VerificationError::AppAppleIdMismatch {
                expected: 1,
                found: Some(99)
            })
        ));
    }

    #[test]
    fn absent_app_identifier_is_accepted_in_production() {
        let claims = claims(Some("com.example.app"), None, Some(Environment::Production));
        check_identity(&claims, "com.example.app", Some(1), &Environment::Production).unwrap();
    }

    #[test]
    fn rejects_environment_mismatch() {
        let claims = claims(Some("com.example.app"), None, Some(Environment::Sandbox));
        let result = check_identity(&claims, "com.example.app", None, &Environment::Production);
        assert!(matches!(
            result,
            Err(VerificationError::EnvironmentMismatch { .. })
        ));
    }

    #[test]
    fn unrecognized_environment_never_matches() {
        let claims = claims(
            Some("com.example.app"),
            None,
            Some(Environment::Unrecognized("Staging".to_owned())),
        );
        assert!(matches!(
            check_identity(&claims, "com.example.app", None, &Environment::Sandbox),
            Err(VerificationError::EnvironmentMismatch { .. })
        ));
    }

    #[test]
    fn notification_claims_prefer_data_then_summary_then_token() {
        use appstore_models::{ExternalPurchaseToken, NotificationData, Summary};

        let mut payload = NotificationPayload {
            data: Some(NotificationData {
                bundle_id: Some("from-data".to_owned()),
                environment: Some(Environment::Sandbox),
                ..Default::default()
            }),
            summary: Some(Summary {
                bundle_id: Some("from-summary".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            notification_claims(&payload).bundle_id.as_deref(),
            Some("from-data")
        );

        payload.data = None;
        assert_eq!(
            notification_claims(&payload).bundle_id.as_deref(),
            Some("from-summary")
        );

        payload.summary = None;
        payload.external_purchase_token = Some(ExternalPurchaseToken {
            external_purchase_id: Some("SANDBOX_1".to_owned()),
            bundle_id: Some("from-token".to_owned()),
            ..Default::default()
        });
        let claims = notification_claims(&payload);
        assert_eq!(claims.bundle_id.as_deref(), Some("from-token"));
        assert_eq!(claims.environment, Some(Environment::Sandbox));
    }
}
