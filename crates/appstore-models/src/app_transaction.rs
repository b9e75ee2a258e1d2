//! Decoded app transaction payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;

/// Decoded payload of a signed app transaction: proof of the app's own
/// purchase/download, as opposed to an in-app purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppTransaction {
    /// Environment the receipt was generated in. Wire name is
    /// `receiptType` for historical reasons.
    #[serde(rename = "receiptType", skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<Environment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_external_identifier: Option<i64>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub receipt_creation_date: Option<DateTime<Utc>>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_purchase_date: Option<DateTime<Utc>>,

    /// Application version the customer originally purchased.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_application_version: Option<String>,

    /// Base64 device verification value; checked on device, opaque here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_verification: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_verification_nonce: Option<Uuid>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub preorder_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_platform: Option<PurchasePlatform>,
}

/// Platform the app was originally purchased on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurchasePlatform {
    Ios,
    MacOs,
    TvOs,
    VisionOs,
    Unrecognized(String),
}

impl PurchasePlatform {
    pub fn as_str(&self) -> &str {
        match self {
            PurchasePlatform::Ios => "iOS",
            PurchasePlatform::MacOs => "macOS",
            PurchasePlatform::TvOs => "tvOS",
            PurchasePlatform::VisionOs => "visionOS",
            PurchasePlatform::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for PurchasePlatform {
    fn from(value: String) -> Self {
        match value.as_str() {
            "iOS" => PurchasePlatform::Ios,
            "macOS" => PurchasePlatform::MacOs,
            "tvOS" => PurchasePlatform::TvOs,
            "visionOS" => PurchasePlatform::VisionOs,
            _ => PurchasePlatform::Unrecognized(value),
        }
    }
}

impl From<PurchasePlatform> for String {
    fn from(value: PurchasePlatform) -> Self {
        value.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_payload() {
        let app: AppTransaction = serde_json::from_value(serde_json::json!({
            "receiptType": "Production",
            "appAppleId": 41234567890i64,
            "bundleId": "com.example.app",
            "applicationVersion": "1.4.2",
            "originalApplicationVersion": "1.0.0",
            "receiptCreationDate": 1698148900000i64,
            "originalPlatform": "iOS"
        }))
        .unwrap();

        assert_eq!(app.receipt_type, Some(Environment::Production));
        assert_eq!(app.original_platform, Some(PurchasePlatform::Ios));
        assert_eq!(app.bundle_id.as_deref(), Some("com.example.app"));
    }

    #[test]
    fn unknown_platform_is_preserved() {
        let app: AppTransaction = serde_json::from_value(serde_json::json!({
            "originalPlatform": "watchOS"
        }))
        .unwrap();

        assert_eq!(
            app.original_platform,
            Some(PurchasePlatform::Unrecognized("watchOS".to_owned()))
        );
    }
}
