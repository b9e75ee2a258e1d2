//! Decoded subscription renewal info payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;

/// Decoded payload of signed renewal info for an auto-renewable
/// subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RenewalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_intent: Option<ExpirationIntent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,

    /// Product the subscription will renew to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_product_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_renew_status: Option<AutoRenewStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_in_billing_retry_period: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_increase_status: Option<PriceIncreaseStatus>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub grace_period_expires_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<crate::transaction::OfferType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signed_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    /// Bundle identifier of the app the subscription belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub recent_subscription_start_date: Option<DateTime<Utc>>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub renewal_date: Option<DateTime<Utc>>,

    /// Renewal price in milliunits of the currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_price: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_discount_type: Option<crate::transaction::OfferDiscountType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_account_token: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_period: Option<String>,

    /// Win-back offer identifiers the customer is eligible for, in
    /// decreasing priority order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_win_back_offer_ids: Option<Vec<String>>,
}

/// Whether a subscription renews automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum AutoRenewStatus {
    Off,
    On,
    Unrecognized(i32),
}

impl From<i32> for AutoRenewStatus {
    fn from(value: i32) -> Self {
        match value {
            0 => AutoRenewStatus::Off,
            1 => AutoRenewStatus::On,
            _ => AutoRenewStatus::Unrecognized(value),
        }
    }
}

impl From<AutoRenewStatus> for i32 {
    fn from(value: AutoRenewStatus) -> Self {
        match value {
            AutoRenewStatus::Off => 0,
            AutoRenewStatus::On => 1,
            AutoRenewStatus::Unrecognized(raw) => raw,
        }
    }
}

/// Why a subscription expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ExpirationIntent {
    CustomerCancelled,
    BillingError,
    DidNotConsentToPriceIncrease,
    ProductNotAvailable,
    Other,
    Unrecognized(i32),
}

impl From<i32> for ExpirationIntent {
    fn from(value: i32) -> Self {
        match value {
            1 => ExpirationIntent::CustomerCancelled,
            2 => ExpirationIntent::BillingError,
            3 => ExpirationIntent::DidNotConsentToPriceIncrease,
            4 => ExpirationIntent::ProductNotAvailable,
            5 => ExpirationIntent::Other,
            _ => ExpirationIntent::Unrecognized(value),
        }
    }
}

impl From<ExpirationIntent> for i32 {
    fn from(value: ExpirationIntent) -> Self {
        match value {
            ExpirationIntent::CustomerCancelled => 1,
            ExpirationIntent::BillingError => 2,
            ExpirationIntent::DidNotConsentToPriceIncrease => 3,
            ExpirationIntent::ProductNotAvailable => 4,
            ExpirationIntent::Other => 5,
            ExpirationIntent::Unrecognized(raw) => raw,
        }
    }
}

/// Customer response to a subscription price increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum PriceIncreaseStatus {
    NotResponded,
    Consented,
    Unrecognized(i32),
}

impl From<i32> for PriceIncreaseStatus {
    fn from(value: i32) -> Self {
        match value {
            0 => PriceIncreaseStatus::NotResponded,
            1 => PriceIncreaseStatus::Consented,
            _ => PriceIncreaseStatus::Unrecognized(value),
        }
    }
}

impl From<PriceIncreaseStatus> for i32 {
    fn from(value: PriceIncreaseStatus) -> Self {
        match value {
            PriceIncreaseStatus::NotResponded => 0,
            PriceIncreaseStatus::Consented => 1,
            PriceIncreaseStatus::Unrecognized(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_payload() {
        let info: RenewalInfo = serde_json::from_value(serde_json::json!({
            "originalTransactionId": "2000000000000001",
            "autoRenewProductId": "com.example.app.premium.yearly",
            "productId": "com.example.app.premium.monthly",
            "autoRenewStatus": 1,
            "expirationIntent": 2,
            "environment": "Production",
            "bundleId": "com.example.app",
            "renewalPrice": 10990
        }))
        .unwrap();

        assert_eq!(info.auto_renew_status, Some(AutoRenewStatus::On));
        assert_eq!(info.expiration_intent, Some(ExpirationIntent::BillingError));
        assert_eq!(info.environment, Some(Environment::Production));
        assert_eq!(info.bundle_id.as_deref(), Some("com.example.app"));
    }

    #[test]
    fn unknown_status_decodes_to_unrecognized() {
        let info: RenewalInfo = serde_json::from_value(serde_json::json!({
            "autoRenewStatus": 3,
            "priceIncreaseStatus": 9
        }))
        .unwrap();

        assert_eq!(info.auto_renew_status, Some(AutoRenewStatus::Unrecognized(3)));
        assert_eq!(
            info.price_increase_status,
            Some(PriceIncreaseStatus::Unrecognized(9))
        );
    }
}
