//! Decoded App Store Server Notification payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;

/// Decoded payload of a version 2 server notification.
///
/// Exactly one of `data`, `summary`, or `external_purchase_token` is
/// present, depending on the notification type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<Subtype>,

    /// Unique identifier of the notification; stable across retries.
    #[serde(rename = "notificationUUID", skip_serializing_if = "Option::is_none")]
    pub notification_uuid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signed_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_purchase_token: Option<ExternalPurchaseToken>,
}

/// App metadata and nested signed objects carried by most notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_version: Option<String>,

    /// Signed transaction, itself a compact JWS string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_transaction_info: Option<String>,

    /// Signed renewal info, itself a compact JWS string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_renewal_info: Option<String>,

    /// Subscription status at the time the notification was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption_request_reason: Option<String>,
}

/// Status of an auto-renewable subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    BillingRetry,
    BillingGracePeriod,
    Revoked,
    Unrecognized(i32),
}

impl From<i32> for SubscriptionStatus {
    fn from(value: i32) -> Self {
        match value {
            1 => SubscriptionStatus::Active,
            2 => SubscriptionStatus::Expired,
            3 => SubscriptionStatus::BillingRetry,
            4 => SubscriptionStatus::BillingGracePeriod,
            5 => SubscriptionStatus::Revoked,
            _ => SubscriptionStatus::Unrecognized(value),
        }
    }
}

impl From<SubscriptionStatus> for i32 {
    fn from(value: SubscriptionStatus) -> Self {
        match value {
            SubscriptionStatus::Active => 1,
            SubscriptionStatus::Expired => 2,
            SubscriptionStatus::BillingRetry => 3,
            SubscriptionStatus::BillingGracePeriod => 4,
            SubscriptionStatus::Revoked => 5,
            SubscriptionStatus::Unrecognized(raw) => raw,
        }
    }
}

/// Summary of a completed renewal-extension request, carried by
/// `RENEWAL_EXTENSION`/`SUMMARY` notifications instead of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront_country_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<i64>,
}

/// External purchase token, carried by `EXTERNAL_PURCHASE_TOKEN`
/// notifications instead of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalPurchaseToken {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_purchase_id: Option<String>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_creation_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_apple_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
}

impl ExternalPurchaseToken {
    /// Environment the token was created in. Sandbox tokens carry a
    /// `SANDBOX_` prefix on the external purchase identifier; everything
    /// else is Production.
    pub fn environment(&self) -> Environment {
        match &self.external_purchase_id {
            Some(id) if id.starts_with("SANDBOX_") => Environment::Sandbox,
            _ => Environment::Production,
        }
    }
}

/// Type of a version 2 server notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    Subscribed,
    DidChangeRenewalPref,
    DidChangeRenewalStatus,
    OfferRedeemed,
    DidRenew,
    Expired,
    DidFailToRenew,
    GracePeriodExpired,
    PriceIncrease,
    Refund,
    RefundDeclined,
    ConsumptionRequest,
    RenewalExtended,
    Revoke,
    Test,
    RenewalExtension,
    RefundReversed,
    ExternalPurchaseToken,
    OneTimeCharge,
    Unrecognized(String),
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::Subscribed => "SUBSCRIBED",
            NotificationType::DidChangeRenewalPref => "DID_CHANGE_RENEWAL_PREF",
            NotificationType::DidChangeRenewalStatus => "DID_CHANGE_RENEWAL_STATUS",
            NotificationType::OfferRedeemed => "OFFER_REDEEMED",
            NotificationType::DidRenew => "DID_RENEW",
            NotificationType::Expired => "EXPIRED",
            NotificationType::DidFailToRenew => "DID_FAIL_TO_RENEW",
            NotificationType::GracePeriodExpired => "GRACE_PERIOD_EXPIRED",
            NotificationType::PriceIncrease => "PRICE_INCREASE",
            NotificationType::Refund => "REFUND",
            NotificationType::RefundDeclined => "REFUND_DECLINED",
            NotificationType::ConsumptionRequest => "CONSUMPTION_REQUEST",
            NotificationType::RenewalExtended => "RENEWAL_EXTENDED",
            NotificationType::Revoke => "REVOKE",
            NotificationType::Test => "TEST",
            NotificationType::RenewalExtension => "RENEWAL_EXTENSION",
            NotificationType::RefundReversed => "REFUND_REVERSED",
            NotificationType::ExternalPurchaseToken => "EXTERNAL_PURCHASE_TOKEN",
            NotificationType::OneTimeCharge => "ONE_TIME_CHARGE",
            NotificationType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SUBSCRIBED" => NotificationType::Subscribed,
            "DID_CHANGE_RENEWAL_PREF" => NotificationType::DidChangeRenewalPref,
            "DID_CHANGE_RENEWAL_STATUS" => NotificationType::DidChangeRenewalStatus,
            "OFFER_REDEEMED" => NotificationType::OfferRedeemed,
            "DID_RENEW" => NotificationType::DidRenew,
            "EXPIRED" => NotificationType::Expired,
            "DID_FAIL_TO_RENEW" => NotificationType::DidFailToRenew,
            "GRACE_PERIOD_EXPIRED" => NotificationType::GracePeriodExpired,
            "PRICE_INCREASE" => NotificationType::PriceIncrease,
            "REFUND" => NotificationType::Refund,
            "REFUND_DECLINED" => NotificationType::RefundDeclined,
            "CONSUMPTION_REQUEST" => NotificationType::ConsumptionRequest,
            "RENEWAL_EXTENDED" => NotificationType::RenewalExtended,
            "REVOKE" => NotificationType::Revoke,
            "TEST" => NotificationType::Test,
            "RENEWAL_EXTENSION" => NotificationType::RenewalExtension,
            "REFUND_REVERSED" => NotificationType::RefundReversed,
            "EXTERNAL_PURCHASE_TOKEN" => NotificationType::ExternalPurchaseToken,
            "ONE_TIME_CHARGE" => NotificationType::OneTimeCharge,
            _ => NotificationType::Unrecognized(value),
        }
    }
}

impl From<NotificationType> for String {
    fn from(value: NotificationType) -> Self {
        value.as_str().to_owned()
    }
}

/// Qualifier refining the notification type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subtype {
    InitialBuy,
    Resubscribe,
    Downgrade,
    Upgrade,
    AutoRenewEnabled,
    AutoRenewDisabled,
    Voluntary,
    BillingRetry,
    PriceIncrease,
    GracePeriod,
    Pending,
    Accepted,
    BillingRecovery,
    ProductNotForSale,
    Summary,
    Failure,
    Unreported,
    Unrecognized(String),
}

impl Subtype {
    pub fn as_str(&self) -> &str {
        match self {
            Subtype::InitialBuy => "INITIAL_BUY",
            Subtype::Resubscribe => "RESUBSCRIBE",
            Subtype::Downgrade => "DOWNGRADE",
            Subtype::Upgrade => "UPGRADE",
            Subtype::AutoRenewEnabled => "AUTO_RENEW_ENABLED",
            Subtype::AutoRenewDisabled => "AUTO_RENEW_DISABLED",
            Subtype::Voluntary => "VOLUNTARY",
            Subtype::BillingRetry => "BILLING_RETRY",
            Subtype::PriceIncrease => "PRICE_INCREASE",
            Subtype::GracePeriod => "GRACE_PERIOD",
            Subtype::Pending => "PENDING",
            Subtype::Accepted => "ACCEPTED",
            Subtype::BillingRecovery => "BILLING_RECOVERY",
            Subtype::ProductNotForSale => "PRODUCT_NOT_FOR_SALE",
            Subtype::Summary => "SUMMARY",
            Subtype::Failure => "FAILURE",
            Subtype::Unreported => "UNREPORTED",
            Subtype::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Subtype {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INITIAL_BUY" => Subtype::InitialBuy,
            "RESUBSCRIBE" => Subtype::Resubscribe,
            "DOWNGRADE" => Subtype::Downgrade,
            "UPGRADE" => Subtype::Upgrade,
            "AUTO_RENEW_ENABLED" => Subtype::AutoRenewEnabled,
            "AUTO_RENEW_DISABLED" => Subtype::AutoRenewDisabled,
            "VOLUNTARY" => Subtype::Voluntary,
            "BILLING_RETRY" => Subtype::BillingRetry,
            "PRICE_INCREASE" => Subtype::PriceIncrease,
            "GRACE_PERIOD" => Subtype::GracePeriod,
            "PENDING" => Subtype::Pending,
            "ACCEPTED" => Subtype::Accepted,
            "BILLING_RECOVERY" => Subtype::BillingRecovery,
            "PRODUCT_NOT_FOR_SALE" => Subtype::ProductNotForSale,
            "SUMMARY" => Subtype::Summary,
            "FAILURE" => Subtype::Failure,
            "UNREPORTED" => Subtype::Unreported,
            _ => Subtype::Unrecognized(value),
        }
    }
}

impl From<Subtype> for String {
    fn from(value: Subtype) -> Self {
        value.as_str().to_owned()
    }
}
