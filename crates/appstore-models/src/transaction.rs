//! Decoded in-app transaction payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;

/// Decoded payload of a signed transaction.
///
/// Every field is optional on the wire; identity checks on missing fields
/// are the verifier's concern, not the decoder's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionInfo {
    /// Original transaction identifier of a purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<String>,

    /// Unique identifier for this transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Subscription purchase event identifier across devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_order_line_item_id: Option<String>,

    /// Bundle identifier of the app the transaction belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    /// Product identifier of the purchased item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Subscription group the product belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_group_identifier: Option<String>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchase_date: Option<DateTime<Utc>>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_purchase_date: Option<DateTime<Utc>>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,

    /// Product type of the transaction.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,

    /// UUID the app optionally attaches to link a purchase to an account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_account_token: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_app_ownership_type: Option<InAppOwnershipType>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signed_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<RevocationReason>,

    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub revocation_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_upgraded: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<OfferType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    /// Storefront country code (ISO alpha-3) of the purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reason: Option<TransactionReason>,

    /// Price in milliunits of the currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,

    /// ISO 4217 currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_discount_type: Option<OfferDiscountType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_period: Option<String>,
}

/// Product type of an in-app purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    AutoRenewableSubscription,
    NonConsumable,
    Consumable,
    NonRenewingSubscription,
    Unrecognized(String),
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            ProductType::AutoRenewableSubscription => "Auto-Renewable Subscription",
            ProductType::NonConsumable => "Non-Consumable",
            ProductType::Consumable => "Consumable",
            ProductType::NonRenewingSubscription => "Non-Renewing Subscription",
            ProductType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Auto-Renewable Subscription" => ProductType::AutoRenewableSubscription,
            "Non-Consumable" => ProductType::NonConsumable,
            "Consumable" => ProductType::Consumable,
            "Non-Renewing Subscription" => ProductType::NonRenewingSubscription,
            _ => ProductType::Unrecognized(value),
        }
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.as_str().to_owned()
    }
}

/// Whether the transaction was purchased directly or shared via Family
/// Sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InAppOwnershipType {
    Purchased,
    FamilyShared,
    Unrecognized(String),
}

impl InAppOwnershipType {
    pub fn as_str(&self) -> &str {
        match self {
            InAppOwnershipType::Purchased => "PURCHASED",
            InAppOwnershipType::FamilyShared => "FAMILY_SHARED",
            InAppOwnershipType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for InAppOwnershipType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PURCHASED" => InAppOwnershipType::Purchased,
            "FAMILY_SHARED" => InAppOwnershipType::FamilyShared,
            _ => InAppOwnershipType::Unrecognized(value),
        }
    }
}

impl From<InAppOwnershipType> for String {
    fn from(value: InAppOwnershipType) -> Self {
        value.as_str().to_owned()
    }
}

/// Cause of a transaction: an explicit purchase or an automatic renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionReason {
    Purchase,
    Renewal,
    Unrecognized(String),
}

impl TransactionReason {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionReason::Purchase => "PURCHASE",
            TransactionReason::Renewal => "RENEWAL",
            TransactionReason::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for TransactionReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PURCHASE" => TransactionReason::Purchase,
            "RENEWAL" => TransactionReason::Renewal,
            _ => TransactionReason::Unrecognized(value),
        }
    }
}

impl From<TransactionReason> for String {
    fn from(value: TransactionReason) -> Self {
        value.as_str().to_owned()
    }
}

/// Payment mode of a subscription offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OfferDiscountType {
    FreeTrial,
    PayAsYouGo,
    PayUpFront,
    Unrecognized(String),
}

impl OfferDiscountType {
    pub fn as_str(&self) -> &str {
        match self {
            OfferDiscountType::FreeTrial => "FREE_TRIAL",
            OfferDiscountType::PayAsYouGo => "PAY_AS_YOU_GO",
            OfferDiscountType::PayUpFront => "PAY_UP_FRONT",
            OfferDiscountType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for OfferDiscountType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FREE_TRIAL" => OfferDiscountType::FreeTrial,
            "PAY_AS_YOU_GO" => OfferDiscountType::PayAsYouGo,
            "PAY_UP_FRONT" => OfferDiscountType::PayUpFront,
            _ => OfferDiscountType::Unrecognized(value),
        }
    }
}

impl From<OfferDiscountType> for String {
    fn from(value: OfferDiscountType) -> Self {
        value.as_str().to_owned()
    }
}

/// Kind of subscription offer applied to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum OfferType {
    IntroductoryOffer,
    PromotionalOffer,
    SubscriptionOfferCode,
    WinBackOffer,
    Unrecognized(i32),
}

impl From<i32> for OfferType {
    fn from(value: i32) -> Self {
        match value {
            1 => OfferType::IntroductoryOffer,
            2 => OfferType::PromotionalOffer,
            3 => OfferType::SubscriptionOfferCode,
            4 => OfferType::WinBackOffer,
            _ => OfferType::Unrecognized(value),
        }
    }
}

impl From<OfferType> for i32 {
    fn from(value: OfferType) -> Self {
        match value {
            OfferType::IntroductoryOffer => 1,
            OfferType::PromotionalOffer => 2,
            OfferType::SubscriptionOfferCode => 3,
            OfferType::WinBackOffer => 4,
            OfferType::Unrecognized(raw) => raw,
        }
    }
}

/// Why a transaction was revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum RevocationReason {
    RefundedDueToIssue,
    RefundedForOtherReason,
    Unrecognized(i32),
}

impl From<i32> for RevocationReason {
    fn from(value: i32) -> Self {
        match value {
            0 => RevocationReason::RefundedForOtherReason,
            1 => RevocationReason::RefundedDueToIssue,
            _ => RevocationReason::Unrecognized(value),
        }
    }
}

impl From<RevocationReason> for i32 {
    fn from(value: RevocationReason) -> Self {
        match value {
            RevocationReason::RefundedForOtherReason => 0,
            RevocationReason::RefundedDueToIssue => 1,
            RevocationReason::Unrecognized(raw) => raw,
        }
    }
}
