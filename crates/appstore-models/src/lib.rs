//! Typed models for App Store signed data payloads.
//!
//! The structs here mirror the decoded JSON payloads carried inside signed
//! JWS objects: in-app transactions, subscription renewal info, App Store
//! Server Notifications, and app transactions. Decoding is forward
//! compatible: enum-valued fields whose wire value is unknown to this
//! library decode to an `Unrecognized` variant carrying the raw value
//! instead of failing, so platform additions never break deployed
//! verifiers.

pub mod app_transaction;
pub mod environment;
pub mod notification;
pub mod renewal;
pub mod transaction;

pub use app_transaction::{AppTransaction, PurchasePlatform};
pub use environment::Environment;
pub use notification::{
    ExternalPurchaseToken, NotificationData, NotificationPayload, NotificationType,
    SubscriptionStatus, Subtype, Summary,
};
pub use renewal::{AutoRenewStatus, ExpirationIntent, PriceIncreaseStatus, RenewalInfo};
pub use transaction::{
    InAppOwnershipType, OfferDiscountType, OfferType, ProductType, RevocationReason,
    TransactionInfo, TransactionReason,
};
