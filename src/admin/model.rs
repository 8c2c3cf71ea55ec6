// region:    --- Imports
use crate::date::StoredDate;
use crate::error::BackendError;
use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// endregion: --- Imports

pub const PRODUCTS: &str = "products";
pub const USERS: &str = "users";
pub const REPORTS: &str = "reports";
pub const BIDS: &str = "bids";

/// Bid credits a user holds when the document does not say otherwise
pub const DEFAULT_BID_CREDITS: i64 = 6;

/// Typed view over a stored document.
pub trait Record: Sized {
    const COLLECTION: &'static str;

    fn from_document(doc: &Document) -> Result<Self, BackendError>;

    fn created_at(&self) -> DateTime<Utc>;
}

/// Reads an explicit `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// region:    --- Product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Sold,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::Pending,
        ProductStatus::Approved,
        ProductStatus::Rejected,
        ProductStatus::Sold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Sold => "sold",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("Unknown product status: {value}"))
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marketplace listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub condition: String,
    /// Only meaningful when bidding is disabled
    pub price: Option<f64>,
    pub images: Vec<String>,
    pub location: String,
    pub city: String,
    pub state: String,
    pub bidding_enabled: bool,
    pub bid_expiry_date: Option<DateTime<Utc>>,
    pub status: ProductStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    category: String,
    subcategory: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    condition: String,
    price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    bidding_enabled: bool,
    #[serde(default)]
    bid_expiry_date: StoredDate,
    #[serde(default, deserialize_with = "null_as_default")]
    status: ProductStatus,
    rejection_reason: Option<String>,
    #[serde(default)]
    created_at: StoredDate,
    #[serde(default)]
    updated_at: StoredDate,
}

impl Record for Product {
    const COLLECTION: &'static str = PRODUCTS;

    fn from_document(doc: &Document) -> Result<Self, BackendError> {
        let raw: ProductDocument = doc.decode(Self::COLLECTION)?;
        Ok(Self {
            id: doc.id.clone(),
            user_id: raw.user_id,
            title: raw.title,
            description: raw.description,
            category: raw.category,
            subcategory: raw.subcategory,
            condition: raw.condition,
            price: raw.price,
            images: raw.images,
            location: raw.location,
            city: raw.city,
            state: raw.state,
            bidding_enabled: raw.bidding_enabled,
            bid_expiry_date: raw.bid_expiry_date.to_optional_date(),
            status: raw.status,
            rejection_reason: raw.rejection_reason,
            created_at: raw.created_at.to_date(),
            updated_at: raw.updated_at.to_optional_date(),
        })
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
// endregion: --- Product

// region:    --- User
/// Marketplace account. Admin and banned are independent flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_picture_url: Option<String>,
    pub is_profile_complete: bool,
    pub is_admin: bool,
    pub is_banned: bool,
    pub banned_at: Option<DateTime<Utc>>,
    pub bid_credits: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    phone_number: Option<String>,
    city: Option<String>,
    state: Option<String>,
    profile_picture_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    is_profile_complete: bool,
    #[serde(default)]
    is_admin: Option<bool>,
    #[serde(default)]
    is_banned: Option<bool>,
    #[serde(default)]
    banned_at: StoredDate,
    bid_credits: Option<i64>,
    #[serde(default)]
    created_at: StoredDate,
}

impl Record for User {
    const COLLECTION: &'static str = USERS;

    fn from_document(doc: &Document) -> Result<Self, BackendError> {
        let raw: UserDocument = doc.decode(Self::COLLECTION)?;
        Ok(Self {
            id: doc.id.clone(),
            email: raw.email,
            name: raw.name,
            phone_number: raw.phone_number,
            city: raw.city,
            state: raw.state,
            profile_picture_url: raw.profile_picture_url,
            is_profile_complete: raw.is_profile_complete,
            is_admin: raw.is_admin.unwrap_or(false),
            is_banned: raw.is_banned.unwrap_or(false),
            banned_at: raw.banned_at.to_optional_date(),
            bid_credits: raw.bid_credits.unwrap_or(DEFAULT_BID_CREDITS),
            created_at: raw.created_at.to_date(),
        })
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
// endregion: --- User

// region:    --- Report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

/// How staff close a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    /// Delete the reported product; the report becomes `resolved`
    Delete,
    /// Waive the report; the report becomes `dismissed`
    Dismiss,
}

impl ResolveAction {
    pub fn outcome(self) -> ReportStatus {
        match self {
            Self::Delete => ReportStatus::Resolved,
            Self::Dismiss => ReportStatus::Dismissed,
        }
    }
}

/// Abuse report filed against a product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub product_id: String,
    pub reported_by: String,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    product_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    reported_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    reason: String,
    description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: ReportStatus,
    #[serde(default)]
    created_at: StoredDate,
    #[serde(default)]
    resolved_at: StoredDate,
}

impl Record for Report {
    const COLLECTION: &'static str = REPORTS;

    fn from_document(doc: &Document) -> Result<Self, BackendError> {
        let raw: ReportDocument = doc.decode(Self::COLLECTION)?;
        Ok(Self {
            id: doc.id.clone(),
            product_id: raw.product_id,
            reported_by: raw.reported_by,
            reason: raw.reason,
            description: raw.description,
            status: raw.status,
            created_at: raw.created_at.to_date(),
            resolved_at: raw.resolved_at.to_optional_date(),
        })
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
// endregion: --- Report

// region:    --- Bid
/// Bid placed on a product. Status is free-form (active, accepted, rejected, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub amount: f64,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BidDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    product_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    amount: f64,
    note: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: String,
    #[serde(default)]
    created_at: StoredDate,
}

impl Record for Bid {
    const COLLECTION: &'static str = BIDS;

    fn from_document(doc: &Document) -> Result<Self, BackendError> {
        let raw: BidDocument = doc.decode(Self::COLLECTION)?;
        Ok(Self {
            id: doc.id.clone(),
            product_id: raw.product_id,
            user_id: raw.user_id,
            amount: raw.amount,
            note: raw.note,
            status: raw.status,
            created_at: raw.created_at.to_date(),
        })
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
// endregion: --- Bid

// endregion: --- Tests
