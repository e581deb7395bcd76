//! Marketplace records
//!
//! Listings, their lifecycle and the notifications they produce, plus the
//! listing-description assistant.

use crate::{
    classifier::{GenerateRequest, TextModel},
    Error, Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Fallback when the model returns nothing
pub const DESCRIPTION_EMPTY_FALLBACK: &str = "Could not generate description. Please try again.";

/// Fallback when the model call fails
pub const DESCRIPTION_ERROR_FALLBACK: &str =
    "Error generating description. Check your connection or API key.";

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Course books
    Textbooks,
    /// Phones, laptops, chargers
    Electronics,
    /// Clothing and accessories
    Fashion,
    /// Hostel essentials
    Hostel,
    /// Lab and scientific gear
    LabGear,
    /// Stationery
    Stationery,
    /// Anything else
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Textbooks => "Textbooks",
            Category::Electronics => "Electronics",
            Category::Fashion => "Fashion",
            Category::Hostel => "Hostel Essentials",
            Category::LabGear => "Lab & Scientific",
            Category::Stationery => "Stationery",
            Category::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Item condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Unused
    New,
    /// Barely used
    LikeNew,
    /// Normal wear
    Good,
    /// Visible wear
    Fair,
    /// Heavily worn
    Poor,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Condition::New => "Brand New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// What the seller wants in return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingKind {
    /// Outright sale
    Sell {
        /// Asking price
        price: f64,
    },
    /// Item-for-item swap
    Swap {
        /// What the seller wants in exchange
        swap_request: String,
    },
    /// Rental
    Rent {
        /// Price per period
        price: f64,
        /// Rental period, e.g. "per week"
        duration: String,
    },
}

impl ListingKind {
    /// Short label used in prompts and listings
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::Sell { .. } => "Buy",
            ListingKind::Swap { .. } => "Swap",
            ListingKind::Rent { .. } => "Rent",
        }
    }
}

/// Listing lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Open for offers
    Available,
    /// Sold or swapped
    Sold,
    /// Currently rented out
    Rented,
}

/// Seller input for a new listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    /// Item name
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Sale, swap or rent terms
    pub kind: ListingKind,
    /// Category
    pub category: Category,
    /// Condition
    pub condition: Condition,
}

impl ListingDraft {
    /// Check the draft is complete
    ///
    /// # Errors
    /// `Error::Validation` for a blank title, a negative or non-finite price,
    /// or blank swap / rental terms
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }

        match &self.kind {
            ListingKind::Sell { price } => validate_price(*price),
            ListingKind::Swap { swap_request } if swap_request.trim().is_empty() => Err(
                Error::Validation("swap request is required".to_string()),
            ),
            ListingKind::Swap { .. } => Ok(()),
            ListingKind::Rent { price, duration } => {
                validate_price(*price)?;
                if duration.trim().is_empty() {
                    return Err(Error::Validation("rental duration is required".to_string()));
                }
                Ok(())
            }
        }
    }
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Validation(format!("invalid price: {}", price)));
    }
    Ok(())
}

/// A posted listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing ID
    pub id: String,
    /// Item name
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Sale, swap or rent terms
    pub kind: ListingKind,
    /// Category
    pub category: Category,
    /// Condition
    pub condition: Condition,
    /// User ID of the seller
    pub seller_id: String,
    /// Display name of the seller
    pub seller_name: String,
    /// When the listing was posted
    pub created_at: DateTime<Utc>,
    /// Lifecycle status
    pub status: ListingStatus,
}

impl Listing {
    /// Build an available listing from a draft
    pub fn from_draft(
        draft: ListingDraft,
        seller_id: impl Into<String>,
        seller_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            kind: draft.kind,
            category: draft.category,
            condition: draft.condition,
            seller_id: seller_id.into(),
            seller_name: seller_name.into(),
            created_at: Utc::now(),
            status: ListingStatus::Available,
        }
    }

    /// Whether the listing still accepts buyers
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available
    }

    /// Status a completed payment moves the listing to
    pub fn status_after_payment(&self) -> ListingStatus {
        match self.kind {
            ListingKind::Rent { .. } => ListingStatus::Rented,
            ListingKind::Sell { .. } | ListingKind::Swap { .. } => ListingStatus::Sold,
        }
    }
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Something needs attention
    Alert,
    /// New chat activity
    Message,
    /// An action completed
    Success,
}

/// In-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID
    pub id: String,
    /// Category
    pub kind: NotificationKind,
    /// Headline
    pub title: String,
    /// Body text
    pub body: String,
    /// Whether the user has seen it
    pub is_read: bool,
    /// When it was raised
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            body: body.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Why a listing was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    /// Looks like a scam
    #[default]
    Suspicious,
    /// Offensive or prohibited content
    Inappropriate,
    /// Same item posted more than once
    Duplicate,
    /// Listed under the wrong category
    WrongCategory,
    /// Anything else; see the details
    Other,
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportReason::Suspicious => "Suspicious / Scam",
            ReportReason::Inappropriate => "Inappropriate Content",
            ReportReason::Duplicate => "Duplicate Listing",
            ReportReason::WrongCategory => "Wrong Category",
            ReportReason::Other => "Other",
        };
        f.write_str(label)
    }
}

/// A user's report against a listing, kept for moderator review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingReport {
    /// Report ID
    pub id: String,
    /// Reported listing
    pub listing_id: String,
    /// User who filed the report
    pub reporter_id: String,
    /// Reason picked by the reporter
    pub reason: ReportReason,
    /// Optional free-text details
    pub details: Option<String>,
    /// When the report was filed
    pub created_at: DateTime<Utc>,
}

impl ListingReport {
    /// Create a report; blank details are dropped
    pub fn new(
        listing_id: impl Into<String>,
        reporter_id: impl Into<String>,
        reason: ReportReason,
        details: &str,
    ) -> Self {
        let details = details.trim();
        Self {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.into(),
            reporter_id: reporter_id.into(),
            reason,
            details: (!details.is_empty()).then(|| details.to_string()),
            created_at: Utc::now(),
        }
    }
}

fn description_prompt(
    title: &str,
    category: Category,
    condition: Condition,
    kind: &ListingKind,
) -> String {
    format!(
        r#"You are a helpful assistant for a student marketplace app called "CampusTrade".
Write a short, catchy, and appealing description (max 50 words) for a product listing with the following details:
- Item Name: {title}
- Category: {category}
- Condition: {condition}
- Listing Type: {kind} (Buy, Swap, or Rent)

The tone should be friendly, student-to-student, and trustworthy.
Do not include quotes around the output."#,
        kind = kind.label(),
    )
}

/// Ask the text model for a listing description
///
/// Never fails: empty output and model errors produce fixed fallback text.
pub async fn describe_listing(
    model: &dyn TextModel,
    title: &str,
    category: Category,
    condition: Condition,
    kind: &ListingKind,
) -> String {
    let request = GenerateRequest::text(description_prompt(title, category, condition, kind));
    match model.generate(request).await {
        Ok(text) if text.trim().is_empty() => DESCRIPTION_EMPTY_FALLBACK.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Listing description failed: {}", e);
            DESCRIPTION_ERROR_FALLBACK.to_string()
        }
    }
}
