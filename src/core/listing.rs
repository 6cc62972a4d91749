//! Surplus listings offered by sellers

use crate::core::error::{MarketError, MarketResult};
use crate::core::record::{Record, SortKey};
use crate::core::sort::collate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use validator::Validate;

/// Company recorded on listings submitted without a signed-in seller
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Days before expiry at which a listing is flagged urgent
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 90;

/// Material categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "APIs")]
    Apis,
    Excipients,
    Packaging,
    Equipment,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Apis,
        Category::Excipients,
        Category::Packaging,
        Category::Equipment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Apis => "APIs",
            Category::Excipients => "Excipients",
            Category::Packaging => "Packaging",
            Category::Equipment => "Equipment",
            Category::Other => "Other",
        }
    }
}

/// A seller-submitted surplus offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub expiry_date: NaiveDate,
    pub price: f64,
    pub category: Category,
    pub seller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_cert: Option<String>,
}

/// How close a listing is to its expiry date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryStatus {
    /// Negative once the date has passed
    pub days_remaining: i64,
    pub urgent: bool,
}

impl Listing {
    /// Expiry badge relative to `today`
    pub fn expiry_status(&self, today: NaiveDate, warning_days: i64) -> ExpiryStatus {
        let days_remaining = (self.expiry_date - today).num_days();
        ExpiryStatus {
            days_remaining,
            urgent: days_remaining < warning_days,
        }
    }
}

/// A listing as rendered in the marketplace grid and the seller table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCard {
    #[serde(flatten)]
    pub listing: Listing,
    pub expiry: ExpiryStatus,
}

impl ListingCard {
    pub fn new(listing: Listing, today: NaiveDate, warning_days: i64) -> Self {
        let expiry = listing.expiry_status(today, warning_days);
        Self { listing, expiry }
    }
}

/// Listing orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum ListingSort {
    #[default]
    Name,
    Price,
    Expiry,
}

impl SortKey for ListingSort {
    fn parse_lenient(raw: &str) -> Self {
        match raw.trim() {
            "price" => ListingSort::Price,
            "expiry" => ListingSort::Expiry,
            _ => ListingSort::Name,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            ListingSort::Name => "name",
            ListingSort::Price => "price",
            ListingSort::Expiry => "expiry",
        }
    }
}

impl From<String> for ListingSort {
    fn from(raw: String) -> Self {
        Self::parse_lenient(&raw)
    }
}

impl Record for Listing {
    type Sort = ListingSort;

    fn resource_name() -> &'static str {
        "listings"
    }

    fn resource_name_singular() -> &'static str {
        "listing"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.seller.as_str()]
    }

    fn facet(&self) -> &str {
        self.category.as_str()
    }

    fn value(&self) -> f64 {
        self.price
    }

    fn compare(&self, other: &Self, key: ListingSort) -> Ordering {
        match key {
            ListingSort::Name => collate(&self.name, &other.name),
            ListingSort::Price => self.price.total_cmp(&other.price),
            ListingSort::Expiry => self.expiry_date.cmp(&other.expiry_date),
        }
    }
}

/// Form data submitted by a seller to create a listing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingDraft {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Quantity is required"))]
    pub quantity: String,

    #[validate(required(message = "Expiry date is required"))]
    pub expiry_date: Option<NaiveDate>,

    #[validate(
        required(message = "Price is required"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,

    #[validate(required(message = "Category is required"))]
    pub category: Option<Category>,

    pub description: Option<String>,

    pub compliance_cert: Option<String>,
}

impl ListingDraft {
    /// Validate the draft and turn it into a listing owned by `seller`
    pub fn into_listing(self, id: String, seller: Option<&str>) -> MarketResult<Listing> {
        self.validate()?;

        let (Some(expiry_date), Some(price), Some(category)) =
            (self.expiry_date, self.price, self.category)
        else {
            return Err(MarketError::Internal(
                "validated draft is missing a required field".to_string(),
            ));
        };

        let seller = seller
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_COMPANY)
            .to_string();

        Ok(Listing {
            id,
            name: self.name,
            quantity: self.quantity,
            expiry_date,
            price,
            category,
            seller,
            compliance_cert: self.compliance_cert.filter(|c| !c.is_empty()),
        })
    }
}
