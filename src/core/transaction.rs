//! Buyer/seller exchange records

use crate::core::record::{Record, SortKey};
use crate::core::user::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Settlement state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
        }
    }
}

/// A completed or pending exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub buyer: String,
    pub seller: String,
    pub item: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Transaction {
    /// The stored ledger hash, or a freshly generated display value
    pub fn display_hash(&self) -> String {
        self.hash.clone().unwrap_or_else(random_display_hash)
    }
}

/// `0x` followed by 64 random lowercase hex digits.
///
/// Purely cosmetic: this is not a digest of anything and carries no
/// cryptographic meaning.
pub fn random_display_hash() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("0x{}", hex::encode(bytes))
}

/// Transaction orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum TransactionSort {
    /// Keep the order the records were supplied in
    #[default]
    Recorded,
    Date,
    Amount,
}

impl SortKey for TransactionSort {
    fn parse_lenient(raw: &str) -> Self {
        match raw.trim() {
            "date" => TransactionSort::Date,
            "amount" => TransactionSort::Amount,
            _ => TransactionSort::Recorded,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TransactionSort::Recorded => "recorded",
            TransactionSort::Date => "date",
            TransactionSort::Amount => "amount",
        }
    }
}

impl From<String> for TransactionSort {
    fn from(raw: String) -> Self {
        Self::parse_lenient(&raw)
    }
}

impl Record for Transaction {
    type Sort = TransactionSort;

    fn resource_name() -> &'static str {
        "transactions"
    }

    fn resource_name_singular() -> &'static str {
        "transaction"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn searchable_fields(&self) -> Vec<&str> {
        vec![self.buyer.as_str(), self.seller.as_str(), self.item.as_str()]
    }

    fn facet(&self) -> &str {
        self.status.as_str()
    }

    fn value(&self) -> f64 {
        self.amount
    }

    fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    fn party(&self, role: Role) -> Option<&str> {
        match role {
            Role::Buyer => Some(self.buyer.as_str()),
            Role::Seller => Some(self.seller.as_str()),
        }
    }

    fn compare(&self, other: &Self, key: TransactionSort) -> Ordering {
        match key {
            TransactionSort::Recorded => Ordering::Equal,
            TransactionSort::Date => self.date.cmp(&other.date),
            TransactionSort::Amount => self.amount.total_cmp(&other.amount),
        }
    }
}
