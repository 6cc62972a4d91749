//! Seed catalog shipped with the application

use crate::core::listing::{Category, Listing};
use crate::core::transaction::{Transaction, TransactionStatus};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn listing(
    id: &str,
    name: &str,
    quantity: &str,
    expiry_date: NaiveDate,
    price: f64,
    category: Category,
    seller: &str,
) -> Listing {
    Listing {
        id: id.to_string(),
        name: name.to_string(),
        quantity: quantity.to_string(),
        expiry_date,
        price,
        category,
        seller: seller.to_string(),
        compliance_cert: None,
    }
}

/// The five seed listings
pub fn listings() -> Vec<Listing> {
    vec![
        listing(
            "1",
            "Paracetamol Base",
            "25kg",
            date(2026, 8, 15),
            5000.0,
            Category::Apis,
            "PharmaCorp Ltd",
        ),
        listing(
            "2",
            "Ibuprofen API",
            "10kg",
            date(2025, 12, 20),
            2200.0,
            Category::Apis,
            "Global Pharma Inc",
        ),
        listing(
            "3",
            "Gelatin Capsules",
            "50,000 units",
            date(2027, 3, 10),
            3500.0,
            Category::Excipients,
            "MedSupply Co",
        ),
        listing(
            "4",
            "Vitamin C Powder",
            "15kg",
            date(2026, 1, 30),
            1800.0,
            Category::Apis,
            "BioTech Solutions",
        ),
        listing(
            "5",
            "Lactose Monohydrate",
            "100kg",
            date(2025, 9, 15),
            4200.0,
            Category::Excipients,
            "Ingredient Masters",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn transaction(
    id: &str,
    buyer: &str,
    seller: &str,
    item: &str,
    date: NaiveDate,
    amount: f64,
    status: TransactionStatus,
    hash: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        buyer: buyer.to_string(),
        seller: seller.to_string(),
        item: item.to_string(),
        date,
        amount,
        status,
        hash: Some(hash.to_string()),
    }
}

/// The four seed transactions
pub fn transactions() -> Vec<Transaction> {
    vec![
        transaction(
            "1",
            "MedCorp Industries",
            "PharmaCorp Ltd",
            "Acetaminophen Base - 20kg",
            date(2024, 12, 15),
            4500.0,
            TransactionStatus::Completed,
            "0x7f8e2c4a9b1d6e3f5a8c2e1b9d4f6a3c8e2b5d7f9c1a4e6b8d2f5a9c3e1b7d4f",
        ),
        transaction(
            "2",
            "Global Health Ltd",
            "BioTech Solutions",
            "Vitamin D3 - 5kg",
            date(2024, 12, 10),
            3200.0,
            TransactionStatus::Completed,
            "0x9a3e1c7f4b6d8e2a5c9f1e4b7d6a8c2e5f3b9d1a7c4e8f2b6d5a9c3e1f7b4d8",
        ),
        transaction(
            "3",
            "PharmaPlus Co",
            "MedSupply Co",
            "Hard Gelatin Capsules - 25,000 units",
            date(2024, 12, 5),
            1800.0,
            TransactionStatus::Pending,
            "0x5c2e8f1b4d7a9c3e6f2b8d1a5c7e9f4b2d6a8c1e5f9b3d7a4c8e2f6b1d9a5c3",
        ),
        transaction(
            "4",
            "MedCorp Industries",
            "Ingredient Masters",
            "Microcrystalline Cellulose - 50kg",
            date(2024, 11, 28),
            2600.0,
            TransactionStatus::Completed,
            "0x1f4b8d2a6c9e3f7b1d5a8c4e2f6b9d3a7c1e5f8b4d2a9c6e1f7b3d5a8c2e4f",
        ),
    ]
}
