// Joiner - left outer join of transactions onto the products catalogue
//
// Every transaction row survives the join exactly once. Product fields are
// absent when the foreign key has no match. A duplicate product_id in the
// catalogue is a join-integrity warning: the first occurrence wins.

use crate::loader::{ProductRecord, TransactionRecord};
use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// A transaction enriched with its matched product and derived period labels.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedRow {
    pub transaction_id: String,
    pub customer_id: String,
    pub product_id: String,
    pub date: NaiveDate,
    pub quantity: u32,
    pub sale_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub region: String,

    // Product side, absent when the left join found no match
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,

    /// First-day-of-month truncation, `YYYY-MM`
    pub month: String,
    /// ISO week label, `YYYY-Www`
    pub week: String,
}

/// Left-join transactions to products on `product_id` and derive the
/// calendar period labels. Output length always equals input length.
pub fn join_transactions(
    products: &[ProductRecord],
    transactions: &[TransactionRecord],
) -> Result<Vec<JoinedRow>> {
    let mut index: HashMap<&str, &ProductRecord> = HashMap::with_capacity(products.len());
    for product in products {
        if index.contains_key(product.product_id.as_str()) {
            warn!(
                product_id = %product.product_id,
                "duplicate product_id in catalogue, keeping first occurrence"
            );
            continue;
        }
        index.insert(product.product_id.as_str(), product);
    }

    let mut joined = Vec::with_capacity(transactions.len());
    for tx in transactions {
        let date = parse_date(&tx.date)?;
        let product = index.get(tx.product_id.as_str());

        joined.push(JoinedRow {
            transaction_id: tx.transaction_id.clone(),
            customer_id: tx.customer_id.clone(),
            product_id: tx.product_id.clone(),
            date,
            quantity: tx.quantity,
            sale_price: tx.sale_price,
            discount_percent: tx.discount_percent,
            discount_amount: tx.discount_amount,
            total_amount: tx.total_amount,
            region: tx.region.clone(),
            product_name: product.map(|p| p.product_name.clone()),
            category: product.map(|p| p.category.clone()),
            brand: product.map(|p| p.brand.clone()),
            rating: product.map(|p| p.rating),
            month: month_label(date),
            week: week_label(date),
        });
    }

    Ok(joined)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    // Legacy exports
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return Ok(date);
    }
    bail!("unparseable transaction date: {:?}", raw)
}

fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

// ============================================================================
// TESTS
// ============================================================================
