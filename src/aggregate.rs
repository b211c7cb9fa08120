// Aggregation Engine - declarative group-by over the joined table
//
// Every report table is the same machine with a different spec: a grouping
// key, a list of (column name, reduction) pairs, a sort rule and an optional
// row limit. Derived ratio columns are applied after reduction. Aggregates
// are pure functions of the joined row set; nothing here mutates the input.

use crate::buckets::{discount_bracket, price_range};
use crate::join::JoinedRow;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// ============================================================================
// FIELD ACCESSORS
// ============================================================================

/// Numeric columns of the joined table.
#[derive(Debug, Clone, Copy)]
pub enum NumField {
    Quantity,
    SalePrice,
    DiscountPercent,
    DiscountAmount,
    TotalAmount,
    Rating,
}

impl NumField {
    /// Value for one row. `None` means missing (unmatched product side)
    /// and is skipped by every reduction, like a null in a column store.
    pub fn value(&self, row: &JoinedRow) -> Option<f64> {
        match self {
            NumField::Quantity => Some(row.quantity as f64),
            NumField::SalePrice => Some(row.sale_price),
            NumField::DiscountPercent => Some(row.discount_percent),
            NumField::DiscountAmount => Some(row.discount_amount),
            NumField::TotalAmount => Some(row.total_amount),
            NumField::Rating => row.rating,
        }
    }
}

/// Identifier columns usable for distinct counts.
#[derive(Debug, Clone, Copy)]
pub enum IdField {
    TransactionId,
    ProductId,
    CustomerId,
}

impl IdField {
    pub fn value<'a>(&self, row: &'a JoinedRow) -> &'a str {
        match self {
            IdField::TransactionId => &row.transaction_id,
            IdField::ProductId => &row.product_id,
            IdField::CustomerId => &row.customer_id,
        }
    }
}

// ============================================================================
// SPEC
// ============================================================================

/// How one output column is reduced from the rows of its group.
#[derive(Debug, Clone, Copy)]
pub enum Reduction {
    Sum(NumField),
    Mean(NumField),
    CountDistinct(IdField),
    /// First observed non-missing value in the group
    First(NumField),
}

/// Grouping dimension. Extraction returning `None` drops the row from that
/// aggregation only; absent keys are never synthesized as zero rows.
#[derive(Debug, Clone, Copy)]
pub enum GroupKey {
    Category,
    Month,
    DiscountBracket,
    /// Composite product identity: name, category, brand
    Product,
    Region,
    PriceRange,
}

impl GroupKey {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            GroupKey::Category => &["category"],
            GroupKey::Month => &["Month"],
            GroupKey::DiscountBracket => &["discount_bracket"],
            GroupKey::Product => &["product_name", "category", "brand"],
            GroupKey::Region => &["region"],
            GroupKey::PriceRange => &["price_range"],
        }
    }

    pub fn of(&self, row: &JoinedRow) -> Option<Vec<String>> {
        match self {
            GroupKey::Category => row.category.clone().map(|c| vec![c]),
            GroupKey::Month => Some(vec![row.month.clone()]),
            GroupKey::DiscountBracket => {
                discount_bracket(row.discount_percent).map(|b| vec![b.to_string()])
            }
            GroupKey::Product => Some(vec![
                row.product_name.clone()?,
                row.category.clone()?,
                row.brand.clone()?,
            ]),
            GroupKey::Region => Some(vec![row.region.clone()]),
            GroupKey::PriceRange => price_range(row.sale_price).map(|b| vec![b.to_string()]),
        }
    }
}

/// Row ordering of the finished table. All sorts are stable, so ties keep
/// the first-appearance order of the underlying rows.
#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    /// Descending by a named value column (revenue rankings)
    ByColumnDesc(&'static str),
    /// Ascending by key label (chronological months)
    KeyAscending,
    /// Position in a fixed label list (bucket-definition order)
    Fixed(&'static [&'static str]),
    /// Accumulation order, untouched
    FirstSeen,
}

/// Full description of one aggregate table.
pub struct AggregateSpec {
    pub key: GroupKey,
    pub columns: Vec<(&'static str, Reduction)>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

// ============================================================================
// OUTPUT TABLE
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AggregateRow {
    pub key: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateTable {
    pub key_columns: Vec<&'static str>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<AggregateRow>,
}

/// Named-column access for one row, used by derived-column formulas.
pub struct RowView<'a> {
    columns: &'a [&'static str],
    values: &'a [f64],
}

impl<'a> RowView<'a> {
    pub fn get(&self, name: &str) -> f64 {
        self.columns
            .iter()
            .position(|c| *c == name)
            .map(|i| self.values[i])
            .unwrap_or(f64::NAN)
    }
}

impl AggregateTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == name)
    }

    /// Sum of one value column across all groups (NaN entries skipped).
    pub fn column_sum(&self, name: &str) -> f64 {
        match self.column_index(name) {
            Some(i) => self
                .rows
                .iter()
                .map(|r| r.values[i])
                .filter(|v| !v.is_nan())
                .sum(),
            None => f64::NAN,
        }
    }

    /// Append a derived column computed from the already-reduced columns.
    /// Results are rounded to 2 decimals; NaN (empty-group division)
    /// propagates untouched.
    pub fn derive<F>(&mut self, name: &'static str, formula: F)
    where
        F: Fn(&RowView) -> f64,
    {
        for row in &mut self.rows {
            let value = formula(&RowView {
                columns: &self.columns,
                values: &row.values,
            });
            row.values.push(round2(value));
        }
        self.columns.push(name);
    }
}

// ============================================================================
// ENGINE
// ============================================================================

enum Acc {
    Sum(f64),
    Mean { sum: f64, count: u64 },
    Distinct(HashSet<String>),
    First(Option<f64>),
}

impl Acc {
    fn new(reduction: &Reduction) -> Self {
        match reduction {
            Reduction::Sum(_) => Acc::Sum(0.0),
            Reduction::Mean(_) => Acc::Mean { sum: 0.0, count: 0 },
            Reduction::CountDistinct(_) => Acc::Distinct(HashSet::new()),
            Reduction::First(_) => Acc::First(None),
        }
    }

    fn update(&mut self, reduction: &Reduction, row: &JoinedRow) {
        match (self, reduction) {
            (Acc::Sum(total), Reduction::Sum(field)) => {
                if let Some(v) = field.value(row) {
                    *total += v;
                }
            }
            (Acc::Mean { sum, count }, Reduction::Mean(field)) => {
                if let Some(v) = field.value(row) {
                    *sum += v;
                    *count += 1;
                }
            }
            (Acc::Distinct(seen), Reduction::CountDistinct(field)) => {
                seen.insert(field.value(row).to_string());
            }
            (Acc::First(slot), Reduction::First(field)) => {
                if slot.is_none() {
                    *slot = field.value(row);
                }
            }
            _ => unreachable!("accumulator kind mismatch"),
        }
    }

    fn finish(self) -> f64 {
        match self {
            Acc::Sum(total) => total,
            Acc::Mean { sum, count } => {
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            }
            Acc::Distinct(seen) => seen.len() as f64,
            Acc::First(slot) => slot.unwrap_or(f64::NAN),
        }
    }
}

/// Run one aggregation pass over the joined rows.
pub fn aggregate(rows: &[JoinedRow], spec: &AggregateSpec) -> AggregateTable {
    // First-appearance order is the tie-break for every stable sort below
    let mut groups: Vec<(Vec<String>, Vec<Acc>)> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for row in rows {
        let Some(key) = spec.key.of(row) else {
            continue;
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, spec.columns.iter().map(|(_, r)| Acc::new(r)).collect()));
            groups.len() - 1
        });
        for (acc, (_, reduction)) in groups[slot].1.iter_mut().zip(&spec.columns) {
            acc.update(reduction, row);
        }
    }

    let mut table = AggregateTable {
        key_columns: spec.key.columns().to_vec(),
        columns: spec.columns.iter().map(|(name, _)| *name).collect(),
        rows: groups
            .into_iter()
            .map(|(key, accs)| AggregateRow {
                key,
                values: accs.into_iter().map(|a| round2(a.finish())).collect(),
            })
            .collect(),
    };

    sort_rows(&mut table, spec.sort);
    if let Some(limit) = spec.limit {
        table.rows.truncate(limit);
    }
    table
}

fn sort_rows(table: &mut AggregateTable, sort: SortOrder) {
    match sort {
        SortOrder::ByColumnDesc(name) => {
            if let Some(i) = table.column_index(name) {
                table.rows.sort_by(|a, b| {
                    b.values[i]
                        .partial_cmp(&a.values[i])
                        .unwrap_or(Ordering::Equal)
                });
            }
        }
        SortOrder::KeyAscending => table.rows.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::Fixed(labels) => {
            let position = |key: &[String]| {
                labels
                    .iter()
                    .position(|l| key.first().map(|k| k == l).unwrap_or(false))
                    .unwrap_or(labels.len())
            };
            table.rows.sort_by_key(|r| position(&r.key));
        }
        SortOrder::FirstSeen => {}
    }
}

/// Round to 2 decimals, leaving NaN alone.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(txn: &str, category: &str, quantity: u32, total: f64, discount_pct: f64) -> JoinedRow {
        JoinedRow {
            transaction_id: txn.to_string(),
            customer_id: "C1".to_string(),
            product_id: "P1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            quantity,
            sale_price: 40.0,
            discount_percent: discount_pct,
            discount_amount: 0.0,
            total_amount: total,
            region: "North".to_string(),
            product_name: Some("Peanuts".to_string()),
            category: Some(category.to_string()),
            brand: Some("CrunchCo".to_string()),
            rating: Some(4.0),
            month: "2024-01".to_string(),
            week: "2024-W01".to_string(),
        }
    }

    fn category_spec(sort: SortOrder) -> AggregateSpec {
        AggregateSpec {
            key: GroupKey::Category,
            columns: vec![
                ("Orders", Reduction::CountDistinct(IdField::TransactionId)),
                ("Units", Reduction::Sum(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
                ("Avg_Qty", Reduction::Mean(NumField::Quantity)),
            ],
            sort,
            limit: None,
        }
    }

    #[test]
    fn test_reductions() {
        let rows = vec![
            row("T1", "Snacks", 2, 80.0, 0.0),
            row("T1", "Snacks", 1, 150.0, 0.0),
            row("T2", "Dairy", 3, 60.0, 0.0),
        ];

        let table = aggregate(&rows, &category_spec(SortOrder::FirstSeen));
        assert_eq!(table.rows.len(), 2);

        let snacks = &table.rows[0];
        assert_eq!(snacks.key, vec!["Snacks".to_string()]);
        assert_eq!(snacks.values, vec![1.0, 3.0, 230.0, 1.5]);

        let dairy = &table.rows[1];
        assert_eq!(dairy.key, vec!["Dairy".to_string()]);
        assert_eq!(dairy.values, vec![1.0, 3.0, 60.0, 3.0]);
    }

    #[test]
    fn test_sort_by_column_desc_and_limit() {
        let rows = vec![
            row("T1", "Dairy", 1, 60.0, 0.0),
            row("T2", "Snacks", 1, 230.0, 0.0),
            row("T3", "Beverages", 1, 90.0, 0.0),
        ];

        let mut spec = category_spec(SortOrder::ByColumnDesc("Revenue"));
        spec.limit = Some(2);
        let table = aggregate(&rows, &spec);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].key[0], "Snacks");
        assert_eq!(table.rows[1].key[0], "Beverages");
    }

    #[test]
    fn test_missing_key_drops_row_only_from_this_table() {
        let mut unmatched = row("T9", "ignored", 5, 500.0, 0.0);
        unmatched.category = None;
        let rows = vec![row("T1", "Snacks", 2, 80.0, 0.0), unmatched];

        let table = aggregate(&rows, &category_spec(SortOrder::FirstSeen));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key[0], "Snacks");
    }

    #[test]
    fn test_derived_column_and_nan_propagation() {
        let rows = vec![row("T1", "Snacks", 2, 100.0, 0.0)];
        let mut table = aggregate(&rows, &category_spec(SortOrder::FirstSeen));

        table.derive("Thirds", |r| r.get("Revenue") / 3.0);
        table.derive("Broken", |r| r.get("Revenue") / r.get("NoSuchColumn"));

        let view_idx = table.column_index("Thirds").unwrap();
        assert!((table.rows[0].values[view_idx] - 33.33).abs() < 1e-9);
        let broken_idx = table.column_index("Broken").unwrap();
        assert!(table.rows[0].values[broken_idx].is_nan());
    }

    #[test]
    fn test_first_reduction_skips_missing() {
        let mut no_rating = row("T1", "Snacks", 1, 10.0, 0.0);
        no_rating.rating = None;
        let rows = vec![no_rating, row("T2", "Snacks", 1, 10.0, 0.0)];

        let spec = AggregateSpec {
            key: GroupKey::Category,
            columns: vec![("Rating", Reduction::First(NumField::Rating))],
            sort: SortOrder::FirstSeen,
            limit: None,
        };
        let table = aggregate(&rows, &spec);
        assert_eq!(table.rows[0].values, vec![4.0]);
    }

    #[test]
    fn test_fixed_bucket_order() {
        let rows = vec![
            row("T1", "Snacks", 1, 10.0, 25.0),
            row("T2", "Snacks", 1, 10.0, 0.0),
            row("T3", "Snacks", 1, 10.0, 15.0),
        ];
        let spec = AggregateSpec {
            key: GroupKey::DiscountBracket,
            columns: vec![("Revenue", Reduction::Sum(NumField::TotalAmount))],
            sort: SortOrder::Fixed(&crate::buckets::DISCOUNT_BRACKET_ORDER),
            limit: None,
        };

        let table = aggregate(&rows, &spec);
        let labels: Vec<&str> = table.rows.iter().map(|r| r.key[0].as_str()).collect();
        // "1-10%" has no rows and is absent, not zero-filled
        assert_eq!(labels, vec!["No Discount", "11-20%", "20%+"]);
    }
}
