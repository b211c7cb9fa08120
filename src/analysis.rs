// The seven analysis passes
//
// Each pass is one AggregateSpec fed to the aggregation engine plus its
// derived ratio columns. The passes are independent: each reads the same
// immutable joined row set and produces its own table.

use crate::aggregate::{
    aggregate, AggregateSpec, AggregateTable, GroupKey, IdField, NumField, Reduction, SortOrder,
};
use crate::buckets::{DISCOUNT_BRACKET_ORDER, PRICE_RANGE_ORDER};
use crate::join::JoinedRow;
use serde::Serialize;

/// Rows kept in the top-products ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 15;

/// 1. Category-wise sales, revenue descending.
pub fn category_sales(rows: &[JoinedRow]) -> AggregateTable {
    let mut table = aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::Category,
            columns: vec![
                ("Orders", Reduction::CountDistinct(IdField::TransactionId)),
                ("Units_Sold", Reduction::Sum(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
                ("Discount", Reduction::Sum(NumField::DiscountAmount)),
            ],
            sort: SortOrder::ByColumnDesc("Revenue"),
            limit: None,
        },
    );
    table.derive("Avg_Discount_%", |r| {
        r.get("Discount") / (r.get("Revenue") + r.get("Discount")) * 100.0
    });
    table
}

/// 2. Monthly sales trend, chronological.
pub fn monthly_sales(rows: &[JoinedRow]) -> AggregateTable {
    let mut table = aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::Month,
            columns: vec![
                (
                    "Transactions",
                    Reduction::CountDistinct(IdField::TransactionId),
                ),
                ("Units", Reduction::Sum(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
                ("Discount", Reduction::Sum(NumField::DiscountAmount)),
            ],
            sort: SortOrder::KeyAscending,
            limit: None,
        },
    );
    table.derive("Avg_Order_Value", |r| {
        r.get("Revenue") / r.get("Transactions")
    });
    table
}

/// 3. Discount impact by bracket, bucket-definition order.
pub fn discount_impact(rows: &[JoinedRow]) -> AggregateTable {
    let mut table = aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::DiscountBracket,
            columns: vec![
                (
                    "Transactions",
                    Reduction::CountDistinct(IdField::TransactionId),
                ),
                ("Total_Units", Reduction::Sum(NumField::Quantity)),
                ("Avg_Units_Per_Order", Reduction::Mean(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
            ],
            sort: SortOrder::Fixed(&DISCOUNT_BRACKET_ORDER),
            limit: None,
        },
    );
    table.derive("Revenue_Per_Transaction", |r| {
        r.get("Revenue") / r.get("Transactions")
    });
    table
}

/// 4. Top products by revenue, truncated after the stable sort.
pub fn top_products(rows: &[JoinedRow]) -> AggregateTable {
    aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::Product,
            columns: vec![
                ("Units_Sold", Reduction::Sum(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
                ("Rating", Reduction::First(NumField::Rating)),
                ("Discount_%", Reduction::First(NumField::DiscountPercent)),
            ],
            sort: SortOrder::ByColumnDesc("Revenue"),
            limit: Some(TOP_PRODUCTS_LIMIT),
        },
    )
}

/// 5. Regional performance, revenue descending, with revenue share.
pub fn regional_performance(rows: &[JoinedRow]) -> AggregateTable {
    let mut table = aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::Region,
            columns: vec![
                ("Orders", Reduction::CountDistinct(IdField::TransactionId)),
                ("Units", Reduction::Sum(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
                ("Discount", Reduction::Sum(NumField::DiscountAmount)),
            ],
            sort: SortOrder::ByColumnDesc("Revenue"),
            limit: None,
        },
    );
    table.derive("Avg_Order_Value", |r| r.get("Revenue") / r.get("Orders"));
    let total_revenue = table.column_sum("Revenue");
    table.derive("Revenue_Share_%", move |r| {
        r.get("Revenue") / total_revenue * 100.0
    });
    table
}

/// 6. Price point analysis, bucket-definition order.
pub fn price_points(rows: &[JoinedRow]) -> AggregateTable {
    aggregate(
        rows,
        &AggregateSpec {
            key: GroupKey::PriceRange,
            columns: vec![
                ("Products", Reduction::CountDistinct(IdField::ProductId)),
                ("Total_Units", Reduction::Sum(NumField::Quantity)),
                ("Avg_Qty_Per_Order", Reduction::Mean(NumField::Quantity)),
                ("Revenue", Reduction::Sum(NumField::TotalAmount)),
            ],
            sort: SortOrder::Fixed(&PRICE_RANGE_ORDER),
            limit: None,
        },
    )
}

// ============================================================================
// CORRELATION
// ============================================================================

const CORRELATION_FIELDS: [(&str, NumField); 5] = [
    ("quantity", NumField::Quantity),
    ("sale_price", NumField::SalePrice),
    ("discount_percent", NumField::DiscountPercent),
    ("rating", NumField::Rating),
    ("total_amount", NumField::TotalAmount),
];

/// Pearson correlation matrix over the five numeric sales metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

/// 7. Correlation over {quantity, sale_price, discount_percent, rating,
/// total_amount}, pairwise-complete: rows missing either value of a pair
/// (unmatched products have no rating) are skipped for that pair only.
pub fn correlation_matrix(rows: &[JoinedRow]) -> CorrelationMatrix {
    let labels: Vec<&'static str> = CORRELATION_FIELDS.iter().map(|(name, _)| *name).collect();
    let values = CORRELATION_FIELDS
        .iter()
        .map(|(_, a)| {
            CORRELATION_FIELDS
                .iter()
                .map(|(_, b)| pearson(rows, *a, *b))
                .collect()
        })
        .collect();

    CorrelationMatrix { labels, values }
}

fn pearson(rows: &[JoinedRow], a: NumField, b: NumField) -> f64 {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| Some((a.value(row)?, b.value(row)?)))
        .collect();
    let n = pairs.len() as f64;
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

// ============================================================================
// TESTS
// ============================================================================
