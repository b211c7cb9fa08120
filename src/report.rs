// Reporter - console rendering of aggregate tables and the run summary
//
// Pure functions from the computed tables to text. The exact layout is
// cosmetic; the numbers are the contract.

use crate::aggregate::{round2, AggregateTable};
use crate::analysis::CorrelationMatrix;
use crate::join::JoinedRow;
use crate::loader::ProductRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// ============================================================================
// SECTION LAYOUT
// ============================================================================

const BANNER_WIDTH: usize = 60;

/// Section banner, `=` rule above and below the title.
pub fn section_banner(title: &str) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    format!("\n{}\n{}\n{}", rule, title, rule)
}

/// Dataset overview printed right after the join.
pub fn render_overview(rows: &[JoinedRow]) -> String {
    let transactions: HashSet<&str> = rows.iter().map(|r| r.transaction_id.as_str()).collect();
    let products: HashSet<&str> = rows.iter().map(|r| r.product_id.as_str()).collect();
    let revenue: f64 = rows.iter().map(|r| r.total_amount).sum();

    let mut out = format!("\nDataset Rows: {}\n", format_count(rows.len() as u64));
    if let (Some(min), Some(max)) = (
        rows.iter().map(|r| r.date).min(),
        rows.iter().map(|r| r.date).max(),
    ) {
        out.push_str(&format!("Date Range: {} to {}\n", min, max));
    }
    out.push_str(&format!(
        "Total Transactions: {}\n",
        format_count(transactions.len() as u64)
    ));
    out.push_str(&format!(
        "Total Products: {}\n",
        format_count(products.len() as u64)
    ));
    out.push_str(&format!("Total Revenue: ₹{}", format_amount(revenue)));
    out
}

// ============================================================================
// TABLE DUMP
// ============================================================================

/// Render an aggregate table with aligned columns: keys left, values right.
pub fn render_table(table: &AggregateTable) -> String {
    let mut headers: Vec<String> = table.key_columns.iter().map(|c| c.to_string()).collect();
    headers.extend(table.columns.iter().map(|c| c.to_string()));

    let mut grid: Vec<Vec<String>> = vec![headers];
    for row in &table.rows {
        let mut cells: Vec<String> = row.key.clone();
        cells.extend(row.values.iter().map(|v| format_value(*v)));
        grid.push(cells);
    }

    let column_count = grid[0].len();
    let widths: Vec<usize> = (0..column_count)
        .map(|i| {
            grid.iter()
                .map(|cells| cells[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let key_count = table.key_columns.len();
    let mut lines = Vec::with_capacity(grid.len());
    for cells in &grid {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i < key_count {
                    format!("{:<width$}", cell, width = widths[i])
                } else {
                    format!("{:>width$}", cell, width = widths[i])
                }
            })
            .collect();
        lines.push(line.join("  ").trim_end().to_string());
    }
    lines.join("\n")
}

/// Render the correlation matrix with row and column labels.
pub fn render_correlation(corr: &CorrelationMatrix) -> String {
    let label_width = corr
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let cell_width = label_width.max(6);

    let mut lines = Vec::with_capacity(corr.labels.len() + 1);
    let header: Vec<String> = corr
        .labels
        .iter()
        .map(|l| format!("{:>cell_width$}", l))
        .collect();
    lines.push(format!(
        "{:label_width$}  {}",
        "",
        header.join("  ")
    ));

    for (label, row) in corr.labels.iter().zip(&corr.values) {
        let cells: Vec<String> = row
            .iter()
            .map(|v| {
                if v.is_nan() {
                    format!("{:>cell_width$}", "NaN")
                } else {
                    format!("{:>cell_width$.3}", v)
                }
            })
            .collect();
        lines.push(format!("{:<label_width$}  {}", label, cells.join("  ")));
    }
    lines.join("\n")
}

// ============================================================================
// SUMMARY
// ============================================================================

/// The nine closing scalar metrics of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_revenue: f64,
    pub total_discount: f64,
    pub transaction_count: u64,
    pub unit_count: u64,
    pub average_order_value: f64,
    pub average_discount_rate: f64,
    pub unique_products_sold: u64,
    pub unique_customers: u64,
    /// Averaged over the products catalogue, so products with zero sales
    /// still count.
    pub average_product_rating: f64,
}

impl SummaryStats {
    pub fn compute(rows: &[JoinedRow], products: &[ProductRecord]) -> Self {
        let total_revenue: f64 = rows.iter().map(|r| r.total_amount).sum();
        let total_discount: f64 = rows.iter().map(|r| r.discount_amount).sum();
        let unit_count: u64 = rows.iter().map(|r| r.quantity as u64).sum();

        // Order value = total of the order, so multi-row transactions are
        // summed per transaction_id before averaging
        let mut per_transaction: HashMap<&str, f64> = HashMap::new();
        for row in rows {
            *per_transaction.entry(row.transaction_id.as_str()).or_default() += row.total_amount;
        }
        let transaction_count = per_transaction.len() as u64;
        let average_order_value = if per_transaction.is_empty() {
            f64::NAN
        } else {
            per_transaction.values().sum::<f64>() / per_transaction.len() as f64
        };

        let unique_products: HashSet<&str> =
            rows.iter().map(|r| r.product_id.as_str()).collect();
        let unique_customers: HashSet<&str> =
            rows.iter().map(|r| r.customer_id.as_str()).collect();

        let average_product_rating = if products.is_empty() {
            f64::NAN
        } else {
            products.iter().map(|p| p.rating).sum::<f64>() / products.len() as f64
        };

        SummaryStats {
            total_revenue,
            total_discount,
            transaction_count,
            unit_count,
            average_order_value,
            average_discount_rate: total_discount / (total_revenue + total_discount) * 100.0,
            unique_products_sold: unique_products.len() as u64,
            unique_customers: unique_customers.len() as u64,
            average_product_rating,
        }
    }

    pub fn render(&self) -> String {
        [
            format!("Total Revenue: ₹{}", format_amount(self.total_revenue)),
            format!("Total Discount Given: ₹{}", format_amount(self.total_discount)),
            format!(
                "Total Transactions: {}",
                format_count(self.transaction_count)
            ),
            format!("Total Units Sold: {}", format_count(self.unit_count)),
            format!("Average Order Value: ₹{:.2}", self.average_order_value),
            format!("Average Discount Rate: {:.2}%", self.average_discount_rate),
            format!(
                "Unique Products Sold: {}",
                format_count(self.unique_products_sold)
            ),
            format!("Unique Customers: {}", format_count(self.unique_customers)),
            format!(
                "Average Product Rating: {:.2}",
                self.average_product_rating
            ),
        ]
        .join("\n")
    }
}

// ============================================================================
// NUMBER FORMATTING
// ============================================================================

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", round2(v))
    }
}

/// Two-decimal amount with thousands separators: 1234567.5 -> "1,234,567.50"
pub fn format_amount(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let negative = v < 0.0;
    let rounded = round2(v.abs());
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;
    let sign = if negative { "-" } else { "" };
    format!("{}{}.{:02}", sign, format_count(whole), cents)
}

/// Integer with thousands separators: 1234567 -> "1,234,567"
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::join_transactions;
    use crate::loader::TransactionRecord;

    fn product(id: &str, rating: f64) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            product_name: format!("Product {}", id),
            category: "Snacks".to_string(),
            brand: "TestBrand".to_string(),
            rating,
        }
    }

    fn transaction(id: &str, customer: &str, product_id: &str, total: f64) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            customer_id: customer.to_string(),
            product_id: product_id.to_string(),
            date: "2024-01-05".to_string(),
            quantity: 2,
            sale_price: 40.0,
            discount_percent: 10.0,
            discount_amount: total / 9.0,
            total_amount: total,
            region: "North".to_string(),
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234567.5), "1,234,567.50");
        assert_eq!(format_amount(0.005), "0.01");
        assert_eq!(format_amount(f64::NAN), "NaN");
    }

    #[test]
    fn test_summary_rating_uses_catalogue_not_joined_rows() {
        // P3 never sells, but still counts toward the average rating
        let products = vec![product("P1", 4.0), product("P2", 5.0), product("P3", 3.0)];
        let transactions = vec![
            transaction("T1", "C1", "P1", 90.0),
            transaction("T2", "C2", "P2", 45.0),
        ];
        let rows = join_transactions(&products, &transactions).unwrap();

        let summary = SummaryStats::compute(&rows, &products);
        assert!((summary.average_product_rating - 4.0).abs() < 1e-9);
        assert_eq!(summary.unique_products_sold, 2);
        assert_eq!(summary.unique_customers, 2);
    }

    #[test]
    fn test_average_order_value_groups_by_transaction() {
        let products = vec![product("P1", 4.0), product("P2", 5.0)];
        // T1 spans two rows totalling 120; T2 is a single 60 row
        let transactions = vec![
            transaction("T1", "C1", "P1", 70.0),
            transaction("T1", "C1", "P2", 50.0),
            transaction("T2", "C2", "P1", 60.0),
        ];
        let rows = join_transactions(&products, &transactions).unwrap();

        let summary = SummaryStats::compute(&rows, &products);
        assert_eq!(summary.transaction_count, 2);
        assert!((summary.average_order_value - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_table_alignment() {
        let products = vec![product("P1", 4.0)];
        let transactions = vec![transaction("T1", "C1", "P1", 90.0)];
        let rows = join_transactions(&products, &transactions).unwrap();
        let table = crate::analysis::category_sales(&rows);

        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("category"));
        assert!(lines[0].contains("Revenue"));
        assert!(lines[1].starts_with("Snacks"));
        assert!(lines[1].contains("90.00"));
    }

    #[test]
    fn test_section_banner() {
        let banner = section_banner("1. CATEGORY-WISE SALES ANALYSIS");
        assert!(banner.contains(&"=".repeat(60)));
        assert!(banner.contains("CATEGORY-WISE"));
    }
}
