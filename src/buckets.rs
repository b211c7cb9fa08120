// Fixed-boundary buckets for discount depth and price point
//
// Intervals are right-closed, matching the bin edges the report was
// calibrated against: a value sitting exactly on an upper edge belongs to
// the lower bucket. Values outside the outermost edges get no bucket and
// the row is simply excluded from that aggregation.

/// Discount brackets in presentation order.
pub const DISCOUNT_BRACKET_ORDER: [&str; 4] = ["No Discount", "1-10%", "11-20%", "20%+"];

/// Price ranges in presentation order.
pub const PRICE_RANGE_ORDER: [&str; 5] = [
    "Under ₹50",
    "₹50-100",
    "₹100-200",
    "₹200-500",
    "Above ₹500",
];

/// Bucket a discount percentage. Edges: (-1, 0], (0, 10], (10, 20], (20, 100].
pub fn discount_bracket(discount_percent: f64) -> Option<&'static str> {
    bucket(
        discount_percent,
        &[-1.0, 0.0, 10.0, 20.0, 100.0],
        &DISCOUNT_BRACKET_ORDER,
    )
}

/// Bucket a sale price. Edges: (0, 50], (50, 100], (100, 200], (200, 500], (500, 10000].
pub fn price_range(sale_price: f64) -> Option<&'static str> {
    bucket(
        sale_price,
        &[0.0, 50.0, 100.0, 200.0, 500.0, 10000.0],
        &PRICE_RANGE_ORDER,
    )
}

/// Right-closed interval lookup: edges[i] < value <= edges[i + 1].
fn bucket(value: f64, edges: &[f64], labels: &[&'static str]) -> Option<&'static str> {
    debug_assert_eq!(edges.len(), labels.len() + 1);

    if value.is_nan() || value <= edges[0] || value > edges[edges.len() - 1] {
        return None;
    }
    for (i, label) in labels.iter().enumerate() {
        if value > edges[i] && value <= edges[i + 1] {
            return Some(label);
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================
