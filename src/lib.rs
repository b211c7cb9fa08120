// Basket Insights - Core Library
// Exposes the analysis pipeline for the CLI and tests

pub mod aggregate;
pub mod analysis;
pub mod buckets;
pub mod error;
pub mod join;
pub mod loader;
pub mod render;
pub mod report;

// Re-export commonly used types
pub use aggregate::{
    aggregate, AggregateRow, AggregateSpec, AggregateTable, GroupKey, IdField, NumField,
    Reduction, RowView, SortOrder,
};
pub use analysis::{
    category_sales, correlation_matrix, discount_impact, monthly_sales, price_points,
    regional_performance, top_products, CorrelationMatrix, TOP_PRODUCTS_LIMIT,
};
pub use buckets::{discount_bracket, price_range, DISCOUNT_BRACKET_ORDER, PRICE_RANGE_ORDER};
pub use error::DataLoadError;
pub use join::{join_transactions, JoinedRow};
pub use loader::{load_products, load_transactions, ProductRecord, TransactionRecord};
pub use render::{ChartData, ChartKind, ChartRenderer, ChartRequest, NullRenderer, SpecFileRenderer};
pub use report::{
    format_amount, format_count, render_correlation, render_overview, render_table,
    section_banner, SummaryStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
