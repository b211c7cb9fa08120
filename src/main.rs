// Basket Insights - sales and pricing analysis over CSV exports
//
// Usage: basket-insights [products.csv] [transactions.csv]
//
// Loads the two exports, left-joins transactions onto the catalogue, runs
// the seven aggregation passes, prints every table plus the closing summary
// and hands one chart intent per pass to the renderer.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use basket_insights::{
    analysis, render_correlation, render_overview, render_table, section_banner, ChartData,
    ChartKind, ChartRenderer, ChartRequest, JoinedRow, SpecFileRenderer, SummaryStats,
};
use basket_insights::{join_transactions, load_products, load_transactions};

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let products_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("products.csv"));
    let transactions_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("transactions.csv"));

    run(&products_path, &transactions_path)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(products_path: &Path, transactions_path: &Path) -> Result<()> {
    println!("Loading datasets...");
    let products = load_products(products_path).context("loading products")?;
    let transactions = load_transactions(transactions_path).context("loading transactions")?;
    info!(
        products = products.len(),
        transactions = transactions.len(),
        "datasets loaded"
    );

    println!("Merging datasets...");
    let rows = join_transactions(&products, &transactions)?;
    println!("{}", render_overview(&rows));

    let renderer = SpecFileRenderer;
    let out_dir = Path::new(".");
    let mut artifacts = Vec::new();

    for section in sections(&rows, out_dir) {
        println!("{}", section_banner(section.heading));
        println!("\n{}", section.body);

        renderer.render(&section.chart)?;
        let artifact = section.chart.artifact_name();
        println!("\nVisualization saved: {}", artifact);
        artifacts.push(artifact);
    }

    let summary = SummaryStats::compute(&rows, &products);
    println!("{}", section_banner("OVERALL SUMMARY STATISTICS"));
    println!("\n{}", summary.render());

    println!("{}", section_banner("ANALYSIS COMPLETE!"));
    println!("\nGenerated Files:");
    for artifact in &artifacts {
        println!("- {}", artifact);
    }

    Ok(())
}

struct Section {
    heading: &'static str,
    body: String,
    chart: ChartRequest,
}

/// The seven passes in report order. Each one is independent of the others.
fn sections(rows: &[JoinedRow], out_dir: &Path) -> Vec<Section> {
    let category = analysis::category_sales(rows);
    let monthly = analysis::monthly_sales(rows);
    let discount = analysis::discount_impact(rows);
    let top = analysis::top_products(rows);
    let regional = analysis::regional_performance(rows);
    let price = analysis::price_points(rows);
    let correlation = analysis::correlation_matrix(rows);

    vec![
        Section {
            heading: "1. CATEGORY-WISE SALES ANALYSIS",
            body: render_table(&category),
            chart: ChartRequest::new(
                ChartKind::HorizontalBar,
                "Category-Wise Sales Performance",
                out_dir,
                "category_analysis",
                ChartData::Table(category),
            ),
        },
        Section {
            heading: "2. MONTHLY SALES TREND",
            body: render_table(&monthly),
            chart: ChartRequest::new(
                ChartKind::Line,
                "Monthly Sales Trends",
                out_dir,
                "monthly_trends",
                ChartData::Table(monthly),
            ),
        },
        Section {
            heading: "3. DISCOUNT IMPACT ANALYSIS",
            body: render_table(&discount),
            chart: ChartRequest::new(
                ChartKind::Bar,
                "Discount Impact on Sales Performance",
                out_dir,
                "discount_impact",
                ChartData::Table(discount),
            ),
        },
        Section {
            heading: "4. TOP 15 PRODUCTS BY REVENUE",
            body: render_table(&top),
            chart: ChartRequest::new(
                ChartKind::HorizontalBar,
                "Top 15 Products by Revenue",
                out_dir,
                "top_products",
                ChartData::Table(top),
            ),
        },
        Section {
            heading: "5. REGIONAL PERFORMANCE ANALYSIS",
            body: render_table(&regional),
            chart: ChartRequest::new(
                ChartKind::Pie,
                "Regional Sales Performance",
                out_dir,
                "regional_performance",
                ChartData::Table(regional),
            ),
        },
        Section {
            heading: "6. PRICE POINT ANALYSIS",
            body: render_table(&price),
            chart: ChartRequest::new(
                ChartKind::Bar,
                "Revenue Distribution by Price Range",
                out_dir,
                "price_analysis",
                ChartData::Table(price),
            ),
        },
        Section {
            heading: "7. CORRELATION ANALYSIS",
            body: render_correlation(&correlation),
            chart: ChartRequest::new(
                ChartKind::Heatmap,
                "Correlation Matrix: Sales Metrics",
                out_dir,
                "correlation_heatmap",
                ChartData::Matrix(correlation),
            ),
        },
    ]
}
