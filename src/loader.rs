// CSV Loader - products and transactions exports
//
// Reads the two headered CSV exports into typed, immutable record vectors.
// Extra columns in either file are ignored; the named columns below are the
// join/group contract and renaming them breaks the pipeline.

use crate::error::DataLoadError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// SOURCE RECORDS
// ============================================================================

/// One row of the products catalogue export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub brand: String,
    /// Customer rating, 0.0 - 5.0
    pub rating: f64,
}

/// One row of the transactions export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub customer_id: String,
    pub product_id: String,
    /// Transaction date, `YYYY-MM-DD` (legacy exports use `MM/DD/YYYY`)
    pub date: String,
    pub quantity: u32,
    pub sale_price: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub region: String,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the products catalogue.
pub fn load_products(path: &Path) -> Result<Vec<ProductRecord>, DataLoadError> {
    read_records(path)
}

/// Load the transactions export.
pub fn load_transactions(path: &Path) -> Result<Vec<TransactionRecord>, DataLoadError> {
    read_records(path)
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::Missing {
            path: path.to_path_buf(),
        });
    }

    let mut rdr = csv::Reader::from_path(path).map_err(|e| malformed(path, &e))?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|e| malformed(path, &e))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(DataLoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(records)
}

fn malformed(path: &Path, err: &csv::Error) -> DataLoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    DataLoadError::Malformed {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_products_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "products.csv",
            "product_id,product_name,category,brand,rating\n\
             P001,Salted Peanuts,Snacks,CrunchCo,4.2\n\
             P002,Toned Milk 1L,Dairy,FarmFresh,4.6\n",
        );

        let products = load_products(&path).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product_id, "P001");
        assert_eq!(products[1].category, "Dairy");
        assert!((products[1].rating - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "products.csv",
            "product_id,product_name,category,brand,rating,supplier\n\
             P001,Salted Peanuts,Snacks,CrunchCo,4.2,Acme\n",
        );

        let products = load_products(&path).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].brand, "CrunchCo");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_products(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Missing { .. }));
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "products.csv",
            "product_id,product_name,category,brand,rating\n\
             P001,Salted Peanuts,Snacks,CrunchCo,4.2\n\
             P002,Toned Milk 1L,Dairy\n",
        );

        let err = load_products(&path).unwrap_err();
        match err {
            DataLoadError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_field_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "transactions.csv",
            "transaction_id,customer_id,product_id,date,quantity,sale_price,discount_percent,discount_amount,total_amount,region\n\
             T1,C1,P001,2024-01-05,two,40.0,0,0,80.0,North\n",
        );

        let err = load_transactions(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { .. }));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "products.csv",
            "product_id,product_name,category,brand,rating\n",
        );

        let err = load_products(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Empty { .. }));
    }
}
