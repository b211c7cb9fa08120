// Error taxonomy for the analysis pipeline
//
// Only the load stage can fail. Once the joined table exists every later
// stage is a total function: division by zero in a derived ratio yields NaN
// and is carried through rather than raised, and a duplicate join key is a
// logged warning (first match wins), not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading one of the two source CSV files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("{}: malformed record at line {line}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("{}: file contains no data rows", path.display())]
    Empty { path: PathBuf },
}
