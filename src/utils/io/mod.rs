//! Tabular file input
//!
//! Every input table may be supplied as CSV (with a header row) or as
//! Parquet. Both are decoded into Arrow record batches so the loaders see a
//! single representation.

pub mod table;

pub use table::{DEFAULT_BATCH_SIZE, TableFormat, column_by_name, read_table};
