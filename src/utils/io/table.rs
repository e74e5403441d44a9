//! Reading CSV and Parquet files into Arrow record batches

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::ArrayRef;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{CohortError, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Default batch size for table reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Rows sampled when inferring CSV column types
const CSV_INFERENCE_ROWS: usize = 10_000;

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

/// Supported on-disk table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// Determine the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet" | "pq") => Ok(Self::Parquet),
            _ => Err(CohortError::invalid_parameter(format!(
                "unsupported table format for {} (expected .csv or .parquet)",
                path.display()
            ))),
        }
    }
}

/// Read a whole table into record batches
///
/// # Arguments
/// * `path` - `.csv` or `.parquet` file
///
/// # Returns
/// All record batches of the table, in file order
pub fn read_table(path: &Path) -> Result<Vec<RecordBatch>> {
    let format = TableFormat::from_path(path)?;
    log_operation_start("Reading table", path);
    let start = Instant::now();

    let batches = match format {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Parquet => read_parquet(path)?,
    };

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));
    Ok(batches)
}

fn read_csv(path: &Path) -> Result<Vec<RecordBatch>> {
    let mut file = File::open(path)?;
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, Some(CSV_INFERENCE_ROWS))?;
    file.rewind()?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build(file)?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE))
        .build()?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Look up a required column, failing with a schema error naming the table
pub fn column_by_name<'a>(batch: &'a RecordBatch, table: &str, name: &str) -> Result<&'a ArrayRef> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| CohortError::missing_column(table, name))?;
    Ok(batch.column(index))
}
