//! Logging helpers
//!
//! Consistent messages for table reads.

use std::path::Path;
use std::time::Duration;

/// Log the start of reading a table
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log a completed read with the number of rows kept
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} rows from {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        );
    } else {
        log::info!("Successfully {} {} rows from {}", operation, items, path.display());
    }
}
