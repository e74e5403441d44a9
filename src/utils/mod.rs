//! Shared utilities: table input, Arrow value extraction, logging and progress

pub mod arrow_utils;
pub mod io;
pub mod logging;

pub use io::{TableFormat, column_by_name, read_table};
