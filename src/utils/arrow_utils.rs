//! Value extraction from Arrow arrays
//!
//! Input tables arrive either as Parquet (typed columns) or as CSV with
//! inferred types, so the same logical field may be stored as text, an
//! integer or a float. These helpers read one cell and coerce it to the
//! type the loader needs, returning `None` for nulls and unusable values.

use arrow::array::{
    Array, ArrayRef, Date32Array, Date64Array, Float32Array, Float64Array, Int32Array,
    Int64Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;

/// Date layouts accepted for text columns
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d/%m/%Y"];

/// Extract a cell as text; integer columns are rendered in decimal
pub fn arrow_array_to_string(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Utf8 => {
            let string_array = array.as_any().downcast_ref::<StringArray>()?;
            Some(string_array.value(index).trim().to_string())
        }
        DataType::LargeUtf8 => {
            let string_array = array.as_any().downcast_ref::<LargeStringArray>()?;
            Some(string_array.value(index).trim().to_string())
        }
        // Numeric identifiers are common in registry extracts
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(int_array.value(index).to_string())
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            Some(int_array.value(index).to_string())
        }
        _ => None,
    }
}

/// Extract a cell as a float
pub fn arrow_array_to_f64(array: &ArrayRef, index: usize) -> Option<f64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(f64::from(int_array.value(index)))
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            Some(int_array.value(index) as f64)
        }
        DataType::Float32 => {
            let float_array = array.as_any().downcast_ref::<Float32Array>()?;
            Some(f64::from(float_array.value(index)))
        }
        DataType::Float64 => {
            let float_array = array.as_any().downcast_ref::<Float64Array>()?;
            Some(float_array.value(index))
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            arrow_array_to_string(array, index)?.parse().ok()
        }
        _ => None,
    }
}

/// Extract a cell as an integer; floats are accepted only when integral
pub fn arrow_array_to_i64(array: &ArrayRef, index: usize) -> Option<i64> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Int32 => {
            let int_array = array.as_any().downcast_ref::<Int32Array>()?;
            Some(i64::from(int_array.value(index)))
        }
        DataType::Int64 => {
            let int_array = array.as_any().downcast_ref::<Int64Array>()?;
            Some(int_array.value(index))
        }
        DataType::Float32 | DataType::Float64 => {
            let value = arrow_array_to_f64(array, index)?;
            (value.fract() == 0.0 && value.is_finite()).then_some(value as i64)
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            arrow_array_to_string(array, index)?.parse().ok()
        }
        _ => None,
    }
}

/// Extract a cell as a calendar date
///
/// # Arguments
/// * `array` - Date, timestamp or text column
/// * `index` - Row within the array
///
/// # Returns
/// The date, or `None` for nulls and values that are not dates. Timestamps
/// keep only their date part.
pub fn arrow_array_to_date(array: &ArrayRef, index: usize) -> Option<NaiveDate> {
    if array.is_null(index) {
        return None;
    }

    match array.data_type() {
        DataType::Date32 => {
            let date_array = array.as_any().downcast_ref::<Date32Array>()?;
            date_array.value_as_date(index)
        }
        DataType::Date64 => {
            let date_array = array.as_any().downcast_ref::<Date64Array>()?;
            date_array.value_as_date(index)
        }
        // CSV schema inference turns `YYYY-MM-DD HH:MM:SS` text into timestamps
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => array
                    .as_any()
                    .downcast_ref::<TimestampSecondArray>()?
                    .value_as_datetime(index),
                TimeUnit::Millisecond => array
                    .as_any()
                    .downcast_ref::<TimestampMillisecondArray>()?
                    .value_as_datetime(index),
                TimeUnit::Microsecond => array
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()?
                    .value_as_datetime(index),
                TimeUnit::Nanosecond => array
                    .as_any()
                    .downcast_ref::<TimestampNanosecondArray>()?
                    .value_as_datetime(index),
            };
            datetime.map(|dt| dt.date())
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = arrow_array_to_string(array, index)?;
            // Timestamps written as text keep only their date part
            let date_part = text.split(['T', ' ']).next().unwrap_or(&text);
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        }
        _ => None,
    }
}
