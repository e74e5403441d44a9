//! Tests for loading typed records from CSV and Parquet files

use std::fs::File;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use dementia_cohort::loader::{
    load_cases, load_controls, load_demographics, load_diagnosis_events,
};
use dementia_cohort::{CohortError, Gender, PersonId};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use crate::utils::write_csv;

#[test]
fn test_load_controls_from_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "controls.csv",
        "person_id,gender,age,extra",
        &["101,M,70.5,x".to_string(), "102,Female,66,y".to_string()],
    );

    let controls = load_controls(&path).unwrap();
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[0].person_id, PersonId::from("101"));
    assert_eq!(controls[0].age, 70.5);
    assert_eq!(controls[1].gender, Gender::Female);
    assert_eq!(controls[1].age, 66.0);
}

#[test]
fn test_load_cases_from_parquet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cases.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("person_id", DataType::Utf8, false),
        Field::new("gender", DataType::Utf8, false),
        Field::new("condition_start_age", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["C1", "C2"])),
            Arc::new(StringArray::from(vec!["F", "M"])),
            Arc::new(Float64Array::from(vec![71.0, 64.0])),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let cases = load_cases(&path).unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].person_id, PersonId::from("C1"));
    assert_eq!(cases[0].gender, Gender::Female);
    assert_eq!(cases[1].condition_start_age, 64.0);
}

#[test]
fn test_load_diagnoses_and_demographics() {
    let dir = TempDir::new().unwrap();
    let diagnoses = write_csv(
        dir.path(),
        "dementia.csv",
        "person_id,condition_start_date",
        &["7,2015-03-01".to_string(), "7,2015-06-01".to_string()],
    );
    let demographics = write_csv(
        dir.path(),
        "person.csv",
        "person_id,year_of_birth,month_of_birth,day_of_birth,gender",
        &["7,1940,3,2,F".to_string(), "8,1941,2,30,M".to_string()],
    );

    let events = load_diagnosis_events(&diagnoses).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1].condition_start_date,
        NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
    );

    // The impossible birth date is skipped
    let people = load_demographics(&demographics).unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].person_id, PersonId::from("7"));
    assert_eq!(people[0].birth_date, NaiveDate::from_ymd_opt(1940, 3, 2).unwrap());
}

#[test]
fn test_load_diagnoses_with_timestamp_text() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "dementia.csv",
        "person_id,condition_start_date",
        &[
            "1,2015-03-01 00:00:00".to_string(),
            "1,2015-06-01 14:30:00".to_string(),
        ],
    );

    let events = load_diagnosis_events(&path).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].person_id, PersonId::from("1"));
    assert_eq!(
        events[0].condition_start_date,
        NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()
    );
    assert_eq!(
        events[1].condition_start_date,
        NaiveDate::from_ymd_opt(2015, 6, 1).unwrap()
    );
}

#[test]
fn test_load_diagnoses_with_parquet_timestamps() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dementia.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("person_id", DataType::Int64, false),
        Field::new(
            "condition_start_date",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
    ]));
    // 2015-03-01 13:45:00
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![42])),
            Arc::new(TimestampMillisecondArray::from(vec![1_425_217_500_000])),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let events = load_diagnosis_events(&path).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].person_id, PersonId::from("42"));
    assert_eq!(
        events[0].condition_start_date,
        NaiveDate::from_ymd_opt(2015, 3, 1).unwrap()
    );
}

#[test]
fn test_missing_column_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "controls.csv",
        "person_id,sex,age",
        &["1,M,70".to_string()],
    );

    let err = load_controls(&path).unwrap_err();
    assert!(matches!(err, CohortError::Schema(_)));
    assert!(err.to_string().contains("'gender'"));
}

#[test]
fn test_null_value_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "controls.csv",
        "person_id,gender,age",
        &["1,M,70".to_string(), "2,F,".to_string()],
    );

    let err = load_controls(&path).unwrap_err();
    assert!(matches!(err, CohortError::Schema(_)));
    assert!(err.to_string().contains("row 2"));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "controls.txt", "person_id,gender,age", &[]);
    assert!(matches!(
        load_controls(&path),
        Err(CohortError::InvalidParameter(_))
    ));
}
