//! Tests for TableLoader: header handling, separators and error propagation.

use s3frame::*;

const BUCKET: &str = "alarm-exports";
const KEY: &str = "alarms.csv";

fn loader(events: Vec<SelectEvent>) -> TableLoader<ScriptedService> {
    TableLoader::new(QueryExecutor::new(ScriptedService::new().with_events(KEY, events)))
}

fn request() -> SelectRequest {
    SelectRequest::new(BUCKET, KEY, SELECT_ALL, "\"")
}

#[tokio::test]
async fn test_load_prepends_header() {
    let loader = loader(vec![SelectEvent::records("a,1\nb,2\n"), SelectEvent::End]);

    let table = loader.load(&request(), "col1,col2", ",").await.unwrap();

    assert_eq!(table.column_names(), vec!["col1", "col2"]);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.row(0), Some(vec![Some("a"), Some("1")]));
    assert_eq!(table.row(1), Some(vec![Some("b"), Some("2")]));
}

#[tokio::test]
async fn test_load_with_semicolon_separator() {
    let loader = loader(vec![SelectEvent::records("a;1\n"), SelectEvent::End]);

    let table = loader.load(&request(), "name;value", ";").await.unwrap();
    assert_eq!(table.value(0, "name"), Some("a"));
    assert_eq!(table.value(0, "value"), Some("1"));
}

#[tokio::test]
async fn test_load_empty_result() {
    let loader = loader(vec![SelectEvent::End]);

    let table = loader.load(&request(), "col1,col2", ",").await.unwrap();
    assert!(table.is_empty());
    assert_eq!(table.num_columns(), 2);
}

#[tokio::test]
async fn test_load_incomplete_stream() {
    let loader = loader(vec![SelectEvent::records("a,1\n")]);

    let err = loader.load(&request(), "col1,col2", ",").await.unwrap_err();
    assert!(matches!(err, SelectError::IncompleteStream { events: 1 }));
}

#[tokio::test]
async fn test_load_column_mismatch() {
    let loader = loader(vec![SelectEvent::records("a,1,extra\n"), SelectEvent::End]);

    let err = loader.load(&request(), "col1,col2", ",").await.unwrap_err();
    assert!(matches!(err, SelectError::Parse(_)));
}

#[tokio::test]
async fn test_load_rejects_multi_byte_separator_before_querying() {
    let loader = loader(vec![SelectEvent::End]);

    let err = loader.load(&request(), "col1,col2", "::").await.unwrap_err();
    assert!(matches!(err, SelectError::InvalidDialect(_)));
    assert!(loader.executor().service().requests().is_empty());
}
