//! Tests for dual-source loading and merging.

use s3frame::*;

const BUCKET: &str = "alarm-exports";
const ESIGN: &str = "alms_esign.csv";
const NOESIGN: &str = "alms_noesign.csv";
const HEADER: &str = "ALARM_ID,TIMESTAMP_IN";

fn service() -> ScriptedService {
    ScriptedService::new()
        .with_events(
            ESIGN,
            vec![
                SelectEvent::records("A2,2024-03-01 10:00:02\n"),
                SelectEvent::records("A1,2024-03-01 10:00:01\n"),
                SelectEvent::End,
            ],
        )
        .with_events(
            NOESIGN,
            vec![SelectEvent::records("B3,2024-03-01 10:00:03\n"), SelectEvent::End],
        )
}

#[tokio::test]
async fn test_load_merged_orders_by_timestamp() {
    let loader = TableLoader::new(QueryExecutor::new(service()));
    let first = SelectRequest::new(BUCKET, ESIGN, SELECT_ALL, "\"");

    let table = loader
        .load_merged(&first, NOESIGN, HEADER, ",", DEFAULT_SORT_COLUMN)
        .await
        .unwrap();

    assert_eq!(table.num_rows(), 3);
    let order: Vec<_> = (0..table.num_rows())
        .map(|i| table.value(i, "TIMESTAMP_IN").unwrap().to_string())
        .collect();
    assert_eq!(
        order,
        vec!["2024-03-01 10:00:01", "2024-03-01 10:00:02", "2024-03-01 10:00:03"]
    );
    assert_eq!(table.value(0, "ALARM_ID"), Some("A1"));
    assert_eq!(table.value(2, "ALARM_ID"), Some("B3"));
}

#[tokio::test]
async fn test_load_merged_queries_sources_in_order() {
    let loader = TableLoader::new(QueryExecutor::new(service()));
    let first = SelectRequest::new(BUCKET, ESIGN, SELECT_ALL, "'");

    loader
        .load_merged(&first, NOESIGN, HEADER, ",", DEFAULT_SORT_COLUMN)
        .await
        .unwrap();

    let seen = loader.executor().service().requests();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].key(), ESIGN);
    assert_eq!(seen[1].key(), NOESIGN);
    assert_eq!(seen[1].expression(), SELECT_ALL);
    assert_eq!(seen[1].quote_character(), "'");
}

#[tokio::test]
async fn test_load_merged_stops_on_first_failure() {
    let service = ScriptedService::new()
        .with_events(ESIGN, vec![SelectEvent::records("A1,2024-03-01\n")])
        .with_events(NOESIGN, vec![SelectEvent::End]);
    let loader = TableLoader::new(QueryExecutor::new(service));
    let first = SelectRequest::new(BUCKET, ESIGN, SELECT_ALL, "\"");

    let err = loader
        .load_merged(&first, NOESIGN, HEADER, ",", DEFAULT_SORT_COLUMN)
        .await
        .unwrap_err();

    assert!(err.is_incomplete());
    assert_eq!(loader.executor().service().requests().len(), 1);
}

#[tokio::test]
async fn test_load_merged_missing_sort_column() {
    let loader = TableLoader::new(QueryExecutor::new(service()));
    let first = SelectRequest::new(BUCKET, ESIGN, SELECT_ALL, "\"");

    let err = loader
        .load_merged(&first, NOESIGN, HEADER, ",", "TIMESTAMP_OUT")
        .await
        .unwrap_err();

    assert!(matches!(err, SelectError::Merge(_)));
}

#[test]
fn test_merge_sorted_three_tables() {
    let a = parse_csv_table(HEADER, "x,3", b',').unwrap();
    let b = parse_csv_table(HEADER, "y,1", b',').unwrap();
    let c = parse_csv_table(HEADER, "z,2", b',').unwrap();

    let merged = merge_sorted(&[a, b, c], DEFAULT_SORT_COLUMN).unwrap();
    assert_eq!(merged.value(0, "ALARM_ID"), Some("y"));
    assert_eq!(merged.value(1, "ALARM_ID"), Some("z"));
    assert_eq!(merged.value(2, "ALARM_ID"), Some("x"));
}
