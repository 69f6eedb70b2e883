//! Live S3 Select test. Requires AWS credentials and these variables:
//! `S3FRAME_TEST_BUCKET`, `S3FRAME_TEST_KEY`, `S3FRAME_TEST_HEADER`.

use std::env;

use s3frame::*;

#[tokio::test]
#[ignore]
async fn test_live_select_first_rows() {
    let bucket = env::var("S3FRAME_TEST_BUCKET").expect("S3FRAME_TEST_BUCKET");
    let key = env::var("S3FRAME_TEST_KEY").expect("S3FRAME_TEST_KEY");
    let header = env::var("S3FRAME_TEST_HEADER").expect("S3FRAME_TEST_HEADER");

    let config = SelectConfig::from_env();
    let client = S3SelectClient::new(&config).await;
    let loader = TableLoader::new(QueryExecutor::new(client));

    let request = SelectRequest::new(bucket, key, "SELECT * FROM S3Object s LIMIT 10", "\"");
    let table = loader.load(&request, &header, ",").await.unwrap();

    assert!(table.num_rows() <= 10);
    assert!(table.num_columns() > 0);
}
