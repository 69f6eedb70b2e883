//! s3frame: run an S3 Select query over CSV objects and print the table.
//!
//! One `--key` loads a single object; two keys load both and merge them
//! sorted by `--sort-column`.

use std::io;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use s3frame::{
    QueryExecutor, S3SelectClient, SelectConfig, SelectRequest, TableLoader, DEFAULT_SEPARATOR,
    DEFAULT_SORT_COLUMN, SELECT_ALL,
};

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
}

/// Pull filtered rows out of CSV objects with S3 Select.
#[derive(Parser, Debug)]
#[command(name = "s3frame", version, about)]
struct Cli {
    /// Bucket holding the objects.
    #[arg(long, env = "S3_SELECT_BUCKET")]
    bucket: Option<String>,

    /// Object key; pass twice to merge two sources.
    #[arg(long = "key", required = true, num_args = 1)]
    keys: Vec<String>,

    /// Column header line prepended to the selected rows.
    #[arg(long)]
    header: String,

    /// S3 Select SQL expression.
    #[arg(long, default_value = SELECT_ALL)]
    expression: String,

    /// Quote character used in the stored objects.
    #[arg(long, default_value = "\"")]
    quote: String,

    /// Field separator for parsing the selected rows.
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    separator: String,

    /// Column the merged table is sorted by.
    #[arg(long, default_value = DEFAULT_SORT_COLUMN)]
    sort_column: String,

    /// How to print the result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SelectConfig::from_env();

    let bucket = cli
        .bucket
        .clone()
        .or_else(|| config.default_bucket.clone())
        .context("no bucket given: pass --bucket or set S3_SELECT_BUCKET")?;

    let client = S3SelectClient::new(&config).await;
    let executor = QueryExecutor::new(client).with_progress_interval(config.progress_interval);
    let loader = TableLoader::new(executor);

    let request = SelectRequest::new(&bucket, &cli.keys[0], &cli.expression, &cli.quote);

    let table = match cli.keys.as_slice() {
        [_] => loader
            .load(&request, &cli.header, &cli.separator)
            .await
            .with_context(|| format!("failed to load s3://{}/{}", bucket, cli.keys[0]))?,
        [_, second] => loader
            .load_merged(&request, second, &cli.header, &cli.separator, &cli.sort_column)
            .await
            .with_context(|| {
                format!("failed to merge s3://{}/{} and {}", bucket, cli.keys[0], second)
            })?,
        _ => bail!("expected one or two --key values, got {}", cli.keys.len()),
    };

    info!(rows = table.num_rows(), columns = table.num_columns(), "Table ready");

    match cli.format {
        OutputFormat::Table => println!("{table}"),
        OutputFormat::Csv => table
            .write_csv(io::stdout().lock())
            .context("failed to write CSV to stdout")?,
    }

    Ok(())
}
