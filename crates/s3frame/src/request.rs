use serde::{Deserialize, Serialize};

use crate::error::SelectError;

/// Only this suffix is treated as compressed input.
pub const GZIP_SUFFIX: &str = ".tar.gz";

/// Default S3 Select expression when the caller does not supply one.
pub const SELECT_ALL: &str = "SELECT * FROM S3Object";

/// Compression declared in the request's input serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionHint {
    Gzip,
    None,
}

impl CompressionHint {
    /// Infer the hint from an object key. Closed two-value policy: `.tar.gz`
    /// is gzip, everything else (plain `.gz` included) is uncompressed.
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(GZIP_SUFFIX) {
            CompressionHint::Gzip
        } else {
            CompressionHint::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionHint::Gzip => "GZIP",
            CompressionHint::None => "NONE",
        }
    }
}

/// CSV dialect of the stored object.
///
/// The first row is always a header and quoted fields may contain record
/// delimiters; only the quote character varies per object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvDialect {
    pub quote_character: String,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            quote_character: "\"".to_string(),
        }
    }
}

/// One S3 Select query against one object. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectRequest {
    bucket: String,
    key: String,
    expression: String,
    dialect: CsvDialect,
    compression: CompressionHint,
}

impl SelectRequest {
    /// Build a request; the compression hint is derived from `key`.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        expression: impl Into<String>,
        quote_character: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let compression = CompressionHint::from_key(&key);
        Self {
            bucket: bucket.into(),
            key,
            expression: expression.into(),
            dialect: CsvDialect {
                quote_character: quote_character.into(),
            },
            compression,
        }
    }

    /// Same query and dialect against another object in the same bucket.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self::new(
            self.bucket.clone(),
            key,
            self.expression.clone(),
            self.dialect.quote_character.clone(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn dialect(&self) -> &CsvDialect {
        &self.dialect
    }

    pub fn quote_character(&self) -> &str {
        &self.dialect.quote_character
    }

    pub fn compression(&self) -> CompressionHint {
        self.compression
    }
}

/// Convert a one-character separator or quote into the byte the CSV parser wants.
pub(crate) fn single_byte(value: &str, what: &str) -> Result<u8, SelectError> {
    match value.as_bytes() {
        [b] => Ok(*b),
        _ => Err(SelectError::InvalidDialect(format!(
            "{what} must be a single byte, got {value:?}"
        ))),
    }
}
