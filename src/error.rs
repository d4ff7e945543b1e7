use thiserror::Error;

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;

/// Failures of a single page extraction. None of these are retried; the
/// caller loses the whole page's rows when one is returned.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("http {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{table} table (index {index}) not found; page has {found} tables")]
    MissingTable {
        table: &'static str,
        index: usize,
        found: usize,
    },

    #[error("malformed {table} table: {reason}")]
    Malformed { table: &'static str, reason: String },

    #[error("column {column}: cannot read {value:?} as a number")]
    Coercion { column: String, value: String },
}

impl ScrapeError {
    pub fn malformed(table: &'static str, reason: impl Into<String>) -> Self {
        ScrapeError::Malformed {
            table,
            reason: reason.into(),
        }
    }

    pub fn coercion(column: impl Into<String>, value: impl Into<String>) -> Self {
        ScrapeError::Coercion {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column {0} already exists")]
    DuplicateColumn(String),

    #[error("columns differ: expected [{}], got [{}]", .expected.join(", "), .got.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("column {column} has {got} values for {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}
