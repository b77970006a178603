use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("Can't retrieve the feed: {0}")]
    Retrieval(String),

    #[error("Can't parse the feed: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for RatesError {
    fn from(e: reqwest::Error) -> Self {
        RatesError::Retrieval(e.to_string())
    }
}

impl From<quick_xml::de::DeError> for RatesError {
    fn from(e: quick_xml::de::DeError) -> Self {
        RatesError::Parse(e.to_string())
    }
}

impl From<rust_decimal::Error> for RatesError {
    fn from(e: rust_decimal::Error) -> Self {
        RatesError::Parse(e.to_string())
    }
}

impl From<sqlx::Error> for RatesError {
    fn from(e: sqlx::Error) -> Self {
        RatesError::Store(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for RatesError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        RatesError::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RatesError>;
