use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Couldn't read the page number in URL: {url}")]
    MalformedPageParam { url: String },

    #[error("Requested author count must be -1 (unbounded) or non-negative, got {0}")]
    InvalidCount(i64),

    #[error("Request answered with Status-Code {status}, only 429 is retried. Url: {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
