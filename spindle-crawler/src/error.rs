use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("WebDriver command failed: {0}")]
    WebDriverError(#[from] fantoccini::error::CmdError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("data URL decode failed: {0}")]
    DecodeError(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
