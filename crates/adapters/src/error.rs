use thiserror::Error;

/// Configuration rejected while building a quoter
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{venue} requires a wrapped native token address")]
    MissingWrappedNative { venue: &'static str },

    #[error("unsupported uniswap v3 fee tier {fee}")]
    InvalidFeeTier { fee: u32 },

    #[error("{venue} prices on-chain and requires a contract reader")]
    MissingReader { venue: &'static str },

    #[error("an executor address is required to receive swap output")]
    MissingExecutor,

    #[error("{venue} base url {url:?} is invalid: {reason}")]
    InvalidBaseUrl {
        venue: &'static str,
        url: String,
        reason: String,
    },

    #[error("{venue} address {field} must be non-zero")]
    ZeroAddress {
        venue: &'static str,
        field: &'static str,
    },

    #[error("http client error: {0}")]
    HttpClient(String),
}
