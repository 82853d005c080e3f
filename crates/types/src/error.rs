use thiserror::Error;

/// Failure reading contract state
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("rpc transport error: {0}")]
    Transport(String),

    #[error("rpc returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("failed to decode {call} result: {reason}")]
    Decode { call: &'static str, reason: String },

    #[error("request timed out")]
    Timeout,
}

/// Failure obtaining a quote from a swap venue
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("venue {venue} request failed: {reason}")]
    Http { venue: &'static str, reason: String },

    #[error("venue {venue} returned an invalid response: {reason}")]
    InvalidResponse { venue: &'static str, reason: String },

    #[error("venue {venue} does not support {reason}")]
    Unsupported { venue: &'static str, reason: String },

    #[error("venue {venue} has no route")]
    NoRoute { venue: &'static str },

    #[error("contract read failed: {0}")]
    Read(#[from] ReadError),
}
