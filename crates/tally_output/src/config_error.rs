use thiserror::Error;

/// Errors raised while configuring stat outputs.
///
/// All of these are startup failures; every variant names the URL or key
/// that caused it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{url}: illegal stat file type '{scheme}'")]
    UnknownScheme { scheme: String, url: String },

    #[error("{url}: '{key}' doesn't have a value")]
    MissingValue { key: String, url: String },

    #[error("{url}: '{key}' has multiple values")]
    DuplicateValue { key: String, url: String },

    #[error("{url}: {value} isn't a valid literal")]
    InvalidLiteral { value: String, url: String },

    #[error("{url}: illegal stat visitor parameter '{key}'")]
    UnknownOption { key: String, url: String },

    #[error("{url}: '{key}' must be {expected}")]
    InvalidOptionType {
        key: String,
        expected: &'static str,
        url: String,
    },

    #[error("{url}: {format} support not enabled at compile time")]
    FormatUnavailable { format: &'static str, url: String },

    #[error("invalid stats settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failed to read stats settings: {0}")]
    Io(#[from] std::io::Error),
}
