use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssocError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize configuration to '{file}': {source}")]
    ConfigSerializeError {
        source: toml::ser::Error,
        file: String,
    },

    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),

    #[error("No value is associated with key '{key}'")]
    NotAssociated { key: String },

    #[error("Value associated with key '{key}' is a `{stored}`, not a `{requested}`")]
    TypeMismatch {
        key: String,
        stored: &'static str,
        requested: &'static str,
    },
}

pub type AssocResult<T> = Result<T, AssocError>;
