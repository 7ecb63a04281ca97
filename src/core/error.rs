use thiserror::Error;

#[derive(Error, Debug)]
pub enum BestowError {
    #[error("Failed to read rules file {path}: {source}")]
    RuleFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid rules TOML: {0}")]
    RuleToml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BestowError>;
