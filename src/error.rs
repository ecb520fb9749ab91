use thiserror::Error;

#[derive(Error, Debug)]
pub enum Pm2InsomniaError {
    #[error("Failed to load input file: {0}")]
    LoadError(String),

    #[error("Collection schema not recognized: {0}")]
    UnrecognizedSchema(String),

    #[error("Unknown document type: {0}")]
    UnknownDocument(String),

    #[error("Transform configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Conversion task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Pm2InsomniaError {
    /// Short classification used in batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            Pm2InsomniaError::LoadError(_) | Pm2InsomniaError::IoError(_) => "io",
            Pm2InsomniaError::JsonError(_) => "parse",
            Pm2InsomniaError::UnrecognizedSchema(_) => "not recognized",
            Pm2InsomniaError::UnknownDocument(_) => "unknown document",
            Pm2InsomniaError::ConfigError(_) => "config",
            Pm2InsomniaError::InvalidPath(_) => "path",
            Pm2InsomniaError::YamlError(_) => "serialize",
            Pm2InsomniaError::TaskFailed(_) => "task",
        }
    }
}

pub type Result<T> = std::result::Result<T, Pm2InsomniaError>;
