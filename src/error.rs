use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("record store error: {0}")]
    Io(#[from] std::io::Error),
    #[error("value '{name}' has unexpected data '{value}'")]
    Conversion { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum GuidError {
    #[error("malformed identifier '{0}'")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for uninstaller: {0}")]
    Wait(#[source] std::io::Error),
}
