use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to open stimuli {path}: {source}")]
    StimuliOpen { path: PathBuf, source: csv::Error },

    #[error("bad stimulus row {row}: {source}")]
    StimulusRow { row: usize, source: csv::Error },

    #[error("failed to create output {path}: {source}")]
    OutputCreate { path: PathBuf, source: io::Error },

    #[error("failed to write record: {0}")]
    Record(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
