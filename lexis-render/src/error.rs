use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no usable font found (tried {})", display_paths(.tried))]
    FontNotFound { tried: Vec<PathBuf> },

    #[error("failed to read font {path}: {source}")]
    FontRead { path: PathBuf, source: io::Error },

    #[error("{path} is not a usable font")]
    FontParse { path: PathBuf },

    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("frame buffer holds {actual} bytes, canvas needs {expected}")]
    BufferSize { expected: usize, actual: usize },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
