use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RigupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("{program} exited with status {code}")]
    Installer { program: String, code: i32 },

    #[error("Expected artifact missing after install: {0}")]
    MissingArtifact(PathBuf),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Dialog error: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("Task error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RigupError>;
