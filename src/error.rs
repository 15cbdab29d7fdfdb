use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Handshake error: {0}")]
    Handshake(String),

    #[error("Serve error: {0}")]
    Serve(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
