use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while setting up a simulation.
///
/// The per-frame simulation itself never fails; these only come out of
/// configuration loading and strict name parsing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("unknown explosion type: {0}")]
    UnknownExplosionType(String),
}

pub type Result<T> = std::result::Result<T, Error>;
