// Error type shared by the library layer. Each variant is one failure kind
// the console layer reports separately.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not open {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("response has no \"{0}\" field")]
    MissingField(&'static str),

    #[error("YAML error in config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the server rejected the credential.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            Error::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}
