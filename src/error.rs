use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoverError {
    #[error("malformed version {0:?}")]
    MalformedVersion(String),

    #[error("{0} is not installed")]
    NotInstalled(String),

    #[error("unable to remove {0} (main)")]
    RemoveMain(String),

    #[error("unexpected `go version` output {0:?}")]
    VersionOutput(String),

    #[error("`{command}` exited with code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("path {0:?} escapes the root directory")]
    PathEscape(String),

    #[error("interrupted")]
    Interrupted,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl GoverError {
    /// Process exit code for this error: a failed delegated subprocess
    /// propagates its own code, a malformed version is a usage error (2),
    /// everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            GoverError::CommandFailed { code, .. } => *code,
            GoverError::MalformedVersion(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, GoverError>;
