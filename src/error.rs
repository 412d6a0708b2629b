use reqwest::StatusCode;
use std::fmt::{Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    // -- Config
    ConfigMissingEnv(&'static str),
    ConfigWrongFormat(&'static str),

    // -- AmoCRM
    Transport(reqwest::Error),
    UpstreamStatus {
        path: String,
        status: StatusCode,
    },
    Decode {
        path: String,
        source: serde_json::Error,
    },
    OAuthDisabled,

    // -- Pipeline boundary
    FetchFailed,

    Io(std::io::Error),
}

// region:    ---From

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Transport(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

// endregion: ---From

// region:    --- Error boilerplate
impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UpstreamStatus { path, status } => {
                write!(f, "amoCRM responded {status} for {path}")
            }
            Error::Decode { path, source } => {
                write!(f, "malformed amoCRM response for {path}: {source}")
            }
            Error::FetchFailed => {
                write!(f, "Something went wrong during fetch! Please try again later.")
            }
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {}
// endregion: --- Error boilerplate
