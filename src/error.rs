use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Resource Error: {0}")]
    Resource(String),

    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Params Error: {0}")]
    Params(#[from] serde_json::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn resource<S: Into<String>>(msg: S) -> Self {
        Error::Resource(msg.into())
    }

    /// Every failure terminates the process with the same code; operator
    /// cancellation is not an error and is reported separately.
    #[inline]
    pub fn exit_code(&self) -> i32 {
        2
    }
}

pub type Result<T> = std::result::Result<T, Error>;
