#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hardware discovery failed: {0}")]
    Discovery(String),

    #[error("temperature sample failed: {0}")]
    Sample(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("actuation failed: {0}")]
    Actuation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn discovery<S: Into<String>>(msg: S) -> Self {
        Error::Discovery(msg.into())
    }

    #[allow(dead_code)]
    pub(crate) fn sample<S: Into<String>>(msg: S) -> Self {
        Error::Sample(msg.into())
    }

    pub(crate) fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Error::InvalidData(msg.into())
    }

    pub(crate) fn actuation<S: Into<String>>(msg: S) -> Self {
        Error::Actuation(msg.into())
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
