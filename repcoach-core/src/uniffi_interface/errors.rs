use thiserror::Error as ThisError;
use uniffi::Error;

#[derive(Debug, ThisError, Error)]
#[non_exhaustive]
pub enum CoachError {
    #[error("error: {0}")]
    Common(String),
}

impl From<anyhow::Error> for CoachError {
    fn from(e: anyhow::Error) -> Self {
        CoachError::Common(format!("{:#}", e))
    }
}

impl From<String> for CoachError {
    fn from(s: String) -> Self {
        CoachError::Common(s)
    }
}

impl From<&str> for CoachError {
    fn from(s: &str) -> Self {
        CoachError::Common(s.to_string())
    }
}
