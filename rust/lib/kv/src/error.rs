use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("value at {0} is not an integer")]
    NotAnInteger(String),

    #[error("counter at {0} would overflow")]
    Overflow(String),
}

impl KVError {
    pub(crate) fn storage(e: impl ToString) -> Self {
        KVError::Storage(e.to_string())
    }
}
