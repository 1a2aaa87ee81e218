use std::fmt;

/// Errors a page fetch may return.
///
/// `Clone` so the reconciler can keep the last error in its view state while
/// the original has already been consumed by the aborted pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or transport failure.
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Api { status: u16, message: String },
    /// A response payload could not be decoded.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchError::Api { status, message } => {
                write!(f, "api error status={status}: {message}")
            }
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}
