use std::string::FromUtf8Error;

/// Broad categories every [`Error`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Socket creation, configuration or transmit failed. Never retried.
    Socket,
    /// Every transport attempt went unanswered.
    TimedOut,
    /// The caller supplied something unusable. Rejected before any I/O.
    InvalidParameter,
    /// A reply could not be read at all.
    ParseFailure,
}

/// All error types that can occur when talking to WiZ bulbs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// No reply arrived within the retry schedule.
    #[error("no reply after {attempts} attempts")]
    TimedOut { attempts: u32 },

    /// The address is not a valid dotted IPv4 address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The composed message does not fit in the outgoing buffer.
    #[error("message of {len} bytes exceeds capacity of {capacity} bytes")]
    MessageTooLarge { len: usize, capacity: usize },

    /// Failed to parse a [`crate::Color`] from a hex string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),

    /// Attempted to apply a [`crate::PilotBuilder`] with no fields set.
    #[error("invalid pilot; no fields set")]
    NoAttribute,

    /// The UDP reply from a bulb contained invalid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    /// The reply was readable but structurally unusable.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid address error
    pub fn invalid_address(addr: &str) -> Self {
        Error::InvalidAddress(addr.to_string())
    }

    /// The category this error belongs to.
    ///
    /// # Examples
    ///
    /// ```
    /// use cwiz::{Error, ErrorKind};
    ///
    /// assert_eq!(Error::NoAttribute.kind(), ErrorKind::InvalidParameter);
    /// assert_eq!(Error::TimedOut { attempts: 6 }.kind(), ErrorKind::TimedOut);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Socket { .. } => ErrorKind::Socket,
            Error::TimedOut { .. } => ErrorKind::TimedOut,
            Error::InvalidAddress(_)
            | Error::MessageTooLarge { .. }
            | Error::InvalidColorString(_)
            | Error::NoAttribute => ErrorKind::InvalidParameter,
            Error::Utf8Decode(_) | Error::MalformedReply(_) => ErrorKind::ParseFailure,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
