//! Error types for IRC sessions.
//!
//! [`Error`] covers misuse of the command surface, transport failures and
//! malformed inbound lines. [`ParseError`] is the narrower error produced by
//! the line parser and the names-list extractor.

use thiserror::Error;

/// Convenience type alias for Results using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level session errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// `connect()` was called while a connection is pending or live.
    #[error("session is already connected")]
    AlreadyConnected,

    /// A command was issued while the session is not connected.
    #[error("session is not connected")]
    NotConnected,

    /// An inbound line could not be parsed.
    #[error("malformed line: {line:?}")]
    MalformedLine {
        /// The raw line.
        line: String,
        /// The underlying parse error.
        #[source]
        cause: ParseError,
    },

    /// I/O error from the underlying stream.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// TLS setup or handshake failure.
    #[error("tls error: {0}")]
    Tls(String),

    /// Inbound line exceeded the framing limit.
    #[error("line too long: {0} bytes")]
    MessageTooLong(usize),

    /// `connect()` needs a tokio runtime to drive the connection.
    #[error("connect() must be called from within a tokio runtime")]
    NoRuntime,
}

/// Errors encountered when parsing protocol lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// Line was empty after trimming.
    #[error("empty line")]
    EmptyLine,

    /// Line carried a prefix but no command.
    #[error("missing command")]
    MissingCommand,

    /// A names reply had no colon-delimited name list.
    #[error("names reply without a name list")]
    MissingNames,
}

impl Error {
    /// Wrap a parse failure together with the offending line.
    pub fn malformed(line: impl Into<String>, cause: ParseError) -> Self {
        Error::MalformedLine {
            line: line.into(),
            cause,
        }
    }

    /// True for errors raised by the stream rather than by the caller.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Tls(_) | Error::MessageTooLong(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::AlreadyConnected.to_string(), "session is already connected");
        assert_eq!(Error::NotConnected.to_string(), "session is not connected");
        assert_eq!(
            Error::MessageTooLong(9000).to_string(),
            "line too long: 9000 bytes"
        );
    }

    #[test]
    fn test_malformed_source_chaining() {
        let err = Error::malformed("", ParseError::EmptyLine);
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), ParseError::EmptyLine.to_string());
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        let err: Error = io_err.into();

        match err {
            Error::Transport(_) => {}
            _ => panic!("Expected Transport variant"),
        }
        assert!(Error::Tls("handshake".into()).is_transport());
        assert!(!Error::NotConnected.is_transport());
    }
}
