//! Common error type.
//!

use crate::runinfo::{remote::RemoteError, stdio::StdStream};

#[derive(Debug, thiserror::Error)]
pub enum RunInfoError {
    /// The factory could not instantiate the automation object.
    #[error("could not create {prog_id}: {source}")]
    Creation {
        prog_id: String,
        #[source]
        source: RemoteError,
    },

    /// `release()` was called on a handle that no longer holds its reference.
    #[error("ContainerRunInfo is already released")]
    AlreadyReleased,

    /// An operation was attempted after the handle was released.
    #[error("ContainerRunInfo is released")]
    ReleasedHandle,

    /// A property or method call on the remote object failed.
    #[error("remote call {member} failed: {source}")]
    RemoteCall {
        member: String,
        #[source]
        source: RemoteError,
    },

    /// The stream could not be redirected or its pipe could not be opened.
    #[error("could not redirect {stream}: {cause}")]
    Redirection {
        stream: StdStream,
        #[source]
        cause: RedirectionCause,
    },
}

/// Why a stream redirection failed.
#[derive(Debug, thiserror::Error)]
pub enum RedirectionCause {
    #[error("remote call failed: {0}")]
    Remote(RemoteError),

    #[error("pipe connection failed: {0}")]
    Dial(std::io::Error),

    #[error("stream was already redirected on this handle")]
    AlreadyRedirected,

    #[error("expected a pipe name, received {0}")]
    UnexpectedValue(&'static str),
}

impl RunInfoError {
    pub(crate) fn remote_call(member: &str, source: RemoteError) -> Self {
        RunInfoError::RemoteCall { member: member.to_string(), source }
    }

    pub(crate) fn redirection(stream: StdStream, cause: RedirectionCause) -> Self {
        RunInfoError::Redirection { stream, cause }
    }
}

impl From<RunInfoError> for std::io::Error {
    fn from(e: RunInfoError) -> Self {
        let kind = match &e {
            RunInfoError::Creation { .. } => std::io::ErrorKind::NotFound,
            RunInfoError::AlreadyReleased | RunInfoError::ReleasedHandle => {
                std::io::ErrorKind::InvalidInput
            }
            RunInfoError::RemoteCall { .. } => std::io::ErrorKind::Other,
            RunInfoError::Redirection { cause: RedirectionCause::Dial(d), .. } => d.kind(),
            RunInfoError::Redirection { .. } => std::io::ErrorKind::BrokenPipe,
        };
        std::io::Error::new(kind, e)
    }
}
