// SPDX-License-Identifier: MIT

//! Standard stream redirection through named pipes.

use std::fmt::Display;

/// Local machine named pipe namespace.
pub const PIPE_PREFIX: &str = r"\\.\pipe\";

/// The standard streams of the contained process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    // The data flows from the parent to the contained process.
    Stdin,
    // The data flows from the contained process to the parent.
    Stdout,
    Stderr,
}

impl StdStream {
    pub const ALL: [StdStream; 3] = [StdStream::Stdin, StdStream::Stdout, StdStream::Stderr];

    /// The remote method that enables the redirection and returns the pipe name.
    pub fn redirect_method(&self) -> &'static str {
        match self {
            StdStream::Stdin => "RedirectStdin",
            StdStream::Stdout => "RedirectStdout",
            StdStream::Stderr => "RedirectStderr",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            StdStream::Stdin => 0b001,
            StdStream::Stdout => 0b010,
            StdStream::Stderr => 0b100,
        }
    }
}

impl Display for StdStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StdStream::Stdin => "stdin",
            StdStream::Stdout => "stdout",
            StdStream::Stderr => "stderr",
        })
    }
}


/// Tracks which streams a handle has already redirected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StdStreamSet(u8);

impl StdStreamSet {
    pub fn contains(&self, stream: StdStream) -> bool {
        self.0 & stream.bit() != 0
    }

    pub fn insert(&mut self, stream: StdStream) {
        self.0 |= stream.bit();
    }
}


/// Build the endpoint address for the pipe name returned by the remote object.
pub fn pipe_path(name: &str) -> String {
    format!("{PIPE_PREFIX}{name}")
}

/// Opens a client connection to a named pipe endpoint.
///
/// Dialing blocks until the connection is made or fails; there is no timeout.
pub trait PipeDialer {
    type Stream: std::io::Read + std::io::Write + Send + 'static;

    fn dial(&self, path: &str) -> Result<Self::Stream, std::io::Error>;
}
