// SPDX-License-Identifier: MIT

//! Run configuration requests and binding options.

use std::io::{Read, Write};

use crate::runinfo::{
    error::RunInfoError,
    handle::RunInfoHandle,
    remote::RemoteObject,
    stdio::PipeDialer,
};

/// Registered identifier of the run configuration automation object.
pub const DEFAULT_PROG_ID: &str = "Uhuru.Prison.ComWrapper.ContainerRunInfo";

/// Environment variable that overrides the programmatic identifier.
pub const PROG_ID_ENV: &str = "PRISON_RUNINFO_PROG_ID";


/// Options for locating the automation object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfoOptions {
    pub prog_id: String,
}

impl Default for RunInfoOptions {
    fn default() -> Self {
        RunInfoOptions { prog_id: DEFAULT_PROG_ID.to_string() }
    }
}

impl RunInfoOptions {
    /// Read the options from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the options through the lookup function.  Unset or empty values
    /// keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ret = Self::default();
        if let Some(id) = lookup(PROG_ID_ENV) {
            let id = id.trim();
            if !id.is_empty() {
                ret.prog_id = id.to_string();
            }
        }
        ret
    }
}


/// Which standard streams to redirect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StdioRequest {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl StdioRequest {
    /// Redirect all three standard streams.
    pub fn std() -> Self {
        StdioRequest { stdin: true, stdout: true, stderr: true }
    }
}

/// Describes how to configure the contained process.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub filename: String,
    pub arguments: Option<String>,
    pub env: Vec<(String, String)>,
    pub stdio: StdioRequest,
}

impl RunRequest {
    pub fn new(filename: &str) -> Self {
        RunRequest { filename: filename.to_string(), ..Default::default() }
    }

    pub fn arguments(mut self, arguments: &str) -> Self {
        self.arguments = Some(arguments.to_string());
        self
    }

    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.env.push((name.to_string(), value.to_string()));
        self
    }

    pub fn stdio(mut self, stdio: StdioRequest) -> Self {
        self.stdio = stdio;
        self
    }
}

/// The streams opened while applying a `RunRequest`.
#[derive(Default)]
pub struct RedirectedStreams {
    pub stdin: Option<Box<dyn Write + Send>>,
    pub stdout: Option<Box<dyn Read + Send>>,
    pub stderr: Option<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for RedirectedStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectedStreams")
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// A `configure` call that stopped part way.
///
/// Streams connected before the failure belong to the caller and are
/// handed back here; the handle will not open them again.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ConfigureError {
    pub streams: RedirectedStreams,
    #[source]
    pub source: RunInfoError,
}

impl From<RunInfoError> for ConfigureError {
    fn from(source: RunInfoError) -> Self {
        ConfigureError { streams: RedirectedStreams::default(), source }
    }
}

impl From<ConfigureError> for RunInfoError {
    fn from(e: ConfigureError) -> Self {
        e.source
    }
}

impl<R: RemoteObject, D: PipeDialer> RunInfoHandle<R, D> {
    /// Apply the whole request to the remote object.
    ///
    /// Stops at the first failure.  The remote object is then left with
    /// whatever part of the request was already applied, and the error
    /// carries the streams already connected.
    pub fn configure(
        &mut self,
        request: &RunRequest,
    ) -> Result<RedirectedStreams, ConfigureError> {
        self.set_filename(&request.filename)?;
        if let Some(args) = &request.arguments {
            self.set_arguments(args)?;
        }
        for (name, value) in &request.env {
            self.add_environment_variable(name, value)?;
        }

        let mut ret = RedirectedStreams::default();
        if request.stdio.stdin {
            match self.redirect_stdin() {
                Ok(s) => ret.stdin = Some(s),
                Err(source) => return Err(ConfigureError { streams: ret, source }),
            }
        }
        if request.stdio.stdout {
            match self.redirect_stdout() {
                Ok(s) => ret.stdout = Some(s),
                Err(source) => return Err(ConfigureError { streams: ret, source }),
            }
        }
        if request.stdio.stderr {
            match self.redirect_stderr() {
                Ok(s) => ret.stderr = Some(s),
                Err(source) => return Err(ConfigureError { streams: ret, source }),
            }
        }
        Ok(ret)
    }
}
