// SPDX-License-Identifier: MIT

//! The owning handle for one remote run configuration object.

use std::io::{Read, Write};

use crate::runinfo::{
    error::{RedirectionCause, RunInfoError},
    remote::{RemoteError, RemoteFactory, RemoteObject, Variant},
    stdio::{PipeDialer, StdStream, StdStreamSet, pipe_path},
};

const PROP_FILENAME: &str = "Filename";
const PROP_ARGUMENTS: &str = "Arguments";
// Spelled exactly as the component exposes it.
const METHOD_ADD_ENV: &str = "AddEnvironemntVariable";


/// Owns one reference to a remote run configuration object.
///
/// The reference is given back exactly once: by `release()`, or by `Drop`
/// when the owner never called it.  Every operation after the release fails
/// with `RunInfoError::ReleasedHandle` without touching the remote object.
///
/// The streams handed out by the `redirect_*` calls are independent pipe
/// connections.  They stay usable after the handle is released.
pub struct RunInfoHandle<R: RemoteObject, D: PipeDialer> {
    remote: Option<R>,
    dialer: D,
    redirected: StdStreamSet,
}

impl<R: RemoteObject, D: PipeDialer> RunInfoHandle<R, D> {
    /// Instantiate a new remote object through the factory.
    pub fn create<F>(factory: &F, prog_id: &str, dialer: D) -> Result<Self, RunInfoError>
    where
        F: RemoteFactory<Object = R>,
    {
        let remote = factory.create(prog_id).map_err(|source| {
            log::debug!("creating {} failed: {}", prog_id, source);
            RunInfoError::Creation { prog_id: prog_id.to_string(), source }
        })?;
        log::debug!("created {}", prog_id);
        Ok(Self::from_remote(remote, dialer))
    }

    /// Take ownership of an existing reference.
    pub fn from_remote(remote: R, dialer: D) -> Self {
        RunInfoHandle { remote: Some(remote), dialer, redirected: StdStreamSet::default() }
    }

    pub fn is_released(&self) -> bool {
        self.remote.is_none()
    }

    /// Give the handle's reference back.  Fails if it was already given back.
    pub fn release(&mut self) -> Result<(), RunInfoError> {
        match self.remote.take() {
            None => Err(RunInfoError::AlreadyReleased),
            Some(remote) => {
                let remaining = remote.release();
                log::debug!("ContainerRunInfo released; remaining references: {}", remaining);
                Ok(())
            }
        }
    }

    /// Take a new strong reference to the remote object.
    ///
    /// The caller owns the returned reference and gives it back on its own,
    /// independently of this handle.
    pub fn acquire_reference(&self) -> Result<R, RunInfoError> {
        Ok(self.remote()?.duplicate())
    }

    pub fn set_filename(&self, value: &str) -> Result<(), RunInfoError> {
        self.put(PROP_FILENAME, Variant::from(value))
    }

    pub fn filename(&self) -> Result<String, RunInfoError> {
        self.get_string(PROP_FILENAME)
    }

    pub fn set_arguments(&self, value: &str) -> Result<(), RunInfoError> {
        self.put(PROP_ARGUMENTS, Variant::from(value))
    }

    pub fn arguments(&self) -> Result<String, RunInfoError> {
        self.get_string(PROP_ARGUMENTS)
    }

    /// Add one entry to the environment of the contained process.
    pub fn add_environment_variable(&self, name: &str, value: &str) -> Result<(), RunInfoError> {
        self.remote()?
            .call_method(METHOD_ADD_ENV, &[Variant::from(name), Variant::from(value)])
            .map_err(|e| RunInfoError::remote_call(METHOD_ADD_ENV, e))?;
        Ok(())
    }

    /// Redirect the standard input, returning the stream that writes to it.
    pub fn redirect_stdin(&mut self) -> Result<Box<dyn Write + Send>, RunInfoError> {
        Ok(Box::new(self.open_redirect(StdStream::Stdin)?))
    }

    /// Redirect the standard output, returning the stream that reads from it.
    pub fn redirect_stdout(&mut self) -> Result<Box<dyn Read + Send>, RunInfoError> {
        Ok(Box::new(self.open_redirect(StdStream::Stdout)?))
    }

    /// Redirect the standard error, returning the stream that reads from it.
    pub fn redirect_stderr(&mut self) -> Result<Box<dyn Read + Send>, RunInfoError> {
        Ok(Box::new(self.open_redirect(StdStream::Stderr)?))
    }

    fn open_redirect(&mut self, stream: StdStream) -> Result<D::Stream, RunInfoError> {
        let remote = self.remote.as_ref().ok_or(RunInfoError::ReleasedHandle)?;
        if self.redirected.contains(stream) {
            return Err(RunInfoError::redirection(stream, RedirectionCause::AlreadyRedirected));
        }

        let value = remote
            .call_method(stream.redirect_method(), &[Variant::Bool(true)])
            .map_err(|e| RunInfoError::redirection(stream, RedirectionCause::Remote(e)))?;
        let name = match value {
            Variant::Str(s) if !s.is_empty() => s,
            other => {
                return Err(RunInfoError::redirection(
                    stream,
                    RedirectionCause::UnexpectedValue(other.type_name()),
                ));
            }
        };

        let path = pipe_path(&name);
        log::debug!("connecting {} to {}", stream, path);
        let conn = self
            .dialer
            .dial(&path)
            .map_err(|e| RunInfoError::redirection(stream, RedirectionCause::Dial(e)))?;
        self.redirected.insert(stream);
        Ok(conn)
    }

    fn remote(&self) -> Result<&R, RunInfoError> {
        self.remote.as_ref().ok_or(RunInfoError::ReleasedHandle)
    }

    fn put(&self, name: &str, value: Variant) -> Result<(), RunInfoError> {
        self.remote()?
            .put_property(name, value)
            .map_err(|e| RunInfoError::remote_call(name, e))
    }

    fn get_string(&self, name: &str) -> Result<String, RunInfoError> {
        let value = self.remote()?
            .get_property(name)
            .map_err(|e| RunInfoError::remote_call(name, e))?;
        let type_name = value.type_name();
        value.into_string().ok_or_else(|| {
            RunInfoError::remote_call(
                name,
                RemoteError::new(&format!("expected a string, received {}", type_name)),
            )
        })
    }
}

impl<R: RemoteObject, D: PipeDialer> Drop for RunInfoHandle<R, D> {
    fn drop(&mut self) {
        // Note: nothing here may fail or panic; anomalies are only logged.
        if let Some(remote) = self.remote.take() {
            let remaining = remote.release();
            log::warn!(
                "ContainerRunInfo dropped without release; remaining references: {}",
                remaining
            );
        }
    }
}
