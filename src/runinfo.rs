// SPDX-License-Identifier: MIT

//! Manages the container run configuration object and the standard stream
//! pipes it hands out.
//!
//! The `create_container_run_info` function is the main entry point on
//! Windows.  It instantiates the `ContainerRunInfo` automation object and
//! wraps it in a `RunInfoHandle`, which owns exactly one reference to the
//! object.  The handle gives that reference back either through an explicit
//! `release()` call or, if the owner forgets, when it is dropped.
//!
//! The handle itself is generic over the automation layer (`RemoteObject`)
//! and the pipe transport (`PipeDialer`), so the reference counting and
//! redirection rules work the same regardless of what sits behind them.

pub mod error;
pub mod handle;
pub mod remote;
pub mod request;
pub mod stdio;

pub use error::{RedirectionCause, RunInfoError};
pub use handle::RunInfoHandle;
pub use remote::{RemoteError, RemoteFactory, RemoteObject, Variant};
pub use request::{ConfigureError, RedirectedStreams, RunInfoOptions, RunRequest, StdioRequest};
pub use stdio::{PipeDialer, StdStream};

#[cfg(test)]
pub(crate) mod mock;

#[cfg(target_os = "windows")]
mod com_windows;

#[cfg(target_os = "windows")]
pub use com_windows::{DispatchFactory, DispatchObject, NamedPipeDialer};

/// The run configuration handle backed by the real automation object.
#[cfg(target_os = "windows")]
pub type ContainerRunInfo = RunInfoHandle<DispatchObject, NamedPipeDialer>;

/// Create a new container run configuration, using the options from the
/// process environment.
#[cfg(target_os = "windows")]
pub fn create_container_run_info() -> Result<ContainerRunInfo, RunInfoError> {
    let options = RunInfoOptions::from_env();
    RunInfoHandle::create(&DispatchFactory, &options.prog_id, NamedPipeDialer)
}
