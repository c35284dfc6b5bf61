//! # prisonclient
//!
//! Client binding for the Prison container runner.  The container engine
//! itself lives in an out-of-process automation object; this library only
//! manages the reference to that object, forwards the run configuration to
//! it, and connects to the named pipes it exposes for the standard streams.

pub mod runinfo;

pub use runinfo::{
    ConfigureError, RedirectedStreams, RunInfoError, RunInfoHandle, RunInfoOptions, RunRequest,
    StdStream, StdioRequest,
};

#[cfg(target_os = "windows")]
pub use runinfo::{ContainerRunInfo, create_container_run_info};
