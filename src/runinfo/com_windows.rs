// SPDX-License-Identifier: MIT

//! Automation and pipe transport for Windows.
//!
//! The run configuration object is reached through late-bound `IDispatch`
//! calls, the same way a scripting host would drive it.  The pipes it
//! returns are plain local named pipes.
//! Documentation:
//!   https://learn.microsoft.com/windows/win32/api/oaidl/nn-oaidl-idispatch
//!   https://learn.microsoft.com/windows/win32/ipc/named-pipe-client

mod conv;
mod dispatch;
mod pipe;

pub use dispatch::{DispatchFactory, DispatchObject};
pub use pipe::NamedPipeDialer;
