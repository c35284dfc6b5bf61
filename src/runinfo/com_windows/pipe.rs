// SPDX-License-Identifier: MIT

//! Client side of the standard stream named pipes.

use std::{ffi::OsStr, fs::File, os::windows::io::FromRawHandle};

use windows::{
    Win32::{
        Foundation::{ERROR_PIPE_BUSY, GENERIC_READ, GENERIC_WRITE},
        Storage::FileSystem::{CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_NONE, OPEN_EXISTING},
        System::Pipes::WaitNamedPipeW,
    },
    core::PCWSTR,
};

use super::conv::as_c_str_w;
use crate::runinfo::stdio::PipeDialer;

// NMPWAIT_WAIT_FOREVER
const WAIT_FOREVER: u32 = u32::MAX;


/// Dials local named pipes.  The connection is opened for both reading and
/// writing; the handle decides which direction it exposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedPipeDialer;

impl PipeDialer for NamedPipeDialer {
    type Stream = File;

    fn dial(&self, path: &str) -> Result<File, std::io::Error> {
        let wide = as_c_str_w(OsStr::new(path));
        loop {
            let opened = unsafe {
                CreateFileW(
                    PCWSTR(wide.as_ptr()), // pipe path
                    (GENERIC_READ | GENERIC_WRITE).0, // duplex
                    FILE_SHARE_NONE,
                    None, // default security
                    OPEN_EXISTING, // pipes are only opened, never created, by the client
                    FILE_ATTRIBUTE_NORMAL,
                    None, // no template
                )
            };
            match opened {
                Ok(handle) => {
                    // The File owns the handle from here and closes it on drop.
                    return Ok(unsafe { File::from_raw_handle(handle.0) });
                }
                Err(e) if e.code() == ERROR_PIPE_BUSY.to_hresult() => {
                    // All server instances are in use; wait for one to free up.
                    log::debug!("pipe {} busy, waiting", path);
                    unsafe { WaitNamedPipeW(PCWSTR(wide.as_ptr()), WAIT_FOREVER) }?;
                }
                Err(e) => {
                    return Err(e.into());
                }
            }
        }
    }
}
