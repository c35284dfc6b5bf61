// SPDX-License-Identifier: MIT

//! Various type conversion routines.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use windows::Win32::System::Variant::{VARIANT, VT_BOOL, VT_BSTR, VT_EMPTY, VT_I4};
use windows::core::BSTR;

use crate::runinfo::remote::{RemoteError, Variant};

/// Convert the OS string into a null-terminated wide (16-bit) C string.
pub fn as_c_str_w(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}

/// Build the native argument value.  The returned VARIANT owns its BSTR and
/// frees it when dropped.
pub fn to_native(value: &Variant) -> VARIANT {
    match value {
        Variant::Empty => VARIANT::default(),
        Variant::Bool(b) => VARIANT::from(*b),
        Variant::Int(i) => VARIANT::from(*i),
        Variant::Str(s) => VARIANT::from(BSTR::from(s.as_str())),
    }
}

/// Copy the native result value out.  The caller still owns (and clears)
/// the VARIANT.
pub fn from_native(value: &VARIANT) -> Result<Variant, RemoteError> {
    let vt = value.vt();
    if vt == VT_EMPTY {
        Ok(Variant::Empty)
    } else if vt == VT_BOOL {
        Ok(Variant::Bool(bool::try_from(value)?))
    } else if vt == VT_I4 {
        Ok(Variant::Int(i32::try_from(value)?))
    } else if vt == VT_BSTR {
        Ok(Variant::Str(BSTR::try_from(value)?.to_string()))
    } else {
        Err(RemoteError::new(&format!("unsupported result type {}", vt.0)))
    }
}

impl From<windows_result::Error> for RemoteError {
    fn from(e: windows_result::Error) -> Self {
        RemoteError::with_code(e.code().0, &e.message())
    }
}
