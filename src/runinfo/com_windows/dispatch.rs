// SPDX-License-Identifier: MIT

//! Late-bound calls on the run configuration object.

use std::{ffi::OsStr, ptr};

use windows::{
    Win32::{
        Foundation::{DISP_E_EXCEPTION, RPC_E_CHANGED_MODE},
        System::{
            Com::{
                CLSCTX_SERVER, CLSIDFromProgID, COINIT_MULTITHREADED, CoCreateInstance,
                CoInitializeEx, DISPATCH_FLAGS, DISPATCH_METHOD, DISPATCH_PROPERTYGET,
                DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO, IDispatch,
            },
            Ole::DISPID_PROPERTYPUT,
            SystemServices::LOCALE_USER_DEFAULT,
            Variant::VARIANT,
        },
    },
    core::{GUID, IUnknown, Interface, PCWSTR},
};

use super::conv::{as_c_str_w, from_native, to_native};
use crate::runinfo::remote::{RemoteError, RemoteFactory, RemoteObject, Variant};


/// Creates automation objects through the COM class registry.
pub struct DispatchFactory;

impl RemoteFactory for DispatchFactory {
    type Object = DispatchObject;

    fn create(&self, prog_id: &str) -> Result<DispatchObject, RemoteError> {
        ensure_com_initialized()?;
        let prog_id = as_c_str_w(OsStr::new(prog_id));
        unsafe {
            let clsid = CLSIDFromProgID(PCWSTR(prog_id.as_ptr()))?;
            let unknown: IUnknown = CoCreateInstance(&clsid, None::<&IUnknown>, CLSCTX_SERVER)?;
            // The IUnknown reference is given back when it goes out of scope;
            // only the IDispatch reference leaves this function.
            let disp = unknown.cast::<IDispatch>()?;
            Ok(DispatchObject { disp })
        }
    }
}

/// Join the multi-threaded apartment, unless this thread already belongs to
/// an apartment.  The thread stays initialised for the life of the process.
fn ensure_com_initialized() -> Result<(), RemoteError> {
    let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if hr.is_err() && hr != RPC_E_CHANGED_MODE {
        return Err(windows_result::Error::from(hr).into());
    }
    Ok(())
}


/// One `IDispatch` reference.  Dropping it calls `Release` on the object.
pub struct DispatchObject {
    disp: IDispatch,
}

impl DispatchObject {
    fn dispid(&self, name: &str) -> Result<i32, RemoteError> {
        let wide = as_c_str_w(OsStr::new(name));
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = 0i32;
        unsafe {
            self.disp.GetIDsOfNames(
                &GUID::zeroed(), // reserved, must be IID_NULL
                names.as_ptr(),
                names.len() as u32,
                LOCALE_USER_DEFAULT,
                &mut id,
            )?;
        }
        Ok(id)
    }

    fn invoke(
        &self,
        name: &str,
        flags: DISPATCH_FLAGS,
        args: &[Variant],
    ) -> Result<Variant, RemoteError> {
        let id = self.dispid(name)?;

        // Positional arguments are passed last to first.
        let mut native: Vec<VARIANT> = args.iter().rev().map(to_native).collect();
        let mut put_id = DISPID_PROPERTYPUT;
        let mut params = DISPPARAMS {
            rgvarg: native.as_mut_ptr(),
            rgdispidNamedArgs: ptr::null_mut(),
            cArgs: native.len() as u32,
            cNamedArgs: 0,
        };
        if flags == DISPATCH_PROPERTYPUT {
            // A property put carries its value as the single named argument.
            params.rgdispidNamedArgs = &mut put_id;
            params.cNamedArgs = 1;
        }

        // Both the result and the exception strings are freed on drop.
        let mut result = VARIANT::default();
        let mut excep = EXCEPINFO::default();
        let mut arg_err = 0u32;
        let invoked = unsafe {
            self.disp.Invoke(
                id,
                &GUID::zeroed(),
                LOCALE_USER_DEFAULT,
                flags,
                &params,
                Some(&mut result as *mut VARIANT),
                Some(&mut excep as *mut EXCEPINFO),
                Some(&mut arg_err as *mut u32),
            )
        };
        if let Err(e) = invoked {
            return Err(exception_error(e, &mut excep));
        }
        from_native(&result)
    }
}

/// Turn a failed Invoke into the error the component actually raised.
///
/// For DISP_E_EXCEPTION the real status and description live in the
/// EXCEPINFO, which the server may only fill in on request.
fn exception_error(e: windows_result::Error, excep: &mut EXCEPINFO) -> RemoteError {
    if e.code() != DISP_E_EXCEPTION {
        return e.into();
    }
    if let Some(fill_in) = excep.pfnDeferredFillIn {
        // A failed fill-in leaves the fields as they are.
        let _ = unsafe { fill_in(excep) };
    }
    let code = if excep.scode != 0 { excep.scode } else { e.code().0 };
    let description = excep.bstrDescription.to_string();
    let message = if description.is_empty() { e.message() } else { description };
    RemoteError::with_code(code, &message)
}

impl RemoteObject for DispatchObject {
    fn duplicate(&self) -> Self {
        // Cloning an interface pointer calls AddRef.
        DispatchObject { disp: self.disp.clone() }
    }

    fn release(self) -> u32 {
        // Call Release by hand to learn the remaining count.  The raw pointer
        // no longer has a Rust owner, so it is not released a second time.
        let release = self.disp.vtable().base__.Release;
        let raw = self.disp.into_raw();
        unsafe { release(raw) }
    }

    fn get_property(&self, name: &str) -> Result<Variant, RemoteError> {
        self.invoke(name, DISPATCH_PROPERTYGET, &[])
    }

    fn put_property(&self, name: &str, value: Variant) -> Result<(), RemoteError> {
        self.invoke(name, DISPATCH_PROPERTYPUT, &[value])?;
        Ok(())
    }

    fn call_method(&self, name: &str, args: &[Variant]) -> Result<Variant, RemoteError> {
        self.invoke(name, DISPATCH_METHOD, args)
    }
}
