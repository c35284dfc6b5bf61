// SPDX-License-Identifier: MIT

//! General model for the out-of-process automation object.
//!
//! Only the small slice of late-bound automation that the run configuration
//! object needs is modelled here: named properties, named methods, and the
//! handful of value types those members exchange.

use std::fmt::Display;

/// A value passed to or returned from a remote member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Empty,
    Bool(bool),
    Int(i32),
    Str(String),
}

impl Variant {
    /// Name of the value type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Empty => "empty",
            Variant::Bool(_) => "bool",
            Variant::Int(_) => "int",
            Variant::Str(_) => "string",
        }
    }

    /// Read the value as a string.  An empty value reads as an empty string.
    pub fn into_string(self) -> Option<String> {
        match self {
            Variant::Str(s) => Some(s),
            Variant::Empty => Some(String::new()),
            _ => None,
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::Int(value)
    }
}


/// Failure reported by the automation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Status code (an HRESULT on Windows), when the layer provided one.
    pub code: Option<i32>,
    pub message: String,
}

impl RemoteError {
    pub fn new(message: &str) -> Self {
        RemoteError { code: None, message: message.to_string() }
    }

    pub fn with_code(code: i32, message: &str) -> Self {
        RemoteError { code: Some(code), message: message.to_string() }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(c) => write!(f, "{} (0x{:08X})", self.message, c as u32),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RemoteError {}


/// One strong reference to a remote, reference counted object.
///
/// Dropping the value gives its reference back.  `release` does the same
/// but reports the count left on the remote object.
pub trait RemoteObject: Sized {
    /// Take another strong reference to the same object.
    fn duplicate(&self) -> Self;

    /// Give this reference back, returning the remaining reference count.
    fn release(self) -> u32;

    fn get_property(&self, name: &str) -> Result<Variant, RemoteError>;

    fn put_property(&self, name: &str, value: Variant) -> Result<(), RemoteError>;

    fn call_method(&self, name: &str, args: &[Variant]) -> Result<Variant, RemoteError>;
}

/// Creates remote objects by their registered programmatic identifier.
pub trait RemoteFactory {
    type Object: RemoteObject;

    /// The returned object carries one reference, owned by the caller.
    fn create(&self, prog_id: &str) -> Result<Self::Object, RemoteError>;
}
