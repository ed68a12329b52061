//! Bind environment variables to struct fields.
//!
//! Fields are tagged with `#[env = "NAME"]` or `#[env = "NAME,DEFAULT"]`.
//! A set, non-empty variable is converted into the field type; if it is
//! missing or does not convert, the default is tried instead. Failures are
//! collected per field and returned together.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//!
//! #[derive(envbind::Bind, Default)]
//! pub struct Config {
//!     #[env = "APP_NAME,demo"]
//!     pub name: String,
//!     #[env = "APP_WORKERS,4"]
//!     pub workers: i64,
//!     #[env = "APP_EPOCH,01/01/2020"]
//!     #[time_layout = "02/01/2006"]
//!     pub epoch: DateTime<Utc>,
//! }
//!
//! let mut config = Config::default();
//! envbind::load_with_time(&mut config).unwrap();
//! ```

pub mod binder;
pub mod convert;
pub mod environment;
pub mod error;
pub mod field;
pub mod layout;
mod macros;

use std::any::Any;

// Re-export main types
pub use binder::{Binder, LoadOptions};
pub use convert::{ConvertError, Kind, Value};
pub use environment::{EnvSource, ProcessEnv};
pub use error::{ErrorKind, FieldError, StructError};
pub use field::{Binding, FieldTag};
pub use layout::{Layout, LayoutError, parse_time};

// Re-export derive
pub use envbind_macros::Bind;

/// Receives the exposed fields of a [`Bind`] type one at a time
pub trait FieldVisitor {
    /// `field` is the field itself; types the visitor does not handle are ignored
    fn visit(&mut self, tag: FieldTag, field: &mut dyn Any);
}

/// A struct whose fields can be filled from the environment
///
/// Usually derived. Implementations report each field that may be written,
/// in declaration order; private fields are not reported.
pub trait Bind {
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor);
}

/// Binds tagged fields from the process environment
pub fn load<T: Bind + ?Sized>(target: &mut T) -> Result<(), StructError> {
    Binder::new(ProcessEnv).load_struct(target)
}

/// Like [`load`], falling back to the field name when a tag has no variable
pub fn load_implicit<T: Bind + ?Sized>(target: &mut T) -> Result<(), StructError> {
    Binder::new(ProcessEnv)
        .with_options(LoadOptions::new().implicit_names(true))
        .load_struct(target)
}

/// Like [`load`], also binding timestamp fields through their `time_layout`
pub fn load_with_time<T: Bind + ?Sized>(target: &mut T) -> Result<(), StructError> {
    Binder::new(ProcessEnv)
        .with_options(LoadOptions::new().with_time(true))
        .load_struct(target)
}

/// Implicit names and timestamp fields together
pub fn load_implicit_with_time<T: Bind + ?Sized>(target: &mut T) -> Result<(), StructError> {
    Binder::new(ProcessEnv)
        .with_options(LoadOptions::new().implicit_names(true).with_time(true))
        .load_struct(target)
}

/// Binds one value from the process environment variable `var`.
///
/// An empty `default` means there is none. Timestamps are left untouched,
/// use [`load_var_with_time`] for them.
pub fn load_var<T: Value>(target: &mut T, var: &str, default: &str) -> Result<(), FieldError> {
    Binder::new(ProcessEnv).load_var(target, var, default)
}

/// Binds one value, parsing timestamps with the reference-date `layout`
pub fn load_var_with_time<T: Value>(
    target: &mut T,
    var: &str,
    default: &str,
    layout: &str,
) -> Result<(), FieldError> {
    Binder::new(ProcessEnv).load_var_with_time(target, var, default, layout)
}
