use crate::convert::{Kind, Value};
use crate::environment::{EnvSource, ProcessEnv};
use crate::error::{ErrorKind, FieldError, StructError};
use crate::field::{Binding, FieldTag};
use crate::macros::with_value_type;
use crate::{Bind, FieldVisitor};
use chrono::{DateTime, Utc};
use std::any::Any;
use tracing::{debug, trace};

/// Switches for a whole-struct load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadOptions {
    /// Use the field name as the variable name when the tag has none
    pub implicit_names: bool,
    /// Bind timestamp fields using their `time_layout` tag
    pub with_time: bool,
}

impl LoadOptions {
    pub const fn new() -> Self {
        Self {
            implicit_names: false,
            with_time: false,
        }
    }

    pub const fn implicit_names(mut self, enabled: bool) -> Self {
        self.implicit_names = enabled;
        self
    }

    pub const fn with_time(mut self, enabled: bool) -> Self {
        self.with_time = enabled;
        self
    }
}

/// Resolves fields from an environment source
///
/// # Example
/// ```rust
/// use envbind::{Bind, Binder};
/// use std::collections::HashMap;
///
/// #[derive(Bind, Default)]
/// struct Server {
///     #[env = "PORT,8080"]
///     pub port: u16,
///     #[env = "HOST"]
///     pub host: String,
/// }
///
/// let env = HashMap::from([("HOST".to_string(), "localhost".to_string())]);
/// let mut server = Server::default();
/// Binder::new(env).load_struct(&mut server).unwrap();
///
/// assert_eq!(server.port, 8080);
/// assert_eq!(server.host, "localhost");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Binder<S = ProcessEnv> {
    source: S,
    options: LoadOptions,
}

impl<S: EnvSource> Binder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: LoadOptions::new(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Binds every exposed field of `target`.
    ///
    /// Every field is attempted; fields that resolve are set even when
    /// others fail. The error lists the failures in declaration order.
    pub fn load_struct<T: Bind + ?Sized>(&self, target: &mut T) -> Result<(), StructError> {
        let mut load = StructLoad {
            binder: self,
            errors: Vec::new(),
            bound: 0,
        };
        target.visit_fields(&mut load);

        debug!(
            bound = load.bound,
            failed = load.errors.len(),
            "struct load finished"
        );
        if load.errors.is_empty() {
            Ok(())
        } else {
            Err(StructError::from(load.errors))
        }
    }

    /// Binds a single value; timestamps are left untouched
    pub fn load_var<T: Value>(
        &self,
        target: &mut T,
        var: &str,
        default: &str,
    ) -> Result<(), FieldError> {
        self.resolve(target, &Binding::new(var, default), false)
    }

    /// Binds a single value, parsing timestamps with `layout`
    pub fn load_var_with_time<T: Value>(
        &self,
        target: &mut T,
        var: &str,
        default: &str,
        layout: &str,
    ) -> Result<(), FieldError> {
        let binding = Binding::new(var, default).with_time_layout(layout);
        self.resolve(target, &binding, true)
    }

    /// Resolves one field: the variable first, then the default.
    ///
    /// `target` is written only with a fully converted value. The returned
    /// error is named after the variable.
    fn resolve<T: Value>(
        &self,
        target: &mut T,
        binding: &Binding,
        with_time: bool,
    ) -> Result<(), FieldError> {
        if T::KIND == Kind::Timestamp && !with_time {
            trace!(var = %binding.var, "timestamp binding disabled, skipping");
            return Ok(());
        }

        let mut error = FieldError::new(&binding.var);
        match self.source.var(&binding.var).filter(|raw| !raw.is_empty()) {
            Some(raw) => match T::convert(&raw, &binding.time_layout) {
                Ok(value) => {
                    *target = value;
                    return Ok(());
                }
                Err(e) => error.record(
                    ErrorKind::VAR_PARSE_ERROR,
                    format!("Error parsing env variable. Trying to set default value...\n{e}"),
                ),
            },
            None => error.record(
                ErrorKind::VAR_NOT_FOUND,
                "Env Variable not found. Trying to set default value",
            ),
        }

        if !binding.has_default() {
            error.record(
                ErrorKind::DEFAULT_NOT_SPECIFIED,
                "Default value not specified. Ignoring the field.",
            );
            return Err(error);
        }

        match T::convert(&binding.default, &binding.time_layout) {
            Ok(value) => {
                debug!(var = %binding.var, "using default value");
                *target = value;
                Ok(())
            }
            Err(e) => {
                error.record(
                    ErrorKind::DEFAULT_PARSE_ERROR,
                    format!("Error while parsing the default value. Ignoring the field...\n{e}"),
                );
                Err(error)
            }
        }
    }
}

/// Visitor state for one `load_struct` call
struct StructLoad<'b, S> {
    binder: &'b Binder<S>,
    errors: Vec<FieldError>,
    bound: usize,
}

impl<S: EnvSource> FieldVisitor for StructLoad<'_, S> {
    fn visit(&mut self, tag: FieldTag, field: &mut dyn Any) {
        let options = self.binder.options;
        let Some(binding) = Binding::from_tag(&tag, options.implicit_names, options.with_time)
        else {
            trace!(field = tag.name, "no environment variable name, skipping");
            return;
        };

        if !options.with_time && field.is::<DateTime<Utc>>() {
            trace!(field = tag.name, "timestamp binding disabled, skipping");
            return;
        }

        let binder = self.binder;
        let outcome = with_value_type!(field, |target| binder.resolve(
            target,
            &binding,
            options.with_time
        ));
        match outcome {
            Some(Ok(())) => self.bound += 1,
            Some(Err(e)) => self.errors.push(e.with_field(tag.name)),
            None => trace!(field = tag.name, "unsupported field type, skipping"),
        }
    }
}
