use colored::Colorize;
use std::fmt;

bitflags::bitflags! {
    /// Stages of a field resolution that failed.
    ///
    /// Flags are independent and combine by union, so recording the same
    /// stage twice leaves the set unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ErrorKind: u8 {
        /// The environment variable is absent or empty
        const VAR_NOT_FOUND = 1 << 0;
        /// The environment variable is set but could not be converted
        const VAR_PARSE_ERROR = 1 << 1;
        /// A fallback was needed but the field has no default
        const DEFAULT_NOT_SPECIFIED = 1 << 2;
        /// The default value could not be converted either
        const DEFAULT_PARSE_ERROR = 1 << 3;
    }
}

/// Failure report for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldError {
    /// Struct field name, or the variable name for single-field loads
    pub field: String,
    /// Every stage that failed
    pub kind: ErrorKind,
    /// Message trail, most recent stage first
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ErrorKind::empty(),
            message: String::new(),
        }
    }

    /// Records a failed stage, prepending its message to the trail
    pub fn record(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.kind |= kind;
        let message = message.into();
        self.message = if self.message.is_empty() {
            message
        } else {
            format!("{}\n\n{}", message, self.message)
        };
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.kind.contains(kind)
    }

    pub(crate) fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Field Name : {}", self.field.magenta().bold())?;
        writeln!(f, "Error:")?;
        for line in self.message.lines() {
            if line.is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, "\t{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// Every field error from one struct load, in field declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructError {
    pub errors: Vec<FieldError>,
}

impl StructError {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Looks up the error reported for a struct field
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }
}

impl fmt::Display for StructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Binding failed with {} field error(s):",
            self.errors.len().to_string().yellow().bold()
        )?;
        for error in &self.errors {
            writeln!(f)?;
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for StructError {}

impl From<Vec<FieldError>> for StructError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for StructError {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a StructError {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
