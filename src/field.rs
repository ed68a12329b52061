/// Separates the variable name from the default inside an `env` tag
pub const TAG_SEPARATOR: char = ',';

/// Static metadata of one struct field, as written in its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldTag {
    /// Rust field name
    pub name: &'static str,
    /// Raw `env` tag: `NAME` or `NAME,DEFAULT`
    pub env: Option<&'static str>,
    /// Raw `time_layout` tag
    pub time_layout: Option<&'static str>,
}

impl FieldTag {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            env: None,
            time_layout: None,
        }
    }

    pub const fn env(mut self, tag: &'static str) -> Self {
        self.env = Some(tag);
        self
    }

    pub const fn time_layout(mut self, layout: &'static str) -> Self {
        self.time_layout = Some(layout);
        self
    }
}

/// How a single field is resolved from the environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binding {
    /// Environment variable name
    pub var: String,
    /// Fallback used when the variable is missing or invalid; empty means none
    pub default: String,
    /// Reference-date layout for timestamp fields
    pub time_layout: String,
}

impl Binding {
    pub fn new(var: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            default: default.into(),
            time_layout: String::new(),
        }
    }

    pub fn with_time_layout(mut self, layout: impl Into<String>) -> Self {
        self.time_layout = layout.into();
        self
    }

    /// Splits an `env` tag on its first comma into name and default.
    ///
    /// Anything after the first comma belongs to the default, commas included.
    pub fn parse_tag(tag: &str) -> Self {
        match tag.split_once(TAG_SEPARATOR) {
            Some((var, default)) => Self::new(var, default),
            None => Self::new(tag, ""),
        }
    }

    /// Builds the binding for a struct field.
    ///
    /// Returns `None` when no variable name can be resolved, meaning the
    /// field should be skipped.
    pub fn from_tag(tag: &FieldTag, implicit_names: bool, with_time: bool) -> Option<Self> {
        let mut binding = tag.env.map(Self::parse_tag).unwrap_or_default();
        if binding.var.is_empty() && implicit_names {
            binding.var = tag.name.to_string();
        }
        if binding.var.is_empty() {
            return None;
        }
        if with_time && let Some(layout) = tag.time_layout {
            binding.time_layout = layout.to_string();
        }
        Some(binding)
    }

    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_name_only() {
        let binding = Binding::parse_tag("TEST_1");
        assert_eq!(binding.var, "TEST_1");
        assert_eq!(binding.default, "");
        assert!(!binding.has_default());
    }

    #[test]
    fn test_parse_tag_name_and_default() {
        let binding = Binding::parse_tag("PORT,8080");
        assert_eq!(binding.var, "PORT");
        assert_eq!(binding.default, "8080");
        assert!(binding.has_default());
    }

    #[test]
    fn test_parse_tag_only_first_comma_splits() {
        let binding = Binding::parse_tag("HOSTS,a,b,c");
        assert_eq!(binding.var, "HOSTS");
        assert_eq!(binding.default, "a,b,c");
    }

    #[test]
    fn test_parse_tag_default_without_name() {
        let binding = Binding::parse_tag(",42");
        assert_eq!(binding.var, "");
        assert_eq!(binding.default, "42");
    }

    #[test]
    fn test_from_tag_without_env_is_skipped() {
        let tag = FieldTag::new("port");
        assert_eq!(Binding::from_tag(&tag, false, false), None);
    }

    #[test]
    fn test_from_tag_implicit_name() {
        let tag = FieldTag::new("Port");
        let binding = Binding::from_tag(&tag, true, false).unwrap();
        assert_eq!(binding.var, "Port");
        assert_eq!(binding.default, "");
    }

    #[test]
    fn test_from_tag_implicit_name_keeps_default() {
        let tag = FieldTag::new("port").env(",8080");
        let binding = Binding::from_tag(&tag, true, false).unwrap();
        assert_eq!(binding.var, "port");
        assert_eq!(binding.default, "8080");

        assert_eq!(Binding::from_tag(&tag, false, false), None);
    }

    #[test]
    fn test_from_tag_explicit_name_wins_over_implicit() {
        let tag = FieldTag::new("port").env("APP_PORT");
        let binding = Binding::from_tag(&tag, true, false).unwrap();
        assert_eq!(binding.var, "APP_PORT");
    }

    #[test]
    fn test_from_tag_time_layout_needs_time_support() {
        let tag = FieldTag::new("started")
            .env("STARTED")
            .time_layout("02/01/2006");

        let plain = Binding::from_tag(&tag, false, false).unwrap();
        assert_eq!(plain.time_layout, "");

        let timed = Binding::from_tag(&tag, false, true).unwrap();
        assert_eq!(timed.time_layout, "02/01/2006");
    }
}
