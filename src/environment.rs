use std::collections::{BTreeMap, HashMap};
use std::env;

/// A read-only key/value source queried by exact, case-sensitive name
pub trait EnvSource {
    /// Returns the value of `key`, or `None` when it is not set
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process
///
/// Values that are not valid unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Captures the current process environment into a map
    pub fn snapshot() -> HashMap<String, String> {
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HashMap<String, String> {
        HashMap::from([
            ("TEST_1".to_string(), "VALUE_1".to_string()),
            ("EMPTY".to_string(), String::new()),
        ])
    }

    #[test]
    fn test_map_lookup() {
        let env = source();
        assert_eq!(env.var("TEST_1"), Some("VALUE_1".to_string()));
        assert_eq!(env.var("EMPTY"), Some(String::new()));
        assert_eq!(env.var("MISSING"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let env = source();
        assert_eq!(env.var("test_1"), None);
    }

    #[test]
    fn test_btree_lookup() {
        let env: BTreeMap<String, String> = source().into_iter().collect();
        assert_eq!(env.var("TEST_1"), Some("VALUE_1".to_string()));
        assert_eq!(env.var("MISSING"), None);
    }

    #[test]
    fn test_reference_source() {
        let env = source();
        let by_ref: &dyn EnvSource = &env;
        assert_eq!((&by_ref).var("TEST_1"), Some("VALUE_1".to_string()));
    }

    #[test]
    fn test_process_env_missing_var() {
        assert_eq!(ProcessEnv.var("ENVBIND_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_snapshot_matches_process_env() {
        let snapshot = ProcessEnv::snapshot();
        if let Some((key, value)) = snapshot.iter().next() {
            assert_eq!(ProcessEnv.var(key).as_ref(), Some(value));
        }
    }
}
