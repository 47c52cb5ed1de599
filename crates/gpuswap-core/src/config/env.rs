//! Environment variable overrides.
//!
//! Two variables steer mode resolution:
//!
//! - [`FORCE_CPU_VAR`]: when truthy, CPU mode wins over everything else.
//! - [`USE_GPU_VAR`]: when set to a boolean, that value is used as-is.
//!
//! The variables are read through a lookup function so resolution can be
//! driven from a map in tests instead of the process environment.

use std::sync::Arc;
use tracing::warn;

/// Forces CPU mode when set to a truthy value.
pub const FORCE_CPU_VAR: &str = "GPUSWAP_FORCE_CPU";

/// Explicitly enables or disables GPU mode.
pub const USE_GPU_VAR: &str = "GPUSWAP_USE_GPU";

/// Shared lookup function for environment variables.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Parses a boolean flag value.
///
/// Accepts `1/true/yes/on` and `0/false/no/off`, ignoring case and
/// surrounding whitespace. Returns `None` for anything else, including the
/// empty string.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether a flag value is truthy.
pub fn is_truthy(value: &str) -> bool {
    parse_bool(value) == Some(true)
}

/// Mode overrides read from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// [`FORCE_CPU_VAR`] was truthy
    pub force_cpu: bool,
    /// Value of [`USE_GPU_VAR`], if it held a recognised boolean
    pub use_gpu: Option<bool>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let force_cpu = lookup(FORCE_CPU_VAR).is_some_and(|v| is_truthy(&v));

        let use_gpu = match lookup(USE_GPU_VAR) {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => {
                let parsed = parse_bool(&raw);
                if parsed.is_none() {
                    warn!(
                        variable = USE_GPU_VAR,
                        value = %raw,
                        "ignoring unrecognised boolean value"
                    );
                }
                parsed
            }
            None => None,
        };

        Self { force_cpu, use_gpu }
    }

    /// Whether any override is present.
    pub fn is_empty(&self) -> bool {
        !self.force_cpu && self.use_gpu.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "TRUE", " yes ", "On"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        for v in ["", "2", "gpu", "enabled"] {
            assert_eq!(parse_bool(v), None, "{v}");
        }
    }

    #[test]
    fn test_overrides_from_lookup() {
        let env = EnvOverrides::from_lookup(lookup_from(&[]));
        assert!(env.is_empty());

        let env = EnvOverrides::from_lookup(lookup_from(&[(FORCE_CPU_VAR, "true")]));
        assert!(env.force_cpu);
        assert_eq!(env.use_gpu, None);

        let env = EnvOverrides::from_lookup(lookup_from(&[(USE_GPU_VAR, "0")]));
        assert!(!env.force_cpu);
        assert_eq!(env.use_gpu, Some(false));
    }

    #[test]
    fn test_unrecognised_values_are_ignored() {
        let env = EnvOverrides::from_lookup(lookup_from(&[
            (FORCE_CPU_VAR, "maybe"),
            (USE_GPU_VAR, "sometimes"),
        ]));
        assert!(env.is_empty());

        let env = EnvOverrides::from_lookup(lookup_from(&[(USE_GPU_VAR, "  ")]));
        assert_eq!(env.use_gpu, None);
    }

    #[test]
    fn test_force_cpu_false_is_not_set() {
        let env = EnvOverrides::from_lookup(lookup_from(&[(FORCE_CPU_VAR, "false")]));
        assert!(!env.force_cpu);
    }
}
