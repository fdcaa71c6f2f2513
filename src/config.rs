//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Optional JSON file holding the profile snapshot (driver binary only).
    pub profile_path: Option<PathBuf>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self { profile_path: None }
    }
}

impl CoordinatorConfig {
    /// Build configuration from environment variables.
    ///
    /// - `ONBOARDING_PROFILE_PATH` (optional, must name an existing file)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile_path = lookup("ONBOARDING_PROFILE_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Some(path) = &profile_path
            && !path.is_file()
        {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDING_PROFILE_PATH".to_string(),
                message: format!("{} is not a file", path.display()),
            });
        }

        Ok(Self { profile_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = CoordinatorConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.profile_path.is_none());
    }

    #[test]
    fn reads_existing_profile_path() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let config =
            CoordinatorConfig::from_lookup(lookup(&[("ONBOARDING_PROFILE_PATH", manifest)]))
                .unwrap();
        assert_eq!(config.profile_path, Some(PathBuf::from(manifest)));
    }

    #[test]
    fn rejects_missing_profile_file() {
        let err = CoordinatorConfig::from_lookup(lookup(&[(
            "ONBOARDING_PROFILE_PATH",
            "/nonexistent/profile.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("ONBOARDING_PROFILE_PATH"));
    }

    #[test]
    fn blank_profile_path_is_ignored() {
        let config =
            CoordinatorConfig::from_lookup(lookup(&[("ONBOARDING_PROFILE_PATH", "  ")])).unwrap();
        assert!(config.profile_path.is_none());
    }
}
