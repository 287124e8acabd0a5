//! Configuration loader with environment variable substitution.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Loads TOML configuration, expanding `${VAR}` references from the
/// environment before parsing.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/takeoff_data.csv`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_empty_config_uses_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.browser.cdp_endpoint, "http://localhost:9222");
        assert_eq!(config.flow.commit_key, "Tab");
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[flow]\nfill_delay_ms = 1500").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.flow.fill_delay_ms, 1500);
    }

    #[test]
    fn expands_env_vars() {
        // Unique name to avoid interference with parallel tests.
        unsafe { std::env::set_var("TAKEOFF_TEST_LOGIN_EMAIL", "bot@example.com") };
        let config = ConfigLoader::load_str(
            "[aspire]\nemail = \"${TAKEOFF_TEST_LOGIN_EMAIL}\"\n",
        )
        .unwrap();
        assert_eq!(config.aspire.email, "bot@example.com");
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let result =
            ConfigLoader::load_str("[aspire]\nemail = \"${TAKEOFF_TEST_UNSET_VAR}\"\n");
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(name)) if name == "TAKEOFF_TEST_UNSET_VAR"));
    }

    #[test]
    fn nested_flow_tables_parse() {
        let config = ConfigLoader::load_str(
            r#"
[flow.login]
submit_index = 7

[flow.property]
navigation_clicks = [{ index = 3, wait_secs = 2 }]
"#,
        )
        .unwrap();
        assert_eq!(config.flow.login.submit_index, 7);
        assert_eq!(config.flow.property.navigation_clicks.len(), 1);
        assert_eq!(config.flow.property.navigation_clicks[0].index, 3);
    }

    #[test]
    fn expand_path_handles_tilde() {
        let expanded = ConfigLoader::expand_path("~/takeoff_data.csv");
        assert!(!expanded.starts_with('~'));
    }
}
