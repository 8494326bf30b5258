use crate::config::PaymentsConfig;
use crate::utils::error::{PaymentsError, Result};
use regex::{Captures, Regex};
use std::path::Path;

impl PaymentsConfig {
    /// Load settings from a TOML file of top-level `KEY = value` pairs.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PaymentsError::ConfigurationError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// Replace `${VAR}` with the environment value; unknown variables stay as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PaymentsError::ConfigurationError {
        message: format!("substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}
