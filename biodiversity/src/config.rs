//! Contract configuration.

use serde::{Deserialize, Serialize};

/// Config load failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a biodiversity contract instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Override value that clears a log field instead of overwriting it
    pub override_clear_sentinel: String,
    /// Prefix of the note appended when a suggestion is approved
    pub approval_note_prefix: String,
    /// Key range holding specimen records
    pub specimen_scan: ScanRange,
    /// Bulk scans touching more records than this log a warning
    pub bulk_scan_warn_threshold: usize,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            override_clear_sentinel: "None".to_string(),
            approval_note_prefix: "Approved update suggested by user ".to_string(),
            specimen_scan: ScanRange::default(),
            bulk_scan_warn_threshold: 10_000,
        }
    }
}

impl ContractConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// An empty sentinel would match every blank override field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.override_clear_sentinel.is_empty() {
            return Err(ConfigError::Invalid(
                "override_clear_sentinel must not be empty".to_string(),
            ));
        }
        if self.specimen_scan.start_key >= self.specimen_scan.end_key {
            return Err(ConfigError::Invalid(format!(
                "specimen_scan start {} must sort before end {}",
                self.specimen_scan.start_key, self.specimen_scan.end_key
            )));
        }
        Ok(())
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// The note recorded when `suggester`'s update is approved.
    pub fn approval_note(&self, suggester: &str) -> String {
        format!("{}{}", self.approval_note_prefix, suggester)
    }
}

/// Half-open key range `[start_key, end_key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanRange {
    pub start_key: String,
    pub end_key: String,
}

impl Default for ScanRange {
    fn default() -> Self {
        Self {
            start_key: "0".to_string(),
            end_key: "999999999999".to_string(),
        }
    }
}
