use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::error::{ProcessingError, Result};
use crate::models::VariablePolicy;
use crate::utils::constants::{
    DEFAULT_DATE_COLUMN, DEFAULT_MISSING_MARKERS, DEFAULT_Z_THRESHOLD, ENV_PREFIX,
    PRECIP_MAX, PRECIP_MIN, PRECIPITATION, TEMPERATURE, TEMP_MAX, TEMP_MIN,
};

/// Everything one QC run needs. Passed explicitly into the pipeline so runs
/// with different thresholds can coexist in one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_config"))]
pub struct QcConfig {
    /// `|z|` above this value marks a statistical outlier.
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,

    #[serde(default = "default_variables")]
    pub variables: Vec<VariablePolicy>,

    /// Cell contents the loader reads as "missing".
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,

    #[serde(default = "default_date_column")]
    pub date_column: String,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            z_threshold: default_z_threshold(),
            variables: default_variables(),
            missing_markers: default_missing_markers(),
            date_column: default_date_column(),
        }
    }
}

impl QcConfig {
    /// Load from a TOML/JSON/YAML file, with `CLIMATE_QC_*` environment
    /// variables taking precedence over scalar settings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: QcConfig = settings.try_deserialize()?;
        config.validate_all()?;
        Ok(config)
    }

    pub fn with_z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }

    pub fn with_variables(mut self, variables: Vec<VariablePolicy>) -> Self {
        self.variables = variables;
        self
    }

    pub fn policy(&self, name: &str) -> Option<&VariablePolicy> {
        self.variables.iter().find(|p| p.name == name)
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|p| p.name.clone()).collect()
    }

    /// Validate the config and each variable policy.
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;
        for policy in &self.variables {
            policy.validate()?;
        }
        Ok(())
    }
}

fn validate_config(config: &QcConfig) -> std::result::Result<(), ValidationError> {
    if !config.z_threshold.is_finite() || config.z_threshold <= 0.0 {
        return Err(config_error(
            "z_threshold",
            format!("z_threshold must be positive, got {}", config.z_threshold),
        ));
    }

    if config.variables.is_empty() {
        return Err(config_error(
            "variables",
            "at least one variable policy is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for policy in &config.variables {
        if !seen.insert(policy.name.as_str()) {
            return Err(config_error(
                "variables",
                format!("duplicate policy for variable '{}'", policy.name),
            ));
        }
        if policy.name == config.date_column {
            return Err(config_error(
                "variables",
                format!("'{}' is the date column", policy.name),
            ));
        }
    }

    Ok(())
}

fn config_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

fn default_z_threshold() -> f64 {
    DEFAULT_Z_THRESHOLD
}

fn default_variables() -> Vec<VariablePolicy> {
    vec![
        VariablePolicy::continuous(TEMPERATURE, TEMP_MIN, TEMP_MAX),
        VariablePolicy::bounded(PRECIPITATION, PRECIP_MIN, PRECIP_MAX),
    ]
}

fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect()
}

fn default_date_column() -> String {
    DEFAULT_DATE_COLUMN.to_string()
}

impl TryFrom<&str> for QcConfig {
    type Error = ProcessingError;

    /// Parse an inline TOML document.
    fn try_from(content: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?;
        let config: QcConfig = settings.try_deserialize()?;
        config.validate_all()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FillMethod;
    use std::io::Write;

    #[test]
    fn test_default_config_thresholds() {
        let config = QcConfig::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.z_threshold, 3.0);

        let temp = config.policy("temperature").unwrap();
        assert_eq!((temp.min, temp.max), (-50.0, 50.0));
        assert_eq!(temp.fill, FillMethod::Linear);

        let precip = config.policy("precipitation").unwrap();
        assert_eq!((precip.min, precip.max), (0.0, 500.0));
        assert_eq!(precip.fill, FillMethod::ForwardFillThenZero);
    }

    #[test]
    fn test_parse_inline_toml() {
        let config = QcConfig::try_from(
            r#"
            z_threshold = 2.5

            [[variables]]
            name = "wind_speed"
            min = 0
            max = 75
            fill = "forward-fill-then-zero"
            outlier_check = true
            "#,
        )
        .unwrap();

        assert_eq!(config.z_threshold, 2.5);
        assert_eq!(config.variables.len(), 1);
        let wind = config.policy("wind_speed").unwrap();
        assert!(wind.applies_outlier_check());
        assert_eq!(wind.max, 75.0);
        // Unspecified settings fall back to defaults
        assert_eq!(config.date_column, "date");
        assert!(config.missing_markers.contains(&"NaN".to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            date_column = "day"

            [[variables]]
            name = "temperature"
            min = -40.0
            max = 45.0
            fill = "linear"
            "#
        )
        .unwrap();

        let config = QcConfig::from_file(file.path()).unwrap();
        assert_eq!(config.date_column, "day");
        assert_eq!(config.policy("temperature").unwrap().min, -40.0);
        assert!(config.policy("precipitation").is_none());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(QcConfig::default().with_z_threshold(0.0).validate_all().is_err());
        assert!(QcConfig::default()
            .with_z_threshold(f64::NAN)
            .validate_all()
            .is_err());
        assert!(QcConfig::default().with_variables(vec![]).validate_all().is_err());

        let duplicated = QcConfig::default().with_variables(vec![
            VariablePolicy::continuous("temperature", -50.0, 50.0),
            VariablePolicy::continuous("temperature", -40.0, 40.0),
        ]);
        assert!(duplicated.validate_all().is_err());

        let inverted = QcConfig::default()
            .with_variables(vec![VariablePolicy::bounded("precipitation", 10.0, 0.0)]);
        assert!(inverted.validate_all().is_err());
    }

    #[test]
    fn test_unknown_fill_method_rejected() {
        let result = QcConfig::try_from(
            r#"
            [[variables]]
            name = "temperature"
            min = -50
            max = 50
            fill = "cubic"
            "#,
        );
        assert!(result.is_err());
    }
}
