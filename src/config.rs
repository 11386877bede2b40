use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::schema::Schema;
use crate::view::range::RangePolicy;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "HEART_EXPLORER_CONFIG";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub in_factor: f64,
    pub out_factor: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            in_factor: 0.8,
            out_factor: 1.25,
        }
    }
}

impl ZoomSettings {
    /// Zoom in must narrow and zoom out must widen: `0 < in < 1 < out`.
    pub fn is_valid(&self) -> bool {
        self.in_factor.is_finite()
            && self.out_factor.is_finite()
            && self.in_factor > 0.0
            && self.in_factor < 1.0
            && self.out_factor > 1.0
    }
}

/// Everything that is fixed for the lifetime of the application.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schema: Schema,
    pub range: RangePolicy,
    pub zoom: ZoomSettings,
    pub default_x: String,
    pub default_y: String,
    /// Dataset loaded at startup when it exists.
    pub data_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            range: RangePolicy::default(),
            zoom: ZoomSettings::default(),
            default_x: "serum_sodium".to_string(),
            default_y: "age".to_string(),
            data_file: Some(PathBuf::from(
                "heart_failure_clinical_records_dataset_cleaned.csv",
            )),
        }
    }
}

impl AppConfig {
    /// Parse a JSON configuration file.  Missing keys take their defaults,
    /// as do out-of-range zoom factors and padding.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.validated())
    }

    /// Replace settings that would produce inverted or inert views.
    pub fn validated(mut self) -> Self {
        if !self.range.is_valid() {
            log::warn!(
                "Ignoring padding_fraction {}: must be a non-negative number",
                self.range.padding_fraction
            );
            self.range.padding_fraction = RangePolicy::default().padding_fraction;
        }
        if !self.zoom.is_valid() {
            log::warn!(
                "Ignoring zoom factors in={} out={}: need 0 < in < 1 < out",
                self.zoom.in_factor,
                self.zoom.out_factor
            );
            self.zoom = ZoomSettings::default();
        }
        self
    }

    /// Configuration named by [`CONFIG_ENV`], or the defaults.
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                log::info!("Using configuration from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring configuration: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"range": {{"y_to_zero": true}}, "default_x": "time"}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.range.y_to_zero);
        assert_eq!(config.range.padding_fraction, 0.05);
        assert_eq!(config.default_x, "time");
        assert_eq!(config.default_y, "age");
        assert_eq!(config.schema, Schema::default());
        assert_eq!(config.zoom, ZoomSettings::default());
    }

    #[test]
    fn test_custom_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"schema": {{"numeric_fields": ["age"], "condition_flags": []}}, "data_file": null}}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.schema.numeric_fields, vec!["age".to_string()]);
        assert!(config.schema.condition_flags.is_empty());
        assert_eq!(config.schema.sex_field, "sex_label");
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_negative_padding_is_replaced_by_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"range": {{"padding_fraction": -0.6, "y_to_zero": true}}}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.range.padding_fraction, 0.05);
        assert!(config.range.y_to_zero);
    }

    #[test]
    fn test_backwards_zoom_factors_fall_back_to_defaults() {
        for zoom in [
            r#"{"in_factor": 1.5}"#,
            r#"{"out_factor": 0.5}"#,
            r#"{"in_factor": 0.0, "out_factor": 2.0}"#,
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"zoom": {zoom}}}"#).unwrap();
            let config = AppConfig::from_file(file.path()).unwrap();
            assert_eq!(config.zoom, ZoomSettings::default(), "zoom = {zoom}");
        }
    }

    #[test]
    fn test_valid_custom_zoom_factors_are_kept() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"zoom": {{"in_factor": 0.5, "out_factor": 2.0}}}}"#).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.zoom.in_factor, 0.5);
        assert_eq!(config.zoom.out_factor, 2.0);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
    }
}
