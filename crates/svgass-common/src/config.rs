//! Conversion configuration

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use svgass_geom::Vector;

/// Largest supported number of fractional digits.
pub const MAX_PRECISION: u8 = 5;

/// How shapes are grouped into drawings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// One drawing for the whole document, painted like its first shape.
    #[default]
    Layout,
    /// One drawing per shape, each with its own paint.
    Colors,
}

impl FromStr for BatchMode {
    type Err = ConfigError;

    /// Accepts the mode names and the numeric aliases `0` and `1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "layout" | "0" => Ok(BatchMode::Layout),
            "colors" | "colours" | "1" => Ok(BatchMode::Colors),
            other => Err(ConfigError::invalid(
                "batch_mode",
                format!("'{}' is not one of layout, colors, 0, 1", other),
            )),
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMode::Layout => write!(f, "layout"),
            BatchMode::Colors => write!(f, "colors"),
        }
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Fractional digits in emitted numbers
    pub precision: u8,

    /// Shape grouping policy
    pub batch_mode: BatchMode,

    /// Uniform output scale factor
    pub scale: f64,

    /// Degenerate-geometry threshold, in local units
    pub epsilon: f64,

    /// Arc length per flattened arc segment, in local units
    pub arc_step: f64,

    /// Ceiling on segments for a single flattened arc
    pub max_arc_segments: usize,

    /// Initial origin of the root context
    pub origin: Vector,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            precision: 1,
            batch_mode: BatchMode::Layout,
            scale: 1.0,
            epsilon: 1e-3,
            arc_step: 1.0,
            max_arc_segments: 4096,
            origin: Vector::ZERO,
        }
    }
}

impl ConvertConfig {
    /// Load a (possibly partial) JSON configuration over the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ConvertConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::invalid(
                "precision",
                format!("{} exceeds {}", self.precision, MAX_PRECISION),
            ));
        }
        positive("scale", self.scale)?;
        positive("epsilon", self.epsilon)?;
        positive("arc_step", self.arc_step)?;
        if self.max_arc_segments == 0 {
            return Err(ConfigError::invalid("max_arc_segments", "must be at least 1"));
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::invalid("origin", "must be finite"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} is not a finite positive number", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ConvertConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.precision, 1);
        assert_eq!(config.batch_mode, BatchMode::Layout);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = ConvertConfig {
            precision: 6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "precision", .. })
        ));

        config.precision = 2;
        config.scale = 0.0;
        assert!(config.validate().is_err());

        config.scale = f64::NAN;
        assert!(config.validate().is_err());

        config.scale = 2.0;
        config.max_arc_segments = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_mode_aliases() {
        assert_eq!("0".parse::<BatchMode>().unwrap(), BatchMode::Layout);
        assert_eq!("1".parse::<BatchMode>().unwrap(), BatchMode::Colors);
        assert_eq!("Colors".parse::<BatchMode>().unwrap(), BatchMode::Colors);
        assert!("2".parse::<BatchMode>().is_err());
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"precision": 3, "batch_mode": "colors"}}"#).unwrap();

        let config = ConvertConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.precision, 3);
        assert_eq!(config.batch_mode, BatchMode::Colors);
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn test_json_file_errors() {
        let missing = ConvertConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ precision: ").unwrap();
        let broken = ConvertConfig::from_json_file(file.path());
        assert!(matches!(broken, Err(ConfigError::Parse { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"arc_step": -1}}"#).unwrap();
        let invalid = ConvertConfig::from_json_file(file.path());
        assert!(matches!(invalid, Err(ConfigError::InvalidValue { .. })));
    }
}
