// src/config.rs
//! Runtime configuration for the contact subsystem.
//!
//! Stored as JSON; every field has a default so partial files are fine:
//!
//! ```json
//! { "cell_size": 64.0, "lumobj_radius_max": 320.0 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contact::ContactKind;
use crate::error::{Error, Result};

/// Default blockmap cell size in map units (vanilla constant).
pub const DEFAULT_CELL_SIZE: f64 = 128.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Edge length of a blockmap cell.
    pub cell_size: f64,
    /// Largest radius of a moving map object; expands the mobj spread region.
    pub mobj_radius_max: f64,
    /// Largest radius of a light source; expands the lumobj spread region.
    pub lumobj_radius_max: f64,
    /// Build BSP nodes when a map is assembled.
    pub build_bsp: bool,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        SpreadConfig {
            cell_size: DEFAULT_CELL_SIZE,
            mobj_radius_max: 32.0,
            lumobj_radius_max: 256.0,
            build_bsp: true,
        }
    }
}

impl SpreadConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SpreadConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        for (name, radius) in [
            ("mobj_radius_max", self.mobj_radius_max),
            ("lumobj_radius_max", self.lumobj_radius_max),
        ] {
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, radius
                )));
            }
        }
        Ok(())
    }

    /// The spread region of a frame is expanded by this much for `kind`.
    pub fn max_radius(&self, kind: ContactKind) -> f64 {
        match kind {
            ContactKind::Mobj => self.mobj_radius_max,
            ContactKind::Lumobj => self.lumobj_radius_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpreadConfig::default();
        assert_eq!(config.cell_size, 128.0);
        assert_eq!(config.max_radius(ContactKind::Mobj), 32.0);
        assert_eq!(config.max_radius(ContactKind::Lumobj), 256.0);
        assert!(config.build_bsp);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SpreadConfig::from_json_str(r#"{ "cell_size": 64.0 }"#).unwrap();
        assert_eq!(config.cell_size, 64.0);
        assert_eq!(config.lumobj_radius_max, 256.0);
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let err = SpreadConfig::from_json_str(r#"{ "cell_size": 0.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SpreadConfig::from_json_str("{ cell_size: ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SpreadConfig {
            lumobj_radius_max: 300.0,
            ..SpreadConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(SpreadConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = SpreadConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
