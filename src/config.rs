//! Persisted clipper settings
//!
//! Settings are stored as a JSON object with camelCase keys. Keys missing from
//! the file fall back to their defaults, so a partial file overlays the
//! defaults instead of replacing them.

use crate::error::{ClipError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the content root is chosen
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    /// Heuristic detection (`<article>`, `<main>`, then largest text block)
    #[default]
    Auto,
    /// Explicit CSS selector
    Css,
    /// Explicit XPath expression
    Xpath,
}

impl ExtractMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractMode::Auto => "auto",
            ExtractMode::Css => "css",
            ExtractMode::Xpath => "xpath",
        }
    }

    /// Whether this mode needs a content path from the user
    pub fn needs_path(&self) -> bool {
        !matches!(self, ExtractMode::Auto)
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractMode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ExtractMode::Auto),
            "css" => Ok(ExtractMode::Css),
            "xpath" => Ok(ExtractMode::Xpath),
            other => Err(ClipError::Config(format!(
                "unknown extract mode '{}' (expected auto, css or xpath)",
                other
            ))),
        }
    }
}

/// User-facing configuration surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipperSettings {
    /// Mode preselected for new clips
    pub default_mode: ExtractMode,

    /// CSS selector or XPath used when the mode is not `auto`
    pub content_path: String,

    /// Download images into the note's attachment area
    pub download_images: bool,

    /// Prefix for downloaded image file names
    pub image_prefix: String,

    /// Verbose diagnostic logging
    pub debug: bool,
}

impl Default for ClipperSettings {
    fn default() -> Self {
        Self {
            default_mode: ExtractMode::Auto,
            content_path: String::new(),
            download_images: true,
            image_prefix: String::new(),
            debug: true,
        }
    }
}

impl ClipperSettings {
    /// Load settings from a JSON file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse settings from a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ClipError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Write settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClipError::Config(format!("Failed to serialize settings: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ClipperSettings::default();
        assert_eq!(settings.default_mode, ExtractMode::Auto);
        assert_eq!(settings.content_path, "");
        assert!(settings.download_images);
        assert_eq!(settings.image_prefix, "");
        assert!(settings.debug);
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let settings = ClipperSettings::from_json(r#"{"defaultMode": "xpath", "debug": false}"#).unwrap();
        assert_eq!(settings.default_mode, ExtractMode::Xpath);
        assert!(!settings.debug);
        assert!(settings.download_images);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = ClipperSettings::default().to_json().unwrap();
        assert!(json.contains("\"defaultMode\": \"auto\""));
        assert!(json.contains("\"downloadImages\": true"));
        assert!(json.contains("\"imagePrefix\""));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = ClipperSettings::from_json("{not json").unwrap_err();
        assert!(matches!(err, ClipError::Config(_)));
    }

    #[test]
    fn test_extract_mode_parse() {
        assert_eq!("AUTO".parse::<ExtractMode>().unwrap(), ExtractMode::Auto);
        assert_eq!(" css ".parse::<ExtractMode>().unwrap(), ExtractMode::Css);
        assert_eq!("xpath".parse::<ExtractMode>().unwrap(), ExtractMode::Xpath);
        assert!("regex".parse::<ExtractMode>().is_err());
        assert!(ExtractMode::Css.needs_path());
        assert!(!ExtractMode::Auto.needs_path());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("url-clipper-settings-does-not-exist.json");
        let settings = ClipperSettings::load(&path).unwrap();
        assert_eq!(settings, ClipperSettings::default());
    }
}
