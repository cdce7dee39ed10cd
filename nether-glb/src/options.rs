//! Decode options (optionally loaded from a TOML file)
//!
//! ```toml
//! normalization = "declared"
//! reject_sentinel_indices = false
//! strict_view_length = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How unsigned integer components are widened to float for texture
/// coordinates, colors and weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Widen the raw integer value (255u8 becomes 255.0)
    #[default]
    Raw,
    /// Always divide by the type maximum (255u8 becomes 1.0)
    Normalized,
    /// Divide only when the accessor declares `normalized: true`
    Declared,
}

impl Normalization {
    /// Whether integer components of an accessor are scaled to [0, 1]
    pub fn applies(self, accessor_normalized: bool) -> bool {
        match self {
            Self::Raw => false,
            Self::Normalized => true,
            Self::Declared => accessor_normalized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeOptions {
    #[serde(default)]
    pub normalization: Normalization,
    /// Reject indices equal to their component type's maximum value
    #[serde(default = "default_true")]
    pub reject_sentinel_indices: bool,
    /// Require `byteLength == count * stride` for attribute buffer views
    #[serde(default = "default_true")]
    pub strict_view_length: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            normalization: Normalization::Raw,
            reject_sentinel_indices: true,
            strict_view_length: true,
        }
    }
}

/// Errors loading decode options
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),
}

impl DecodeOptions {
    /// Parse options from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecodeOptions::default();
        assert_eq!(options.normalization, Normalization::Raw);
        assert!(options.reject_sentinel_indices);
        assert!(options.strict_view_length);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let options = DecodeOptions::from_toml_str("").unwrap();
        assert_eq!(options, DecodeOptions::default());
    }

    #[test]
    fn test_partial_toml() {
        let options = DecodeOptions::from_toml_str(
            r#"
normalization = "declared"
reject_sentinel_indices = false
"#,
        )
        .unwrap();
        assert_eq!(options.normalization, Normalization::Declared);
        assert!(!options.reject_sentinel_indices);
        assert!(options.strict_view_length);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = DecodeOptions::from_toml_str(r#"normalization = "srgb""#);
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }

    #[test]
    fn test_normalization_applies() {
        assert!(!Normalization::Raw.applies(true));
        assert!(Normalization::Normalized.applies(false));
        assert!(Normalization::Declared.applies(true));
        assert!(!Normalization::Declared.applies(false));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glb.toml");
        std::fs::write(&path, "normalization = \"normalized\"\n").unwrap();

        let options = DecodeOptions::load(&path).unwrap();
        assert_eq!(options.normalization, Normalization::Normalized);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DecodeOptions::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(OptionsError::Io(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let options = DecodeOptions {
            normalization: Normalization::Normalized,
            reject_sentinel_indices: false,
            strict_view_length: false,
        };
        let text = toml::to_string(&options).unwrap();
        assert!(text.contains("normalization = \"normalized\""));
        assert_eq!(DecodeOptions::from_toml_str(&text).unwrap(), options);
    }
}
