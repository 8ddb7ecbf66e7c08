//! Unpacking configuration loaded from TOML

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;

use crate::error::UnpackResult;

/// Settings shared by the CLI and library callers.
///
/// ```toml
/// timestamps_per_cycle = 512
/// board = "A5"
/// calibration_dir = "calibration_data"
/// keep_sentinel = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
#[serde(default, deny_unknown_fields)]
pub struct UnpackConfig {
    #[builder(default = 512)]
    pub timestamps_per_cycle: usize,
    pub board: Option<String>,
    #[builder(default = PathBuf::from("calibration_data"))]
    pub calibration_dir: PathBuf,
    #[builder(default)]
    pub keep_sentinel: bool,
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl UnpackConfig {
    pub fn load(path: impl AsRef<Path>) -> UnpackResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> UnpackResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;

    #[test]
    fn test_defaults() {
        let config = UnpackConfig::default();
        assert_eq!(config.timestamps_per_cycle, 512);
        assert_eq!(config.board, None);
        assert_eq!(config.calibration_dir, PathBuf::from("calibration_data"));
        assert!(!config.keep_sentinel);
    }

    #[test]
    fn test_partial_toml() {
        let config =
            UnpackConfig::from_toml("board = \"NL11\"\ntimestamps_per_cycle = 10\n").unwrap();
        assert_eq!(config.board.as_deref(), Some("NL11"));
        assert_eq!(config.timestamps_per_cycle, 10);
        assert_eq!(config.calibration_dir, PathBuf::from("calibration_data"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = UnpackConfig::from_toml("timestamps = 10\n").unwrap_err();
        assert!(matches!(err, UnpackError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unpack.toml");
        std::fs::write(&path, "keep_sentinel = true\n").unwrap();
        let config = UnpackConfig::load(&path).unwrap();
        assert!(config.keep_sentinel);
    }
}
