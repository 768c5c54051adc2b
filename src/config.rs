//! Runtime configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! analysis_delay_ms = 400
//! format = "text"
//! sample_document = "This Agreement ..."
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LexplainError, Result};
use crate::trim_text;

/// Contract analyzed when no document text is supplied.
pub const SAMPLE_DOCUMENT: &str = "This Agreement is governed by the laws of California. \
Either party may terminate for material breach upon 30 days written notice. \
Liability is limited to the fees paid in the preceding 12 months and excludes indirect damages. \
The agreement auto-renews for successive one-year terms unless notice of non-renewal is provided \
60 days prior to the end of the then-current term. \
Each party shall indemnify and hold harmless the other from third-party claims.";

const MAX_DELAY_MS: u64 = 60_000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulated latency between requesting an analysis and showing it.
    pub analysis_delay_ms: u64,
    pub format: OutputFormat,
    pub sample_document: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_delay_ms: 0,
            format: OutputFormat::default(),
            sample_document: SAMPLE_DOCUMENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|e| LexplainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from: {}", path.display());
        let source = fs::read_to_string(path).map_err(|source| LexplainError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis_delay_ms > MAX_DELAY_MS {
            return Err(LexplainError::Config(format!(
                "analysis_delay_ms must be at most {MAX_DELAY_MS}, got {}",
                self.analysis_delay_ms
            )));
        }
        if trim_text(&self.sample_document).is_empty() {
            return Err(LexplainError::Config(
                "sample_document must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = Config::from_toml_str("analysis_delay_ms = 400\nformat = \"text\"\n").unwrap();
        assert_eq!(config.analysis_delay(), Duration::from_millis(400));
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.sample_document, SAMPLE_DOCUMENT);
    }

    #[test]
    fn rejects_blank_sample() {
        let err = Config::from_toml_str("sample_document = \"   \"").unwrap_err();
        assert!(matches!(err, LexplainError::Config(_)));
    }

    #[test]
    fn rejects_excessive_delay() {
        let err = Config::from_toml_str("analysis_delay_ms = 600000").unwrap_err();
        assert!(err.to_string().contains("analysis_delay_ms"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Config::from_toml_str("format = ").unwrap_err();
        assert!(matches!(err, LexplainError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sample_document = \"Late fee applies.\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sample_document, "Late fee applies.");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/lexplain.toml")).unwrap_err();
        assert!(matches!(err, LexplainError::Io { .. }));
    }
}
