//! User configuration, read from `<config dir>/wordspeak/config.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! document = "/home/me/duckfeet.pdf"
//! pdfium_library = "./libpdfium.so"
//!
//! [ocr]
//! language = "eng"
//!
//! [speech]
//! program = "espeak-ng"
//! rate = 0.75
//! pitch = 1.0
//! volume = 1.0
//!
//! [selection]
//! outline_every_n_moves = 4
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::modes::selection_mode::DEFAULT_OUTLINE_EVERY_N_MOVES;
use crate::services::ocr::DEFAULT_LANGUAGE;
use crate::services::speech::{self, Voice};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub document: Option<PathBuf>,
    pub pdfium_library: Option<PathBuf>,
    pub ocr: OcrConfig,
    pub speech: SpeechConfig,
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub program: String,
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let voice = Voice::default();
        Self {
            program: speech::DEFAULT_PROGRAM.to_string(),
            rate: voice.rate,
            pitch: voice.pitch,
            volume: voice.volume,
        }
    }
}

impl SpeechConfig {
    pub fn voice(&self) -> Voice {
        Voice {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub outline_every_n_moves: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            outline_every_n_moves: DEFAULT_OUTLINE_EVERY_N_MOVES,
        }
    }
}

impl Config {
    /// Returns the path to the default config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wordspeak").join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.speech.program, "espeak-ng");
        assert_eq!(config.speech.rate, 0.75);
        assert_eq!(config.selection.outline_every_n_moves, 4);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            document = "duckfeet.pdf"

            [speech]
            rate = 1.25

            [ocr]
            language = "deu"
            "#,
        )
        .unwrap();

        assert_eq!(config.document, Some(PathBuf::from("duckfeet.pdf")));
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.speech.rate, 1.25);
        assert_eq!(config.speech.pitch, 1.0);
        assert_eq!(config.speech.voice().rate, 1.25);
        assert_eq!(config.pdfium_library, None);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[speech]\nrate = \"fast\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("wordspeak-definitely-missing.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
    }
}
