//! Error Types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type
#[derive(Debug, Clone, Error)]
pub enum WavlabError {
    #[error("Audio error: {message}")]
    Audio { message: String },
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("IO error: {message}")]
    Io { message: String },
    #[error("Config error: {message}")]
    Config { message: String },
    #[error("Filter design error: {message}")]
    Design { message: String },
    #[error("Plot error: {message}")]
    Plot { message: String },
    #[error("Playback error: {message}")]
    Playback { message: String },
}

impl WavlabError {
    pub fn audio<S: Into<String>>(msg: S) -> Self { Self::Audio { message: msg.into() } }
    pub fn io<S: Into<String>>(msg: S) -> Self { Self::Io { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
    pub fn design<S: Into<String>>(msg: S) -> Self { Self::Design { message: msg.into() } }
    pub fn plot<S: Into<String>>(msg: S) -> Self { Self::Plot { message: msg.into() } }
    pub fn playback<S: Into<String>>(msg: S) -> Self { Self::Playback { message: msg.into() } }

    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::FileNotFound { path: path.as_ref().to_path_buf() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, WavlabError>;

impl From<std::io::Error> for WavlabError {
    fn from(err: std::io::Error) -> Self { Self::io(err.to_string()) }
}

impl From<hound::Error> for WavlabError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => Self::io(e.to_string()),
            other => Self::audio(format!("WAV: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = WavlabError::audio("test");
        assert!(e.to_string().contains("Audio"));

        let e = WavlabError::design("bad edges");
        assert_eq!(e.to_string(), "Filter design error: bad edges");
    }

    #[test]
    fn test_not_found() {
        let e = WavlabError::not_found("missing.wav");
        assert!(e.is_not_found());
        assert!(e.to_string().contains("missing.wav"));
        assert!(!WavlabError::io("x").is_not_found());
    }

    #[test]
    fn test_hound_error_conversion() {
        let e: WavlabError = hound::Error::FormatError("no RIFF tag found").into();
        assert!(matches!(e, WavlabError::Audio { .. }));
    }
}
