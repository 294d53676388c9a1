//! wavlab - WAV header inspection and IIR lowpass design
//!
//! The numeric path (design, coefficients, response) is free of any display
//! dependency; only [`viewer`] opens a window.

pub mod audio;
pub mod config;
pub mod error;
pub mod filter;
pub mod inspect;
pub mod player;
pub mod viewer;

pub use config::{Args, Command, Config};
pub use error::{WavlabError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    let mut features = Vec::new();
    if cfg!(feature = "viewer") {
        features.push("viewer");
    }
    if cfg!(feature = "playback") {
        features.push("playback");
    }

    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        features,
    }
}

/// Build banner shown with `--verbose`
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Optional cargo features compiled in
    pub features: Vec<&'static str>,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)?;
        if self.features.is_empty() {
            write!(f, " (no optional features)")
        } else {
            write!(f, " (features: {})", self.features.join(", "))
        }
    }
}
