//! WAV metadata inspection for a single file or a directory of files

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::audio::{read_params, WavParams};
use crate::error::{WavlabError, Result};

/// How the inspected path is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InspectMode {
    /// Exactly one WAV file
    File,
    /// Every `.wav` file directly inside a directory
    #[value(name = "dir", alias = "directory")]
    #[serde(rename = "dir", alias = "directory")]
    Directory,
    /// Directory if the path is one, otherwise file
    #[default]
    Auto,
}

impl InspectMode {
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto if path.is_dir() => Self::Directory,
            Self::Auto => Self::File,
            other => other,
        }
    }
}

/// Header parameters of one file, keyed by its absolute path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub params: WavParams,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Getting WAV info for file: {}", self.path.display())?;
        writeln!(f, "File info:")?;
        write!(f, "  {}", self.params)
    }
}

pub fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// List the `.wav` files directly inside `dir`, sorted by path.
///
/// Subdirectories and other files are skipped without error.
pub fn scan_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => WavlabError::not_found(dir),
        _ => WavlabError::io(format!("Cannot read directory {}: {}", dir.display(), e)),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_wav_path(&path) {
            files.push(path);
        } else {
            log::debug!("Skipping {}", path.display());
        }
    }
    files.sort();

    Ok(files)
}

/// Resolve the absolute path of `path` and read its header.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<FileReport> {
    let path = path.as_ref();

    let absolute = path.canonicalize().map_err(|e| match e.kind() {
        ErrorKind::NotFound => WavlabError::not_found(path),
        _ => WavlabError::io(format!("Cannot resolve {}: {}", path.display(), e)),
    })?;

    if absolute.is_dir() {
        return Err(WavlabError::audio(format!("{} is a directory", absolute.display())));
    }

    let params = read_params(&absolute)?;
    Ok(FileReport { path: absolute, params })
}

/// Inspect one file or every WAV file in a directory.
///
/// The first file that fails to open or parse aborts the whole run.
pub fn inspect<P: AsRef<Path>>(path: P, mode: InspectMode) -> Result<Vec<FileReport>> {
    let path = path.as_ref();

    match mode.resolve(path) {
        InspectMode::Directory => {
            let files = scan_directory(path)?;
            log::info!("Found {} WAV files in {}", files.len(), path.display());
            files.iter().map(|file| inspect_file(file)).collect()
        }
        _ => Ok(vec![inspect_file(path)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16) {
        let spec = WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..100 * channels {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_is_wav_path() {
        assert!(is_wav_path(Path::new("a.wav")));
        assert!(is_wav_path(Path::new("dir/Low E.WAV")));
        assert!(!is_wav_path(Path::new("a.wav.txt")));
        assert!(!is_wav_path(Path::new("wav")));
        assert!(!is_wav_path(Path::new("a.flac")));
    }

    #[test]
    fn test_mode_resolution() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x.wav");
        write_wav(&file, 1);

        assert_eq!(InspectMode::Auto.resolve(dir.path()), InspectMode::Directory);
        assert_eq!(InspectMode::Auto.resolve(&file), InspectMode::File);
        assert_eq!(InspectMode::File.resolve(dir.path()), InspectMode::File);
    }

    #[test]
    fn test_scan_skips_non_wav_entries() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("b.wav"), 1);
        write_wav(&dir.path().join("a.wav"), 2);
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested.wav")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        write_wav(&dir.path().join("sub").join("deep.wav"), 1);

        let files = scan_directory(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }

    #[test]
    fn test_inspect_directory() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("mono.wav"), 1);
        write_wav(&dir.path().join("stereo.wav"), 2);

        let reports = inspect(dir.path(), InspectMode::Directory).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.path.is_absolute()));
        assert_eq!(reports[0].params.nchannels, 1);
        assert_eq!(reports[1].params.nchannels, 2);
        assert_eq!(reports[1].params.nframes, 100);
    }

    #[test]
    fn test_inspect_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.wav");
        assert!(inspect(&missing, InspectMode::Auto).unwrap_err().is_not_found());
        assert!(scan_directory(dir.path().join("nodir")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_directory_in_file_mode() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            inspect(dir.path(), InspectMode::File),
            Err(WavlabError::Audio { .. })
        ));
    }

    #[test]
    fn test_bad_file_aborts_scan() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("a.wav"), 1);
        std::fs::write(dir.path().join("b.wav"), b"garbage").unwrap();

        assert!(inspect(dir.path(), InspectMode::Directory).is_err());
    }

    #[test]
    fn test_report_display() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("one.wav");
        write_wav(&file, 1);

        let report = inspect_file(&file).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Getting WAV info for file: "));
        assert!(lines[0].ends_with("one.wav"));
        assert_eq!(lines[1], "File info:");
        assert!(lines[2].starts_with("  WavParams(nchannels=1, sampwidth=2, framerate=22050, nframes=100"));
    }
}
