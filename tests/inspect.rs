mod common;

use common::write_pcm16;
use tempfile::TempDir;
use wavlab::audio::read_params;
use wavlab::inspect::{inspect, inspect_file, InspectMode};

#[test]
fn test_known_header_reported_exactly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("two_seconds.wav");
    write_pcm16(&path, 2, 44100, 88200);

    let report = inspect_file(&path).unwrap();
    let p = &report.params;
    assert_eq!(
        (p.nchannels, p.sampwidth, p.framerate, p.nframes, p.comptype.as_str(), p.compname.as_str()),
        (2, 2, 44100, 88200, "NONE", "not compressed")
    );
    assert_eq!(report.path, path.canonicalize().unwrap());
}

#[test]
fn test_directory_scan_is_top_level_only() {
    let dir = TempDir::new().unwrap();
    write_pcm16(&dir.path().join("kick.wav"), 1, 48000, 10);
    write_pcm16(&dir.path().join("snare.WAV"), 2, 48000, 20);
    std::fs::write(dir.path().join("readme.md"), "not audio").unwrap();
    std::fs::write(dir.path().join("kick.wav.bak"), "old").unwrap();
    let sub = dir.path().join("takes");
    std::fs::create_dir(&sub).unwrap();
    write_pcm16(&sub.join("take1.wav"), 1, 48000, 30);

    let reports = inspect(dir.path(), InspectMode::Auto).unwrap();
    let names: Vec<String> = reports
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["kick.wav", "snare.WAV"]);
    assert_eq!(reports[0].params.nframes, 10);
    assert_eq!(reports[1].params.nframes, 20);
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("Low E.wav");

    assert!(read_params(&missing).unwrap_err().is_not_found());
    assert!(inspect(&missing, InspectMode::File).unwrap_err().is_not_found());
}

#[test]
fn test_inspection_is_idempotent_and_read_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    write_pcm16(&path, 1, 22050, 4410);
    let before = std::fs::read(&path).unwrap();

    let first: Vec<String> = inspect(&path, InspectMode::Auto).unwrap().iter().map(|r| r.to_string()).collect();
    let second: Vec<String> = inspect(&path, InspectMode::Auto).unwrap().iter().map(|r| r.to_string()).collect();

    assert_eq!(first, second);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}
