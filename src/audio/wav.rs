//! WAV audio file processing

use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::{Array2, ArrayView1};
use serde::Serialize;

use crate::error::{WavlabError, Result};

/// Header parameters of a WAV container.
///
/// Field names follow the classic `getparams()` record so the printed form
/// is familiar to anyone who has poked at WAV files from a REPL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavParams {
    pub nchannels: u16,
    /// Sample width in bytes
    pub sampwidth: u16,
    pub framerate: u32,
    pub nframes: u32,
    pub comptype: String,
    pub compname: String,
}

impl WavParams {
    pub fn from_spec(spec: &WavSpec, nframes: u32) -> Self {
        let (comptype, compname) = match spec.sample_format {
            SampleFormat::Int => ("NONE", "not compressed"),
            SampleFormat::Float => ("FLOAT", "IEEE float"),
        };

        Self {
            nchannels: spec.channels,
            sampwidth: spec.bits_per_sample.div_ceil(8),
            framerate: spec.sample_rate,
            nframes,
            comptype: comptype.to_string(),
            compname: compname.to_string(),
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sampwidth * 8
    }

    pub fn duration_secs(&self) -> f64 {
        if self.framerate == 0 {
            return 0.0;
        }
        self.nframes as f64 / self.framerate as f64
    }
}

impl fmt::Display for WavParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WavParams(nchannels={}, sampwidth={}, framerate={}, nframes={}, comptype='{}', compname='{}')",
            self.nchannels, self.sampwidth, self.framerate, self.nframes, self.comptype, self.compname
        )
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => WavlabError::not_found(path),
        _ => WavlabError::io(format!("Cannot open audio file {}: {}", path.display(), e)),
    })
}

/// Read only the header parameters of a WAV file.
///
/// The file handle lives for the duration of this call.
pub fn read_params<P: AsRef<Path>>(path: P) -> Result<WavParams> {
    let path = path.as_ref();
    let file = open_file(path)?;

    let reader = WavReader::new(BufReader::new(file))
        .map_err(|e| WavlabError::audio(format!("Cannot read WAV header of {}: {}", path.display(), e)))?;

    let spec = reader.spec();
    log::debug!("{}: {:?}, {} frames", path.display(), spec, reader.duration());

    Ok(WavParams::from_spec(&spec, reader.duration()))
}

/// Decoded WAV audio, stored as a frames x channels matrix in [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub spec: WavSpec,
    pub data: Array2<f32>,
}

impl WavAudio {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_file(path)?;

        let mut reader = WavReader::new(BufReader::new(file))
            .map_err(|e| WavlabError::Audio {
                message: format!("Cannot create WAV reader: {}", e)
            })?;

        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(WavlabError::audio("Channel count cannot be 0"));
        }

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => {
                if spec.bits_per_sample != 32 {
                    return Err(WavlabError::audio(
                        format!("Unsupported float bit depth: {}", spec.bits_per_sample)
                    ));
                }
                reader.samples::<f32>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| WavlabError::Audio {
                        message: format!("Failed to read sample: {}", e)
                    })?
            }
            SampleFormat::Int => {
                let scale = int_scale(spec.bits_per_sample)?;
                reader.samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| WavlabError::Audio {
                        message: format!("Failed to read sample: {}", e)
                    })?
            }
        };

        let channels = spec.channels as usize;
        let frames = samples.len() / channels;
        let data = Array2::from_shape_vec((frames, channels), samples[..frames * channels].to_vec())
            .map_err(|e| WavlabError::audio(format!("Invalid sample layout: {}", e)))?;

        Ok(Self { spec, data })
    }

    pub fn new(spec: WavSpec, data: Array2<f32>) -> Result<Self> {
        if data.ncols() != spec.channels as usize {
            return Err(WavlabError::audio(format!(
                "Data has {} columns but spec declares {} channels",
                data.ncols(), spec.channels
            )));
        }
        Ok(Self { spec, data })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| WavlabError::Audio {
                        message: format!("Cannot create output directory: {}", e)
                    })?;
            }
        }

        let mut writer = WavWriter::create(path, self.spec)
            .map_err(|e| WavlabError::Audio {
                message: format!("Cannot create output file {}: {}", path.display(), e)
            })?;

        match self.spec.sample_format {
            SampleFormat::Float => {
                for &sample in self.data.iter() {
                    writer.write_sample(sample.clamp(-1.0, 1.0))?;
                }
            }
            SampleFormat::Int => {
                let max = int_scale(self.spec.bits_per_sample)? - 1.0;
                for &sample in self.data.iter() {
                    writer.write_sample((sample.clamp(-1.0, 1.0) * max).round() as i32)?;
                }
            }
        }

        writer.finalize()
            .map_err(|e| WavlabError::Audio {
                message: format!("Failed to finalize WAV writing: {}", e)
            })?;

        Ok(())
    }

    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.data.nrows()
    }

    pub fn channel(&self, index: usize) -> ArrayView1<'_, f32> {
        self.data.column(index)
    }

    pub fn params(&self) -> WavParams {
        WavParams::from_spec(&self.spec, self.frames() as u32)
    }
}

fn int_scale(bits_per_sample: u16) -> Result<f32> {
    match bits_per_sample {
        1..=32 => Ok((1u64 << (bits_per_sample - 1)) as f32),
        _ => Err(WavlabError::audio(format!("Unsupported bit depth: {}", bits_per_sample))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pcm16(path: &Path, channels: u16, sample_rate: u32, frames: u32) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as u32 {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_params_known_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        write_pcm16(&path, 2, 44100, 88200);

        let params = read_params(&path).unwrap();
        assert_eq!(params.nchannels, 2);
        assert_eq!(params.sampwidth, 2);
        assert_eq!(params.framerate, 44100);
        assert_eq!(params.nframes, 88200);
        assert_eq!(params.comptype, "NONE");
        assert_eq!(params.compname, "not compressed");
        assert!((params.duration_secs() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_read_params_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_params(dir.path().join("nope.wav")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_params_corrupt_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, b"this is not a riff file").unwrap();

        let err = read_params(&path).unwrap_err();
        assert!(matches!(err, WavlabError::Audio { .. }));
    }

    #[test]
    fn test_params_display() {
        let params = WavParams {
            nchannels: 1,
            sampwidth: 3,
            framerate: 48000,
            nframes: 10,
            comptype: "NONE".into(),
            compname: "not compressed".into(),
        };
        assert_eq!(
            params.to_string(),
            "WavParams(nchannels=1, sampwidth=3, framerate=48000, nframes=10, comptype='NONE', compname='not compressed')"
        );
        assert_eq!(params.bits_per_sample(), 24);
    }

    #[test]
    fn test_float_params() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let params = WavParams::from_spec(&spec, 16000);
        assert_eq!(params.sampwidth, 4);
        assert_eq!(params.comptype, "FLOAT");
    }

    #[test]
    fn test_wav_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let data = Array2::from(vec![[0.5f32, -0.5], [0.25, -0.25], [0.0, 1.0]]);
        let audio = WavAudio::new(spec, data.clone()).unwrap();
        audio.save_to_file(&path).unwrap();

        let loaded = WavAudio::from_file(&path).unwrap();
        assert_eq!(loaded.channels(), 2);
        assert_eq!(loaded.sample_rate(), 8000);
        assert_eq!(loaded.frames(), 3);
        for (a, b) in loaded.data.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_channel_mismatch() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let data = Array2::<f32>::zeros((4, 2));
        assert!(WavAudio::new(spec, data).is_err());
    }
}
