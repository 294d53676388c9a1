//! Real-time playback through the lowpass filter
//!
//! The audio callback pulls blocks from a [`FilteredSource`], which filters
//! each channel on the fly and keeps a smoothed output level for the meter.

use ndarray::Array2;

use crate::audio::WavAudio;
use crate::error::Result;
use crate::filter::apply::{check_mix, mix_sample, SosFilter};
use crate::filter::Zpk;

/// Exponentially smoothed output level, `0.6 * level + 0.4 * |x|`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelMeter {
    level: f32,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        self.level = 0.6 * self.level + 0.4 * sample.abs();
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

/// Text meter such as `[####      ]` for a level in [0, 1].
pub fn meter_bar(level: f32, width: usize) -> String {
    let filled = ((level.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}

/// Decoded audio streamed out through one filter per channel.
pub struct FilteredSource {
    data: Array2<f32>,
    position: usize,
    filters: Vec<SosFilter>,
    mix: f32,
    meter: LevelMeter,
}

impl FilteredSource {
    pub fn new(audio: WavAudio, zpk: &Zpk, mix: f32) -> Result<Self> {
        check_mix(mix)?;

        let filters = (0..audio.channels())
            .map(|_| SosFilter::new(zpk))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            data: audio.data,
            position: 0,
            filters,
            mix,
            meter: LevelMeter::new(),
        })
    }

    pub fn channels(&self) -> usize {
        self.filters.len()
    }

    /// Fill an interleaved output buffer and return the number of frames
    /// taken from the file. Frames past the end are silence.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        let channels = self.channels();
        let mut written = 0;
        let mut peak = 0.0f32;

        for frame in out.chunks_mut(channels) {
            if self.position >= self.data.nrows() {
                frame.fill(0.0);
                continue;
            }

            let row = self.data.row(self.position);
            for ((dst, &dry), filter) in frame.iter_mut().zip(row.iter()).zip(self.filters.iter_mut()) {
                let wet = filter.process_sample(dry as f64) as f32;
                *dst = mix_sample(dry, wet, self.mix);
                peak = peak.max(dst.abs());
            }

            self.position += 1;
            written += 1;
        }

        self.meter.update(peak);
        written
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.data.nrows()
    }

    /// Fraction of the file already played
    pub fn progress(&self) -> f64 {
        if self.data.nrows() == 0 {
            return 1.0;
        }
        self.position as f64 / self.data.nrows() as f64
    }

    pub fn level(&self) -> f32 {
        self.meter.level()
    }
}

/// Play `source` on the default output device, drawing the level meter
/// until the file ends.
#[cfg(feature = "playback")]
pub fn play(source: FilteredSource, sample_rate: u32) -> Result<()> {
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    use crate::error::WavlabError;

    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| WavlabError::playback("No output device"))?;
    log::info!("Output device: {}", device.name().unwrap_or_else(|_| "unknown".to_string()));

    let config = cpal::StreamConfig {
        channels: source.channels() as u16,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let shared = Arc::new(Mutex::new(source));
    let callback_source = Arc::clone(&shared);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match callback_source.lock() {
                Ok(mut source) => {
                    source.fill(data);
                }
                Err(_) => data.fill(0.0),
            },
            |err: cpal::StreamError| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| WavlabError::playback(format!("Cannot open output stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| WavlabError::playback(format!("Cannot start playback: {}", e)))?;

    let mut stdout = std::io::stdout();
    loop {
        let (level, progress, finished) = {
            let source = shared
                .lock()
                .map_err(|_| WavlabError::playback("Playback state was poisoned"))?;
            (source.level(), source.progress(), source.is_finished())
        };

        write!(stdout, "\rLevel {} {:5.1}%", meter_bar(level, 40), progress * 100.0)?;
        stdout.flush()?;

        if finished {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(200));
    writeln!(stdout)?;
    drop(stream);

    Ok(())
}

#[cfg(not(feature = "playback"))]
pub fn play(_source: FilteredSource, _sample_rate: u32) -> Result<()> {
    Err(crate::error::WavlabError::playback("wavlab was built without the `playback` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{apply_to_audio, design, FilterSpec};
    use hound::{SampleFormat, WavSpec};
    use num_complex::Complex64;

    fn stereo(frames: usize) -> WavAudio {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let data = Array2::from_shape_fn((frames, 2), |(i, c)| {
            let t = i as f32 / 44100.0;
            if c == 0 { 0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() } else { 0.25 }
        });
        WavAudio::new(spec, data).unwrap()
    }

    #[test]
    fn test_level_meter_smoothing() {
        let mut meter = LevelMeter::new();
        assert!((meter.update(1.0) - 0.4).abs() < 1e-6);
        assert!((meter.update(-1.0) - 0.64).abs() < 1e-6);
        assert!((meter.update(0.0) - 0.384).abs() < 1e-6);
        assert!((meter.level() - 0.384).abs() < 1e-6);
    }

    #[test]
    fn test_meter_bar() {
        assert_eq!(meter_bar(0.0, 4), "[    ]");
        assert_eq!(meter_bar(0.5, 10), "[#####     ]");
        assert_eq!(meter_bar(3.0, 4), "[####]");
    }

    #[test]
    fn test_dry_source_passes_input_through() {
        let audio = stereo(6);
        let expected = audio.data.clone();
        let design = design::lowpass(&FilterSpec::default()).unwrap();
        let mut source = FilteredSource::new(audio, &design.zpk, 0.0).unwrap();

        let mut out = vec![0.0f32; 8];
        assert_eq!(source.fill(&mut out), 4);
        assert_eq!(out[0], expected[[0, 0]]);
        assert_eq!(out[1], expected[[0, 1]]);
        assert_eq!(out[6], expected[[3, 0]]);
        assert!(!source.is_finished());
        assert!((source.progress() - 4.0 / 6.0).abs() < 1e-12);

        // Two frames left, the rest is silence
        assert_eq!(source.fill(&mut out), 2);
        assert_eq!(out[3], expected[[5, 1]]);
        assert!(out[4..].iter().all(|&s| s == 0.0));
        assert!(source.is_finished());
        assert_eq!(source.fill(&mut out), 0);
    }

    #[test]
    fn test_streamed_blocks_match_offline_filtering() {
        let audio = stereo(1000);
        let design = design::lowpass(&FilterSpec::default()).unwrap();
        let offline = apply_to_audio(&design.zpk, &audio, 0.7).unwrap();

        let mut source = FilteredSource::new(audio, &design.zpk, 0.7).unwrap();
        let mut streamed = Vec::new();
        let mut block = vec![0.0f32; 2 * 128];
        while !source.is_finished() {
            let frames = source.fill(&mut block);
            streamed.extend_from_slice(&block[..2 * frames]);
        }

        assert_eq!(streamed.len(), offline.data.len());
        for (a, b) in streamed.iter().zip(offline.data.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        assert!(source.level() > 0.0);
    }

    #[test]
    fn test_source_rejects_bad_mix() {
        let zpk = Zpk { zeros: vec![], poles: vec![Complex64::new(0.5, 0.0)], gain: 1.0 };
        assert!(FilteredSource::new(stereo(4), &zpk, 2.0).is_err());
    }
}
