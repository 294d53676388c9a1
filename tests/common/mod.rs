use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Write a 16-bit PCM file with a ramp pattern.
pub fn write_pcm16(path: &Path, channels: u16, sample_rate: u32, frames: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as u32 {
        writer.write_sample(((i % 200) as i16 - 100) * 50).unwrap();
    }
    writer.finalize().unwrap();
}

/// Write a mono 16-bit sine tone.
#[allow(dead_code)]
pub fn write_tone(path: &Path, freq: f32, sample_rate: u32, frames: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let s = 0.5 * (2.0 * std::f32::consts::PI * freq * t).sin();
        writer.write_sample((s * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}
