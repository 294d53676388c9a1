//! Running a designed filter over audio

use iir_filters::filter::{DirectForm2Transposed, Filter};
use iir_filters::filter_design::ZPKCoeffs;
use iir_filters::sos::zpk2sos;
use ndarray::Array2;

use super::design::Zpk;
use crate::audio::WavAudio;
use crate::error::{WavlabError, Result};

/// IIR filter run as cascaded second-order sections, each in transposed
/// direct form II.
///
/// Built from zeros/poles/gain rather than expanded (b, a) polynomials, so
/// high orders keep their response.
pub struct SosFilter {
    sections: DirectForm2Transposed,
}

impl SosFilter {
    pub fn new(zpk: &Zpk) -> Result<Self> {
        if zpk.poles.is_empty() && zpk.zeros.is_empty() {
            return Err(WavlabError::design("Filter has neither poles nor zeros"));
        }

        let coef = ZPKCoeffs {
            z: zpk.zeros.clone(),
            p: zpk.poles.clone(),
            k: zpk.gain,
        };
        let sos = zpk2sos(&coef, None)
            .map_err(|e| WavlabError::design(format!("Cannot split filter into sections: {:?}", e)))?;

        Ok(Self { sections: DirectForm2Transposed::new(&sos) })
    }

    pub fn process_sample(&mut self, x: f64) -> f64 {
        self.sections.filter(x)
    }

    pub fn process(&mut self, input: impl IntoIterator<Item = f32>) -> Vec<f32> {
        input
            .into_iter()
            .map(|x| self.process_sample(x as f64) as f32)
            .collect()
    }
}

pub fn check_mix(mix: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&mix) {
        return Err(WavlabError::config(format!("Mix must be in range [0.0, 1.0], got {}", mix)));
    }
    Ok(())
}

/// Blend one filtered sample with its input: 0.0 is dry, 1.0 is fully filtered.
#[inline]
pub fn mix_sample(dry: f32, wet: f32, mix: f32) -> f32 {
    (1.0 - mix) * dry + mix * wet
}

/// Filter every channel of `audio` independently, blending by `mix`.
pub fn apply_to_audio(zpk: &Zpk, audio: &WavAudio, mix: f32) -> Result<WavAudio> {
    check_mix(mix)?;

    let channels = audio.channels() as usize;
    let mut out = Array2::<f32>::zeros((audio.frames(), channels));

    for ch in 0..channels {
        let dry = audio.channel(ch);
        let mut filter = SosFilter::new(zpk)?;
        let wet = filter.process(dry.iter().copied());

        for ((dst, &d), w) in out.column_mut(ch).iter_mut().zip(dry.iter()).zip(wet) {
            *dst = mix_sample(d, w, mix);
        }
    }

    let peak = out.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 1.0 {
        log::warn!("Filtered output peaks at {:.3}, samples will be clipped on write", peak);
    }

    WavAudio::new(audio.spec, out)
}
