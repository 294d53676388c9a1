//! Audio Module
//!
//! WAV header inspection plus sample reading and writing.

pub mod wav;

pub use wav::{read_params, WavAudio, WavParams};
