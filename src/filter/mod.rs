//! IIR Lowpass Filter Module
//!
//! Elliptic lowpass design from band edges and tolerances, frequency
//! response evaluation, and filtering as second-order sections.

pub mod apply;
pub mod design;
pub mod elliptic;
pub mod response;
pub mod spec;

pub use apply::{apply_to_audio, SosFilter};
pub use design::{lowpass, FilterDesign, TransferFunction, Zpk};
pub use response::{evaluate, evaluate_zpk, freqz, freqz_zpk, unwrap, FrequencyResponse, ResponsePoint};
pub use spec::FilterSpec;
