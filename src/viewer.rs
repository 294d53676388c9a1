//! Frequency response chart
//!
//! Magnitude (dB) on the left axis and unwrapped phase (rad) on the right,
//! sharing one frequency axis. egui_plot has a single coordinate system, so
//! the phase curve is mapped linearly onto the magnitude range and the right
//! axis labels undo that mapping.

use std::f64::consts::PI;

use crate::config::PlotConfig;
use crate::error::Result;
use crate::filter::{FilterDesign, FrequencyResponse};

pub const TITLE: &str = "Digital filter frequency response";

/// Linear map from one closed interval onto another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    from: (f64, f64),
    to: (f64, f64),
}

impl AxisMap {
    pub fn new(from: (f64, f64), to: (f64, f64)) -> Self {
        Self { from, to }
    }

    pub fn map(&self, v: f64) -> f64 {
        let t = (v - self.from.0) / (self.from.1 - self.from.0);
        self.to.0 + t * (self.to.1 - self.to.0)
    }

    pub fn invert(&self, v: f64) -> f64 {
        let t = (v - self.to.0) / (self.to.1 - self.to.0);
        self.from.0 + t * (self.from.1 - self.from.0)
    }
}

/// `count` evenly spaced ticks from `lo` to `hi`, both ends included.
pub fn linear_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![0.5 * (lo + hi)],
        _ => {
            let step = (hi - lo) / (count - 1) as f64;
            (0..count).map(|i| lo + step * i as f64).collect()
        }
    }
}

/// Plot-ready series. Values are left as computed; the plot bounds do the
/// clipping, so out-of-range stretches leave the view instead of flattening.
#[derive(Debug, Clone)]
pub struct ResponseChart {
    pub magnitude: Vec<[f64; 2]>,
    /// Phase already mapped into magnitude coordinates
    pub phase: Vec<[f64; 2]>,
    pub phase_map: AxisMap,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    pub config: PlotConfig,
}

impl ResponseChart {
    pub fn new(response: &FrequencyResponse, config: &PlotConfig) -> Self {
        let (mag_lo, mag_hi) = config.magnitude_range;
        let phase_map = AxisMap::new(config.phase_range, config.magnitude_range);

        let magnitude = response
            .frequencies
            .iter()
            .zip(response.magnitude_db())
            .map(|(&w, m)| [w, m])
            .collect();

        let phase = response
            .frequencies
            .iter()
            .zip(response.unwrapped_phase())
            .map(|(&w, p)| [w, phase_map.map(p)])
            .collect();

        Self {
            magnitude,
            phase,
            phase_map,
            x_ticks: linear_ticks(0.0, PI, config.x_ticks),
            y_ticks: linear_ticks(mag_lo, mag_hi, config.y_ticks),
            config: config.clone(),
        }
    }
}

/// Open the chart window and block until it is closed.
#[cfg(feature = "viewer")]
pub fn show_response(design: &FilterDesign, response: &FrequencyResponse, config: &PlotConfig) -> Result<()> {
    use crate::error::WavlabError;
    use eframe::egui;

    let chart = ResponseChart::new(response, config);
    let subtitle = format!(
        "order {} elliptic lowpass, passband {} Hz, stopband {} Hz",
        design.order, design.spec.passband_edge, design.spec.stopband_edge
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 650.0])
            .with_min_inner_size([500.0, 300.0]),
        ..Default::default()
    };

    log::info!("Opening response viewer; close the window to continue");

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(window::ResponseApp::new(chart, subtitle)))),
    )
    .map_err(|e| WavlabError::plot(format!("Viewer failed: {}", e)))
}

#[cfg(not(feature = "viewer"))]
pub fn show_response(_design: &FilterDesign, _response: &FrequencyResponse, _config: &PlotConfig) -> Result<()> {
    Err(crate::error::WavlabError::plot("wavlab was built without the `viewer` feature"))
}

#[cfg(feature = "viewer")]
mod window {
    use std::ops::RangeInclusive;

    use eframe::egui::{self, Color32};
    use egui_plot::{AxisHints, GridInput, GridMark, HPlacement, Legend, Line, Plot, PlotPoints};

    use super::{ResponseChart, TITLE};

    pub struct ResponseApp {
        chart: ResponseChart,
        subtitle: String,
    }

    impl ResponseApp {
        pub fn new(chart: ResponseChart, subtitle: String) -> Self {
            Self { chart, subtitle }
        }
    }

    fn fixed_spacer(ticks: Vec<f64>) -> impl Fn(GridInput) -> Vec<GridMark> + 'static {
        let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
        move |_input| {
            ticks
                .iter()
                .map(|&value| GridMark { value, step_size: step })
                .collect()
        }
    }

    impl eframe::App for ResponseApp {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading(TITLE);
                ui.label(&self.subtitle);

                let chart = &self.chart;
                let (mag_lo, mag_hi) = chart.config.magnitude_range;
                let phase_map = chart.phase_map;

                let left = AxisHints::new_y()
                    .label("Amplitude [dB]")
                    .placement(HPlacement::Left)
                    .formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format!("{:.1}", mark.value));
                let right = AxisHints::new_y()
                    .label("Phase [rad]")
                    .placement(HPlacement::Right)
                    .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                        format!("{:.2}", phase_map.invert(mark.value))
                    });

                Plot::new("frequency_response")
                    .legend(Legend::default())
                    .x_axis_label("Frequency [rad/sample]")
                    .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format!("{:.2}", mark.value))
                    .custom_y_axes(vec![left, right])
                    .x_grid_spacer(fixed_spacer(chart.x_ticks.clone()))
                    .y_grid_spacer(fixed_spacer(chart.y_ticks.clone()))
                    .default_x_bounds(0.0, std::f64::consts::PI)
                    .default_y_bounds(mag_lo, mag_hi)
                    .auto_bounds(false)
                    .show(ui, |plot_ui| {
                        plot_ui.line(
                            Line::new("Amplitude [dB]", PlotPoints::from(chart.magnitude.clone()))
                                .color(Color32::BLUE)
                                .width(1.5),
                        );
                        plot_ui.line(
                            Line::new("Phase [rad]", PlotPoints::from(chart.phase.clone()))
                                .color(Color32::GREEN)
                                .width(1.5),
                        );
                    });
            });
        }
    }
}
