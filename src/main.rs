//! wavlab - WAV inspection and IIR lowpass design

use clap::Parser;
use std::path::Path;
use std::process;
use wavlab::audio::WavAudio;
use wavlab::config::FilterArgs;
use wavlab::filter::{self, FilterDesign, FilterSpec};
use wavlab::player::{self, FilteredSource};
use wavlab::{init_logging, inspect, viewer, Args, Command, Config, Result};

fn main() {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.verbose {
        // stderr keeps --json output parseable
        eprintln!("{}", wavlab::get_library_info());
    }

    if let Command::InitConfig { path } = &args.command {
        Config::create_default_config(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::from_args_and_config(&args)?;

    match args.command {
        Command::Info { json, .. } => run_info(&config, json),
        Command::Design { json, .. } => run_design(&config, json),
        Command::Plot { .. } => run_plot(&config),
        Command::Filter { input, output, mix, filter } => run_filter(&config, &input, &output, mix, &filter),
        Command::Play { input, mix, filter } => run_play(&config, &input, mix, &filter),
        Command::InitConfig { .. } => Ok(()),
    }
}

fn run_info(config: &Config, json: bool) -> Result<()> {
    let reports = inspect::inspect(&config.inspect.path, config.inspect.mode)?;

    if json {
        let text = serde_json::to_string_pretty(&reports)
            .map_err(|e| wavlab::WavlabError::io(format!("Failed to serialize reports: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    for report in &reports {
        println!("{}", report);
    }
    Ok(())
}

fn print_design(design: &FilterDesign) {
    let spec = &design.spec;
    println!("=== Elliptic Lowpass Design ===");
    println!("Sampling frequency: {} Hz", spec.sampling_frequency);
    println!("Passband edge: {} Hz ({:.6} x Nyquist)", spec.passband_edge, spec.normalized_passband());
    println!("Stopband edge: {} Hz ({:.6} x Nyquist)", spec.stopband_edge, spec.normalized_stopband());
    println!("Max passband loss: {} dB", spec.passband_max_loss);
    println!("Min stopband attenuation: {} dB", spec.stopband_min_attenuation);
    println!("Order: {}", design.order);
    println!("Natural frequency: {:.6} x Nyquist", design.wn);
    println!("b = {:?}", design.tf.b());
    println!("a = {:?}", design.tf.a());
    if !design.coefficients_accurate() {
        println!(
            "Warning: b/a lose {:.2} dB against the pole/zero response at the band edges; \
             use the zeros/poles/gain form (filter and play already do)",
            design.coefficient_error_db
        );
    }
}

fn run_design(config: &Config, json: bool) -> Result<()> {
    let design = filter::lowpass(&config.filter)?;
    let response = filter::freqz_zpk(&design.zpk, config.response.points);

    if json {
        let value = serde_json::json!({
            "spec": design.spec,
            "order": design.order,
            "wn": design.wn,
            "stable": design.zpk.is_stable(),
            "coefficients_accurate": design.coefficients_accurate(),
            "coefficient_error_db": design.coefficient_error_db,
            "b": design.tf.b(),
            "a": design.tf.a(),
            "response": response.to_points(design.spec.sampling_frequency),
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| wavlab::WavlabError::io(format!("Failed to serialize design: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    print_design(&design);

    let edges = [
        design.spec.hz_to_omega(design.spec.passband_edge),
        design.spec.hz_to_omega(design.spec.stopband_edge),
    ];
    let at_edges = filter::evaluate_zpk(&design.zpk, &edges).magnitude_db();
    println!("Gain at passband edge: {:.4} dB", at_edges[0]);
    println!("Gain at stopband edge: {:.4} dB", at_edges[1]);

    Ok(())
}

fn run_plot(config: &Config) -> Result<()> {
    let design = filter::lowpass(&config.filter)?;
    print_design(&design);

    let response = filter::freqz_zpk(&design.zpk, config.response.points);
    viewer::show_response(&design, &response, &config.plot)
}

/// The configured filter, designed at the file's own rate unless `--fs` was given.
fn spec_for_audio(config: &Config, audio: &WavAudio, overrides: &FilterArgs) -> FilterSpec {
    let mut spec = config.filter.clone();
    if overrides.sampling_frequency.is_none() {
        spec.sampling_frequency = audio.sample_rate() as f64;
    }
    spec
}

fn run_filter(config: &Config, input: &Path, output: &Path, mix: f32, overrides: &FilterArgs) -> Result<()> {
    let audio = WavAudio::from_file(input)?;
    let design = filter::lowpass(&spec_for_audio(config, &audio, overrides))?;
    log::info!(
        "Filtering {} ({} Hz, {} ch, {} frames) with order-{} lowpass",
        input.display(), audio.sample_rate(), audio.channels(), audio.frames(), design.order
    );

    let filtered = filter::apply_to_audio(&design.zpk, &audio, mix)?;
    filtered.save_to_file(output)?;

    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    println!("Order: {}, mix: {}", design.order, mix);
    Ok(())
}

fn run_play(config: &Config, input: &Path, mix: f32, overrides: &FilterArgs) -> Result<()> {
    let audio = WavAudio::from_file(input)?;
    let design = filter::lowpass(&spec_for_audio(config, &audio, overrides))?;
    let sample_rate = audio.sample_rate();

    println!("Playing: {}", input.display());
    println!(
        "{} Hz, {} ch, {:.1} s, order-{} lowpass, mix {}",
        sample_rate, audio.channels(), audio.params().duration_secs(), design.order, mix
    );

    let source = FilteredSource::new(audio, &design.zpk, mix)?;
    player::play(source, sample_rate)
}
