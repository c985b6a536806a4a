//! Subcommand implementations

use anyhow::{bail, Context, Result};
use biochart_core::{
    load_channels, signal_channel_id, signal_index, timestamp::format_elapsed, Channel, ChannelStore,
    ChartConfig, EdfReader, EdfWriter,
};
use biochart_processing::{apply_to_store, SignalProcessor, Transform};
use biochart_render::{save_png, Renderer, Series};
use biochart_simulation::{
    populate_demo_store, SimulationConfig, SyntheticGenerator, DEMO_LAYOUT, DEMO_SAMPLE_RATE,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options of the `render` subcommand
pub struct RenderArgs {
    pub file: PathBuf,
    pub output: PathBuf,
    pub transform: Option<Transform>,
    pub processed: bool,
    pub config: Option<PathBuf>,
    pub max_signals: Option<usize>,
    pub width: u32,
    pub track_height: u32,
    pub offset: f64,
    pub scale: Option<f64>,
    pub grid: bool,
}

fn open(file: &Path) -> Result<EdfReader<std::io::BufReader<std::fs::File>>> {
    EdfReader::open(file).with_context(|| format!("Failed to open container {:?}", file))
}

pub fn cmd_info(file: &Path) -> Result<()> {
    let reader = open(file)?;
    let header = reader.header();

    println!("File:        {}", file.display());
    println!("Patient:     {}", header.patient_id);
    println!("Recording:   {}", header.recording_id);
    println!("Start:       {}", header.start_time);
    println!(
        "Records:     {} x {} s ({})",
        header.data_records,
        header.record_duration,
        format_elapsed(header.duration())
    );
    println!("Signals:     {}", header.num_signals());
    println!();
    println!(
        "{:>3}  {:<16} {:<8} {:>12} {:>12} {:>10}",
        "#", "Label", "Unit", "Phys min", "Phys max", "Rate (Hz)"
    );

    for index in 0..reader.num_signals() {
        let Some(info) = reader.channel_info(index) else {
            continue;
        };
        println!(
            "{:>3}  {:<16} {:<8} {:>12.3} {:>12.3} {:>10.2}",
            index,
            info.label,
            info.physical_dim,
            info.physical_min,
            info.physical_max,
            reader.sampling_rate(index)
        );
    }

    Ok(())
}

pub fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut reader = open(&args.file)?;
    let mut store = ChannelStore::new();
    let report = load_channels(&mut reader, &mut store, args.max_signals);
    for (index, error) in &report.failed {
        warn!("Skipping signal {}: {}", index, error);
    }
    if report.loaded.is_empty() {
        bail!("No signal in {:?} could be loaded", args.file);
    }
    info!("Loaded {} channels", report.loaded.len());

    let config = match &args.config {
        Some(path) => {
            let config = ChartConfig::load(path).with_context(|| format!("Failed to load config {:?}", path))?;
            for channel_config in &config.channels {
                if let Some(channel) = store.get_mut(&channel_config.id) {
                    channel_config.apply_to(channel);
                }
            }
            Some(config)
        }
        None => None,
    };

    if let Some(transform) = args.transform {
        apply_by_rate(&reader, &mut store, &report.loaded, transform);
        info!("Applied {}", transform);
    }

    let series = if args.processed { Series::Processed } else { Series::Raw };
    let mut renderer = Renderer::new(args.width, args.track_height);
    renderer.set_series(series);
    renderer.set_grid_visible(config.as_ref().map_or(args.grid, |c| args.grid && c.display.grid_visible));

    let scale = args
        .scale
        .unwrap_or_else(|| fit_scale(&store, series, args.width, args.offset));
    renderer.set_viewport(args.offset, scale);

    let img = match &config {
        Some(config) => renderer.render_configured(config, &store, args.track_height),
        None => renderer.render_all_channels(&report.loaded, &store, args.track_height),
    };
    save_png(&img, &args.output).with_context(|| format!("Failed to write {:?}", args.output))?;

    println!(
        "Wrote {}x{} image with {} channel(s) to {}",
        img.width(),
        img.height(),
        report.loaded.len(),
        args.output.display()
    );
    Ok(())
}

/// Run `transform` over loaded channels, one parallel batch per sampling rate
fn apply_by_rate<R: std::io::Read + std::io::Seek>(
    reader: &EdfReader<R>,
    store: &mut ChannelStore,
    loaded: &[String],
    transform: Transform,
) {
    let mut by_rate: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for id in loaded {
        let rate = signal_index(id).map_or(0.0, |index| reader.sampling_rate(index));
        by_rate.entry(rate.to_bits()).or_default().push(id.clone());
    }

    for (bits, ids) in by_rate {
        let processor = SignalProcessor::new(f64::from_bits(bits));
        apply_to_store(&processor, store, Some(ids.as_slice()), transform);

        if transform.is_frequency_domain() {
            for id in &ids {
                if let Some(channel) = store.get_mut(id) {
                    fit_magnitude_range(channel);
                }
            }
        }
    }
}

/// Y range covering a magnitude spectrum
fn fit_magnitude_range(channel: &mut Channel) {
    let peak = channel.processed.iter().map(|s| s.value).fold(0.0_f64, f64::max);
    if peak > 0.0 {
        channel.set_y_range(0.0, peak * 1.1);
    }
}

/// Pixels per second so the longest selected series fills the width
fn fit_scale(store: &ChannelStore, series: Series, width: u32, offset: f64) -> f64 {
    let end = store
        .channels()
        .filter_map(|c| match series {
            Series::Raw => c.raw.last(),
            Series::Processed => c.processed.last(),
        })
        .map(|s| s.time)
        .fold(0.0_f64, f64::max);

    let span = end - offset;
    if span > 0.0 && width > 0 {
        f64::from(width) / span
    } else {
        1.0
    }
}

pub fn cmd_heart_rate(file: &Path, signal: usize) -> Result<()> {
    let mut reader = open(file)?;
    let Some(info) = reader.channel_info(signal) else {
        bail!("Signal {} does not exist ({} signals)", signal, reader.num_signals());
    };

    let mut channel = Channel::new(signal_channel_id(signal), info.label.clone());
    channel.set_y_range(info.physical_min, info.physical_max);
    reader
        .load_into_channel(signal, &mut channel)
        .with_context(|| format!("Failed to read signal {}", signal))?;

    let processor = SignalProcessor::new(reader.sampling_rate(signal));
    let peaks = processor.detect_peaks(&channel, biochart_processing::HEART_RATE_PEAK_THRESHOLD);
    let bpm = processor.heart_rate(&channel);

    info!("{} samples, {} peaks", channel.len(), peaks.len());
    if bpm == 0.0 {
        println!("{}: not enough peaks to estimate heart rate", info.label);
    } else {
        println!("{}: {:.1} bpm ({} peaks)", info.label, bpm, peaks.len());
    }
    Ok(())
}

pub fn cmd_synth(output: &Path, seed: Option<u64>, width: u32, track_height: u32) -> Result<()> {
    let mut generator = SyntheticGenerator::new(SimulationConfig {
        seed,
        ..SimulationConfig::default()
    });
    let mut store = ChannelStore::new();
    populate_demo_store(&mut store, &mut generator);

    let is_container = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("edf"));

    if is_container {
        let channels: Vec<&Channel> = DEMO_LAYOUT.iter().filter_map(|(id, _)| store.get(id)).collect();
        let writer = EdfWriter::from_channels(&channels, DEMO_SAMPLE_RATE, 1.0)
            .context("Failed to encode demo recording")?;
        writer
            .save(output)
            .with_context(|| format!("Failed to write {:?}", output))?;
        println!(
            "Wrote {} signals x {} records to {}",
            writer.signals().len(),
            writer.data_records(),
            output.display()
        );
    } else {
        let config = ChartConfig::default();
        let mut renderer = Renderer::new(width, track_height);
        renderer.set_viewport(0.0, fit_scale(&store, Series::Raw, width, 0.0));
        let img = renderer.render_configured(&config, &store, track_height);
        save_png(&img, output).with_context(|| format!("Failed to write {:?}", output))?;
        println!("Wrote {}x{} demo image to {}", img.width(), img.height(), output.display());
    }

    Ok(())
}
