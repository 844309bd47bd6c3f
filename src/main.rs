mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use cli::Cli;
use spectr::export::Spectrogram;
use spectr::transform::stft;
use spectr::transform::window::WindowFunction;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::discover(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            apply_config(&mut cli, cfg.spectrogram);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("spectr - audio spectrogram extractor");
    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    // 1. Decode audio
    spinner.set_message("Decoding audio...");
    let raw = spectr::decode(&cli.input)
        .with_context(|| format!("Failed to decode {}", cli.input.display()))?;

    let stat = *raw.stat();
    log::info!(
        "Stream: {:?}, {}Hz, {}-bit, {} samples ({}), Nyquist {}",
        stat.container_kind,
        stat.sample_rate,
        stat.bit_depth,
        raw.len(),
        stat.duration_string(raw.len()),
        stat.nyquist_string()
    );

    if let Some(ref pcm_path) = cli.pcm_out {
        spinner.set_message("Writing PCM...");
        let file = File::create(pcm_path)
            .with_context(|| format!("Failed to create {}", pcm_path.display()))?;
        raw.write_pcm(&mut BufWriter::new(file))
            .with_context(|| format!("Failed to write PCM to {}", pcm_path.display()))?;
        log::info!("Wrote PCM to {}", pcm_path.display());
    }

    // 2. STFT
    let window_size = match cli.window_size {
        Some(size) => size,
        None => stft::select_window_size(cli.width, raw.len())
            .context("Failed to choose an STFT window size")?,
    };

    spinner.set_message(format!("Computing STFT (window {})...", window_size));
    let result = stft::compute_stft_with(&raw, window_size, cli.overlap, cli.window)
        .context("Failed to compute STFT")?;
    drop(raw);

    // 3. Export
    spinner.set_message("Writing spectrogram...");
    let mut spectrogram = Spectrogram::from_stft(&result, cli.log_scale);
    if cli.normalize {
        spectrogram.normalize();
    }
    spectrogram
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    spinner.finish_with_message("Done");

    log::info!(
        "Done! {} frames x {} bins, output: {}",
        spectrogram.frames.len(),
        spectrogram.bins,
        cli.output.display()
    );
    Ok(())
}

/// Config values apply only where the CLI is still at its default.
fn apply_config(cli: &mut Cli, spec: config::SpectrogramConfig) {
    if cli.width == 800 {
        cli.width = spec.width;
    }
    if cli.window_size.is_none() {
        cli.window_size = spec.window_size;
    }
    if cli.overlap == 0 {
        cli.overlap = spec.overlap;
    }
    if cli.window == WindowFunction::Hann {
        cli.window = spec.window;
    }
    cli.log_scale |= spec.log_scale;
    cli.normalize |= spec.normalize;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> config::SpectrogramConfig {
        config::SpectrogramConfig {
            width: 1024,
            window_size: Some(2048),
            overlap: 64,
            window: WindowFunction::Blackman,
            log_scale: true,
            normalize: true,
        }
    }

    #[test]
    fn config_fills_defaults() {
        let mut cli = Cli::parse_from(["spectr", "in.mp3"]);
        apply_config(&mut cli, spec());
        assert_eq!(cli.width, 1024);
        assert_eq!(cli.window_size, Some(2048));
        assert_eq!(cli.overlap, 64);
        assert_eq!(cli.window, WindowFunction::Blackman);
        assert!(cli.log_scale);
        assert!(cli.normalize);
    }

    #[test]
    fn explicit_flags_beat_config() {
        let mut cli = Cli::parse_from([
            "spectr", "in.mp3", "--width", "640", "--window-size", "512", "--overlap", "32",
            "--window", "hamming",
        ]);
        apply_config(&mut cli, spec());
        assert_eq!(cli.width, 640);
        assert_eq!(cli.window_size, Some(512));
        assert_eq!(cli.overlap, 32);
        assert_eq!(cli.window, WindowFunction::Hamming);
    }
}
