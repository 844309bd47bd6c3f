use rayon::prelude::*;

use super::fourier::{self, DftResult};
use super::window::WindowFunction;
use crate::audio::raw::RawAudio;
use crate::audio::stat::StreamStat;
use crate::bitwise::{flp2, is_pow2};
use crate::error::{Result, SpectrError};

/// Ordered per-window spectra of a whole file.
#[derive(Clone, Debug)]
pub struct StftResult {
    pub source_sample_count: usize,
    pub stat: StreamStat,
    pub window_size: usize,
    pub overlap: usize,
    pub frames: Vec<DftResult>,
}

impl StftResult {
    /// Distance in samples between the starts of consecutive windows.
    pub fn hop(&self) -> usize {
        self.window_size - self.overlap
    }

    pub fn duration_secs(&self) -> f64 {
        self.stat.duration_secs(self.source_sample_count)
    }

    /// Centre frequency of bin `k`, in Hz.
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.stat.sample_rate as f64 / self.window_size as f64
    }
}

/// Number of whole windows of `window_size` samples, advancing by
/// `window_size - overlap`, that fit in `sample_count` samples.
pub fn frame_count(sample_count: usize, window_size: usize, overlap: usize) -> usize {
    if window_size == 0 || overlap >= window_size || sample_count < window_size {
        return 0;
    }
    (sample_count - window_size) / (window_size - overlap) + 1
}

/// Hann-windowed STFT of `raw`.
pub fn compute_stft(raw: &RawAudio, window_size: usize, overlap: usize) -> Result<StftResult> {
    compute_stft_with(raw, window_size, overlap, WindowFunction::Hann)
}

pub fn compute_stft_with(
    raw: &RawAudio,
    window_size: usize,
    overlap: usize,
    window: WindowFunction,
) -> Result<StftResult> {
    if !is_pow2(window_size) {
        return Err(SpectrError::invalid(format!(
            "STFT window size {} is not a power of two",
            window_size
        )));
    }
    if overlap >= window_size {
        return Err(SpectrError::invalid(format!(
            "overlap {} must be smaller than the window size {}",
            overlap, window_size
        )));
    }

    let hop = window_size - overlap;
    let count = frame_count(raw.len(), window_size, overlap);
    let window_fn = window.as_fn();

    log::info!(
        "STFT: {} windows of {} samples (hop {}, {:?} window)",
        count,
        window_size,
        hop,
        window
    );

    // Windows are independent copies, so they transform in parallel.
    let frames = (0..count)
        .into_par_iter()
        .map(|i| {
            let segment = raw.copy_window(i * hop, window_size)?;
            fourier::transform(segment.samples(), window_fn)
        })
        .collect::<Result<Vec<DftResult>>>()?;

    Ok(StftResult {
        source_sample_count: raw.len(),
        stat: *raw.stat(),
        window_size,
        overlap,
        frames,
    })
}

/// Largest power-of-two window giving at least one window per pixel column.
pub fn select_window_size(pixel_width: usize, sample_count: usize) -> Result<usize> {
    if pixel_width == 0 {
        return Err(SpectrError::invalid("spectrogram width must be non-zero"));
    }
    if sample_count < pixel_width {
        return Err(SpectrError::invalid(format!(
            "{} samples cannot fill {} pixel columns",
            sample_count, pixel_width
        )));
    }
    Ok(flp2(sample_count / pixel_width))
}
