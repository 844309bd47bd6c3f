//! Spectrogram data handed to an external renderer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::audio::container::ContainerKind;
use crate::bitwise::scale;
use crate::error::Result;
use crate::transform::stft::StftResult;

/// Per-frame magnitudes plus the labels a renderer needs for its axes.
#[derive(Debug, Serialize)]
pub struct Spectrogram {
    pub container: ContainerKind,
    pub sample_rate: u32,
    pub bit_depth: u32,
    pub sample_count: usize,
    pub window_size: usize,
    pub overlap: usize,
    pub log_scale: bool,
    /// Whether `frames` were rescaled into `[0, 1]`.
    pub normalized: bool,
    /// e.g. `3:27`
    pub duration: String,
    /// e.g. `22.05 kHz`
    pub nyquist: String,
    /// Number of bins per frame (`window_size / 2 + 1`).
    pub bins: usize,
    /// `frames[t][k]` is the magnitude of bin `k` in window `t`.
    pub frames: Vec<Vec<f32>>,
    /// Largest value in `frames`, for colour normalisation.
    pub peak: f32,
}

impl Spectrogram {
    pub fn from_stft(stft: &StftResult, log_scale: bool) -> Self {
        let frames: Vec<Vec<f32>> = stft
            .frames
            .iter()
            .map(|dft| {
                dft.magnitudes(log_scale)
                    .into_iter()
                    .map(|m| m as f32)
                    .collect()
            })
            .collect();

        let peak = frames
            .iter()
            .flatten()
            .copied()
            .fold(0.0f32, f32::max);

        Self {
            container: stft.stat.container_kind,
            sample_rate: stft.stat.sample_rate,
            bit_depth: stft.stat.bit_depth,
            sample_count: stft.source_sample_count,
            window_size: stft.window_size,
            overlap: stft.overlap,
            log_scale,
            normalized: false,
            duration: stft.stat.duration_string(stft.source_sample_count),
            nyquist: stft.stat.nyquist_string(),
            bins: stft.window_size / 2 + 1,
            frames,
            peak,
        }
    }

    /// Rescale every magnitude from `[0, peak]` onto `[0, 1]`. `peak` is
    /// left as the pre-normalisation maximum.
    pub fn normalize(&mut self) {
        if self.normalized {
            return;
        }
        let peak = f64::from(self.peak);
        for m in self.frames.iter_mut().flatten() {
            *m = scale(0.0, peak, 0.0, 1.0, f64::from(*m)) as f32;
        }
        self.normalized = true;
    }

    pub fn write_json<W: Write>(&self, out: W) -> Result<()> {
        serde_json::to_writer(out, self).map_err(std::io::Error::from)?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_json(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::raw::{RawAudio, StereoSample};
    use crate::audio::stat::StreamStat;
    use crate::transform::stft::compute_stft;

    fn stft() -> StftResult {
        let samples = (0..2048)
            .map(|i| {
                let v = ((i as f64 * 0.2).sin() * 8000.0) as i32;
                StereoSample::new(v, v)
            })
            .collect();
        let raw = RawAudio::new(StreamStat::new(ContainerKind::Mp3, 16, 44100), samples);
        compute_stft(&raw, 256, 0).unwrap()
    }

    #[test]
    fn matrix_shape_and_labels() {
        let spec = Spectrogram::from_stft(&stft(), false);
        assert_eq!(spec.frames.len(), 8);
        assert!(spec.frames.iter().all(|f| f.len() == 129));
        assert_eq!(spec.bins, 129);
        assert_eq!(spec.nyquist, "22.05 kHz");
        assert_eq!(spec.duration, "0:00");
        assert!(spec.peak > 0.0);
        assert!(spec.frames.iter().flatten().all(|&m| m <= spec.peak));
    }

    #[test]
    fn normalize_maps_peak_to_one() {
        let mut spec = Spectrogram::from_stft(&stft(), false);
        let peak = spec.peak;
        spec.normalize();
        assert!(spec.normalized);
        assert_eq!(spec.peak, peak);

        let max = spec.frames.iter().flatten().copied().fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
        assert!(spec.frames.iter().flatten().all(|&m| (0.0..=1.0).contains(&m)));

        let once = spec.frames.clone();
        spec.normalize();
        assert_eq!(spec.frames, once);
    }

    #[test]
    fn silent_input_normalizes_to_zero() {
        let raw = RawAudio::new(
            StreamStat::new(ContainerKind::Mp3, 16, 44100),
            vec![StereoSample::default(); 512],
        );
        let mut spec = Spectrogram::from_stft(&compute_stft(&raw, 256, 0).unwrap(), false);
        spec.normalize();
        assert!(spec.frames.iter().flatten().all(|&m| m == 0.0));
    }

    #[test]
    fn json_has_expected_fields() {
        let spec = Spectrogram::from_stft(&stft(), true);
        let mut buf = Vec::new();
        spec.write_json(&mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["container"], "mp3");
        assert_eq!(value["sample_rate"], 44100);
        assert_eq!(value["window_size"], 256);
        assert_eq!(value["log_scale"], true);
        assert_eq!(value["normalized"], false);
        assert_eq!(value["frames"].as_array().unwrap().len(), 8);
    }
}
