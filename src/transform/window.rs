//! Apodization functions, evaluated per sample index within a window.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Coefficient for sample `index` of a window `window_length` samples long.
pub type WindowFn = fn(i64, usize) -> f64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// No tapering.
    Rectangular,
    #[default]
    Hann,
    Hamming,
    /// Stronger leakage suppression, wider main lobe.
    Blackman,
}

impl WindowFunction {
    /// The coefficient function, or `None` when samples pass through untouched.
    pub fn as_fn(self) -> Option<WindowFn> {
        match self {
            WindowFunction::Rectangular => None,
            WindowFunction::Hann => Some(hann),
            WindowFunction::Hamming => Some(hamming),
            WindowFunction::Blackman => Some(blackman),
        }
    }
}

/// Fraction `index / (window_length - 1)`, or `None` for degenerate windows
/// of zero or one sample, which are left unweighted.
fn position(index: i64, window_length: usize) -> Option<f64> {
    if window_length <= 1 {
        return None;
    }
    Some(index as f64 / (window_length - 1) as f64)
}

/// `0.5 * (1 - cos(2π·index / (window_length - 1)))`
pub fn hann(index: i64, window_length: usize) -> f64 {
    position(index, window_length).map_or(1.0, |x| 0.5 * (1.0 - (2.0 * PI * x).cos()))
}

pub fn hamming(index: i64, window_length: usize) -> f64 {
    position(index, window_length).map_or(1.0, |x| 0.54 - 0.46 * (2.0 * PI * x).cos())
}

pub fn blackman(index: i64, window_length: usize) -> f64 {
    position(index, window_length).map_or(1.0, |x| {
        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
    })
}
