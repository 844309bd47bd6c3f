//! Radix-2 FFT over real (mono-downmixed) input.
//!
//! The transform is the iterative form of the Danielson–Lanczos recursion:
//! inputs are loaded in bit-reversed order, then combined by butterflies of
//! doubling span. Window coefficients are applied while loading, indexed by
//! each sample's position in the whole window.

use std::f64::consts::PI;

use super::complex::Complex;
use super::window::WindowFn;
use crate::audio::raw::StereoSample;
use crate::bitwise::is_pow2;
use crate::error::{try_vec_with_capacity, Result, SpectrError};

/// Spectrum of one window. All `N` bins are stored even though bins `k` and
/// `N - k` of a real input are complex conjugates.
#[derive(Clone, Debug, PartialEq)]
pub struct DftResult {
    values: Vec<Complex>,
}

impl DftResult {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Complex] {
        &self.values
    }

    pub fn get(&self, k: usize) -> Option<Complex> {
        self.values.get(k).copied()
    }

    pub fn magnitude(&self, k: usize) -> Option<f64> {
        self.get(k).map(Complex::norm)
    }

    /// Magnitudes of the non-redundant bins `0..=N/2`. With `log_scale`
    /// each magnitude `m` becomes `20·log10(1 + m)`.
    pub fn magnitudes(&self, log_scale: bool) -> Vec<f64> {
        let bins = if self.values.is_empty() {
            0
        } else {
            self.values.len() / 2 + 1
        };
        self.values[..bins]
            .iter()
            .map(|c| {
                let m = c.norm();
                if log_scale {
                    20.0 * m.ln_1p() / std::f64::consts::LN_10
                } else {
                    m
                }
            })
            .collect()
    }

    /// Whether `values[k] == conj(values[(N - k) % N])` within `tolerance`
    /// for every bin.
    pub fn is_conjugate_symmetric(&self, tolerance: f64) -> bool {
        let n = self.values.len();
        (0..n).all(|k| {
            let a = self.values[k];
            let b = self.values[(n - k) % n].conj();
            (a.re - b.re).abs() <= tolerance && (a.im - b.im).abs() <= tolerance
        })
    }
}

/// Transform a window of stereo samples, downmixed to mono.
pub fn transform(samples: &[StereoSample], window: Option<WindowFn>) -> Result<DftResult> {
    let mut mono = try_vec_with_capacity(samples.len(), "mono downmix")?;
    mono.extend(samples.iter().map(|s| f64::from(s.mono())));
    transform_real(&mono, window)
}

/// Transform a real sequence whose length is a power of two.
pub fn transform_real(input: &[f64], window: Option<WindowFn>) -> Result<DftResult> {
    let n = input.len();
    if !is_pow2(n) {
        return Err(SpectrError::invalid(format!(
            "FFT length {} is not a power of two",
            n
        )));
    }

    let bits = n.trailing_zeros();
    let mut values = try_vec_with_capacity(n, "DFT values")?;
    values.resize(n, Complex::ZERO);

    for (i, &x) in input.iter().enumerate() {
        let coeff = window.map_or(1.0, |w| w(i as i64, n));
        values[bit_reverse(i, bits)] = Complex::from_real(x * coeff);
    }

    butterflies(&mut values);

    debug_assert!(
        values.iter().all(|c| c.is_finite()),
        "FFT produced a non-finite bin"
    );

    Ok(DftResult { values })
}

fn bit_reverse(i: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        i.reverse_bits() >> (usize::BITS - bits)
    }
}

// Each pass merges pairs of length-`half` spectra into length-`span` ones:
//   out[k]        = even[k] + W^k * odd[k]
//   out[k + half] = even[k] - W^k * odd[k],   W = e^(-2πi/span)
// Both outputs are computed from copies taken before either slot is written.
fn butterflies(values: &mut [Complex]) {
    let n = values.len();
    let mut span = 2;
    while span <= n {
        let half = span / 2;
        for k in 0..half {
            let twiddle = Complex::expi(-2.0 * PI * k as f64 / span as f64);
            for start in (0..n).step_by(span) {
                let even = values[start + k];
                let odd = twiddle * values[start + k + half];
                values[start + k] = even + odd;
                values[start + k + half] = even - odd;
            }
        }
        span <<= 1;
    }
}
