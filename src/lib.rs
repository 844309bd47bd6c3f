//! Decode a compressed audio file to stereo PCM and compute its short-time
//! Fourier transform.

pub mod audio;
pub mod bitwise;
pub mod error;
pub mod export;
pub mod transform;

pub use audio::container::{locate_frame_offset, ContainerKind};
pub use audio::raw::{decode, RawAudio, StereoSample};
pub use audio::stat::{read_stats, StreamStat};
pub use error::{Result, SpectrError};
pub use transform::complex::Complex;
pub use transform::fourier::{transform, DftResult};
pub use transform::stft::{compute_stft, select_window_size, StftResult};
