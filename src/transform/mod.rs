pub mod complex;
pub mod fourier;
pub mod stft;
pub mod window;
