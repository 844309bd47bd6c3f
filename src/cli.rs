use clap::Parser;
use spectr::transform::window::WindowFunction;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spectr", about = "Compute the spectrogram of a compressed audio file")]
pub struct Cli {
    /// Input audio file (MP3)
    pub input: PathBuf,

    /// Spectrogram output file (JSON)
    #[arg(short, long, default_value = "spectrogram.json")]
    pub output: PathBuf,

    /// Also write the decoded PCM (interleaved, big-endian) to this file
    #[arg(long)]
    pub pcm_out: Option<PathBuf>,

    /// Spectrogram width in pixels; picks the window size when --window-size is unset
    #[arg(long, default_value_t = 800)]
    pub width: usize,

    /// STFT window size in samples (power of two)
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Samples shared by consecutive windows
    #[arg(long, default_value_t = 0)]
    pub overlap: usize,

    /// Apodization function
    #[arg(long, value_enum, default_value_t = WindowFunction::Hann)]
    pub window: WindowFunction,

    /// Store magnitudes on a log scale (20·log10(1 + m))
    #[arg(long)]
    pub log_scale: bool,

    /// Rescale magnitudes into [0, 1] against the loudest bin
    #[arg(long)]
    pub normalize: bool,

    /// Config file (default: ./spectr.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
