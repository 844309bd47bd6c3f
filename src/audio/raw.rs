use std::io::Write;
use std::path::Path;

use super::codec::{FrameDecoder, SymphoniaDecoder};
use super::container;
use super::stat::{self, StreamStat};
use crate::error::{try_vec_with_capacity, Result, SpectrError};

/// One PCM frame. Only the low `bit_depth` bits are meaningful, sign-extended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StereoSample {
    pub left: i32,
    pub right: i32,
}

impl StereoSample {
    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Average of both channels, rounded toward negative infinity, without
    /// overflowing on extreme inputs.
    pub fn mono(self) -> i32 {
        ((i64::from(self.left) + i64::from(self.right)) >> 1) as i32
    }
}

/// Decoded stereo PCM of a whole file.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAudio {
    stat: StreamStat,
    samples: Vec<StereoSample>,
}

impl RawAudio {
    pub fn new(stat: StreamStat, samples: Vec<StereoSample>) -> Self {
        Self { stat, samples }
    }

    /// Reinterpret interleaved big-endian PCM bytes as stereo samples.
    pub fn from_pcm_bytes(stat: StreamStat, pcm: &[u8]) -> Result<Self> {
        let width = sample_width(stat.bit_depth)?;
        let frame_bytes = 2 * width;

        if pcm.len() % frame_bytes != 0 {
            return Err(SpectrError::invalid(format!(
                "{} PCM bytes is not a whole number of {}-byte stereo frames",
                pcm.len(),
                frame_bytes
            )));
        }

        let mut samples = try_vec_with_capacity(pcm.len() / frame_bytes, "decoded samples")?;
        samples.extend(pcm.chunks_exact(frame_bytes).map(|frame| {
            let (left, right) = frame.split_at(width);
            StereoSample::new(read_be_sample(left), read_be_sample(right))
        }));

        Ok(Self { stat, samples })
    }

    pub fn stat(&self) -> &StreamStat {
        &self.stat
    }

    pub fn samples(&self) -> &[StereoSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.stat.duration_secs(self.samples.len())
    }

    /// Independent copy of samples `[offset, offset + length)`.
    pub fn copy_window(&self, offset: usize, length: usize) -> Result<RawAudio> {
        let window = offset
            .checked_add(length)
            .and_then(|end| self.samples.get(offset..end))
            .ok_or_else(|| {
                SpectrError::invalid(format!(
                    "window [{}, +{}) exceeds {} samples",
                    offset,
                    length,
                    self.samples.len()
                ))
            })?;

        let mut samples = try_vec_with_capacity(length, "sample window")?;
        samples.extend_from_slice(window);

        Ok(RawAudio {
            stat: self.stat,
            samples,
        })
    }

    pub fn copy(&self) -> Result<RawAudio> {
        self.copy_window(0, self.samples.len())
    }

    /// Write the samples back out as interleaved big-endian PCM at the
    /// stream's bit depth.
    pub fn write_pcm<W: Write>(&self, out: &mut W) -> Result<()> {
        let width = sample_width(self.stat.bit_depth)?;
        for s in &self.samples {
            out.write_all(&s.left.to_be_bytes()[4 - width..])?;
            out.write_all(&s.right.to_be_bytes()[4 - width..])?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Decode the file at `path` with the default codec.
pub fn decode(path: &Path) -> Result<RawAudio> {
    decode_with(path, &SymphoniaDecoder)
}

pub fn decode_with<D: FrameDecoder + ?Sized>(path: &Path, decoder: &D) -> Result<RawAudio> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes, decoder)
}

/// Decode an in-memory file: locate its frames, read the stream parameters,
/// run the codec and materialise the resulting PCM.
pub fn decode_bytes<D: FrameDecoder + ?Sized>(bytes: &[u8], decoder: &D) -> Result<RawAudio> {
    let location = container::locate(bytes)?;
    let stat = stat::read_stats_at(bytes, &location)?;
    let pcm = decoder.decode_frames(bytes, &location)?;
    let raw = RawAudio::from_pcm_bytes(stat, &pcm)?;

    log::info!(
        "Decoded audio: {} samples, {}Hz, {}-bit, {:.1}s",
        raw.len(),
        stat.sample_rate,
        stat.bit_depth,
        raw.duration_secs()
    );

    Ok(raw)
}

/// Bytes per channel sample for a bit depth.
fn sample_width(bit_depth: u32) -> Result<usize> {
    match bit_depth {
        8 | 16 | 24 | 32 => Ok(bit_depth as usize / 8),
        _ => Err(SpectrError::invalid(format!(
            "unsupported PCM bit depth {}",
            bit_depth
        ))),
    }
}

fn read_be_sample(bytes: &[u8]) -> i32 {
    let acc = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    let shift = 32 - 8 * bytes.len() as u32;
    ((acc << shift) as i32) >> shift
}
