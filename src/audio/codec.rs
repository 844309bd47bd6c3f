//! The boundary to the audio codec.
//!
//! Everything behind [`FrameDecoder`] is opaque to the rest of the crate: it
//! turns compressed frames into a flat, interleaved PCM byte buffer. The
//! production implementation is backed by symphonia.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::container::FrameLocation;
use crate::error::{Result, SpectrError};

/// Decodes the compressed frames of a file into PCM bytes.
///
/// The returned buffer holds interleaved left/right pairs, each channel
/// sample stored most significant byte first at the bit depth reported by
/// the stream statistics reader for the same container.
pub trait FrameDecoder {
    fn decode_frames(&self, file_bytes: &[u8], location: &FrameLocation) -> Result<Vec<u8>>;
}

/// Symphonia-backed decoder producing 16-bit big-endian stereo PCM.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl FrameDecoder for SymphoniaDecoder {
    fn decode_frames(&self, file_bytes: &[u8], location: &FrameLocation) -> Result<Vec<u8>> {
        let frames = file_bytes.get(location.offset..).ok_or_else(|| {
            SpectrError::invalid(format!(
                "frame offset {} is past the end of a {}-byte file",
                location.offset,
                file_bytes.len()
            ))
        })?;

        let mss = MediaSourceStream::new(Box::new(Cursor::new(frames.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = location.kind.extension() {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(library_error)?;

        let mut format = probed.format;

        let wanted = location.kind.codec_type();
        let track = format
            .tracks()
            .iter()
            .find(|t| match wanted {
                Some(codec) => t.codec_params.codec == codec,
                None => t.codec_params.codec != CODEC_TYPE_NULL,
            })
            .ok_or_else(|| SpectrError::Library("no decodable audio track".into()))?;

        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(library_error)?;

        let mut pcm: Vec<u8> = Vec::new();
        let mut skipped = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(library_error(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(_)) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(library_error(e)),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count();

            let mut sample_buf = SampleBuffer::<i16>::new(decoded.frames() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            append_stereo_be16(&mut pcm, sample_buf.samples(), channels);
        }

        if skipped > 0 {
            log::warn!("Skipped {} undecodable packets", skipped);
        }

        log::info!("Decoded {} bytes of PCM", pcm.len());

        Ok(pcm)
    }
}

fn library_error(e: SymphoniaError) -> SpectrError {
    SpectrError::Library(e.to_string())
}

/// Append interleaved samples as stereo big-endian pairs. Mono is duplicated
/// into both channels; channels beyond the first two are dropped.
fn append_stereo_be16(out: &mut Vec<u8>, interleaved: &[i16], channels: usize) {
    if channels == 0 {
        return;
    }
    out.reserve(interleaved.len() / channels * 4);
    for frame in interleaved.chunks_exact(channels) {
        let left = frame[0];
        let right = frame.get(1).copied().unwrap_or(left);
        out.extend_from_slice(&left.to_be_bytes());
        out.extend_from_slice(&right.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::container::{self, ContainerKind};
    use crate::audio::raw::decode_bytes;
    use crate::audio::stat::MP3_DECODED_BIT_DEPTH;

    #[test]
    fn stereo_passes_through_big_endian() {
        let mut out = Vec::new();
        append_stereo_be16(&mut out, &[0x0102, -2], 2);
        assert_eq!(out, vec![0x01, 0x02, 0xFF, 0xFE]);
    }

    #[test]
    fn mono_is_duplicated() {
        let mut out = Vec::new();
        append_stereo_be16(&mut out, &[7, -1], 1);
        assert_eq!(out, vec![0, 7, 0, 7, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn extra_channels_dropped() {
        let mut out = Vec::new();
        append_stereo_be16(&mut out, &[1, 2, 3, 4, 5, 6], 3);
        assert_eq!(out, vec![0, 1, 0, 2, 0, 4, 0, 5]);
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let loc = FrameLocation {
            kind: ContainerKind::Mp3,
            offset: 100,
        };
        let err = SymphoniaDecoder.decode_frames(&[0u8; 10], &loc).unwrap_err();
        assert!(err.is_invalid_input());
    }

    const SILENT_FRAMES: usize = 40;
    const SAMPLES_PER_FRAME: usize = 1152;

    /// Silent MPEG 1 layer III stream, 128 kbit/s at 44.1 kHz: 417-byte
    /// frames with an all-zero body, optionally behind a 32-byte ID3v2 tag.
    fn silent_mp3(tagged: bool) -> Vec<u8> {
        let mut file = Vec::new();
        if tagged {
            file.extend_from_slice(b"ID3");
            file.extend_from_slice(&[0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20]);
            file.resize(file.len() + 32, 0);
        }
        for _ in 0..SILENT_FRAMES {
            file.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            file.resize(file.len() + 413, 0);
        }
        file
    }

    #[test]
    fn decodes_real_mp3_frames() {
        for tagged in [false, true] {
            let file = silent_mp3(tagged);
            let location = container::locate(&file).unwrap();
            assert_eq!(location.offset, if tagged { 42 } else { 0 });

            let pcm = SymphoniaDecoder.decode_frames(&file, &location).unwrap();
            assert_eq!(pcm.len(), SILENT_FRAMES * SAMPLES_PER_FRAME * 4);
        }
    }

    #[test]
    fn decoded_pcm_matches_reported_bit_depth() {
        for tagged in [false, true] {
            let raw = decode_bytes(&silent_mp3(tagged), &SymphoniaDecoder).unwrap();
            assert_eq!(raw.stat().bit_depth, MP3_DECODED_BIT_DEPTH);
            assert_eq!(raw.stat().sample_rate, 44100);
            assert_eq!(raw.len(), SILENT_FRAMES * SAMPLES_PER_FRAME);
        }
    }
}
