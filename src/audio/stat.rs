use serde::Serialize;

use super::container::{self, ContainerKind, FrameLocation};
use crate::error::{Result, SpectrError};

/// Bit depth of the PCM the MP3 codec hands back.
pub const MP3_DECODED_BIT_DEPTH: u32 = 16;

const MP3_HEADER_LEN: usize = 4;

/// Encoding parameters of a decoded stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StreamStat {
    pub container_kind: ContainerKind,
    pub bit_depth: u32,
    pub sample_rate: u32,
}

impl StreamStat {
    pub fn new(container_kind: ContainerKind, bit_depth: u32, sample_rate: u32) -> Self {
        Self {
            container_kind,
            bit_depth,
            sample_rate,
        }
    }

    pub fn duration_secs(&self, sample_count: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        sample_count as f64 / self.sample_rate as f64
    }

    /// Duration as `M:SS`, or `H:MM:SS` from one hour up.
    pub fn duration_string(&self, sample_count: usize) -> String {
        let total_secs = self.duration_secs(sample_count) as u64;
        if total_secs >= 3600 {
            format!(
                "{}:{:02}:{:02}",
                total_secs / 3600,
                (total_secs % 3600) / 60,
                total_secs % 60
            )
        } else {
            format!("{}:{:02}", total_secs / 60, total_secs % 60)
        }
    }

    pub fn nyquist_frequency(&self) -> u32 {
        self.sample_rate / 2
    }

    pub fn nyquist_string(&self) -> String {
        format!("{:.2} kHz", self.nyquist_frequency() as f64 / 1000.0)
    }
}

/// Locate the first frame in `bytes` and read the stream parameters from it.
pub fn read_stats(bytes: &[u8]) -> Result<StreamStat> {
    let location = container::locate(bytes)?;
    read_stats_at(bytes, &location)
}

/// Read stream parameters from an already-located frame header.
pub fn read_stats_at(bytes: &[u8], location: &FrameLocation) -> Result<StreamStat> {
    match location.kind {
        ContainerKind::Mp3 => read_mp3_stats(bytes, location.offset),
        other => Err(SpectrError::invalid(format!(
            "no stream statistics reader for {:?} files",
            other
        ))),
    }
}

// Frame header layout:
//
//   AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//
// A sync, B version id, C layer, D protection, E bitrate index,
// F sample rate index, G padding, H private, I channel mode.
fn read_mp3_stats(bytes: &[u8], offset: usize) -> Result<StreamStat> {
    let header = bytes
        .get(offset..)
        .and_then(|rest| rest.get(..MP3_HEADER_LEN))
        .ok_or_else(|| {
            SpectrError::io(format!("truncated MP3 frame header at offset {}", offset))
        })?;

    let version = (header[1] & 0x18) >> 3;
    let rate = (header[2] & 0x0C) >> 2;

    Ok(StreamStat::new(
        ContainerKind::Mp3,
        MP3_DECODED_BIT_DEPTH,
        mp3_sample_rate(version, rate)?,
    ))
}

/// Sample rate for an MPEG audio version id and sample rate index.
pub fn mp3_sample_rate(version: u8, rate: u8) -> Result<u32> {
    let rates: [u32; 3] = match version {
        0b00 => [11025, 12000, 8000],  // MPEG 2.5
        0b10 => [22050, 24000, 16000], // MPEG 2
        0b11 => [44100, 48000, 32000], // MPEG 1
        _ => {
            return Err(SpectrError::invalid(format!(
                "reserved MPEG version id {:#04b}",
                version
            )))
        }
    };

    rates.get(rate as usize).copied().ok_or_else(|| {
        SpectrError::invalid(format!("reserved MPEG sample rate index {:#04b}", rate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(offset: usize, b1: u8, b2: u8) -> Vec<u8> {
        let mut buf = vec![0u8; offset];
        buf.extend_from_slice(&[0xFF, b1, b2, 0x64]);
        buf.resize(buf.len().max(32), 0);
        buf
    }

    #[test]
    fn sample_rate_table() {
        assert_eq!(mp3_sample_rate(0b11, 0).unwrap(), 44100);
        assert_eq!(mp3_sample_rate(0b11, 1).unwrap(), 48000);
        assert_eq!(mp3_sample_rate(0b11, 2).unwrap(), 32000);
        assert_eq!(mp3_sample_rate(0b10, 0).unwrap(), 22050);
        assert_eq!(mp3_sample_rate(0b10, 1).unwrap(), 24000);
        assert_eq!(mp3_sample_rate(0b10, 2).unwrap(), 16000);
        assert_eq!(mp3_sample_rate(0b00, 0).unwrap(), 11025);
        assert_eq!(mp3_sample_rate(0b00, 1).unwrap(), 12000);
        assert_eq!(mp3_sample_rate(0b00, 2).unwrap(), 8000);
    }

    #[test]
    fn reserved_codes_rejected() {
        assert!(mp3_sample_rate(0b11, 3).unwrap_err().is_invalid_input());
        assert!(mp3_sample_rate(0b01, 0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn reads_mpeg1_header() {
        // FF FB 90: MPEG 1 layer III, 128 kbit/s, 44.1 kHz.
        let stat = read_stats(&frame_at(0, 0xFB, 0x90)).unwrap();
        assert_eq!(stat.container_kind, ContainerKind::Mp3);
        assert_eq!(stat.bit_depth, 16);
        assert_eq!(stat.sample_rate, 44100);
    }

    #[test]
    fn reads_header_after_leading_junk() {
        // FF FA 94: rate index 01, 48 kHz.
        let stat = read_stats(&frame_at(12, 0xFA, 0x94)).unwrap();
        assert_eq!(stat.sample_rate, 48000);
    }

    #[test]
    fn reserved_rate_in_header_fails() {
        let err = read_stats(&frame_at(0, 0xFB, 0x9C)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn truncated_header_is_io_error() {
        let mut buf = vec![0u8; 20];
        buf[18] = 0xFF;
        buf[19] = 0xFB;
        let err = read_stats(&buf).unwrap_err();
        assert!(matches!(err, SpectrError::Io(_)));
    }

    #[test]
    fn unsupported_container() {
        let loc = FrameLocation {
            kind: ContainerKind::Flac,
            offset: 0,
        };
        assert!(read_stats_at(&[0u8; 16], &loc).unwrap_err().is_invalid_input());
    }

    #[test]
    fn duration_and_nyquist_strings() {
        let stat = StreamStat::new(ContainerKind::Mp3, 16, 44100);
        assert_eq!(stat.duration_string(44100 * 75), "1:15");
        assert_eq!(stat.duration_string(44100 * 3725), "1:02:05");
        assert_eq!(stat.duration_string(100), "0:00");
        assert_eq!(stat.nyquist_frequency(), 22050);
        assert_eq!(stat.nyquist_string(), "22.05 kHz");
        assert!((stat.duration_secs(22050) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_duration() {
        let stat = StreamStat::new(ContainerKind::Invalid, 0, 0);
        assert_eq!(stat.duration_secs(1000), 0.0);
    }
}
