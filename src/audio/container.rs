//! Locating the first compressed frame inside a file.
//!
//! MP3 files frequently start with an ID3v2 tag. The tag header declares its
//! own size, which normally tells us exactly where the first frame begins.
//! Real files get that size wrong often enough that we verify the candidate
//! offset and fall back to scanning the whole file for a frame sync.

use serde::Serialize;
use symphonia::core::codecs::{
    CodecType, CODEC_TYPE_AAC, CODEC_TYPE_FLAC, CODEC_TYPE_MP3, CODEC_TYPE_VORBIS,
};

use crate::bitwise::from_synchsafe_u32;
use crate::error::{Result, SpectrError};

pub const ID3_MAGIC: &[u8; 3] = b"ID3";
pub const ID3_HEADER_LEN: usize = 10;
pub const ID3_FOOTER_LEN: usize = 10;

const ID3_FLAGS_OFFSET: usize = 5;
const ID3_SIZE_OFFSET: usize = 6;
const ID3_FLAG_FOOTER: u8 = 0x10;

const FRAME_SYNC: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Mp3,
    Flac,
    Ogg,
    Aac,
    Invalid,
}

impl ContainerKind {
    /// The codec the frames of this container are decoded with.
    pub fn codec_type(self) -> Option<CodecType> {
        match self {
            ContainerKind::Mp3 => Some(CODEC_TYPE_MP3),
            ContainerKind::Flac => Some(CODEC_TYPE_FLAC),
            ContainerKind::Ogg => Some(CODEC_TYPE_VORBIS),
            ContainerKind::Aac => Some(CODEC_TYPE_AAC),
            ContainerKind::Invalid => None,
        }
    }

    pub fn extension(self) -> Option<&'static str> {
        match self {
            ContainerKind::Mp3 => Some("mp3"),
            ContainerKind::Flac => Some("flac"),
            ContainerKind::Ogg => Some("ogg"),
            ContainerKind::Aac => Some("aac"),
            ContainerKind::Invalid => None,
        }
    }
}

/// Where the audio frames of a file start, and what kind of frames they are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLocation {
    pub kind: ContainerKind,
    pub offset: usize,
}

/// Identify the container and find its first frame.
///
/// Only MP3 is recognised today; other containers slot in here as additional
/// locators tried in turn.
pub fn locate(bytes: &[u8]) -> Result<FrameLocation> {
    let offset = locate_frame_offset(bytes)?;
    Ok(FrameLocation {
        kind: ContainerKind::Mp3,
        offset,
    })
}

pub fn detect_container(bytes: &[u8]) -> Result<ContainerKind> {
    locate(bytes).map(|loc| loc.kind)
}

/// Byte offset of the first MP3 frame header in `bytes`.
///
/// Fails with an I/O error when the buffer cannot even hold an ID3v2 header,
/// and with `InvalidInput` when no frame sync exists anywhere.
///
/// The scan fallback is a heuristic: on a file whose tag size is wrong it
/// can land on a sync-like byte pair inside tag or audio data.
pub fn locate_frame_offset(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < ID3_HEADER_LEN {
        return Err(SpectrError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "file is {} bytes, shorter than the {}-byte minimum",
                bytes.len(),
                ID3_HEADER_LEN
            ),
        )));
    }

    let tag_end = id3_tag_end(bytes);
    let candidate = tag_end.unwrap_or(0);

    if is_frame_sync(bytes, candidate) {
        log::debug!("First MP3 frame at offset {}", candidate);
        return Ok(candidate);
    }

    if let Some(end) = tag_end {
        log::warn!(
            "ID3 tag claims audio starts at offset {}, but no frame sync is there; scanning file",
            end
        );
    }

    let offset = scan_for_frame_sync(bytes)
        .ok_or_else(|| SpectrError::invalid("no MP3 frame header found"))?;
    log::debug!("First MP3 frame found by scan at offset {}", offset);
    Ok(offset)
}

/// Offset just past the ID3v2 tag (and its footer, if flagged), or `None`
/// when the file does not start with a tag.
pub fn id3_tag_end(bytes: &[u8]) -> Option<usize> {
    if !bytes.starts_with(ID3_MAGIC) {
        return None;
    }

    let flags = *bytes.get(ID3_FLAGS_OFFSET)?;
    let body = from_synchsafe_u32(bytes, ID3_SIZE_OFFSET)? as usize;

    let mut end = body + ID3_HEADER_LEN;
    if flags & ID3_FLAG_FOOTER != 0 {
        end += ID3_FOOTER_LEN;
    }
    Some(end)
}

/// True when an MP3 frame sync (`FF FB` or `FF FA`) starts at `offset`.
pub fn is_frame_sync(bytes: &[u8], offset: usize) -> bool {
    matches!(
        bytes.get(offset..).and_then(|rest| rest.get(..2)),
        Some([FRAME_SYNC, 0xFA | 0xFB])
    )
}

pub fn scan_for_frame_sync(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(2)
        .position(|pair| matches!(pair, [FRAME_SYNC, 0xFA | 0xFB]))
}
