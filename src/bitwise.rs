//! Small integer helpers shared by the container parser and the STFT.

/// Decode a 32-bit synchsafe integer starting at `buf[offset]`.
///
/// Only the low 7 bits of each of the four bytes carry data, most
/// significant byte first, so the result fits in 28 bits.
/// Returns `None` when fewer than four bytes remain.
pub fn from_synchsafe_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F)),
    )
}

pub fn is_pow2(x: usize) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

/// Largest power of two `<= x`; zero maps to zero.
pub fn flp2(x: usize) -> usize {
    if x == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - x.leading_zeros())
    }
}

/// Map `v` from the range `[omin, omax]` onto `[nmin, nmax]`.
pub fn scale(omin: f64, omax: f64, nmin: f64, nmax: f64, v: f64) -> f64 {
    if omax == omin {
        return nmin;
    }
    nmin + (v - omin) * (nmax - nmin) / (omax - omin)
}
