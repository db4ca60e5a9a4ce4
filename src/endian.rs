//! Byte order handling for multi-byte reads

use crate::error::ReadError;

/// Order in which a multi-byte number is stored.
///
/// There is no "native" variant: every rule states its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl Endianness {
    /// Little becomes big and big becomes little.
    pub fn swapped(self) -> Endianness {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }

    /// Swapped order if `swap` is true, otherwise unchanged.
    pub fn maybe_swapped(self, swap: bool) -> Endianness {
        if swap {
            self.swapped()
        } else {
            self
        }
    }
}

/// Checks that `width` is one the decoder supports and returns it as a length.
pub fn check_width(width: u8) -> Result<usize, ReadError> {
    match width {
        1 | 2 | 4 | 8 => Ok(width as usize),
        _ => Err(ReadError::UnsupportedWidth(width)),
    }
}

/// Decodes exactly `width` bytes into an unsigned integer.
pub fn decode(width: u8, endianness: Endianness, bytes: &[u8]) -> Result<u64, ReadError> {
    let len = check_width(width)?;
    if bytes.len() != len {
        return Err(ReadError::OutOfBounds {
            position: 0,
            width: len,
            len: bytes.len(),
        });
    }

    let shift_in = |acc: u64, &b: &u8| (acc << 8) | b as u64;
    Ok(match endianness {
        Endianness::Little => bytes.iter().rev().fold(0, shift_in),
        Endianness::Big => bytes.iter().fold(0, shift_in),
    })
}

/// Reads a `width`-byte unsigned integer at `position`, bounds checked.
pub fn read_uint(
    buffer: &[u8],
    position: usize,
    width: u8,
    endianness: Endianness,
) -> Result<u64, ReadError> {
    let len = check_width(width)?;
    let end = position.checked_add(len);

    match end {
        Some(end) if end <= buffer.len() => decode(width, endianness, &buffer[position..end]),
        _ => Err(ReadError::OutOfBounds {
            position: position as i64,
            width: len,
            len: buffer.len(),
        }),
    }
}

/// All ones across `width` bytes.
pub fn width_mask(width: u8) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width as u32 * 8)) - 1
    }
}

/// Interprets the low `width` bytes of `raw` as a two's complement number.
pub fn sign_extend(raw: u64, width: u8) -> i64 {
    if width == 0 || width >= 8 {
        return raw as i64;
    }
    let unused = 64 - width as u32 * 8;
    ((raw << unused) as i64) >> unused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_round_trips() {
        for &e in &[Endianness::Little, Endianness::Big] {
            assert_eq!(e.swapped().swapped(), e);
            assert_ne!(e.swapped(), e);
            assert_eq!(e.maybe_swapped(false), e);
            assert_eq!(e.maybe_swapped(true), e.swapped());
        }
    }

    #[test]
    fn decodes_both_orders() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(decode(4, Endianness::Little, &bytes), Ok(0x7856_3412));
        assert_eq!(decode(4, Endianness::Big, &bytes), Ok(0x1234_5678));
        assert_eq!(decode(2, Endianness::Big, &bytes[..2]), Ok(0x1234));
        assert_eq!(decode(1, Endianness::Big, &bytes[..1]), Ok(0x12));
        assert_eq!(
            decode(8, Endianness::Little, &[1, 0, 0, 0, 0, 0, 0, 0x80]),
            Ok(0x8000_0000_0000_0001)
        );
    }

    #[test]
    fn rejects_odd_widths() {
        assert_eq!(decode(3, Endianness::Little, &[0, 0, 0]), Err(ReadError::UnsupportedWidth(3)));
        assert_eq!(read_uint(&[0; 16], 0, 0, Endianness::Big), Err(ReadError::UnsupportedWidth(0)));
    }

    #[test]
    fn short_reads_are_out_of_bounds() {
        let buf = [1, 2, 3];
        assert!(read_uint(&buf, 0, 4, Endianness::Little).is_err());
        assert!(read_uint(&buf, 2, 2, Endianness::Little).is_err());
        assert!(read_uint(&buf, usize::MAX, 1, Endianness::Little).is_err());
        assert_eq!(read_uint(&buf, 1, 2, Endianness::Little), Ok(0x0302));
    }

    #[test]
    fn masks_and_signs() {
        assert_eq!(width_mask(1), 0xff);
        assert_eq!(width_mask(4), 0xffff_ffff);
        assert_eq!(width_mask(8), u64::MAX);
        assert_eq!(sign_extend(0xff, 1), -1);
        assert_eq!(sign_extend(0x7f, 1), 127);
        assert_eq!(sign_extend(0x8000, 2), -32768);
        assert_eq!(sign_extend(u64::MAX, 8), -1);
    }
}
