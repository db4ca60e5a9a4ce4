//! Turns a rule's `Offset` into an absolute position in the buffer.

use std::convert::TryFrom;
use crate::endian;
use crate::error::OffsetError;
use super::{IndirectOffset, Offset, OffsetType};

/// Resolves `offset` against `buffer`, with `cursor` as the base of any
/// relative part.
///
/// The returned position may lie past the end of the buffer; it is the
/// matcher that decides whether enough bytes are left there.
pub fn resolve(offset: &Offset, buffer: &[u8], cursor: usize) -> Result<usize, OffsetError> {
    let cursor = i64::try_from(cursor).map_err(|_| OffsetError::Overflow)?;

    let base = match offset.offset_type {
        OffsetType::Direct(direct) => direct,
        OffsetType::Indirect(ref indirect) => resolve_indirect(indirect, buffer, cursor)?,
    };

    let position = if offset.is_relative {
        base.checked_add(cursor).ok_or(OffsetError::Overflow)?
    } else {
        base
    };

    usize::try_from(position).map_err(|_| OffsetError::OutOfBounds {
        position: position,
        width: 0,
        len: buffer.len(),
    })
}

fn resolve_indirect(indirect: &IndirectOffset, buffer: &[u8], cursor: i64) -> Result<i64, OffsetError> {
    // A bad width is reported before any bounds problem
    let width = endian::check_width(indirect.byte_width)?;

    let address = if indirect.is_relative {
        indirect.offset_address.checked_add(cursor).ok_or(OffsetError::Overflow)?
    } else {
        indirect.offset_address
    };
    let at = usize::try_from(address).map_err(|_| OffsetError::OutOfBounds {
        position: address,
        width: width,
        len: buffer.len(),
    })?;

    let pointer = endian::read_uint(buffer, at, indirect.byte_width, indirect.endianness)?;
    let pointer = i64::try_from(pointer).map_err(|_| OffsetError::Overflow)?;

    let bias = if indirect.adjustment_is_relative { cursor } else { 0 };
    indirect.adjustment.apply(pointer, bias)
}
