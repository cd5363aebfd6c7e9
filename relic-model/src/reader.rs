//! Bounds-checked little-endian read helpers and the offset-array decoder
//!
//! All binary decoding in this crate goes through these helpers. Reads that
//! would cross the end of the buffer surface [`ModelError::TruncatedData`]
//! with the offending offset and length instead of an opaque IO error.

use std::io::Cursor;

use crate::error::ModelError;

pub(crate) type Reader<'a> = Cursor<&'a [u8]>;

/// Borrow `len` bytes at the current position and advance past them.
fn take<'a>(cursor: &mut Reader<'a>, len: usize) -> Result<&'a [u8], ModelError> {
    let offset = cursor.position();
    let buf = *cursor.get_ref();
    let start = offset as usize;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .ok_or(ModelError::TruncatedData {
            offset,
            len,
            buffer_len: buf.len(),
        })?;
    cursor.set_position(end as u64);
    Ok(&buf[start..end])
}

pub(crate) fn remaining(cursor: &Reader) -> u64 {
    let len = cursor.get_ref().len() as u64;
    len.saturating_sub(cursor.position())
}

pub(crate) fn read_u8(cursor: &mut Reader) -> Result<u8, ModelError> {
    Ok(take(cursor, 1)?[0])
}

pub(crate) fn read_u16(cursor: &mut Reader) -> Result<u16, ModelError> {
    let b = take(cursor, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_i16(cursor: &mut Reader) -> Result<i16, ModelError> {
    let b = take(cursor, 2)?;
    Ok(i16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(cursor: &mut Reader) -> Result<u32, ModelError> {
    let b = take(cursor, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_i32(cursor: &mut Reader) -> Result<i32, ModelError> {
    let b = take(cursor, 4)?;
    Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_f32(cursor: &mut Reader) -> Result<f32, ModelError> {
    let b = take(cursor, 4)?;
    Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_f32_3(cursor: &mut Reader) -> Result<[f32; 3], ModelError> {
    Ok([read_f32(cursor)?, read_f32(cursor)?, read_f32(cursor)?])
}

/// Read `len` bytes as a string, stopping at the first NUL and trimming
/// trailing whitespace. Invalid UTF-8 is replaced, never fatal.
pub(crate) fn read_string(cursor: &mut Reader, len: usize) -> Result<String, ModelError> {
    let bytes = take(cursor, len)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).trim_end().to_string())
}

/// Advance the cursor by `len` bytes with bounds checking.
pub(crate) fn skip(cursor: &mut Reader, len: usize) -> Result<(), ModelError> {
    take(cursor, len)?;
    Ok(())
}

/// Decode one `(count u32, offset u32)` pointer pair.
///
/// Seeks to `base + offset`, invokes `read_element` exactly `count` times,
/// then restores the cursor to just past the pair. The base offset is
/// threaded explicitly by the caller - file start for the legacy dialects,
/// record payload start for the chunk-wrapped dialect - and never inferred
/// from the current cursor position. Nested pairs (the modern per-animation
/// track shape) resolve against the same base by calling `read_array` again
/// inside `read_element`.
pub(crate) fn read_array<'a, T>(
    cursor: &mut Reader<'a>,
    base: u64,
    mut read_element: impl FnMut(&mut Reader<'a>) -> Result<T, ModelError>,
) -> Result<Vec<T>, ModelError> {
    let count = read_u32(cursor)? as usize;
    let offset = read_u32(cursor)? as u64;

    let restore = cursor.position();
    cursor.set_position(base + offset);

    // Cap the pre-allocation so a corrupt count cannot balloon memory
    // before the first truncated read fails.
    let mut elements = Vec::with_capacity(count.min(0x10000));
    for _ in 0..count {
        elements.push(read_element(cursor)?);
    }

    cursor.set_position(restore);
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3F];
        let mut cursor = Reader::new(&data);
        assert_eq!(read_u16(&mut cursor).unwrap(), 0x0201);
        assert_eq!(read_u16(&mut cursor).unwrap(), 0x0403);
        assert_eq!(read_f32(&mut cursor).unwrap(), 1.0);
    }

    #[test]
    fn test_truncated_read_reports_offset_and_len() {
        let data = [0u8; 6];
        let mut cursor = Reader::new(&data);
        cursor.set_position(4);
        let err = read_u32(&mut cursor).unwrap_err();
        assert_eq!(
            err,
            ModelError::TruncatedData {
                offset: 4,
                len: 4,
                buffer_len: 6
            }
        );
    }

    #[test]
    fn test_read_string_stops_at_nul() {
        let data = b"Creature\0junk";
        let mut cursor = Reader::new(&data[..]);
        assert_eq!(read_string(&mut cursor, data.len()).unwrap(), "Creature");
    }

    #[test]
    fn test_read_array_restores_cursor() {
        // Pair at offset 0 pointing at three u16 values stored at offset 8.
        let mut data = vec![];
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&[10, 0, 20, 0, 30, 0]);

        let mut cursor = Reader::new(&data[..]);
        let values = read_array(&mut cursor, 0, read_u16).unwrap();
        assert_eq!(values, vec![10, 20, 30]);
        // Cursor resumes immediately after the pair.
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_read_array_threads_base_offset() {
        // Values live at absolute 12, the pair stores offset 4 relative to
        // a base of 8.
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(&[7, 0, 9, 0]);

        let mut cursor = Reader::new(&data[..]);
        cursor.set_position(4);
        let values = read_array(&mut cursor, 8, read_u16).unwrap();
        assert_eq!(values, vec![7, 9]);
    }

    #[test]
    fn test_read_array_out_of_bounds_is_truncated() {
        let mut data = vec![];
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());

        let mut cursor = Reader::new(&data[..]);
        let err = read_array(&mut cursor, 0, read_u16).unwrap_err();
        assert!(matches!(err, ModelError::TruncatedData { .. }));
    }
}
