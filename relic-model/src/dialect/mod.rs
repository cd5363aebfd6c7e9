//! Dialect dispatch and shared record readers
//!
//! The on-disk family splits into three structural dialects: the modern
//! chunk-wrapped container, the monolithic legacy record, and the
//! ASCII-keyword chunk stream of the older product line. [`load`] sniffs
//! the leading magic and hands the buffer to the right decoder; everything
//! the dialects share (offset arrays, track records) lives here.

pub(crate) mod chunked;
pub(crate) mod legacy;
pub(crate) mod mdx;
pub(crate) mod record;

use crate::error::ModelError;
use crate::model::Model;
use crate::reader::{self, Reader};
use crate::track::{Interpolation, Track, TrackValues};
use crate::{MAGIC_MD20, MAGIC_MD21, MAGIC_MDLX};

/// Decode a model from an in-memory buffer, picking the structural dialect
/// from the leading magic.
pub fn load(data: &[u8]) -> Result<Model, ModelError> {
    if data.len() < 4 {
        return Err(ModelError::TruncatedData {
            offset: 0,
            len: 4,
            buffer_len: data.len(),
        });
    }
    let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    tracing::debug!(magic = format_args!("0x{magic:08X}"), "loading model");
    match magic {
        MAGIC_MD21 => chunked::parse(data),
        MAGIC_MD20 => legacy::parse(data),
        MAGIC_MDLX => mdx::parse(data),
        other => Err(ModelError::UnsupportedFormat(other)),
    }
}

/// Physical layout of a track record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackShape {
    /// Shared timeline plus a per-animation ranges table.
    Flat,
    /// One timestamp/value sub-array per animation.
    Nested,
}

/// Read an offset-array of offset-arrays. Both levels of offsets resolve
/// against the same `base`.
pub(crate) fn read_nested_array<'a, T>(
    cursor: &mut Reader<'a>,
    base: u64,
    mut read_element: impl FnMut(&mut Reader<'a>) -> Result<T, ModelError>,
) -> Result<Vec<Vec<T>>, ModelError> {
    reader::read_array(cursor, base, |outer| {
        reader::read_array(outer, base, &mut read_element)
    })
}

/// Read one animated track record in either physical shape. A negative
/// global sequence index means the track follows the animation clock.
pub(crate) fn read_track<'a, T>(
    cursor: &mut Reader<'a>,
    base: u64,
    shape: TrackShape,
    mut read_value: impl FnMut(&mut Reader<'a>) -> Result<T, ModelError>,
) -> Result<Track<T>, ModelError> {
    let interpolation = Interpolation::from_u16(reader::read_u16(cursor)?);
    let global = reader::read_i16(cursor)?;
    let global_seq = (global >= 0).then_some(global as u16);

    let values = match shape {
        TrackShape::Flat => {
            let ranges = reader::read_array(cursor, base, |c| {
                Ok((reader::read_u32(c)?, reader::read_u32(c)?))
            })?;
            let timestamps = reader::read_array(cursor, base, reader::read_u32)?;
            let values = reader::read_array(cursor, base, &mut read_value)?;
            TrackValues::Flat {
                ranges,
                timestamps,
                values,
            }
        }
        TrackShape::Nested => {
            let timestamps = read_nested_array(cursor, base, reader::read_u32)?;
            let values = read_nested_array(cursor, base, &mut read_value)?;
            TrackValues::PerAnimation { timestamps, values }
        }
    };

    Ok(Track {
        interpolation,
        global_seq,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_unknown_magic() {
        let data = *b"XXXX\0\0\0\0";
        assert_eq!(
            load(&data).err(),
            Some(ModelError::UnsupportedFormat(u32::from_le_bytes(*b"XXXX")))
        );
    }

    #[test]
    fn test_load_rejects_short_buffer() {
        assert_eq!(
            load(&[0x4D, 0x44]).err(),
            Some(ModelError::TruncatedData {
                offset: 0,
                len: 4,
                buffer_len: 2,
            })
        );
    }

    #[test]
    fn test_read_nested_array_shares_base() {
        // Buffer laid out at base 4: outer array of two inner arrays.
        let mut buf = vec![0u8; 4]; // padding before base
        let base = 4u64;

        // Outer header lives at base+0: count 2, offset 8 (to inner headers).
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&8u32.to_le_bytes());

        // Inner headers at base+8: [count 2, offset 24], [count 1, offset 32].
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&24u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&32u32.to_le_bytes());

        // Payloads at base+24 and base+32.
        buf.extend_from_slice(&10u32.to_le_bytes());
        buf.extend_from_slice(&20u32.to_le_bytes());
        buf.extend_from_slice(&30u32.to_le_bytes());

        let mut cursor = Reader::new(&buf);
        cursor.set_position(base);
        let nested = read_nested_array(&mut cursor, base, reader::read_u32).unwrap();
        assert_eq!(nested, vec![vec![10, 20], vec![30]]);
        // Cursor lands just past the outer header.
        assert_eq!(cursor.position(), base + 8);
    }

    #[test]
    fn test_read_track_flat_shape() {
        // Track header at base 0, arrays appended after the 28-byte header.
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u16.to_le_bytes()); // linear
        buf.extend_from_slice(&(-1i16).to_le_bytes()); // no global sequence
        buf.extend_from_slice(&1u32.to_le_bytes()); // ranges count
        buf.extend_from_slice(&28u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes()); // timestamps count
        buf.extend_from_slice(&36u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes()); // values count
        buf.extend_from_slice(&44u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // range (0, 1)
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&100u32.to_le_bytes()); // timestamps
        buf.extend_from_slice(&200u32.to_le_bytes());
        buf.extend_from_slice(&7u32.to_le_bytes()); // values
        buf.extend_from_slice(&9u32.to_le_bytes());

        let mut cursor = Reader::new(&buf);
        let track = read_track(&mut cursor, 0, TrackShape::Flat, reader::read_u32).unwrap();
        assert_eq!(track.interpolation, Interpolation::Linear);
        assert_eq!(track.global_seq, None);
        assert_eq!(
            track.values,
            TrackValues::Flat {
                ranges: vec![(0, 1)],
                timestamps: vec![100, 200],
                values: vec![7, 9],
            }
        );
    }

    #[test]
    fn test_read_track_global_sequence_index() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&3i16.to_le_bytes());
        // Empty nested arrays.
        buf.extend_from_slice(&[0u8; 16]);
        let mut cursor = Reader::new(&buf);
        let track = read_track(&mut cursor, 0, TrackShape::Nested, reader::read_u32).unwrap();
        assert_eq!(track.global_seq, Some(3));
    }
}
