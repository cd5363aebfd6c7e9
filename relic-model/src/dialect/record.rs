//! Shared readers for the monolithic model record
//!
//! The chunk-wrapped dialect embeds the same record the legacy files carry
//! at file start; only the offset base, the track shape and a handful of
//! version-gated fields differ. The walkers here read one table each, with
//! the cursor positioned at the table's pointer pair and `base` naming the
//! origin every offset in the record resolves against.

use glam::{Quat, Vec3};

use crate::error::ModelError;
use crate::model::{
    convert_point, convert_quat, convert_scale, convert_uv, Animation, Bone, Bounds,
    CollisionMesh, Material, Texture, Vertex,
};
use crate::reader::{self, Reader};
use crate::track::decode_quat_i16;

use super::{read_track, TrackShape};

/// How rotation keyframes are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RotationEncoding {
    /// Four quantized `i16` components (legacy revisions).
    CompressedI16,
    /// Four `u16` components rescaled into `[-1, 1]` (chunk-wrapped).
    RescaledU16,
}

/// Version-dependent shape of the record's bone and animation tables.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordLayout {
    pub shape: TrackShape,
    pub rotation: RotationEncoding,
    /// Bones carry a name hash from the middle revision onward.
    pub bone_name_crc: bool,
}

pub(crate) fn read_name(cursor: &mut Reader, base: u64) -> Result<String, ModelError> {
    let len = reader::read_u32(cursor)? as usize;
    let ofs = reader::read_u32(cursor)? as u64;
    let restore = cursor.position();
    cursor.set_position(base + ofs);
    // The stored length includes a trailing NUL.
    let name = reader::read_string(cursor, len.saturating_sub(1))?;
    cursor.set_position(restore);
    Ok(name)
}

pub(crate) fn read_u16_table(cursor: &mut Reader, base: u64) -> Result<Vec<u16>, ModelError> {
    reader::read_array(cursor, base, reader::read_u16)
}

pub(crate) fn read_i16_table(cursor: &mut Reader, base: u64) -> Result<Vec<i16>, ModelError> {
    reader::read_array(cursor, base, reader::read_i16)
}

pub(crate) fn read_u32_table(cursor: &mut Reader, base: u64) -> Result<Vec<u32>, ModelError> {
    reader::read_array(cursor, base, reader::read_u32)
}

/// Animation table. The flat shape stores absolute start/end timestamps on
/// the shared timeline; the nested shape stores an explicit duration and
/// splits the blend time into an in/out pair.
pub(crate) fn read_animations(
    cursor: &mut Reader,
    base: u64,
    shape: TrackShape,
) -> Result<Vec<Animation>, ModelError> {
    reader::read_array(cursor, base, |c| {
        let id = reader::read_u16(c)?;
        let variation_index = reader::read_u16(c)?;
        let (start_ms, duration_ms) = match shape {
            TrackShape::Flat => {
                let start = reader::read_u32(c)?;
                let end = reader::read_u32(c)?;
                (start, end.saturating_sub(start))
            }
            TrackShape::Nested => (0, reader::read_u32(c)?),
        };
        let move_speed = reader::read_f32(c)?;
        let flags = reader::read_u32(c)?;
        let frequency = reader::read_i16(c)?;
        reader::skip(c, 2)?; // padding
        reader::skip(c, 8)?; // replay min/max
        let blend_time = match shape {
            TrackShape::Flat => reader::read_u32(c)?,
            TrackShape::Nested => {
                let blend_in = reader::read_u16(c)? as u32;
                let blend_out = reader::read_u16(c)? as u32;
                blend_in | (blend_out << 16)
            }
        };
        let bounds = read_bounds(c)?;
        let variation_next = reader::read_i16(c)?;
        let alias_next = reader::read_u16(c)?;
        Ok(Animation {
            id,
            variation_index,
            start_ms,
            duration_ms,
            move_speed,
            flags,
            frequency,
            blend_time,
            bounds,
            variation_next,
            alias_next,
        })
    })
}

pub(crate) fn read_playable_lookup(
    cursor: &mut Reader,
    base: u64,
) -> Result<Vec<(u16, u16)>, ModelError> {
    reader::read_array(cursor, base, |c| {
        Ok((reader::read_u16(c)?, reader::read_u16(c)?))
    })
}

pub(crate) fn read_bones(
    cursor: &mut Reader,
    base: u64,
    layout: RecordLayout,
) -> Result<Vec<Bone>, ModelError> {
    reader::read_array(cursor, base, |c| {
        let bone_id = reader::read_i32(c)?;
        let flags = reader::read_u32(c)?;
        let parent = reader::read_i16(c)?;
        let submesh_id = reader::read_u16(c)?;
        if layout.bone_name_crc {
            reader::skip(c, 4)?;
        }
        let translation = read_track(c, base, layout.shape, |v| {
            let [x, y, z] = reader::read_f32_3(v)?;
            Ok(convert_point(x, y, z))
        })?;
        let rotation = read_track(c, base, layout.shape, |v| {
            read_rotation_key(v, layout.rotation)
        })?;
        let scale = read_track(c, base, layout.shape, |v| {
            let [x, y, z] = reader::read_f32_3(v)?;
            Ok(convert_scale(x, y, z))
        })?;
        let [px, py, pz] = reader::read_f32_3(c)?;
        Ok(Bone {
            bone_id,
            flags,
            parent,
            submesh_id,
            pivot: convert_point(px, py, pz),
            translation,
            rotation,
            scale,
        })
    })
}

fn read_rotation_key(cursor: &mut Reader, encoding: RotationEncoding) -> Result<Quat, ModelError> {
    let mut c = [0f32; 4];
    match encoding {
        RotationEncoding::CompressedI16 => {
            for v in &mut c {
                *v = decode_quat_i16(reader::read_i16(cursor)?);
            }
        }
        RotationEncoding::RescaledU16 => {
            // The 65565 divisor is what the format's tooling has always
            // used; 65535 would be the obvious constant but does not match
            // the files in the wild.
            for v in &mut c {
                *v = (reader::read_u16(cursor)? as f32 / 65565.0) - 1.0;
            }
        }
    }
    Ok(convert_quat(c[0], c[1], c[2], c[3]))
}

pub(crate) fn read_vertices(cursor: &mut Reader, base: u64) -> Result<Vec<Vertex>, ModelError> {
    reader::read_array(cursor, base, |c| {
        let [px, py, pz] = reader::read_f32_3(c)?;
        let mut bone_weights = [0u8; 4];
        for w in &mut bone_weights {
            *w = reader::read_u8(c)?;
        }
        let mut bone_indices = [0u8; 4];
        for i in &mut bone_indices {
            *i = reader::read_u8(c)?;
        }
        let [nx, ny, nz] = reader::read_f32_3(c)?;
        let u1 = reader::read_f32(c)?;
        let v1 = reader::read_f32(c)?;
        let u2 = reader::read_f32(c)?;
        let v2 = reader::read_f32(c)?;
        Ok(Vertex {
            position: convert_point(px, py, pz),
            bone_weights,
            bone_indices,
            normal: convert_point(nx, ny, nz),
            uv: convert_uv(u1, v1),
            uv2: convert_uv(u2, v2),
        })
    })
}

/// Texture table. Type-zero entries may embed a path; everything else is
/// matched up with ids from an aux chunk after the record walk.
pub(crate) fn read_textures(cursor: &mut Reader, base: u64) -> Result<Vec<Texture>, ModelError> {
    reader::read_array(cursor, base, |c| {
        let texture_type = reader::read_u32(c)?;
        let flags = reader::read_u32(c)?;
        let name_len = reader::read_u32(c)? as usize;
        let name_ofs = reader::read_u32(c)? as u64;
        let mut filename = String::new();
        if texture_type == 0 && name_ofs > 0 && name_len > 0 {
            let restore = c.position();
            c.set_position(base + name_ofs);
            filename = reader::read_string(c, name_len)?;
            c.set_position(restore);
        }
        Ok(Texture {
            texture_type,
            flags,
            filename,
            file_id: 0,
        })
    })
}

pub(crate) fn read_materials(cursor: &mut Reader, base: u64) -> Result<Vec<Material>, ModelError> {
    reader::read_array(cursor, base, |c| {
        Ok(Material {
            flags: reader::read_u16(c)?,
            blending_mode: reader::read_u16(c)?,
        })
    })
}

/// An axis-aligned box followed by a sphere radius, stored inline.
pub(crate) fn read_bounds(cursor: &mut Reader) -> Result<Bounds, ModelError> {
    let [min_x, min_y, min_z] = reader::read_f32_3(cursor)?;
    let [max_x, max_y, max_z] = reader::read_f32_3(cursor)?;
    let radius = reader::read_f32(cursor)?;
    Ok(Bounds {
        min: Vec3::new(min_x, min_y, min_z),
        max: Vec3::new(max_x, max_y, max_z),
        radius,
    })
}

pub(crate) fn read_collision(
    cursor: &mut Reader,
    base: u64,
) -> Result<CollisionMesh, ModelError> {
    let indices = reader::read_array(cursor, base, reader::read_u16)?;
    let positions = reader::read_array(cursor, base, |c| {
        let [x, y, z] = reader::read_f32_3(c)?;
        Ok(convert_point(x, y, z))
    })?;
    let normals = reader::read_array(cursor, base, |c| {
        let [x, y, z] = reader::read_f32_3(c)?;
        Ok(convert_point(x, y, z))
    })?;
    Ok(CollisionMesh {
        indices,
        positions,
        normals,
    })
}
