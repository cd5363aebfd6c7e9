//! Monolithic legacy dialect
//!
//! Legacy files start directly with the record magic; every offset is
//! relative to the file start. Three revisions share the walk with small
//! gates: the classic revision (256-257) has a playable-animation fallback
//! table, inline skin views and a texture-flipbook table; the middle
//! revision (260-263) adds a bone name hash and keeps inline views; the
//! late revision (264) switches tracks to the per-animation shape and
//! moves skin views into external resources it has no ids for.

use crate::error::ModelError;
use crate::model::{Dialect, Model};
use crate::reader::{self, Reader};
use crate::skin::{self, Skin, SkinSlot, Submesh};
use crate::{
    MAGIC_MD20, VERSION_CLASSIC_MAX, VERSION_CLASSIC_MIN, VERSION_LATE, VERSION_MIDDLE_MAX,
    VERSION_MIDDLE_MIN,
};

use super::record::{self, RecordLayout, RotationEncoding};
use super::TrackShape;

pub(crate) fn parse(data: &[u8]) -> Result<Model, ModelError> {
    let mut cursor = Reader::new(data);

    let magic = reader::read_u32(&mut cursor)?;
    debug_assert_eq!(magic, MAGIC_MD20);
    let version = reader::read_u32(&mut cursor)?;

    let dialect = match version {
        VERSION_CLASSIC_MIN..=VERSION_CLASSIC_MAX => Dialect::Classic,
        VERSION_MIDDLE_MIN..=VERSION_MIDDLE_MAX => Dialect::Middle,
        VERSION_LATE => Dialect::Late,
        other => return Err(ModelError::UnsupportedVersion(other)),
    };

    let layout = RecordLayout {
        shape: if dialect == Dialect::Late {
            TrackShape::Nested
        } else {
            TrackShape::Flat
        },
        rotation: RotationEncoding::CompressedI16,
        bone_name_crc: dialect != Dialect::Classic,
    };

    // All offsets in the record resolve against the file start.
    let base = 0u64;
    let cursor = &mut cursor;

    let mut model = Model::empty(dialect, version);
    model.name = record::read_name(cursor, base)?;
    model.flags = reader::read_u32(cursor)?;
    model.global_sequences = record::read_u32_table(cursor, base)?;
    model.animations = record::read_animations(cursor, base, layout.shape)?;
    model.animation_lookup = record::read_i16_table(cursor, base)?;
    if dialect == Dialect::Classic {
        model.playable_animation_lookup = record::read_playable_lookup(cursor, base)?;
    }
    model.bones = record::read_bones(cursor, base, layout)?;
    model.bone_lookup = record::read_i16_table(cursor, base)?;
    model.vertices = record::read_vertices(cursor, base)?;
    if dialect == Dialect::Late {
        model.view_count = reader::read_u32(cursor)? as usize;
        model.skins = vec![SkinSlot::Empty; model.view_count];
    } else {
        model.skins = parse_inline_views(cursor, base, dialect)?
            .into_iter()
            .map(SkinSlot::Ready)
            .collect();
        model.view_count = model.skins.len();
    }
    reader::skip(cursor, 8)?; // colors
    model.textures = record::read_textures(cursor, base)?;
    reader::skip(cursor, 8)?; // texture weights
    if dialect == Dialect::Classic {
        reader::skip(cursor, 8)?; // texture flipbooks
    }
    reader::skip(cursor, 8)?; // texture transforms
    model.replaceable_texture_lookup = record::read_i16_table(cursor, base)?;
    model.materials = record::read_materials(cursor, base)?;
    reader::skip(cursor, 8)?; // bone combos
    model.texture_combos = record::read_u16_table(cursor, base)?;
    reader::skip(cursor, 8)?; // texture coordinate combos
    model.transparency_lookup = record::read_u16_table(cursor, base)?;
    model.texture_transform_lookup = record::read_u16_table(cursor, base)?;
    model.bounds = record::read_bounds(cursor)?;
    model.collision_bounds = record::read_bounds(cursor)?;
    model.collision = record::read_collision(cursor, base)?;

    tracing::debug!(
        name = %model.name,
        version,
        bones = model.bones.len(),
        views = model.view_count,
        "decoded legacy model"
    );
    Ok(model)
}

/// Inline skin views of the classic and middle revisions. Each view is a
/// header of pointer pairs plus a bone count, with the payload arrays
/// resolved against the file start. Classic submeshes lack the trailing
/// sort fields.
fn parse_inline_views(
    cursor: &mut Reader,
    base: u64,
    dialect: Dialect,
) -> Result<Vec<Skin>, ModelError> {
    reader::read_array(cursor, base, |c| {
        let indices = reader::read_array(c, base, reader::read_u16)?;
        let triangles = reader::read_array(c, base, reader::read_u16)?;
        let properties = reader::read_array(c, base, reader::read_u8)?;
        let submeshes = reader::read_array(c, base, |s| read_inline_submesh(s, dialect))?;
        let texture_units = reader::read_array(c, base, skin::read_texture_unit)?;
        let bone_count_max = reader::read_u32(c)?;
        Ok(Skin {
            indices,
            triangles,
            properties,
            submeshes,
            texture_units,
            bone_count_max,
        })
    })
}

fn read_inline_submesh(cursor: &mut Reader, dialect: Dialect) -> Result<Submesh, ModelError> {
    let submesh_id = reader::read_u16(cursor)?;
    let level = reader::read_u16(cursor)?;
    let vertex_start = reader::read_u16(cursor)?;
    let vertex_count = reader::read_u16(cursor)?;
    let triangle_start = reader::read_u16(cursor)?;
    let triangle_count = reader::read_u16(cursor)?;
    let bone_count = reader::read_u16(cursor)?;
    let bone_start = reader::read_u16(cursor)?;
    let bone_influences = reader::read_u16(cursor)?;
    let center_bone_index = reader::read_u16(cursor)?;
    let center_position = reader::read_f32_3(cursor)?;
    let (sort_center_position, sort_radius) = if dialect == Dialect::Classic {
        ([0.0; 3], 0.0)
    } else {
        (reader::read_f32_3(cursor)?, reader::read_f32(cursor)?)
    };
    Ok(Submesh {
        submesh_id,
        level,
        vertex_start,
        vertex_count,
        triangle_start: (triangle_start as u32) + ((level as u32) << 16),
        triangle_count,
        bone_count,
        bone_start,
        bone_influences,
        center_bone_index,
        center_position,
        sort_center_position,
        sort_radius,
    })
}
