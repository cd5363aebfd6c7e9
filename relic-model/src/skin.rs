//! Skin views and the external skin resource loader
//!
//! A skin view carries the render-ready index data for one level of detail:
//! a vertex lookup table, a triangle list into that table, submesh ranges
//! and texture units. The monolithic dialects embed their views inline; the
//! chunk-wrapped dialect stores each view in a separate resource that is
//! fetched on demand through a [`SkinSource`] and cached on the model, at
//! most one fetch per view.

use crate::error::ModelError;
use crate::model::Model;
use crate::reader::{self, Reader};
use crate::MAGIC_SKIN;

/// One submesh range within a skin view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Submesh {
    pub submesh_id: u16,
    pub level: u16,
    pub vertex_start: u16,
    pub vertex_count: u16,
    /// Triangle list start, already widened with the level's high bits.
    pub triangle_start: u32,
    pub triangle_count: u16,
    pub bone_count: u16,
    pub bone_start: u16,
    pub bone_influences: u16,
    pub center_bone_index: u16,
    pub center_position: [f32; 3],
    pub sort_center_position: [f32; 3],
    pub sort_radius: f32,
}

/// One draw batch binding a submesh to a material and texture combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureUnit {
    pub flags: u8,
    pub priority: u8,
    pub shader_id: u16,
    pub skin_section_index: u16,
    pub geoset_index: u16,
    pub color_index: u16,
    pub material_index: u16,
    pub material_layer: u16,
    pub texture_count: u16,
    pub texture_combo_index: u16,
    pub texture_coord_combo_index: u16,
    pub texture_weight_combo_index: u16,
    pub texture_transform_combo_index: u16,
}

/// One decoded skin view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    /// Lookup from skin-local vertex index to model vertex index.
    pub indices: Vec<u16>,
    /// Triangle list, indexing into `indices`.
    pub triangles: Vec<u16>,
    /// Per-vertex bone property bytes.
    pub properties: Vec<u8>,
    pub submeshes: Vec<Submesh>,
    pub texture_units: Vec<TextureUnit>,
    /// Maximum number of bones any submesh in this view references.
    pub bone_count_max: u32,
}

impl Skin {
    /// Decode one external skin resource. All offsets inside the resource
    /// are relative to the start of its buffer.
    pub fn parse_external(data: &[u8], file_id: u32) -> Result<Skin, ModelError> {
        let mut cursor = Reader::new(data);
        let magic = reader::read_u32(&mut cursor).map_err(|_| ModelError::InvalidSkin { file_id })?;
        if magic != MAGIC_SKIN {
            return Err(ModelError::InvalidSkin { file_id });
        }

        let indices = reader::read_array(&mut cursor, 0, reader::read_u16)?;
        let triangles = reader::read_array(&mut cursor, 0, reader::read_u16)?;
        let properties = reader::read_array(&mut cursor, 0, reader::read_u8)?;
        let submeshes = reader::read_array(&mut cursor, 0, read_submesh)?;
        let texture_units = reader::read_array(&mut cursor, 0, read_texture_unit)?;
        let bone_count_max = reader::read_u32(&mut cursor)?;

        Ok(Skin {
            indices,
            triangles,
            properties,
            submeshes,
            texture_units,
            bone_count_max,
        })
    }
}

pub(crate) fn read_submesh(cursor: &mut Reader) -> Result<Submesh, ModelError> {
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
    let sort_center_position = reader::read_f32_3(cursor)?;
    let sort_radius = reader::read_f32(cursor)?;
    Ok(Submesh {
        submesh_id,
        level,
        vertex_start,
        vertex_count,
        // The level field holds the high 16 bits of the triangle start.
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

pub(crate) fn read_texture_unit(cursor: &mut Reader) -> Result<TextureUnit, ModelError> {
    Ok(TextureUnit {
        flags: reader::read_u8(cursor)?,
        priority: reader::read_u8(cursor)?,
        shader_id: reader::read_u16(cursor)?,
        skin_section_index: reader::read_u16(cursor)?,
        geoset_index: reader::read_u16(cursor)?,
        color_index: reader::read_u16(cursor)?,
        material_index: reader::read_u16(cursor)?,
        material_layer: reader::read_u16(cursor)?,
        texture_count: reader::read_u16(cursor)?,
        texture_combo_index: reader::read_u16(cursor)?,
        texture_coord_combo_index: reader::read_u16(cursor)?,
        texture_weight_combo_index: reader::read_u16(cursor)?,
        texture_transform_combo_index: reader::read_u16(cursor)?,
    })
}

/// Supplies the raw bytes of external skin resources by id. Implemented by
/// whatever archive or filesystem layer hosts the model's companion files.
pub trait SkinSource {
    /// Fetch the resource, returning `None` when it does not exist.
    #[allow(async_fn_in_trait)]
    async fn fetch(&self, file_id: u32) -> Option<Vec<u8>>;
}

/// Cache state for one skin view on a model.
#[derive(Debug, Clone)]
pub(crate) enum SkinSlot {
    /// Not fetched yet.
    Empty,
    /// Fetch was attempted and failed; never retried.
    Missing,
    Ready(Skin),
}

impl Model {
    /// Borrow one skin view, fetching and decoding it through `source` on
    /// first access. A failed fetch marks the slot missing and every later
    /// access reports the same error without refetching.
    pub async fn skin<S: SkinSource>(
        &mut self,
        index: usize,
        source: &S,
    ) -> Result<&Skin, ModelError> {
        if index >= self.skins.len() {
            return Err(ModelError::NoSuchSkin(index));
        }

        if matches!(self.skins[index], SkinSlot::Empty) {
            self.skins[index] = match self.fetch_skin(index, source).await {
                Ok(skin) => SkinSlot::Ready(skin),
                Err(err) => {
                    tracing::warn!(index, %err, "skin view unavailable");
                    SkinSlot::Missing
                }
            };
        }

        match &self.skins[index] {
            SkinSlot::Ready(skin) => Ok(skin),
            _ => Err(ModelError::MissingSkinResource { index }),
        }
    }

    /// Borrow a skin view that is already decoded, without fetching.
    pub fn skin_loaded(&self, index: usize) -> Option<&Skin> {
        match self.skins.get(index)? {
            SkinSlot::Ready(skin) => Some(skin),
            _ => None,
        }
    }

    async fn fetch_skin<S: SkinSource>(
        &self,
        index: usize,
        source: &S,
    ) -> Result<Skin, ModelError> {
        let file_id = self.skin_file_ids.get(index).copied().unwrap_or(0);
        if file_id == 0 {
            return Err(ModelError::MissingSkinResource { index });
        }
        let data = source
            .fetch(file_id)
            .await
            .ok_or(ModelError::MissingSkinResource { index })?;
        Skin::parse_external(&data, file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_f32(buf: &mut Vec<u8>, v: f32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Build a minimal external skin resource with one submesh and one
    /// texture unit.
    fn build_skin_resource() -> Vec<u8> {
        let header_len = 4 + 5 * 8 + 4;
        let indices: [u16; 3] = [0, 1, 2];
        let triangles: [u16; 3] = [0, 1, 2];
        let properties: [u8; 3] = [0, 0, 0];

        let indices_ofs = header_len;
        let triangles_ofs = indices_ofs + 6;
        let properties_ofs = triangles_ofs + 6;
        let submeshes_ofs = properties_ofs + 3;
        let texture_units_ofs = submeshes_ofs + 48;

        let mut buf = Vec::new();
        push_u32(&mut buf, crate::MAGIC_SKIN);
        push_u32(&mut buf, 3);
        push_u32(&mut buf, indices_ofs as u32);
        push_u32(&mut buf, 3);
        push_u32(&mut buf, triangles_ofs as u32);
        push_u32(&mut buf, 3);
        push_u32(&mut buf, properties_ofs as u32);
        push_u32(&mut buf, 1);
        push_u32(&mut buf, submeshes_ofs as u32);
        push_u32(&mut buf, 1);
        push_u32(&mut buf, texture_units_ofs as u32);
        push_u32(&mut buf, 4); // bone count

        for v in indices {
            push_u16(&mut buf, v);
        }
        for v in triangles {
            push_u16(&mut buf, v);
        }
        buf.extend_from_slice(&properties);

        // Submesh: id 7, level 1, triangle start 5 (widens to 0x10005).
        for v in [7u16, 1, 0, 3, 5, 3, 2, 0, 1, 0] {
            push_u16(&mut buf, v);
        }
        for v in [0.0f32; 7] {
            push_f32(&mut buf, v);
        }

        // Texture unit.
        buf.push(16); // flags
        buf.push(2); // priority
        for v in [0u16, 7, 0, 0, 3, 0, 1, 0, 0, 0, 0] {
            push_u16(&mut buf, v);
        }

        buf
    }

    #[test]
    fn test_parse_external_skin() {
        let data = build_skin_resource();
        let skin = Skin::parse_external(&data, 901).unwrap();
        assert_eq!(skin.indices, vec![0, 1, 2]);
        assert_eq!(skin.triangles, vec![0, 1, 2]);
        assert_eq!(skin.properties.len(), 3);
        assert_eq!(skin.bone_count_max, 4);

        let sub = &skin.submeshes[0];
        assert_eq!(sub.submesh_id, 7);
        assert_eq!(sub.triangle_start, 0x10005);
        assert_eq!(sub.vertex_count, 3);

        let unit = &skin.texture_units[0];
        assert_eq!(unit.flags, 16);
        assert_eq!(unit.priority, 2);
        assert_eq!(unit.skin_section_index, 7);
        assert_eq!(unit.material_index, 3);
    }

    #[test]
    fn test_parse_external_rejects_bad_magic() {
        let mut data = build_skin_resource();
        data[0] = b'X';
        assert_eq!(
            Skin::parse_external(&data, 901),
            Err(ModelError::InvalidSkin { file_id: 901 })
        );
    }
}
