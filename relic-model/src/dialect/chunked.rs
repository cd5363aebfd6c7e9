//! Chunk-wrapped dialect
//!
//! Modern files are a stream of `(tag, size)` chunks. The record chunk
//! wraps the same monolithic record the legacy files carry, with every
//! offset inside it relative to the chunk payload rather than the file
//! start. Auxiliary chunks supply resource ids the record itself no longer
//! embeds. Unknown tags are skipped; after every handler the cursor is
//! forced to the declared chunk end so a short or over-reading handler can
//! never derail the stream.

use crate::error::ModelError;
use crate::model::{AnimFileEntry, Dialect, Model};
use crate::reader::{self, Reader};
use crate::skin::SkinSlot;
use crate::{MAGIC_MD20, MAGIC_MD21};

use super::record::{self, RecordLayout, RotationEncoding};
use super::TrackShape;

const CHUNK_SFID: u32 = u32::from_le_bytes(*b"SFID");
const CHUNK_TXID: u32 = u32::from_le_bytes(*b"TXID");
const CHUNK_SKID: u32 = u32::from_le_bytes(*b"SKID");
const CHUNK_BFID: u32 = u32::from_le_bytes(*b"BFID");
const CHUNK_AFID: u32 = u32::from_le_bytes(*b"AFID");

pub(crate) fn parse(data: &[u8]) -> Result<Model, ModelError> {
    let mut cursor = Reader::new(data);
    let mut model: Option<Model> = None;

    while reader::remaining(&cursor) > 0 {
        let tag = reader::read_u32(&mut cursor)?;
        let size = reader::read_u32(&mut cursor)?;
        let next = cursor
            .position()
            .checked_add(size as u64)
            .filter(|&n| n <= data.len() as u64)
            .ok_or(ModelError::MalformedChunk { tag, size })?;

        match tag {
            MAGIC_MD21 => {
                model = Some(parse_record(&mut cursor)?);
            }
            CHUNK_SFID => {
                let model = require_record(&mut model, tag)?;
                parse_sfid(&mut cursor, size, model)?;
            }
            CHUNK_TXID => {
                let model = require_record(&mut model, tag)?;
                for texture in &mut model.textures {
                    texture.file_id = reader::read_u32(&mut cursor)?;
                }
            }
            CHUNK_SKID => {
                let model = require_record(&mut model, tag)?;
                model.skeleton_file_id = reader::read_u32(&mut cursor)?;
            }
            CHUNK_BFID => {
                let model = require_record(&mut model, tag)?;
                for _ in 0..size / 4 {
                    model.bone_file_ids.push(reader::read_u32(&mut cursor)?);
                }
            }
            CHUNK_AFID => {
                let model = require_record(&mut model, tag)?;
                for _ in 0..size / 8 {
                    model.anim_file_ids.push(AnimFileEntry {
                        animation_id: reader::read_u16(&mut cursor)?,
                        sub_animation_id: reader::read_u16(&mut cursor)?,
                        file_id: reader::read_u32(&mut cursor)?,
                    });
                }
            }
            other => {
                tracing::trace!(
                    tag = format_args!("0x{other:08X}"),
                    size,
                    "skipping unknown chunk"
                );
            }
        }

        // Resync to the declared chunk boundary.
        cursor.set_position(next);
    }

    let mut model =
        model.ok_or(ModelError::MalformedStructure("file carries no record chunk"))?;
    if model.skins.is_empty() {
        model.skins = vec![SkinSlot::Empty; model.view_count];
    }
    tracing::debug!(
        name = %model.name,
        bones = model.bones.len(),
        animations = model.animations.len(),
        "decoded chunk-wrapped model"
    );
    Ok(model)
}

fn require_record<'m>(model: &'m mut Option<Model>, tag: u32) -> Result<&'m mut Model, ModelError> {
    match model {
        Some(model) => Ok(model),
        None => {
            tracing::warn!(tag = format_args!("0x{tag:08X}"), "aux chunk before record");
            Err(ModelError::MalformedStructure("aux chunk before record chunk"))
        }
    }
}

/// Skin file id list. Entries past the record's view count are LOD skins.
fn parse_sfid(cursor: &mut Reader, size: u32, model: &mut Model) -> Result<(), ModelError> {
    let total = size as usize / 4;
    let lod_count = total.saturating_sub(model.view_count);
    for _ in 0..total.min(model.view_count) {
        model.skin_file_ids.push(reader::read_u32(cursor)?);
    }
    for _ in 0..lod_count {
        model.lod_skin_file_ids.push(reader::read_u32(cursor)?);
    }
    Ok(())
}

/// The embedded record. `base` for every offset inside it is the payload
/// start, which is the cursor position on entry.
fn parse_record(cursor: &mut Reader) -> Result<Model, ModelError> {
    let base = cursor.position();

    let magic = reader::read_u32(cursor)?;
    if magic != MAGIC_MD20 {
        return Err(ModelError::MalformedStructure("record chunk lacks inner magic"));
    }
    let version = reader::read_u32(cursor)?;

    let layout = RecordLayout {
        shape: TrackShape::Nested,
        rotation: RotationEncoding::RescaledU16,
        bone_name_crc: true,
    };

    let mut model = Model::empty(Dialect::Chunked, version);
    model.name = record::read_name(cursor, base)?;
    model.flags = reader::read_u32(cursor)?;
    model.global_sequences = record::read_u32_table(cursor, base)?;
    model.animations = record::read_animations(cursor, base, layout.shape)?;
    model.animation_lookup = record::read_i16_table(cursor, base)?;
    model.bones = record::read_bones(cursor, base, layout)?;
    model.bone_lookup = record::read_i16_table(cursor, base)?;
    model.vertices = record::read_vertices(cursor, base)?;
    model.view_count = reader::read_u32(cursor)? as usize;
    reader::skip(cursor, 8)?; // colors
    model.textures = record::read_textures(cursor, base)?;
    reader::skip(cursor, 8)?; // texture weights
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

    Ok(model)
}
