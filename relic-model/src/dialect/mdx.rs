//! ASCII-keyword chunk dialect of the older product line
//!
//! Files are a flat stream of keyword chunks (`VERS`, `MODL`, `SEQS`,
//! `GLBS`, `TEXS`, `MTLS`, `GEOS`, `BONE`, `HELP`, `PIVT`, `CLID`), each a
//! 4-byte ASCII tag plus a declared size, with data read sequentially
//! instead of through offset arrays. Keyframes live on one shared timeline
//! with sequence intervals delimiting each animation, which maps directly
//! onto the flat track shape. Geometry arrives as geosets that are fused
//! into one vertex table plus a synthetic inline skin view, so consumers
//! see the same surface every other dialect produces.

use glam::{Quat, Vec2, Vec3};

use crate::error::ModelError;
use crate::model::{
    convert_point, convert_quat, convert_scale, Animation, Bone, Bounds, Dialect, Material,
    Model, Texture, Vertex,
};
use crate::reader::{self, Reader};
use crate::skin::{Skin, SkinSlot, Submesh, TextureUnit};
use crate::track::{Interpolation, Track, TrackValues};
use crate::{MAGIC_MDLX, MDX_VERSION_MAX, MDX_VERSION_MIN};

const KW_VERS: u32 = u32::from_le_bytes(*b"VERS");
const KW_MODL: u32 = u32::from_le_bytes(*b"MODL");
const KW_SEQS: u32 = u32::from_le_bytes(*b"SEQS");
const KW_GLBS: u32 = u32::from_le_bytes(*b"GLBS");
const KW_MTLS: u32 = u32::from_le_bytes(*b"MTLS");
const KW_TEXS: u32 = u32::from_le_bytes(*b"TEXS");
const KW_GEOS: u32 = u32::from_le_bytes(*b"GEOS");
const KW_BONE: u32 = u32::from_le_bytes(*b"BONE");
const KW_HELP: u32 = u32::from_le_bytes(*b"HELP");
const KW_PIVT: u32 = u32::from_le_bytes(*b"PIVT");
const KW_CLID: u32 = u32::from_le_bytes(*b"CLID");

const KW_KGTR: u32 = u32::from_le_bytes(*b"KGTR");
const KW_KGRT: u32 = u32::from_le_bytes(*b"KGRT");
const KW_KGSC: u32 = u32::from_le_bytes(*b"KGSC");

const KW_VRTX: u32 = u32::from_le_bytes(*b"VRTX");
const KW_NRMS: u32 = u32::from_le_bytes(*b"NRMS");
const KW_UVAS: u32 = u32::from_le_bytes(*b"UVAS");
const KW_PTYP: u32 = u32::from_le_bytes(*b"PTYP");
const KW_PCNT: u32 = u32::from_le_bytes(*b"PCNT");
const KW_PVTX: u32 = u32::from_le_bytes(*b"PVTX");
const KW_GNDX: u32 = u32::from_le_bytes(*b"GNDX");
const KW_MTGC: u32 = u32::from_le_bytes(*b"MTGC");
const KW_MATS: u32 = u32::from_le_bytes(*b"MATS");
const KW_BIDX: u32 = u32::from_le_bytes(*b"BIDX");
const KW_BWGT: u32 = u32::from_le_bytes(*b"BWGT");
const KW_TRI: u32 = u32::from_le_bytes(*b"TRI ");

const NAME_LEN: usize = 0x50;
const FILE_NAME_LEN: usize = 0x104;

/// One skeleton node before pivots are attached. Bones and helpers share
/// this record; helpers simply carry no geoset binding.
struct Node {
    object_id: i32,
    parent: i32,
    flags: u32,
    translation: Track<Vec3>,
    rotation: Track<Quat>,
    scale: Track<Vec3>,
}

pub(crate) fn parse(data: &[u8]) -> Result<Model, ModelError> {
    let mut cursor = Reader::new(data);
    let magic = reader::read_u32(&mut cursor)?;
    debug_assert_eq!(magic, MAGIC_MDLX);

    let mut model = Model::empty(Dialect::Mdx, MDX_VERSION_MIN);
    let mut nodes: Vec<Option<Node>> = Vec::new();
    let mut pivots: Vec<Vec3> = Vec::new();
    let mut skin = Skin::default();

    while reader::remaining(&cursor) > 0 {
        let tag = reader::read_u32(&mut cursor)?;
        let size = reader::read_u32(&mut cursor)?;
        let next = cursor
            .position()
            .checked_add(size as u64)
            .filter(|&n| n <= data.len() as u64)
            .ok_or(ModelError::MalformedChunk { tag, size })?;

        match tag {
            KW_VERS => {
                let version = reader::read_u32(&mut cursor)?;
                if !(MDX_VERSION_MIN..=MDX_VERSION_MAX).contains(&version) {
                    return Err(ModelError::UnsupportedVersion(version));
                }
                model.version = version;
            }
            KW_MODL => parse_modl(&mut cursor, &mut model)?,
            KW_SEQS => parse_seqs(&mut cursor, &mut model)?,
            KW_GLBS => {
                for _ in 0..size / 4 {
                    model.global_sequences.push(reader::read_u32(&mut cursor)?);
                }
            }
            KW_MTLS => parse_mtls(&mut cursor, &mut model)?,
            KW_TEXS => parse_texs(&mut cursor, size, &mut model)?,
            KW_GEOS => {
                if model.version == 1500 {
                    parse_geos_v1500(&mut cursor, &mut model, &mut skin)?;
                } else {
                    parse_geos_v1300(&mut cursor, &mut model, &mut skin)?;
                }
            }
            KW_BONE => {
                let count = reader::read_u32(&mut cursor)?;
                for _ in 0..count {
                    let node = read_node(&mut cursor)?;
                    reader::skip(&mut cursor, 8)?; // geoset + geoset anim binding
                    store_node(&mut nodes, node);
                }
            }
            KW_HELP => {
                let count = reader::read_u32(&mut cursor)?;
                for _ in 0..count {
                    let node = read_node(&mut cursor)?;
                    store_node(&mut nodes, node);
                }
            }
            KW_PIVT => {
                for _ in 0..size / 12 {
                    let [x, y, z] = reader::read_f32_3(&mut cursor)?;
                    pivots.push(convert_point(x, y, z));
                }
            }
            KW_CLID => parse_clid(&mut cursor, &mut model)?,
            other => {
                tracing::trace!(
                    tag = format_args!("0x{other:08X}"),
                    size,
                    "skipping unknown chunk"
                );
            }
        }

        cursor.set_position(next);
    }

    // Attach pivots by object id and flatten the node slots into the bone
    // table. Gaps in the id space become static placeholder bones so
    // parent indices keep their meaning.
    model.bones = nodes
        .into_iter()
        .map(|slot| match slot {
            Some(node) => {
                let pivot = usize::try_from(node.object_id)
                    .ok()
                    .and_then(|id| pivots.get(id).copied())
                    .unwrap_or(Vec3::ZERO);
                Bone {
                    bone_id: node.object_id,
                    flags: node.flags,
                    parent: clamp_parent(node.parent),
                    submesh_id: 0,
                    pivot,
                    translation: node.translation,
                    rotation: node.rotation,
                    scale: node.scale,
                }
            }
            None => Bone::placeholder(),
        })
        .collect();

    if !model.vertices.is_empty() {
        model.skins = vec![SkinSlot::Ready(skin)];
        model.view_count = 1;
    }

    tracing::debug!(
        name = %model.name,
        version = model.version,
        bones = model.bones.len(),
        sequences = model.animations.len(),
        "decoded keyword-chunk model"
    );
    Ok(model)
}

fn clamp_parent(parent: i32) -> i16 {
    i16::try_from(parent).unwrap_or(-1)
}

fn store_node(nodes: &mut Vec<Option<Node>>, node: Node) {
    let Ok(id) = usize::try_from(node.object_id) else {
        return;
    };
    if nodes.len() <= id {
        nodes.resize_with(id + 1, || None);
    }
    nodes[id] = Some(node);
}

fn parse_modl(cursor: &mut Reader, model: &mut Model) -> Result<(), ModelError> {
    model.name = reader::read_string(cursor, NAME_LEN)?;
    reader::skip(cursor, FILE_NAME_LEN)?; // animation file path
    model.bounds = read_extent(cursor)?;
    reader::skip(cursor, 4)?; // blend time
    model.flags = reader::read_u8(cursor)? as u32;
    Ok(())
}

/// Sequence table. Intervals are absolute positions on the shared
/// timeline, so each entry becomes a flat-shape animation whose start is
/// the interval begin.
fn parse_seqs(cursor: &mut Reader, model: &mut Model) -> Result<(), ModelError> {
    let count = reader::read_u32(cursor)?;
    for index in 0..count {
        reader::skip(cursor, NAME_LEN)?;
        let start = reader::read_u32(cursor)?;
        let end = reader::read_u32(cursor)?;
        let move_speed = reader::read_f32(cursor)?;
        reader::skip(cursor, 4)?; // non-looping marker
        let bounds = read_extent(cursor)?;
        let frequency = reader::read_f32(cursor)?;
        reader::skip(cursor, 8)?; // replay range
        let blend_time = reader::read_i32(cursor)? as u32;
        model.animations.push(Animation {
            id: index as u16,
            variation_index: 0,
            start_ms: start,
            duration_ms: end.saturating_sub(start),
            move_speed,
            flags: 0,
            frequency: frequency as i16,
            blend_time,
            bounds,
            variation_next: -1,
            alias_next: 0,
        });
        model.animation_lookup.push(index as i16);
    }
    Ok(())
}

/// Material table. Only the first layer's filter mode survives into the
/// shared material record; layer sub-chunks are size-skipped.
fn parse_mtls(cursor: &mut Reader, model: &mut Model) -> Result<(), ModelError> {
    let count = reader::read_u32(cursor)?;
    reader::skip(cursor, 4)?;
    for _ in 0..count {
        reader::skip(cursor, 4)?; // material size
        reader::skip(cursor, 4)?; // priority plane
        let layer_count = reader::read_u32(cursor)?;
        let mut blending_mode = 0u16;
        for layer in 0..layer_count {
            let start = cursor.position();
            let layer_size = reader::read_u32(cursor)? as u64;
            let filter_mode = reader::read_i32(cursor)?;
            if layer == 0 {
                blending_mode = filter_mode.clamp(0, u16::MAX as i32) as u16;
            }
            cursor.set_position(start + layer_size);
        }
        model.materials.push(Material {
            flags: 0,
            blending_mode,
        });
    }
    Ok(())
}

fn parse_texs(cursor: &mut Reader, size: u32, model: &mut Model) -> Result<(), ModelError> {
    let end = cursor.position() + size as u64;
    while cursor.position() < end {
        let replaceable_id = reader::read_i32(cursor)?;
        let filename = reader::read_string(cursor, FILE_NAME_LEN)?;
        let flags = reader::read_i32(cursor)? as u32;
        model.textures.push(Texture {
            texture_type: replaceable_id.max(0) as u32,
            flags,
            filename,
            file_id: 0,
        });
    }
    Ok(())
}

fn parse_clid(cursor: &mut Reader, model: &mut Model) -> Result<(), ModelError> {
    expect_keyword(cursor, KW_VRTX)?;
    let count = reader::read_u32(cursor)?;
    for _ in 0..count {
        let [x, y, z] = reader::read_f32_3(cursor)?;
        model.collision.positions.push(convert_point(x, y, z));
    }

    expect_keyword(cursor, KW_TRI)?;
    let count = reader::read_u32(cursor)?;
    for _ in 0..count {
        model.collision.indices.push(reader::read_u16(cursor)?);
    }

    expect_keyword(cursor, KW_NRMS)?;
    let count = reader::read_u32(cursor)?;
    for _ in 0..count {
        let [x, y, z] = reader::read_f32_3(cursor)?;
        model.collision.normals.push(convert_point(x, y, z));
    }
    Ok(())
}

fn expect_keyword(cursor: &mut Reader, expected: u32) -> Result<(), ModelError> {
    let keyword = reader::read_u32(cursor)?;
    if keyword != expected {
        return Err(ModelError::MalformedStructure("unexpected block keyword"));
    }
    Ok(())
}

fn read_extent(cursor: &mut Reader) -> Result<Bounds, ModelError> {
    let radius = reader::read_f32(cursor)?;
    let [min_x, min_y, min_z] = reader::read_f32_3(cursor)?;
    let [max_x, max_y, max_z] = reader::read_f32_3(cursor)?;
    Ok(Bounds {
        min: Vec3::new(min_x, min_y, min_z),
        max: Vec3::new(max_x, max_y, max_z),
        radius,
    })
}

fn read_node(cursor: &mut Reader) -> Result<Node, ModelError> {
    let start = cursor.position();
    let size = reader::read_u32(cursor)? as u64;
    reader::skip(cursor, NAME_LEN)?;
    let object_id = reader::read_i32(cursor)?;
    let parent = reader::read_i32(cursor)?;
    let flags = reader::read_u32(cursor)?;

    let mut node = Node {
        object_id,
        parent,
        flags,
        translation: Track::empty(),
        rotation: Track::empty(),
        scale: Track::empty(),
    };

    while cursor.position() < start + size {
        let keyword = reader::read_u32(cursor)?;
        match keyword {
            KW_KGTR => {
                node.translation = read_keyframes(cursor, |c| {
                    let [x, y, z] = reader::read_f32_3(c)?;
                    Ok(convert_point(x, y, z))
                })?;
            }
            KW_KGRT => {
                node.rotation = read_keyframes(cursor, |c| {
                    let x = reader::read_f32(c)?;
                    let y = reader::read_f32(c)?;
                    let z = reader::read_f32(c)?;
                    let w = reader::read_f32(c)?;
                    Ok(convert_quat(x, y, z, w))
                })?;
            }
            KW_KGSC => {
                node.scale = read_keyframes(cursor, |c| {
                    let [x, y, z] = reader::read_f32_3(c)?;
                    Ok(convert_scale(x, y, z))
                })?;
            }
            _ => return Err(ModelError::MalformedStructure("unknown node sub-chunk")),
        }
    }

    Ok(node)
}

/// One keyframe block. Hermite and bezier blocks carry an in/out tangent
/// pair per key; the tangents are consumed so the stream stays in sync but
/// the sampler interpolates the kept values linearly.
fn read_keyframes<'a, T>(
    cursor: &mut Reader<'a>,
    mut read_value: impl FnMut(&mut Reader<'a>) -> Result<T, ModelError>,
) -> Result<Track<T>, ModelError> {
    let count = reader::read_u32(cursor)?;
    let line_type = reader::read_u32(cursor)?;
    let global = reader::read_i32(cursor)?;

    // Unknown line types carry no tangent data, so they must not fall into
    // the hermite/bezier branch or the stream desyncs.
    let interpolation = u16::try_from(line_type)
        .map(Interpolation::from_u16)
        .unwrap_or(Interpolation::None);
    let tangents = matches!(
        interpolation,
        Interpolation::Hermite | Interpolation::Bezier
    );

    let mut timestamps = Vec::with_capacity(count.min(0x10000) as usize);
    let mut values = Vec::with_capacity(count.min(0x10000) as usize);
    for _ in 0..count {
        let frame = reader::read_i32(cursor)?;
        timestamps.push(frame.max(0) as u32);
        values.push(read_value(cursor)?);
        if tangents {
            read_value(cursor)?;
            read_value(cursor)?;
        }
    }

    Ok(Track {
        interpolation,
        global_seq: u16::try_from(global).ok(),
        values: TrackValues::Flat {
            ranges: Vec::new(),
            timestamps,
            values,
        },
    })
}

/// Bone groups of the classic geoset layout: each vertex names a group and
/// each group lists the bones influencing it. Influence is split evenly
/// across the group's bones, with the rounding remainder on the first.
fn group_weights(bones: &[i32]) -> ([u8; 4], [u8; 4]) {
    let mut indices = [0u8; 4];
    let mut weights = [0u8; 4];
    if bones.is_empty() {
        weights[0] = 255;
        return (indices, weights);
    }
    let used = bones.len().min(4);
    let share = (255 / used as u16) as u8;
    for (slot, bone) in bones.iter().take(4).enumerate() {
        indices[slot] = (*bone).clamp(0, u8::MAX as i32) as u8;
        weights[slot] = share;
    }
    weights[0] += (255 - share as u16 * used as u16) as u8;
    (indices, weights)
}

fn parse_geos_v1300(
    cursor: &mut Reader,
    model: &mut Model,
    skin: &mut Skin,
) -> Result<(), ModelError> {
    let count = reader::read_u32(cursor)?;
    for _ in 0..count {
        reader::skip(cursor, 4)?; // geoset size
        let vertex_base = model.vertices.len();

        expect_keyword(cursor, KW_VRTX)?;
        let vertex_count = reader::read_u32(cursor)? as usize;
        let mut positions = Vec::with_capacity(vertex_count.min(0x10000));
        for _ in 0..vertex_count {
            let [x, y, z] = reader::read_f32_3(cursor)?;
            positions.push(convert_point(x, y, z));
        }

        expect_keyword(cursor, KW_NRMS)?;
        let normal_count = reader::read_u32(cursor)? as usize;
        let mut normals = Vec::with_capacity(normal_count.min(0x10000));
        for _ in 0..normal_count {
            let [x, y, z] = reader::read_f32_3(cursor)?;
            normals.push(convert_point(x, y, z));
        }

        // Optional texture coordinate sets; only the first is kept.
        let mut uvs = vec![Vec2::ZERO; vertex_count];
        let keyword = reader::read_u32(cursor)?;
        if keyword == KW_UVAS {
            let set_count = reader::read_u32(cursor)?;
            for set in 0..set_count {
                for uv in uvs.iter_mut().take(vertex_count) {
                    let u = reader::read_f32(cursor)?;
                    let v = reader::read_f32(cursor)?;
                    if set == 0 {
                        *uv = Vec2::new(u, v);
                    }
                }
            }
        } else {
            cursor.set_position(cursor.position() - 4);
        }

        expect_keyword(cursor, KW_PTYP)?;
        let prim_count = reader::read_u32(cursor)?;
        for _ in 0..prim_count {
            if reader::read_u8(cursor)? != 4 {
                return Err(ModelError::MalformedStructure("unsupported primitive type"));
            }
        }

        expect_keyword(cursor, KW_PCNT)?;
        let face_group_count = reader::read_u32(cursor)? as usize;
        reader::skip(cursor, face_group_count * 4)?;

        expect_keyword(cursor, KW_PVTX)?;
        let face_count = reader::read_u32(cursor)? as usize;
        let triangle_base = skin.triangles.len();
        for _ in 0..face_count {
            let index = reader::read_u16(cursor)?;
            skin.triangles.push((index as usize + vertex_base) as u16);
        }

        expect_keyword(cursor, KW_GNDX)?;
        let group_index_count = reader::read_u32(cursor)? as usize;
        let mut vertex_groups = Vec::with_capacity(group_index_count.min(0x10000));
        for _ in 0..group_index_count {
            vertex_groups.push(reader::read_u8(cursor)?);
        }

        expect_keyword(cursor, KW_MTGC)?;
        let group_count = reader::read_u32(cursor)? as usize;
        let mut group_sizes = Vec::with_capacity(group_count.min(0x10000));
        for _ in 0..group_count {
            group_sizes.push(reader::read_u32(cursor)? as usize);
        }

        expect_keyword(cursor, KW_MATS)?;
        let total = reader::read_u32(cursor)? as usize;
        let mut groups: Vec<Vec<i32>> = Vec::with_capacity(group_count);
        let mut remaining = total;
        for &size in &group_sizes {
            let take = size.min(remaining);
            let mut group = Vec::with_capacity(take);
            for _ in 0..take {
                group.push(reader::read_i32(cursor)?);
            }
            remaining -= take;
            groups.push(group);
        }

        expect_keyword(cursor, KW_BIDX)?;
        let skip_count = reader::read_u32(cursor)? as usize;
        reader::skip(cursor, skip_count * 4)?;
        expect_keyword(cursor, KW_BWGT)?;
        let skip_count = reader::read_u32(cursor)? as usize;
        reader::skip(cursor, skip_count * 4)?;

        let material_id = reader::read_i32(cursor)?;
        reader::skip(cursor, 8)?; // selection group + flags
        read_extent(cursor)?;
        let anim_count = reader::read_u32(cursor)? as usize;
        reader::skip(cursor, anim_count * 28)?;

        for i in 0..vertex_count {
            let group = vertex_groups.get(i).copied().unwrap_or(0) as usize;
            let bones: &[i32] = groups.get(group).map(|g| g.as_slice()).unwrap_or(&[]);
            let (bone_indices, bone_weights) = group_weights(bones);
            model.vertices.push(Vertex {
                position: positions[i],
                bone_weights,
                bone_indices,
                normal: normals.get(i).copied().unwrap_or(Vec3::Y),
                uv: uvs[i],
                uv2: Vec2::ZERO,
            });
            skin.indices.push((vertex_base + i) as u16);
            skin.properties.push(vertex_groups.get(i).copied().unwrap_or(0));
        }

        push_geoset_view(
            skin,
            vertex_base,
            vertex_count,
            triangle_base,
            face_count,
            material_id,
        );
    }
    Ok(())
}

fn parse_geos_v1500(
    cursor: &mut Reader,
    model: &mut Model,
    skin: &mut Skin,
) -> Result<(), ModelError> {
    let count = reader::read_u32(cursor)? as usize;

    // Headers first, vertex payloads after all of them.
    let mut vertex_counts = Vec::with_capacity(count.min(0x10000));
    let mut material_ids = Vec::with_capacity(count.min(0x10000));
    for _ in 0..count {
        let material_id = reader::read_i32(cursor)?;
        reader::skip(cursor, 16)?; // bounds center + radius
        reader::skip(cursor, 12)?; // selection group, geoset index, flags
        expect_keyword(cursor, KW_PVTX)?;
        let vertex_count = reader::read_u32(cursor)? as usize;
        expect_keyword(cursor, KW_PTYP)?;
        reader::skip(cursor, 4)?;
        expect_keyword(cursor, KW_PVTX)?;
        reader::skip(cursor, 4)?;
        reader::skip(cursor, 8)?; // padding
        vertex_counts.push(vertex_count);
        material_ids.push(material_id);
    }

    for geoset in 0..count {
        let vertex_count = vertex_counts[geoset];
        let vertex_base = model.vertices.len();

        for _ in 0..vertex_count {
            let [px, py, pz] = reader::read_f32_3(cursor)?;
            reader::skip(cursor, 4)?; // packed bone weights
            let mut bone_indices = [0u8; 4];
            for b in &mut bone_indices {
                *b = reader::read_u8(cursor)?;
            }
            let [nx, ny, nz] = reader::read_f32_3(cursor)?;
            let u = reader::read_f32(cursor)?;
            let v = reader::read_f32(cursor)?;
            reader::skip(cursor, 8)?; // second coordinate set, unused

            // Influence count is the index prefix before trailing zeros.
            let used = bone_indices
                .iter()
                .rposition(|&b| b != 0)
                .map_or(1, |p| p + 1);
            let bones: Vec<i32> = bone_indices[..used].iter().map(|&b| b as i32).collect();
            let (bone_indices, bone_weights) = group_weights(&bones);

            model.vertices.push(Vertex {
                position: convert_point(px, py, pz),
                bone_weights,
                bone_indices,
                normal: convert_point(nx, ny, nz),
                uv: Vec2::new(u, v),
                uv2: Vec2::ZERO,
            });
            skin.indices.push((model.vertices.len() - 1) as u16);
            skin.properties.push(0);
        }

        reader::skip(cursor, 8)?; // primitive type + unknown
        let prim_vertex_count = reader::read_u16(cursor)? as usize;
        reader::skip(cursor, 6)?; // min/max vertex + padding

        let triangle_base = skin.triangles.len();
        for _ in 0..prim_vertex_count {
            let index = reader::read_u16(cursor)?;
            skin.triangles.push((index as usize + vertex_base) as u16);
        }
        if prim_vertex_count % 8 != 0 {
            reader::skip(cursor, 2 * (8 - prim_vertex_count % 8))?;
        }

        push_geoset_view(
            skin,
            vertex_base,
            vertex_count,
            triangle_base,
            prim_vertex_count,
            material_ids[geoset],
        );
    }
    Ok(())
}

/// One submesh and draw batch per geoset in the synthetic skin view.
fn push_geoset_view(
    skin: &mut Skin,
    vertex_base: usize,
    vertex_count: usize,
    triangle_base: usize,
    triangle_count: usize,
    material_id: i32,
) {
    let submesh_index = skin.submeshes.len() as u16;
    skin.submeshes.push(Submesh {
        submesh_id: submesh_index,
        vertex_start: vertex_base as u16,
        vertex_count: vertex_count as u16,
        triangle_start: triangle_base as u32,
        triangle_count: triangle_count as u16,
        ..Submesh::default()
    });
    skin.texture_units.push(TextureUnit {
        skin_section_index: submesh_index,
        material_index: material_id.clamp(0, u16::MAX as i32) as u16,
        texture_count: 1,
        ..TextureUnit::default()
    });
}
