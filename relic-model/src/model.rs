//! Decoded model document
//!
//! One [`Model`] holds the dialect-independent view of a decoded file:
//! geometry, bones with their animated channels, textures, materials and
//! the animation table. Dialect parsers fill it in; the skeleton composer
//! and skin resolver read from it.

use glam::{Quat, Vec2, Vec3};

use crate::error::ModelError;
use crate::skin::SkinSlot;
use crate::track::Track;

/// Animation flag marking an entry as an alias that forwards to another
/// animation record instead of carrying keyframes of its own.
pub const ANIMATION_FLAG_ALIAS: u32 = 0x40;

/// Which on-disk layout the file was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Chunk-wrapped container with the record embedded in an inner chunk.
    Chunked,
    /// Monolithic records, versions 256-257.
    Classic,
    /// Monolithic records, versions 260-263.
    Middle,
    /// Monolithic records, version 264.
    Late,
    /// ASCII-keyword chunk stream, versions 1300-1500.
    Mdx,
}

/// One skinned vertex in engine axis convention.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub bone_weights: [u8; 4],
    pub bone_indices: [u8; 4],
    pub normal: Vec3,
    pub uv: Vec2,
    pub uv2: Vec2,
}

/// One bone with its pivot and animated channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub bone_id: i32,
    pub flags: u32,
    /// Index of the parent bone, `-1` for roots.
    pub parent: i16,
    pub submesh_id: u16,
    pub pivot: Vec3,
    pub translation: Track<Vec3>,
    pub rotation: Track<Quat>,
    pub scale: Track<Vec3>,
}

impl Bone {
    /// A static root bone with no keyframes, used where a dialect refers
    /// to bone slots it never defines.
    pub fn placeholder() -> Self {
        Bone {
            bone_id: -1,
            flags: 0,
            parent: -1,
            submesh_id: 0,
            pivot: Vec3::ZERO,
            translation: Track::empty(),
            rotation: Track::empty(),
            scale: Track::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    pub texture_type: u32,
    pub flags: u32,
    /// Embedded path, empty when the file references textures by id.
    pub filename: String,
    /// Resource id supplied by an aux chunk, zero when absent.
    pub file_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Material {
    pub flags: u16,
    pub blending_mode: u16,
}

/// One entry of the animation table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Animation {
    pub id: u16,
    pub variation_index: u16,
    /// Absolute start on the shared timeline; zero for dialects that store
    /// per-animation keyframe arrays.
    pub start_ms: u32,
    pub duration_ms: u32,
    pub move_speed: f32,
    pub flags: u32,
    pub frequency: i16,
    /// Raw blend field; the later revisions pack an in/out pair of u16s
    /// into the low and high halves.
    pub blend_time: u32,
    pub bounds: Bounds,
    pub variation_next: i16,
    /// Forwarding target chased when [`ANIMATION_FLAG_ALIAS`] is set.
    pub alias_next: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
    pub radius: f32,
}

/// Collision hull geometry, already axis-converted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionMesh {
    pub indices: Vec<u16>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// A fully decoded model document.
#[derive(Debug, Clone)]
pub struct Model {
    pub dialect: Dialect,
    pub version: u32,
    pub name: String,
    pub flags: u32,

    pub vertices: Vec<Vertex>,
    pub bones: Vec<Bone>,
    /// Bone id to bone index remap, `-1` for unmapped ids.
    pub bone_lookup: Vec<i16>,

    pub textures: Vec<Texture>,
    pub texture_combos: Vec<u16>,
    pub transparency_lookup: Vec<u16>,
    pub texture_transform_lookup: Vec<u16>,
    pub replaceable_texture_lookup: Vec<i16>,
    pub materials: Vec<Material>,

    pub animations: Vec<Animation>,
    /// Animation id to table index remap, `-1` for ids this model lacks.
    pub animation_lookup: Vec<i16>,
    /// Classic-only fallback table of `(fallback_animation_id, flags)`.
    pub playable_animation_lookup: Vec<(u16, u16)>,
    pub global_sequences: Vec<u32>,

    pub bounds: Bounds,
    pub collision_bounds: Bounds,
    pub collision: CollisionMesh,

    /// Aux-chunk resource ids; all zero/empty for monolithic files.
    pub skeleton_file_id: u32,
    pub bone_file_ids: Vec<u32>,
    pub anim_file_ids: Vec<AnimFileEntry>,
    pub skin_file_ids: Vec<u32>,
    pub lod_skin_file_ids: Vec<u32>,

    /// Number of skin views this model carries.
    pub view_count: usize,
    pub(crate) skins: Vec<SkinSlot>,
}

/// One low-priority animation data file reference from the aux table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimFileEntry {
    pub animation_id: u16,
    pub sub_animation_id: u16,
    pub file_id: u32,
}

impl Model {
    pub(crate) fn empty(dialect: Dialect, version: u32) -> Self {
        Model {
            dialect,
            version,
            name: String::new(),
            flags: 0,
            vertices: Vec::new(),
            bones: Vec::new(),
            bone_lookup: Vec::new(),
            textures: Vec::new(),
            texture_combos: Vec::new(),
            transparency_lookup: Vec::new(),
            texture_transform_lookup: Vec::new(),
            replaceable_texture_lookup: Vec::new(),
            materials: Vec::new(),
            animations: Vec::new(),
            animation_lookup: Vec::new(),
            playable_animation_lookup: Vec::new(),
            global_sequences: Vec::new(),
            bounds: Bounds::default(),
            collision_bounds: Bounds::default(),
            collision: CollisionMesh::default(),
            skeleton_file_id: 0,
            bone_file_ids: Vec::new(),
            anim_file_ids: Vec::new(),
            skin_file_ids: Vec::new(),
            lod_skin_file_ids: Vec::new(),
            view_count: 0,
            skins: Vec::new(),
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Duration of one animation in milliseconds.
    pub fn animation_duration_ms(&self, index: usize) -> Result<u32, ModelError> {
        self.animations
            .get(index)
            .map(|a| a.duration_ms)
            .ok_or(ModelError::NoSuchAnimation(index as u32))
    }

    /// Resolve an animation id to a playable table index, chasing alias
    /// forwarding. Returns `None` for ids this model does not carry or
    /// alias chains that never reach a playable entry.
    pub fn playable_animation(&self, id: u16) -> Option<usize> {
        let mapped = *self.animation_lookup.get(id as usize)?;
        if mapped < 0 {
            return None;
        }
        let mut index = mapped as usize;
        // Alias chains in well-formed files are short; the bound guards
        // against forwarding loops in corrupt ones.
        for _ in 0..self.animations.len().max(1) {
            let anim = self.animations.get(index)?;
            if anim.flags & ANIMATION_FLAG_ALIAS == 0 {
                return Some(index);
            }
            index = anim.alias_next as usize;
        }
        None
    }
}

// =============================================================================
// Axis Conversion
// =============================================================================
//
// Source files are Z-up right-handed; the engine convention is Y-up. The
// conversion happens once at decode time so everything a caller sees is
// already in engine space.

pub(crate) fn convert_point(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, -z, y)
}

pub(crate) fn convert_scale(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, z, y)
}

pub(crate) fn convert_quat(x: f32, y: f32, z: f32, w: f32) -> Quat {
    Quat::from_xyzw(x, -z, y, w)
}

/// Flip a texture V coordinate from the source's bottom-up convention.
pub(crate) fn convert_uv(u: f32, v: f32) -> Vec2 {
    Vec2::new(u, 1.0 - v)
}

impl Model {
    pub(crate) fn animation(&self, index: usize) -> Result<&Animation, ModelError> {
        self.animations
            .get(index)
            .ok_or(ModelError::NoSuchAnimation(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion_swaps_up_axis() {
        assert_eq!(convert_point(1.0, 2.0, 3.0), Vec3::new(1.0, -3.0, 2.0));
    }

    #[test]
    fn test_scale_conversion_has_no_sign_flip() {
        assert_eq!(convert_scale(1.0, 2.0, 3.0), Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_quat_conversion_matches_point_mapping() {
        let q = convert_quat(0.1, 0.2, 0.3, 0.9);
        assert_eq!(q, Quat::from_xyzw(0.1, -0.3, 0.2, 0.9));
    }

    #[test]
    fn test_uv_flips_v() {
        assert_eq!(convert_uv(0.25, 0.75), Vec2::new(0.25, 0.25));
    }

    fn model_with_animations(animations: Vec<Animation>, lookup: Vec<i16>) -> Model {
        let mut model = Model::empty(Dialect::Chunked, 274);
        model.animations = animations;
        model.animation_lookup = lookup;
        model
    }

    fn anim(flags: u32, alias_next: u16) -> Animation {
        Animation {
            duration_ms: 1000,
            flags,
            alias_next,
            ..Animation::default()
        }
    }

    #[test]
    fn test_playable_animation_chases_aliases() {
        let model = model_with_animations(
            vec![anim(ANIMATION_FLAG_ALIAS, 2), anim(0, 0), anim(0, 0)],
            vec![0],
        );
        assert_eq!(model.playable_animation(0), Some(2));
    }

    #[test]
    fn test_playable_animation_rejects_alias_loop() {
        let model = model_with_animations(
            vec![anim(ANIMATION_FLAG_ALIAS, 1), anim(ANIMATION_FLAG_ALIAS, 0)],
            vec![0],
        );
        assert_eq!(model.playable_animation(0), None);
    }

    #[test]
    fn test_playable_animation_unmapped_id() {
        let model = model_with_animations(vec![anim(0, 0)], vec![-1]);
        assert_eq!(model.playable_animation(0), None);
        assert_eq!(model.playable_animation(7), None);
    }
}
