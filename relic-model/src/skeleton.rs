//! Skeleton pose composition
//!
//! Builds one world-space matrix per bone for a given animation and time.
//! Each bone's local transform rotates and scales about its pivot; world
//! transforms accumulate down the parent chain with memoization so shared
//! ancestors are composed once.

use glam::{Mat4, Vec3};

use crate::error::ModelError;
use crate::model::{Bone, Model};
use crate::track::SampleContext;

/// Compose world-space bone matrices for one animation at one point in
/// time, one matrix per bone, into a caller-owned buffer that may be
/// reused across frames. `time_ms` is relative to the animation start;
/// sampling clamps to the keyed range.
pub fn compose_pose(
    model: &Model,
    animation_index: usize,
    time_ms: f64,
    pose: &mut Vec<Mat4>,
) -> Result<(), ModelError> {
    let anim = model.animation(animation_index)?;
    let ctx = SampleContext {
        animation_index,
        time_ms,
        anim_start_ms: anim.start_ms as f64,
        global_durations: &model.global_sequences,
    };

    let count = model.bones.len();
    let mut cache: Vec<Option<Mat4>> = vec![None; count];
    let mut visiting = vec![false; count];
    for index in 0..count {
        world_matrix(model, &ctx, index, &mut cache, &mut visiting);
    }

    pose.clear();
    pose.extend(cache.into_iter().map(|m| m.unwrap_or(Mat4::IDENTITY)));
    Ok(())
}

fn world_matrix(
    model: &Model,
    ctx: &SampleContext,
    index: usize,
    cache: &mut Vec<Option<Mat4>>,
    visiting: &mut Vec<bool>,
) -> Mat4 {
    if let Some(cached) = cache[index] {
        return cached;
    }

    visiting[index] = true;
    let bone = &model.bones[index];
    let local = local_matrix(bone, ctx);

    // A parent index that is out of range, or one already on the current
    // recursion path (a parent cycle in corrupt data), is treated as no
    // parent at all.
    let parent = bone.parent;
    let world = match usize::try_from(parent) {
        Ok(p) if p < model.bones.len() && !visiting[p] => {
            world_matrix(model, ctx, p, cache, visiting) * local
        }
        _ => local,
    };

    visiting[index] = false;
    cache[index] = Some(world);
    world
}

fn local_matrix(bone: &Bone, ctx: &SampleContext) -> Mat4 {
    let animated = bone.translation.has_keys(ctx.animation_index)
        || bone.rotation.has_keys(ctx.animation_index)
        || bone.scale.has_keys(ctx.animation_index);
    if !animated {
        return Mat4::IDENTITY;
    }

    let translation = bone.translation.sample(ctx, Vec3::ZERO);
    let rotation = bone.rotation.sample(ctx);
    let scale = bone.scale.sample(ctx, Vec3::ONE);

    Mat4::from_translation(bone.pivot)
        * Mat4::from_translation(translation)
        * Mat4::from_quat(rotation)
        * Mat4::from_scale(scale)
        * Mat4::from_translation(-bone.pivot)
}

impl Model {
    /// Allocating convenience wrapper around [`compose_pose`].
    pub fn pose(&self, animation_index: usize, time_ms: f64) -> Result<Vec<Mat4>, ModelError> {
        let mut pose = Vec::with_capacity(self.bones.len());
        compose_pose(self, animation_index, time_ms, &mut pose)?;
        Ok(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Animation, Dialect};
    use crate::track::{Interpolation, Track, TrackValues};
    use glam::Quat;

    fn keyed_vec3(keys: Vec<(u32, Vec3)>) -> Track<Vec3> {
        let (timestamps, values) = keys.into_iter().unzip();
        Track {
            interpolation: Interpolation::Linear,
            global_seq: None,
            values: TrackValues::PerAnimation {
                timestamps: vec![timestamps],
                values: vec![values],
            },
        }
    }

    fn keyed_quat(keys: Vec<(u32, Quat)>) -> Track<Quat> {
        let (timestamps, values) = keys.into_iter().unzip();
        Track {
            interpolation: Interpolation::Linear,
            global_seq: None,
            values: TrackValues::PerAnimation {
                timestamps: vec![timestamps],
                values: vec![values],
            },
        }
    }

    fn bone(parent: i16, pivot: Vec3) -> Bone {
        Bone {
            pivot,
            parent,
            ..Bone::placeholder()
        }
    }

    fn model_with_bones(bones: Vec<Bone>) -> Model {
        let mut model = Model::empty(Dialect::Late, 264);
        model.bones = bones;
        model.animations = vec![Animation {
            duration_ms: 1000,
            ..Animation::default()
        }];
        model
    }

    #[test]
    fn test_static_bone_yields_identity() {
        let model = model_with_bones(vec![bone(-1, Vec3::new(5.0, 0.0, 0.0))]);
        let pose = model.pose(0, 100.0).unwrap();
        assert_eq!(pose[0], Mat4::IDENTITY);
    }

    #[test]
    fn test_child_inherits_parent_translation() {
        let mut root = bone(-1, Vec3::ZERO);
        root.translation = keyed_vec3(vec![(0, Vec3::new(0.0, 3.0, 0.0))]);
        let mut child = bone(0, Vec3::ZERO);
        child.translation = keyed_vec3(vec![(0, Vec3::new(1.0, 0.0, 0.0))]);

        let model = model_with_bones(vec![root, child]);
        let pose = model.pose(0, 0.0).unwrap();
        let p = pose[1].transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_pivots_about_bone_pivot() {
        let pivot = Vec3::new(2.0, 0.0, 0.0);
        let mut b = bone(-1, pivot);
        b.rotation = keyed_quat(vec![(0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))]);
        let model = model_with_bones(vec![b]);
        let pose = model.pose(0, 0.0).unwrap();

        // The pivot itself stays fixed; the origin sweeps around it.
        assert!((pose[0].transform_point3(pivot) - pivot).length() < 1e-5);
        let swept = pose[0].transform_point3(Vec3::ZERO);
        assert!((swept - Vec3::new(2.0, -2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_parent_cycle_falls_back_to_parentless() {
        let mut a = bone(1, Vec3::ZERO);
        a.translation = keyed_vec3(vec![(0, Vec3::X)]);
        let mut b = bone(0, Vec3::ZERO);
        b.translation = keyed_vec3(vec![(0, Vec3::Y)]);
        let model = model_with_bones(vec![a, b]);
        let pose = model.pose(0, 0.0).unwrap();

        // Bone 0 is composed first; its parent (bone 1) is reachable, and
        // while composing bone 1 the back-edge to bone 0 is ignored.
        let p0 = pose[0].transform_point3(Vec3::ZERO);
        let p1 = pose[1].transform_point3(Vec3::ZERO);
        assert!((p1 - Vec3::Y).length() < 1e-5);
        assert!((p0 - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_unanimated_child_matches_parent_world() {
        let mut root = bone(-1, Vec3::ZERO);
        root.translation = keyed_vec3(vec![(0, Vec3::new(0.0, 2.0, 0.0))]);
        root.rotation = keyed_quat(vec![(0, Quat::from_rotation_z(0.5))]);
        let child = bone(0, Vec3::new(4.0, 0.0, 0.0));

        let model = model_with_bones(vec![root, child]);
        let pose = model.pose(0, 0.0).unwrap();
        assert_eq!(pose[1], pose[0]);
    }

    #[test]
    fn test_unknown_animation_is_an_error() {
        let model = model_with_bones(vec![bone(-1, Vec3::ZERO)]);
        assert_eq!(model.pose(3, 0.0), Err(ModelError::NoSuchAnimation(3)));
    }
}
