//! Keyframe tracks and the animation sampler
//!
//! Tracks come in two physical shapes. The legacy dialects store one shared
//! timeline for the whole file with a ranges table delimiting each
//! animation's slice; the late and chunk-wrapped dialects store one
//! timestamp/value sub-array per animation index. Both shapes answer the
//! same sampling contract: clamp outside the keyed range, otherwise locate
//! the bracketing pair and interpolate.

use glam::{Quat, Vec3};

/// Keyframe interpolation kind as stored on disk.
///
/// Hermite and Bezier appear in the older product line's files; the runtime
/// sampler only exercises none/linear (and spherical linear for rotations),
/// so tangent data is decoded past but tracks carrying it interpolate
/// linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    None,
    Linear,
    Hermite,
    Bezier,
}

impl Interpolation {
    pub fn from_u16(raw: u16) -> Self {
        match raw {
            1 => Interpolation::Linear,
            2 => Interpolation::Hermite,
            3 => Interpolation::Bezier,
            _ => Interpolation::None,
        }
    }
}

/// Keyframe data in one of the two on-disk shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackValues<T> {
    /// One shared timeline for the whole file. `ranges` holds the
    /// `(start, end)` timestamp pair for each animation id; sampling runs
    /// on absolute time (`animation start + requested time`).
    Flat {
        ranges: Vec<(u32, u32)>,
        timestamps: Vec<u32>,
        values: Vec<T>,
    },
    /// One timestamp and value sub-array per animation index, sampled with
    /// the requested time directly.
    PerAnimation {
        timestamps: Vec<Vec<u32>>,
        values: Vec<Vec<T>>,
    },
}

/// A single animated channel (translation, rotation or scale).
#[derive(Debug, Clone, PartialEq)]
pub struct Track<T> {
    pub interpolation: Interpolation,
    /// When present, sampling uses the shared looping clock for this
    /// global sequence instead of the animation's own clock.
    pub global_seq: Option<u16>,
    pub values: TrackValues<T>,
}

impl<T> Track<T> {
    /// An empty track in the nested shape - never has keys.
    pub fn empty() -> Self {
        Track {
            interpolation: Interpolation::None,
            global_seq: None,
            values: TrackValues::PerAnimation {
                timestamps: Vec::new(),
                values: Vec::new(),
            },
        }
    }

    /// Whether this channel has any keyframes for the given animation.
    pub fn has_keys(&self, animation_index: usize) -> bool {
        match &self.values {
            TrackValues::Flat { values, .. } => !values.is_empty(),
            TrackValues::PerAnimation { timestamps, .. } => {
                // Tracks driven by a global sequence keep their keys in the
                // first sub-array regardless of the current animation.
                let index = if animation_index < timestamps.len() {
                    animation_index
                } else {
                    0
                };
                timestamps.get(index).is_some_and(|t| !t.is_empty())
            }
        }
    }
}

/// Per-invocation sampling inputs threaded down from the composer.
#[derive(Debug, Clone, Copy)]
pub struct SampleContext<'a> {
    pub animation_index: usize,
    /// Requested time in milliseconds, relative to the animation start.
    pub time_ms: f64,
    /// Absolute start timestamp of the animation on the shared timeline.
    /// Only meaningful for the flat track shape; zero otherwise.
    pub anim_start_ms: f64,
    /// Global sequence durations in milliseconds.
    pub global_durations: &'a [u32],
}

impl<T: Copy> Track<T> {
    /// Sample this track at the context time with a caller-supplied
    /// interpolator. Returns `default` when the track has no keys.
    pub fn sample_with(
        &self,
        ctx: &SampleContext,
        default: T,
        lerp: impl Fn(T, T, f32) -> T,
    ) -> T {
        let at = match self.global_seq {
            Some(gs) => {
                let duration = ctx
                    .global_durations
                    .get(gs as usize)
                    .copied()
                    .unwrap_or(0) as f64;
                if duration > 0.0 {
                    ctx.time_ms % duration
                } else {
                    0.0
                }
            }
            None => match &self.values {
                TrackValues::Flat { .. } => ctx.anim_start_ms + ctx.time_ms,
                TrackValues::PerAnimation { .. } => ctx.time_ms,
            },
        };

        let (times, values) = match &self.values {
            TrackValues::Flat {
                timestamps, values, ..
            } => (timestamps.as_slice(), values.as_slice()),
            TrackValues::PerAnimation { timestamps, values } => {
                let index = if ctx.animation_index < timestamps.len() {
                    ctx.animation_index
                } else {
                    0
                };
                match (timestamps.get(index), values.get(index)) {
                    (Some(t), Some(v)) => (t.as_slice(), v.as_slice()),
                    _ => return default,
                }
            }
        };

        if times.is_empty() || values.is_empty() {
            return default;
        }

        // Clamp outside the keyed range - no extrapolation.
        if times.len() == 1 || values.len() == 1 || at <= times[0] as f64 {
            return values[0];
        }
        if at >= times[times.len() - 1] as f64 {
            return values[values.len() - 1];
        }

        let mut frame = 0;
        for i in 0..times.len() - 1 {
            if at >= times[i] as f64 && at < times[i + 1] as f64 {
                frame = i;
                break;
            }
        }

        let v0 = values[frame.min(values.len() - 1)];
        if self.interpolation == Interpolation::None {
            return v0;
        }
        let Some(&v1) = values.get(frame + 1) else {
            return v0;
        };

        let t0 = times[frame] as f64;
        let t1 = times[frame + 1] as f64;
        let alpha = ((at - t0) / (t1 - t0)) as f32;
        lerp(v0, v1, alpha)
    }
}

impl Track<Vec3> {
    /// Sample a vector channel with per-component linear interpolation.
    pub fn sample(&self, ctx: &SampleContext, default: Vec3) -> Vec3 {
        self.sample_with(ctx, default, |a, b, t| a.lerp(b, t))
    }
}

impl Track<Quat> {
    /// Sample a rotation channel with spherical linear interpolation.
    pub fn sample(&self, ctx: &SampleContext) -> Quat {
        self.sample_with(ctx, Quat::IDENTITY, slerp)
    }
}

/// Spherical linear interpolation taking the shorter arc.
///
/// Falls back to linear interpolation with renormalization when the inputs
/// are nearly parallel and the closed form would divide by a vanishing
/// sine.
pub(crate) fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    let mut cosom = a.dot(b);
    let mut b = b;
    if cosom < 0.0 {
        cosom = -cosom;
        b = Quat::from_xyzw(-b.x, -b.y, -b.z, -b.w);
    }

    if 1.0 - cosom > 1e-6 {
        let omega = cosom.acos();
        let sinom = omega.sin();
        let scale0 = ((1.0 - t) * omega).sin() / sinom;
        let scale1 = (t * omega).sin() / sinom;
        Quat::from_xyzw(
            scale0 * a.x + scale1 * b.x,
            scale0 * a.y + scale1 * b.y,
            scale0 * a.z + scale1 * b.z,
            scale0 * a.w + scale1 * b.w,
        )
    } else {
        Quat::from_xyzw(
            (1.0 - t) * a.x + t * b.x,
            (1.0 - t) * a.y + t * b.y,
            (1.0 - t) * a.z + t * b.z,
            (1.0 - t) * a.w + t * b.w,
        )
        .normalize()
    }
}

// =============================================================================
// Legacy i16 Quaternion Quantization
// =============================================================================

/// Decode one quantized quaternion component from the legacy dialects.
///
/// The rescale is deliberately asymmetric (`+32768` on the negative side,
/// `-32767` on the non-negative side) and is preserved exactly as the
/// format stores it; do not replace it with a plain `/32768`.
pub fn decode_quat_i16(value: i16) -> f32 {
    if value < 0 {
        (value as f32 + 32768.0) / 32767.0
    } else {
        (value as f32 - 32767.0) / 32767.0
    }
}

/// Inverse of [`decode_quat_i16`].
///
/// `-32768` and `32767` both decode to `0.0`; the encode resolves that
/// collision toward the non-negative branch, so every other i16 value
/// round-trips bit-exactly.
pub fn encode_quat_i16(value: f32) -> i16 {
    if value > 0.0 {
        ((value * 32767.0).round() - 32768.0) as i16
    } else {
        ((value * 32767.0).round() + 32767.0) as i16
    }
}
