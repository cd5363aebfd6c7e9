//! Relic-Model: decoder and skeletal animation sampler for the Relic
//! family of binary model formats
//!
//! This crate reads one logical model format across four incompatible
//! on-disk layouts — three monolithic legacy revisions plus a modern
//! chunk-wrapped revision — and the unrelated `MDLX` chunked format of an
//! older product line. It reconstructs geometry, bone hierarchies and
//! keyframe tracks, and can sample a full per-bone pose at an arbitrary
//! animation time.
//!
//! # Key Features
//!
//! - **Single entry point**: [`load`] inspects the magic and picks the
//!   right structural decoder
//! - **Forward compatible**: unknown chunk tags are skipped, never fatal
//! - **Pose sampling**: [`compose_pose`] builds world matrices for every
//!   bone by memoized recursion over the parent hierarchy
//! - **Lazy skins**: external skin resources are fetched at most once per
//!   index through a caller-supplied [`SkinSource`]
//!
//! # Usage
//!
//! ```ignore
//! use relic_model::load;
//!
//! let bytes = std::fs::read("creature.model").unwrap();
//! let model = load(&bytes).unwrap();
//!
//! println!("Model: {}", model.name);
//! println!("Bones: {}", model.bone_count());
//! println!("Animations: {}", model.animation_count());
//!
//! // Sample animation 0 at 500ms.
//! let pose = model.pose(0, 500.0).unwrap();
//! assert_eq!(pose.len(), model.bone_count());
//! ```
//!
//! The graphics presentation layer, texture codec, interchange exporters
//! and archive access all live outside this crate; model bytes arrive as an
//! already-resident buffer and decoded tables leave as plain data.

mod dialect;
mod error;
mod model;
mod reader;
mod skeleton;
mod skin;
mod track;


pub use dialect::load;
pub use error::ModelError;
pub use model::{
    AnimFileEntry, Animation, Bone, Bounds, CollisionMesh, Dialect, Material, Model, Texture,
    Vertex, ANIMATION_FLAG_ALIAS,
};
pub use skeleton::compose_pose;
pub use skin::{Skin, SkinSource, Submesh, TextureUnit};
pub use track::{
    decode_quat_i16, encode_quat_i16, Interpolation, SampleContext, Track, TrackValues,
};

// =============================================================================
// Format Magic
// =============================================================================

/// Magic of the monolithic legacy model record ('MD20' as LE u32)
pub const MAGIC_MD20: u32 = 0x3032444D;

/// Tag of the chunk wrapping the modern model record ('MD21' as LE u32)
pub const MAGIC_MD21: u32 = 0x3132444D;

/// Magic of the older product line's chunked format ('MDLX' as LE u32)
pub const MAGIC_MDLX: u32 = 0x584C444D;

/// Magic of the external skin resource ('SKIN' as LE u32)
pub const MAGIC_SKIN: u32 = 0x4E494B53;

// =============================================================================
// Version Ranges
// =============================================================================

/// Lowest supported monolithic version (classic revision)
pub const VERSION_CLASSIC_MIN: u32 = 256;

/// Highest version of the classic revision
pub const VERSION_CLASSIC_MAX: u32 = 257;

/// Lowest version of the middle revision
pub const VERSION_MIDDLE_MIN: u32 = 260;

/// Highest version of the middle revision
pub const VERSION_MIDDLE_MAX: u32 = 263;

/// The late monolithic revision (nested track shape, external skins)
pub const VERSION_LATE: u32 = 264;

/// Supported MDLX version range
pub const MDX_VERSION_MIN: u32 = 1300;
pub const MDX_VERSION_MAX: u32 = 1500;
