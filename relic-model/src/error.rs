//! Model decoding error types

use thiserror::Error;

/// Errors produced while decoding a model or resolving its resources.
///
/// Structural errors (`UnsupportedFormat` through `MalformedStructure`) are
/// fatal to `load`: a failed decode yields no partial model. Skin errors are
/// scoped to the requested index and leave the rest of the model usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Unrecognized file magic - no decode is attempted
    #[error("unrecognized model magic: 0x{0:08X}")]
    UnsupportedFormat(u32),

    /// Version integer outside every supported dialect range
    #[error("unsupported model version: {0}")]
    UnsupportedVersion(u32),

    /// A read would cross the end of the buffer
    #[error("read of {len} bytes at offset {offset} crosses end of buffer ({buffer_len} bytes)")]
    TruncatedData {
        offset: u64,
        len: usize,
        buffer_len: usize,
    },

    /// A chunk declares a size that seeks outside the file
    #[error("chunk 0x{tag:08X} declares {size} bytes past the end of the buffer")]
    MalformedChunk { tag: u32, size: u32 },

    /// A structural invariant of the record layout does not hold
    #[error("malformed model structure: {0}")]
    MalformedStructure(&'static str),

    /// External skin fetch returned nothing - recoverable, the caller may
    /// treat the skin as absent
    #[error("no skin resource available for index {index}")]
    MissingSkinResource { index: usize },

    /// External skin bytes failed structural checks
    #[error("skin resource {file_id} is structurally invalid")]
    InvalidSkin { file_id: u32 },

    /// Animation index out of range
    #[error("animation index {0} out of range")]
    NoSuchAnimation(u32),

    /// Skin index out of range
    #[error("skin index {0} out of range")]
    NoSuchSkin(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ModelError::UnsupportedFormat(0x58494241).to_string(),
            "unrecognized model magic: 0x58494241"
        );
        assert_eq!(
            ModelError::TruncatedData {
                offset: 12,
                len: 4,
                buffer_len: 14
            }
            .to_string(),
            "read of 4 bytes at offset 12 crosses end of buffer (14 bytes)"
        );
        assert_eq!(
            ModelError::MissingSkinResource { index: 2 }.to_string(),
            "no skin resource available for index 2"
        );
    }
}
