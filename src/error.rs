// src/error.rs

//! Typed validation errors for the character grid and glyph atlas.
//!
//! Every variant describes bad input detected before any state was touched:
//! an operation that returns one of these has left the screen exactly as it
//! found it. Failures of external collaborators (the rendering backend, image
//! decoding, config files) travel as `anyhow::Error` instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    /// A required argument was missing or structurally unusable.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: String,
    },

    /// A coordinate, character code or dimension fell outside `[min, max)`.
    #[error("{name} {value} must be within range [{min}, {max})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// An atlas lookup for a code that has no glyph tile.
    #[error("glyph code {code} is not in the atlas (valid codes are 0-255)")]
    InvalidGlyphCode { code: u32 },
}

impl ScreenError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        ScreenError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Checks `min <= value < max`.
    pub(crate) fn check_range(
        name: &'static str,
        value: impl Into<i64>,
        min: impl Into<i64>,
        max: impl Into<i64>,
    ) -> Result<(), ScreenError> {
        let (value, min, max) = (value.into(), min.into(), max.into());
        if value < min || value >= max {
            return Err(ScreenError::OutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}
