// src/atlas.rs

//! Glyph atlas: slices a packed image of 256 glyph bitmaps into per-code tiles.
//!
//! The source image holds the glyphs drawn in any single color on a transparent
//! background. On construction it is converted into an alpha mask (every
//! visible pixel becomes the same mid grey, alpha untouched) so that the
//! backend can tint one shared texture with any foreground color at draw time.
//! Only the alpha channel carries shape information after the conversion.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;
use crate::glyph::{GlyphTile, GLYPH_COUNT};

/// RGB value written into every visible pixel of the alpha mask.
pub const MASK_GREY: u8 = 127;

const BYTES_PER_PIXEL: usize = 4;

/// How glyph tiles are laid out inside the atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasGeometry {
    /// Tile width in pixels; also the on-screen width of a character cell.
    pub tile_width: u32,
    /// Tile height in pixels; also the on-screen height of a character cell.
    pub tile_height: u32,
    /// Number of tiles per atlas row.
    pub columns: u32,
    /// Inset from each tile slot's top-left corner to the glyph's origin.
    pub padding: u32,
}

impl AtlasGeometry {
    /// The 9x16 code-page-437 sheet: 32 columns, glyphs inset by 7 pixels.
    pub const CP437: AtlasGeometry = AtlasGeometry {
        tile_width: 9,
        tile_height: 16,
        columns: 32,
        padding: 7,
    };

    pub fn validate(&self) -> Result<(), ScreenError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ScreenError::invalid_argument(
                "tile size",
                format!(
                    "{}x{} must be at least 1x1",
                    self.tile_width, self.tile_height
                ),
            ));
        }
        if self.columns == 0 || self.columns as usize > GLYPH_COUNT {
            return Err(ScreenError::invalid_argument(
                "columns",
                format!("{} must be between 1 and {}", self.columns, GLYPH_COUNT),
            ));
        }
        if self.checked_required_size().is_none() {
            return Err(ScreenError::invalid_argument(
                "geometry",
                format!(
                    "{}x{} tiles in {} columns with padding {} overflow a u32 image size",
                    self.tile_width, self.tile_height, self.columns, self.padding
                ),
            ));
        }
        Ok(())
    }

    /// Number of tile rows needed to hold all 256 codes.
    pub fn rows(&self) -> u32 {
        (GLYPH_COUNT as u32).div_ceil(self.columns.max(1))
    }

    pub fn tile_for(&self, code: u8) -> GlyphTile {
        let code_idx = u32::from(code);
        GlyphTile {
            code,
            atlas_x: (code_idx % self.columns.max(1))
                .saturating_mul(self.tile_width)
                .saturating_add(self.padding),
            atlas_y: (code_idx / self.columns.max(1))
                .saturating_mul(self.tile_height)
                .saturating_add(self.padding),
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Smallest image size in which every tile lies fully inside the image.
    /// Saturates at `u32::MAX` for geometry that `validate` rejects.
    pub fn required_size(&self) -> (u32, u32) {
        self.checked_required_size().unwrap_or((u32::MAX, u32::MAX))
    }

    fn checked_required_size(&self) -> Option<(u32, u32)> {
        let used_columns = self.columns.clamp(1, GLYPH_COUNT as u32);
        let width = used_columns
            .checked_mul(self.tile_width)?
            .checked_add(self.padding)?;
        let height = self
            .rows()
            .checked_mul(self.tile_height)?
            .checked_add(self.padding)?;
        Some((width, height))
    }
}

impl Default for AtlasGeometry {
    fn default() -> Self {
        AtlasGeometry::CP437
    }
}

/// A tightly packed RGBA8 pixel buffer, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasImage {
    /// Wraps raw RGBA8 data. `pixels.len()` must equal `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ScreenError> {
        if width == 0 || height == 0 {
            return Err(ScreenError::invalid_argument(
                "image size",
                format!("{}x{} must be at least 1x1", width, height),
            ));
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ScreenError::invalid_argument(
                "pixels",
                format!(
                    "expected {} bytes for a {}x{} RGBA image, got {}",
                    expected,
                    width,
                    height,
                    pixels.len()
                ),
            ));
        }
        Ok(AtlasImage {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Result<Self, ScreenError> {
        let len = width as usize * height as usize * BYTES_PER_PIXEL;
        Self::from_rgba(width, height, vec![0; len])
    }

    /// Decodes an image file (any format the `image` crate understands) into RGBA8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open atlas image '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        debug!("Atlas image loaded: {}x{} from {}", width, height, path.display());
        Ok(Self::from_rgba(width, height, img.into_raw())?)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[start..start + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Produces the tintable mask: RGB forced to `MASK_GREY` wherever alpha is
    /// non-zero, fully transparent black elsewhere. Alpha is preserved.
    pub fn to_alpha_mask(&self) -> AtlasImage {
        let pixels = self
            .pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .flat_map(|px| {
                let alpha = px[3];
                if alpha == 0 {
                    [0, 0, 0, 0]
                } else {
                    [MASK_GREY, MASK_GREY, MASK_GREY, alpha]
                }
            })
            .collect();
        AtlasImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// The 256 glyph tiles of one atlas plus the alpha mask they index into.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    geometry: AtlasGeometry,
    mask: AtlasImage,
    tiles: Vec<GlyphTile>,
}

impl GlyphAtlas {
    /// Builds the atlas, consuming the source image.
    pub fn new(source: AtlasImage, geometry: AtlasGeometry) -> Result<Self, ScreenError> {
        geometry.validate()?;

        let mask = source.to_alpha_mask();
        let tiles: Vec<GlyphTile> = (0..=u8::MAX).map(|code| geometry.tile_for(code)).collect();

        let (needed_w, needed_h) = geometry.required_size();
        if needed_w > mask.width() || needed_h > mask.height() {
            warn!(
                "Atlas image is {}x{} but its geometry addresses {}x{}; tiles past the edge will sample outside the texture",
                mask.width(),
                mask.height(),
                needed_w,
                needed_h
            );
        }
        debug!(
            "GlyphAtlas built: {} tiles of {}x{} px, {} columns, padding {}",
            tiles.len(),
            geometry.tile_width,
            geometry.tile_height,
            geometry.columns,
            geometry.padding
        );

        Ok(GlyphAtlas {
            geometry,
            mask,
            tiles,
        })
    }

    /// Builds an atlas using the standard code-page-437 geometry.
    pub fn cp437(source: AtlasImage) -> Result<Self, ScreenError> {
        Self::new(source, AtlasGeometry::CP437)
    }

    /// Looks up the tile for a character code.
    pub fn tile(&self, code: u32) -> Result<GlyphTile, ScreenError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.tiles.get(idx))
            .copied()
            .ok_or(ScreenError::InvalidGlyphCode { code })
    }

    /// Infallible lookup for a code already known to be a byte.
    pub fn glyph(&self, code: u8) -> GlyphTile {
        self.tiles[usize::from(code)]
    }

    pub fn tiles(&self) -> &[GlyphTile] {
        &self.tiles
    }

    pub fn geometry(&self) -> AtlasGeometry {
        self.geometry
    }

    /// The tintable alpha-mask texture the tiles index into.
    pub fn mask(&self) -> &AtlasImage {
        &self.mask
    }
}
