// src/display.rs

//! The capability interface a display loop drives once per frame.

use anyhow::Result;

/// Something that can be shown by a display loop.
///
/// The loop owns timing: it calls `render` at most once per logical frame and
/// forwards window resizes. Both calls run on the loop's thread.
pub trait Screen {
    /// The window was resized to `width_px x height_px`.
    fn resize(&mut self, width_px: u32, height_px: u32);

    /// Draws one frame. `delta` is the time since the previous frame in seconds.
    fn render(&mut self, delta: f32) -> Result<()>;
}
