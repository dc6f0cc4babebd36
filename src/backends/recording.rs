// src/backends/recording.rs

//! A headless backend that records every frame it receives.
//!
//! Used by tests to assert on the exact command stream, and by headless runs
//! of the binary. It can be told to fail upcoming frames to exercise the
//! screen's no-partial-commit behavior.

use anyhow::{bail, Result};
use log::trace;

use crate::atlas::AtlasImage;
use crate::backends::{Backend, RenderCommand};

#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Command batches in execution order, one per successful frame.
    pub frames: Vec<Vec<RenderCommand>>,
    /// Size of the uploaded atlas mask, if any.
    pub atlas_size: Option<(u32, u32)>,
    pub logical_size: Option<(u32, u32)>,
    pub window_size: Option<(u32, u32)>,
    pub presents: usize,
    fail_next: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` command executions fail.
    pub fn fail_next_frames(&mut self, count: usize) {
        self.fail_next = count;
    }

    pub fn last_frame(&self) -> Option<&[RenderCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn total_commands(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }
}

impl Backend for RecordingBackend {
    fn upload_atlas(&mut self, mask: &AtlasImage) -> Result<()> {
        self.atlas_size = Some((mask.width(), mask.height()));
        Ok(())
    }

    fn set_logical_size(&mut self, width_px: u32, height_px: u32) {
        self.logical_size = Some((width_px, height_px));
    }

    fn resize(&mut self, width_px: u32, height_px: u32) {
        self.window_size = Some((width_px, height_px));
    }

    fn execute_render_commands(&mut self, commands: &[RenderCommand]) -> Result<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            bail!("RecordingBackend: simulated failure executing {} commands", commands.len());
        }
        trace!("RecordingBackend: recorded frame with {} commands", commands.len());
        self.frames.push(commands.to_vec());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }
}
