// src/main.rs

//! Demo binary: draws a bordered palette card on the console and color-cycles
//! its title for a few seconds.

use std::io::stdout;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::info;

use ascii_screen::atlas::{AtlasImage, GlyphAtlas};
use ascii_screen::backends::{Backend, ConsoleBackend};
use ascii_screen::color::NamedColor;
use ascii_screen::config::CONFIG;
use ascii_screen::{AsciiScreen, Cell, Screen};

const FRAME_COUNT: usize = 90;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

// Code-page-437 double-line box pieces.
const BOX_TOP_LEFT: u8 = 0xC9;
const BOX_TOP_RIGHT: u8 = 0xBB;
const BOX_BOTTOM_LEFT: u8 = 0xC8;
const BOX_BOTTOM_RIGHT: u8 = 0xBC;
const BOX_HORIZONTAL: u8 = 0xCD;
const BOX_VERTICAL: u8 = 0xBA;
const FULL_BLOCK: u8 = 0xDB;

const TITLE: &str = "ascii-screen";

fn main() -> Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting ascii-screen demo...");
    let config = &*CONFIG;

    let geometry = config.atlas.geometry;
    geometry
        .validate()
        .context("Invalid atlas geometry in configuration")?;
    let sheet = match &config.atlas.path {
        Some(path) => AtlasImage::open(path)?,
        None => {
            info!("No atlas image configured, using a blank sheet.");
            let (w, h) = geometry.required_size();
            AtlasImage::transparent(w, h)?
        }
    };
    let atlas = GlyphAtlas::new(sheet, geometry).context("Failed to build glyph atlas")?;

    let backend = ConsoleBackend::new(stdout()).context("Failed to initialize console")?;
    let mut screen = AsciiScreen::from_config(config, atlas, backend)
        .context("Failed to create screen from configuration")?;
    let (w, h) = screen.logical_size();
    screen.resize(w, h);

    draw_border(&mut screen)?;
    draw_palette(&mut screen)?;
    screen.write_center_with(TITLE, 1, NamedColor::BrightWhite.to_color(), None)?;

    let mut last = Instant::now();
    for frame in 0..FRAME_COUNT {
        cycle_title(&mut screen, frame);
        let now = Instant::now();
        screen.render(now.duration_since(last).as_secs_f32())?;
        last = now;
        thread::sleep(FRAME_INTERVAL);
    }

    info!("Demo finished.");
    Ok(())
}

fn draw_border<B: Backend>(screen: &mut AsciiScreen<B>) -> Result<()> {
    let (right, bottom) = (screen.width() - 1, screen.height() - 1);
    let edge = NamedColor::Cyan.to_color();
    for x in 1..right {
        screen.write_with(char::from(BOX_HORIZONTAL), x, 0, edge, None)?;
        screen.write_with(char::from(BOX_HORIZONTAL), x, bottom, edge, None)?;
    }
    for y in 1..bottom {
        screen.write_with(char::from(BOX_VERTICAL), 0, y, edge, None)?;
        screen.write_with(char::from(BOX_VERTICAL), right, y, edge, None)?;
    }
    screen
        .write_with(char::from(BOX_TOP_LEFT), 0, 0, edge, None)?
        .write_with(char::from(BOX_TOP_RIGHT), right, 0, edge, None)?
        .write_with(char::from(BOX_BOTTOM_LEFT), 0, bottom, edge, None)?
        .write_with(char::from(BOX_BOTTOM_RIGHT), right, bottom, edge, None)?;
    Ok(())
}

fn draw_palette<B: Backend>(screen: &mut AsciiScreen<B>) -> Result<()> {
    let row = screen.height() / 2;
    let start = (screen.width() - 2 * NamedColor::ALL.len() as i32) / 2;
    for (i, named) in NamedColor::ALL.iter().enumerate() {
        let x = start + 2 * i as i32;
        let swatch = named.to_color();
        screen
            .write_with(char::from(FULL_BLOCK), x, row, swatch, None)?
            .put_with(char::from(FULL_BLOCK), swatch, None)?;
    }
    Ok(())
}

/// Shifts each title letter one step further through the bright palette every frame.
fn cycle_title<B: Backend>(screen: &mut AsciiScreen<B>, frame: usize) {
    let left = (screen.width() - TITLE.len() as i32) / 2;
    screen.for_each_tile(left, 1, TITLE.len() as i32, 1, |x: i32, _y: i32, cell: Cell| {
        let step = (frame + x as usize) % 8;
        let bright = NamedColor::ALL[8 + step];
        Cell {
            foreground: bright.to_color(),
            ..cell
        }
    });
}
