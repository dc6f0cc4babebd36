// src/screen/tests.rs

use super::*;
use crate::atlas::{AtlasGeometry, AtlasImage};
use crate::backends::{RecordingBackend, RenderCommand};
use crate::config::Config;
use proptest::prelude::*;
use test_log::test;

// --- Test Helpers ---

fn atlas() -> GlyphAtlas {
    let (w, h) = AtlasGeometry::CP437.required_size();
    GlyphAtlas::cp437(AtlasImage::transparent(w, h).unwrap()).unwrap()
}

fn screen(width: i32, height: i32) -> AsciiScreen<RecordingBackend> {
    AsciiScreen::new(width, height, atlas(), RecordingBackend::new()).unwrap()
}

fn default_screen() -> AsciiScreen<RecordingBackend> {
    AsciiScreen::with_default_size(atlas(), RecordingBackend::new()).unwrap()
}

/// Every cell, for before/after comparisons.
fn snapshot<B: Backend>(s: &AsciiScreen<B>) -> Vec<Cell> {
    let mut cells = Vec::new();
    for y in 0..s.height() {
        for x in 0..s.width() {
            cells.push(s.cell(x, y).unwrap());
        }
    }
    cells
}

fn blank() -> Cell {
    Cell::new(b' ', Color::WHITE, Color::BLACK)
}

fn assert_out_of_range<T>(result: Result<T, ScreenError>, expected_name: &str) {
    match result {
        Err(ScreenError::OutOfRange { name, .. }) => assert_eq!(name, expected_name),
        Err(other) => panic!("expected OutOfRange for {}, got {:?}", expected_name, other),
        Ok(_) => panic!("expected OutOfRange for {}, got Ok", expected_name),
    }
}

// --- Construction ---

mod construction {
    use super::*;
    use test_log::test;

    #[test]
    fn default_size_is_80_by_24() {
        let s = default_screen();
        assert_eq!((s.width(), s.height()), (80, 24));
        assert_eq!((s.char_width(), s.char_height()), (9, 16));
        assert_eq!(s.logical_size(), (720, 384));
    }

    #[test]
    fn starts_blank_with_cursor_at_origin() {
        let s = screen(5, 3);
        assert!(snapshot(&s).iter().all(|c| *c == blank()));
        assert_eq!(s.cursor(), (0, 0));
        assert_eq!(s.default_foreground(), Color::WHITE);
        assert_eq!(s.default_background(), Color::BLACK);
    }

    #[test]
    fn zero_or_negative_dimensions_are_invalid_arguments() {
        for (w, h) in [(0, 24), (80, 0), (-3, 5)] {
            let result = AsciiScreen::new(w, h, atlas(), RecordingBackend::new());
            assert!(
                matches!(result, Err(ScreenError::InvalidArgument { .. })),
                "{}x{} should be rejected",
                w,
                h
            );
        }
    }

    #[test]
    fn one_by_one_is_allowed() {
        let mut s = screen(1, 1);
        s.write('x', 0, 0).unwrap();
        assert_eq!(s.cursor(), (1, 0));
    }

    #[test]
    fn from_config_applies_size_and_colors() {
        let config = Config::from_json_str(
            r#"{ "screen": { "columns": 20, "rows": 5 },
                 "colors": { "foreground": "BrightGreen", "background": "Blue" } }"#,
        )
        .unwrap();
        let s = AsciiScreen::from_config(&config, atlas(), RecordingBackend::new()).unwrap();
        assert_eq!((s.width(), s.height()), (20, 5));
        assert_eq!(s.default_foreground(), Color::BRIGHT_GREEN);
        assert_eq!(
            s.cell(19, 4).unwrap(),
            Cell::new(b' ', Color::BRIGHT_GREEN, Color::BLUE)
        );
    }
}

// --- Write family ---

mod write {
    use super::*;
    use test_log::test;

    #[test]
    fn write_stores_cell_and_advances_cursor() {
        let mut s = default_screen();
        s.write_with('A', 10, 5, Color::RED, Color::CYAN).unwrap();
        assert_eq!(s.cell(10, 5).unwrap(), Cell::new(b'A', Color::RED, Color::CYAN));
        assert_eq!(s.cursor(), (11, 5));
    }

    #[test]
    fn unspecified_colors_use_defaults() {
        let mut s = default_screen();
        s.set_default_foreground(Color::BRIGHT_YELLOW);
        s.write_with('q', 0, 0, None, Color::BLUE).unwrap();
        s.write_with('r', 1, 0, Color::RED, None).unwrap();
        s.write('s', 2, 0).unwrap();
        assert_eq!(s.cell(0, 0).unwrap(), Cell::new(b'q', Color::BRIGHT_YELLOW, Color::BLUE));
        assert_eq!(s.cell(1, 0).unwrap(), Cell::new(b'r', Color::RED, Color::BLACK));
        assert_eq!(s.cell(2, 0).unwrap(), Cell::new(b's', Color::BRIGHT_YELLOW, Color::BLACK));
    }

    #[test]
    fn writing_last_column_leaves_cursor_one_past_it() {
        let mut s = default_screen();
        s.write('z', 79, 3).unwrap();
        assert_eq!(s.cursor(), (80, 3));
        // Writing again at the cursor without repositioning fails.
        assert_out_of_range(s.put('y'), "x");
    }

    #[test]
    fn out_of_range_writes_leave_grid_unchanged() {
        let mut s = default_screen();
        s.write('k', 3, 3).unwrap();
        let before = snapshot(&s);
        let cursor = s.cursor();

        assert_out_of_range(s.write('a', 80, 0), "x");
        assert_out_of_range(s.write('a', 0, 24), "y");
        assert_out_of_range(s.write('a', -1, 0), "x");
        assert_out_of_range(s.write('a', 0, -1), "y");
        assert_out_of_range(s.write(char::from_u32(256).unwrap(), 0, 0), "character");

        assert_eq!(snapshot(&s), before);
        assert_eq!(s.cursor(), cursor);
    }

    #[test]
    fn full_byte_range_is_writable() {
        let mut s = default_screen();
        s.write(char::from(255u8), 0, 0).unwrap();
        s.write('\0', 1, 0).unwrap();
        assert_eq!(s.cell(0, 0).unwrap().character, 255);
        assert_eq!(s.cell(1, 0).unwrap().character, 0);
    }

    #[test]
    fn put_writes_at_cursor_and_chains() {
        let mut s = default_screen();
        s.set_cursor_position(4, 2)
            .unwrap()
            .put('h')
            .unwrap()
            .put_with('i', Color::GREEN, None)
            .unwrap();
        assert_eq!(s.row_text(2).unwrap()[4..6].to_string(), "hi");
        assert_eq!(s.cell(5, 2).unwrap().foreground, Color::GREEN);
        assert_eq!(s.cursor(), (6, 2));
    }

    #[test]
    fn string_must_end_before_last_column() {
        let mut s = default_screen();
        s.write_str("hi", 77, 0).unwrap();
        assert_eq!(s.cell(77, 0).unwrap().character, b'h');
        assert_eq!(s.cell(78, 0).unwrap().character, b'i');

        let before = snapshot(&s);
        assert_out_of_range(s.write_str("hi", 78, 0), "x + length");
        // Even a single character is refused in the last column.
        assert_out_of_range(s.write_str("x", 79, 0), "x + length");
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn string_write_validates_every_character_first() {
        let mut s = default_screen();
        let before = snapshot(&s);
        assert_out_of_range(s.write_str("ab\u{2603}", 0, 0), "character");
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn string_write_validates_position() {
        let mut s = default_screen();
        assert_out_of_range(s.write_str("ab", -1, 0), "x");
        assert_out_of_range(s.write_str("ab", 0, 24), "y");
    }

    #[test]
    fn string_write_moves_cursor_past_last_character() {
        let mut s = default_screen();
        s.write_str_with("abc", 10, 7, Color::MAGENTA, Color::YELLOW).unwrap();
        assert_eq!(s.cursor(), (13, 7));
        assert_eq!(s.cell(12, 7).unwrap(), Cell::new(b'c', Color::MAGENTA, Color::YELLOW));
    }

    #[test]
    fn empty_string_is_a_no_op() {
        let mut s = default_screen();
        let before = snapshot(&s);
        s.write_str("", 79, 0).unwrap();
        assert_eq!(snapshot(&s), before);
        assert_eq!(s.cursor(), (0, 0));
    }

    #[test]
    fn print_continues_from_cursor() {
        let mut s = default_screen();
        s.print("abc").unwrap().print_with("de", Color::RED, None).unwrap();
        assert_eq!(&s.row_text(0).unwrap()[..5], "abcde");
        assert_eq!(s.cell(4, 0).unwrap().foreground, Color::RED);
    }

    #[test]
    fn print_refuses_to_reach_last_column() {
        let mut s = default_screen();
        s.set_cursor_x(75).unwrap();
        assert_out_of_range(s.print("abcde"), "cursor x + length");
        s.print("abcd").unwrap();
        assert_eq!(s.cursor(), (79, 0));
    }

    #[test]
    fn center_uses_integer_midpoint() {
        let mut s = default_screen();
        s.write_center("hello", 4).unwrap();
        // (80 - 5) / 2 = 37
        assert_eq!(&s.row_text(4).unwrap()[37..42], "hello");
        assert_eq!(s.cell(36, 4).unwrap().character, b' ');

        s.write_center_with("ab", 5, Color::BRIGHT_RED, Color::BLUE).unwrap();
        assert_eq!(s.cell(39, 5).unwrap(), Cell::new(b'a', Color::BRIGHT_RED, Color::BLUE));
    }

    #[test]
    fn center_requires_length_below_width() {
        let mut s = screen(10, 2);
        let exact = "0123456789";
        assert_out_of_range(s.write_center(exact, 0), "length");
        s.write_center("012345678", 0).unwrap();
        assert_eq!(s.row_text(0).unwrap(), "012345678 ");
        assert_out_of_range(s.write_center("a", 2), "y");
    }
}

// --- Clear family ---

mod clear {
    use super::*;
    use test_log::test;

    #[test]
    fn clear_fills_every_cell_with_default_space() {
        let mut s = default_screen();
        s.write_str_with("garbage", 3, 3, Color::RED, Color::GREEN).unwrap();
        s.clear().unwrap();
        let cells = snapshot(&s);
        assert_eq!(cells.len(), 1920);
        assert!(cells.iter().all(|c| *c == blank()));
    }

    #[test]
    fn clear_uses_current_defaults() {
        let mut s = screen(4, 4);
        s.set_default_background(Color::BLUE);
        s.clear().unwrap();
        assert!(snapshot(&s)
            .iter()
            .all(|c| *c == Cell::new(b' ', Color::WHITE, Color::BLUE)));
    }

    #[test]
    fn clear_with_character_and_colors() {
        let mut s = screen(4, 4);
        s.clear_with('#', Color::GREEN, None).unwrap();
        assert!(snapshot(&s)
            .iter()
            .all(|c| *c == Cell::new(b'#', Color::GREEN, Color::BLACK)));
        assert_out_of_range(s.clear_with('\u{100}', None, None), "character");
    }

    #[test]
    fn clear_moves_cursor_like_the_last_write() {
        let mut s = screen(6, 4);
        s.clear().unwrap();
        assert_eq!(s.cursor(), (6, 3));
        s.clear_region('.', 1, 1, 2, 2).unwrap();
        assert_eq!(s.cursor(), (3, 2));
    }

    #[test]
    fn region_clear_touches_only_the_region() {
        let mut s = screen(6, 4);
        s.clear_region_with('*', 2, 1, 3, 2, Color::RED, Color::YELLOW).unwrap();
        let star = Cell::new(b'*', Color::RED, Color::YELLOW);
        for y in 0..4 {
            for x in 0..6 {
                let inside = (2..5).contains(&x) && (1..3).contains(&y);
                let expected = if inside { star } else { blank() };
                assert_eq!(s.cell(x, y).unwrap(), expected, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn region_may_reach_the_far_edges() {
        let mut s = screen(6, 4);
        s.clear_region('x', 0, 0, 6, 4).unwrap();
        s.clear_region('y', 5, 3, 1, 1).unwrap();
        assert_eq!(s.cell(5, 3).unwrap().character, b'y');
    }

    #[test]
    fn invalid_regions_change_nothing() {
        let mut s = screen(6, 4);
        let before = snapshot(&s);
        let cursor = s.cursor();

        assert_out_of_range(s.clear_region('x', 0, 0, 0, 1), "width");
        assert_out_of_range(s.clear_region('x', 0, 0, 1, 0), "height");
        assert_out_of_range(s.clear_region('x', 4, 0, 3, 1), "width");
        assert_out_of_range(s.clear_region('x', 0, 2, 1, 3), "height");
        assert_out_of_range(s.clear_region('x', 6, 0, 1, 1), "x");
        assert_out_of_range(s.clear_region('x', 0, -1, 1, 1), "y");
        assert_out_of_range(s.clear_region('\u{1F600}', 0, 0, 1, 1), "character");

        assert_eq!(snapshot(&s), before);
        assert_eq!(s.cursor(), cursor);
    }
}

// --- Cursor and defaults ---

mod cursor_and_defaults {
    use super::*;
    use test_log::test;

    #[test]
    fn cursor_setters_validate() {
        let mut s = default_screen();
        s.set_cursor_x(79).unwrap().set_cursor_y(23).unwrap();
        assert_eq!(s.cursor(), (79, 23));
        assert_out_of_range(s.set_cursor_x(80), "cursor x");
        assert_out_of_range(s.set_cursor_y(-1), "cursor y");
        assert_eq!((s.cursor_x(), s.cursor_y()), (79, 23));
    }

    #[test]
    fn cursor_position_is_all_or_nothing() {
        let mut s = default_screen();
        s.set_cursor_position(5, 5).unwrap();
        assert_out_of_range(s.set_cursor_position(10, 24), "cursor y");
        assert_eq!(s.cursor(), (5, 5));
    }

    #[test]
    fn clearing_default_colors_restores_white_on_black() {
        let mut s = default_screen();
        s.set_default_foreground(Color::RED)
            .set_default_background(Color::BRIGHT_BLUE);
        assert_eq!(s.default_foreground(), Color::RED);
        assert_eq!(s.default_background(), Color::BRIGHT_BLUE);

        s.set_default_foreground(None).set_default_background(None);
        assert_eq!(s.default_foreground(), Color::WHITE);
        assert_eq!(s.default_background(), Color::BLACK);
    }

    #[test]
    fn reading_outside_grid_is_out_of_range() {
        let s = default_screen();
        assert_out_of_range(s.cell(80, 0), "x");
        assert_out_of_range(s.cell(0, 24), "y");
        assert_out_of_range(s.row_text(24), "y");
    }
}

// --- Tile transformation ---

mod transform {
    use super::*;
    use test_log::test;

    #[test]
    fn identity_transform_changes_nothing() {
        let mut s = screen(5, 4);
        s.write_str_with("abc", 1, 1, Color::RED, Color::BLUE).unwrap();
        let before = snapshot(&s);
        s.for_each_tile(-3, -3, 20, 20, |_x: i32, _y: i32, cell: Cell| cell);
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn off_grid_positions_are_skipped() {
        let mut s = screen(5, 4);
        let mut visited = Vec::new();
        s.for_each_tile(3, 2, 4, 4, |x: i32, y: i32, cell: Cell| {
            visited.push((x, y));
            cell
        });
        // Column-major, clipped to the grid.
        assert_eq!(visited, vec![(3, 2), (3, 3), (4, 2), (4, 3)]);
    }

    #[test]
    fn region_entirely_off_grid_visits_nothing() {
        let mut s = screen(5, 4);
        let mut count = 0;
        s.for_each_tile(-10, 0, 5, 4, |_x: i32, _y: i32, cell: Cell| {
            count += 1;
            cell
        });
        s.for_each_tile(0, 0, -2, 4, |_x: i32, _y: i32, cell: Cell| {
            count += 1;
            cell
        });
        let far = i32::MAX - 1;
        s.for_each_tile(far, far, i32::MAX, i32::MAX, |_x: i32, _y: i32, cell: Cell| {
            count += 1;
            cell
        });
        assert_eq!(count, 0);
    }

    #[test]
    fn transform_rewrites_cells_in_place() {
        let mut s = screen(4, 2);
        s.for_each_tile_in_screen(|x: i32, y: i32, cell: Cell| Cell {
            character: b'0' + (x + y * 4) as u8,
            background: Color::BRIGHT_BLACK,
            ..cell
        });
        assert_eq!(s.row_text(0).unwrap(), "0123");
        assert_eq!(s.row_text(1).unwrap(), "4567");
        assert_eq!(s.cell(2, 1).unwrap().background, Color::BRIGHT_BLACK);
        assert_eq!(s.cursor(), (0, 0));
    }

    struct Recolor(Color);

    impl TileTransformer for Recolor {
        fn transform_tile(&mut self, _x: i32, _y: i32, cell: Cell) -> Cell {
            Cell {
                foreground: self.0,
                ..cell
            }
        }
    }

    #[test]
    fn struct_transformers_are_accepted() {
        let mut s = screen(3, 3);
        s.for_each_tile(0, 0, 2, 2, Recolor(Color::BRIGHT_BLACK));
        assert_eq!(s.cell(0, 0).unwrap().foreground, Color::BRIGHT_BLACK);
        assert_eq!(s.cell(1, 1).unwrap().foreground, Color::BRIGHT_BLACK);
        assert_eq!(s.cell(2, 2).unwrap().foreground, Color::WHITE);
    }

    #[test]
    fn transformer_errors_propagate_and_keep_earlier_changes() {
        let mut s = screen(3, 3);
        let result = s.try_for_each_tile(0, 0, 3, 3, |x, y, cell| {
            if (x, y) == (1, 0) {
                return Err(format!("refused ({}, {})", x, y));
            }
            Ok(Cell {
                character: b'+',
                ..cell
            })
        });
        assert_eq!(result.err(), Some("refused (1, 0)".to_string()));
        // Column 0 was fully visited before the failure.
        assert_eq!(s.row_text(0).unwrap(), "+  ");
        assert_eq!(s.row_text(2).unwrap(), "+  ");
    }
}

// --- Rendering ---

mod rendering {
    use super::*;
    use test_log::test;

    #[test]
    fn first_frame_uploads_atlas_and_draws_everything() {
        let mut s = screen(4, 3);
        assert_eq!(s.render_frame().unwrap(), 12);
        let backend = s.backend();
        assert_eq!(backend.atlas_size, Some(AtlasGeometry::CP437.required_size()));
        assert_eq!(backend.logical_size, Some((36, 48)));
        assert_eq!(backend.frames[0].len(), 24);
    }

    #[test]
    fn second_render_without_changes_emits_nothing() {
        let mut s = default_screen();
        s.render(0.016).unwrap();
        s.render(0.016).unwrap();
        let backend = s.backend();
        assert_eq!(backend.frames.len(), 2);
        assert!(backend.frames[1].is_empty());
        assert_eq!(backend.presents, 2);
    }

    #[test]
    fn only_changed_cells_are_redrawn() {
        let mut s = default_screen();
        s.render_frame().unwrap();
        s.write_str("ok", 10, 0).unwrap();
        assert_eq!(s.render_frame().unwrap(), 2);

        let frame = s.backend().last_frame().unwrap();
        let glyphs: Vec<(usize, u8)> = frame
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawGlyph { cell, tile, .. } => Some((cell.x, tile.code)),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs, vec![(10, b'o'), (11, b'k')]);
        // Row 0 is drawn at the top of the 384 px tall surface.
        assert_eq!(frame[0].rect().y, 23 * 16);
    }

    #[test]
    fn rewriting_identical_content_is_not_a_change() {
        let mut s = default_screen();
        s.write_with('x', 0, 0, Color::new(0.3, 0.3, 0.3, 1.0), None).unwrap();
        s.render_frame().unwrap();
        s.write_with('x', 0, 0, Color::new(0.3, 0.3, 0.3, 1.0), None).unwrap();
        assert_eq!(s.render_frame().unwrap(), 0);
    }

    #[test]
    fn nan_colors_are_clamped_and_settle_after_one_frame() {
        let nan = Color::rgba(f32::NAN, 0.0, 0.0, 1.0);
        let mut s = screen(4, 2);
        s.write_with('x', 0, 0, nan, None).unwrap();
        s.set_default_background(Color::rgba(0.0, f32::NAN, 2.0, 1.0));
        s.write('y', 1, 0).unwrap();
        s.for_each_tile(2, 0, 1, 1, |_x: i32, _y: i32, cell: Cell| Cell {
            foreground: nan,
            ..cell
        });

        assert_eq!(s.cell(0, 0).unwrap().foreground, Color::BLACK);
        assert_eq!(s.cell(1, 0).unwrap().background, Color::rgba(0.0, 0.0, 1.0, 1.0));
        assert_eq!(s.cell(2, 0).unwrap().foreground, Color::BLACK);

        s.render_frame().unwrap();
        assert_eq!(s.render_frame().unwrap(), 0);
    }

    #[test]
    fn changes_accumulate_across_skipped_frames() {
        let mut s = screen(5, 5);
        s.render_frame().unwrap();
        s.write('a', 0, 0).unwrap();
        s.write('b', 4, 4).unwrap();
        s.write('a', 0, 0).unwrap();
        assert_eq!(s.render_frame().unwrap(), 2);
    }

    #[test]
    fn failed_frame_is_retried_in_full() {
        let mut s = screen(5, 5);
        s.render_frame().unwrap();
        s.write('q', 2, 2).unwrap();

        s.backend_mut().fail_next_frames(1);
        assert!(s.render(0.016).is_err());
        assert_eq!(s.render_frame().unwrap(), 1);
        assert_eq!(s.render_frame().unwrap(), 0);
    }

    #[test]
    fn invalidate_redraws_everything() {
        let mut s = screen(3, 2);
        s.render_frame().unwrap();
        s.invalidate();
        assert_eq!(s.render_frame().unwrap(), 6);
    }

    #[test]
    fn resize_reaches_backend_without_changing_grid() {
        let mut s = default_screen();
        s.resize(1440, 900);
        assert_eq!(s.backend().window_size, Some((1440, 900)));
        assert_eq!((s.width(), s.height()), (80, 24));
    }
}

// --- Properties ---

proptest! {
    #[test]
    fn in_range_writes_read_back(
        code in 0u8..=255,
        x in 0i32..80,
        y in 0i32..24,
        fg in 0u8..16,
        bg in 0u8..16,
    ) {
        let mut s = default_screen();
        let fg = NamedColor::from_index(fg).unwrap().to_color();
        let bg = NamedColor::from_index(bg).unwrap().to_color();
        s.write_with(char::from(code), x, y, fg, bg).unwrap();
        prop_assert_eq!(s.cell(x, y).unwrap(), Cell::new(code, fg, bg));
        prop_assert_eq!(s.cursor(), (x + 1, y));
    }

    #[test]
    fn out_of_range_writes_never_mutate(
        x in -200i32..200,
        y in -50i32..50,
        code in 0u32..600,
    ) {
        let mut s = screen(20, 10);
        let before = snapshot(&s);
        let ch = char::from_u32(code).unwrap();
        let valid = (0..20).contains(&x) && (0..10).contains(&y) && code < 256;
        let result = s.write(ch, x, y);
        prop_assert_eq!(result.is_ok(), valid);
        if !valid {
            prop_assert_eq!(snapshot(&s), before);
        }
    }

    #[test]
    fn fitting_strings_read_back_exactly(
        text in "[ -~]{0,30}",
        x in 0i32..40,
        y in 0i32..24,
    ) {
        let mut s = default_screen();
        let len = text.chars().count() as i32;
        prop_assume!(x + len < 80);
        s.write_str(&text, x, y).unwrap();
        let read: String = (0..len)
            .map(|i| char::from(s.cell(x + i, y).unwrap().character))
            .collect();
        prop_assert_eq!(read, text);
    }
}
