//! Frame serialization checked byte for byte and through a terminal emulator.

use termstage::ansi::{self, ColorMode, FrameWriter, sequences};
use termstage::{Canvas, Cell, Rgb};

fn two_cells() -> Canvas {
    let mut canvas = Canvas::new(2, 1);
    canvas.set(0, 0, Cell::new('A', Rgb::RED, Rgb::BLACK));
    canvas.set(1, 0, Cell::new('B', Rgb::RED, Rgb::BLUE));
    canvas
}

/// Feed one frame (cursor home included) to a vt100 screen.
fn render(canvas: &Canvas, mode: ColorMode) -> vt100::Parser {
    let mut out = Vec::new();
    FrameWriter::with_color_mode(mode)
        .write_frame(canvas, &mut out)
        .unwrap();
    let mut parser = vt100::Parser::new(canvas.height() as u16, canvas.width() as u16 + 1, 0);
    parser.process(&out);
    parser
}

// ============================================================================
// Exact output
// ============================================================================

#[test]
fn background_changes_once_foreground_never() {
    let out = two_cells().to_ansi();
    assert_eq!(
        out,
        "\x1b[38;2;255;0;0m\x1b[48;2;0;0;0mA\x1b[48;2;0;0;255mB\x1b[49m\x1b[39m"
    );
    assert_eq!(out.matches("\x1b[38;").count(), 1);
    assert_eq!(out.matches("\x1b[48;").count(), 2);
}

#[test]
fn frame_ends_with_default_colors() {
    let canvas = Canvas::new(4, 2);
    for mode in [
        ColorMode::TrueColor,
        ColorMode::Color256,
        ColorMode::Color16,
        ColorMode::NoColor,
    ] {
        let out = canvas.to_ansi_with_mode(mode);
        assert!(out.ends_with("\x1b[49m\x1b[39m"), "{mode:?}");
        assert_eq!(out.matches(sequences::ROW_BREAK).count(), 1, "{mode:?}");
    }
}

#[test]
fn palette_modes_use_palette_escapes() {
    let out = two_cells().to_ansi_with_mode(ColorMode::Color256);
    assert!(out.starts_with(&ansi::fg_color_with_mode(Rgb::RED, ColorMode::Color256)));
    assert!(!out.contains("38;2;"));
}

// ============================================================================
// Emulated terminal
// ============================================================================

#[test]
fn emulator_sees_text_and_colors() {
    let parser = render(&two_cells(), ColorMode::TrueColor);
    let screen = parser.screen();

    assert_eq!(screen.contents(), "AB");
    let a = screen.cell(0, 0).unwrap();
    let b = screen.cell(0, 1).unwrap();
    assert_eq!(a.fgcolor(), vt100::Color::Rgb(255, 0, 0));
    assert_eq!(a.bgcolor(), vt100::Color::Rgb(0, 0, 0));
    assert_eq!(b.bgcolor(), vt100::Color::Rgb(0, 0, 255));
}

#[test]
fn emulator_places_rows() {
    let mut canvas = Canvas::new(3, 3);
    canvas.clear_with('.', Rgb::WHITE, Rgb::BLACK);
    canvas.draw_text(0, 1, "abc", Rgb::GREEN);
    canvas.draw_text(1, 2, "z", Rgb::GREEN);

    let parser = render(&canvas, ColorMode::TrueColor);
    let rows: Vec<String> = parser.screen().rows(0, 3).collect();
    assert_eq!(rows, vec!["...", "abc", ".z."]);
}

#[test]
fn repeated_frames_overwrite_in_place() {
    let mut out = Vec::new();
    let mut writer = FrameWriter::with_color_mode(ColorMode::NoColor);
    let mut canvas = Canvas::new(2, 2);
    canvas.clear_with('x', Rgb::WHITE, Rgb::BLACK);
    writer.write_frame(&canvas, &mut out).unwrap();
    canvas.clear_with('y', Rgb::WHITE, Rgb::BLACK);
    writer.write_frame(&canvas, &mut out).unwrap();

    let mut parser = vt100::Parser::new(2, 3, 0);
    parser.process(&out);
    assert_eq!(parser.screen().contents(), "yy\nyy");
}

#[test]
fn wide_glyphs_take_two_columns() {
    let mut canvas = Canvas::new(4, 1);
    canvas.draw_text(0, 0, "日x", Rgb::WHITE);
    let parser = render(&canvas, ColorMode::NoColor);
    let screen = parser.screen();
    assert_eq!(screen.cell(0, 0).unwrap().contents(), "日");
    assert!(screen.cell(0, 0).unwrap().is_wide());
    assert_eq!(screen.cell(0, 2).unwrap().contents(), "x");
}
