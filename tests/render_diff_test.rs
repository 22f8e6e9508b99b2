//! Differential redraw: dirty detection and idempotence.

use tui_arcade::canvas::{compose_into, frame_buffer_for, LayerCanvas};
use tui_arcade::term::encode_diff_into;
use tui_arcade::types::{CellColor, Layer, Rgb};

#[test]
fn rendering_the_same_frame_twice_is_dirty_free() {
    let mut canvas = LayerCanvas::new(20, 6);
    let color = CellColor::new(Rgb::WHITE, Rgb::BLACK);
    canvas.draw_text(1, 1, Layer::Ui, "steady frame", color);
    canvas.draw_rect(0, 3, 20, 2, Layer::Background, color, '~');

    let mut first = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut first);
    let mut second = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut second);

    let mut out = Vec::new();
    let dirty = encode_diff_into(&first, &second, &mut out).unwrap();
    assert_eq!(dirty, 0);
    assert!(out.is_empty());
}

#[test]
fn a_single_cell_change_dirties_exactly_one_cell() {
    let mut canvas = LayerCanvas::new(20, 6);
    let color = CellColor::new(Rgb::WHITE, Rgb::BLACK);
    canvas.draw_text(1, 1, Layer::Ui, "score: 0", color);

    let mut before = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut before);

    canvas.draw_text(1, 1, Layer::Ui, "score: 1", color);
    let mut after = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut after);

    let mut out = Vec::new();
    let dirty = encode_diff_into(&before, &after, &mut out).unwrap();
    assert_eq!(dirty, 1);
}

#[test]
fn color_change_alone_is_a_redraw() {
    let mut canvas = LayerCanvas::new(8, 3);
    canvas.draw_text(0, 0, Layer::Ui, "hp", CellColor::new(Rgb::WHITE, Rgb::BLACK));
    let mut before = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut before);

    // Same glyphs, new foreground color.
    canvas.draw_text(
        0,
        0,
        Layer::Ui,
        "hp",
        CellColor::new(Rgb::new(255, 0, 0), Rgb::BLACK),
    );
    let mut after = frame_buffer_for(&canvas);
    compose_into(&canvas, false, &mut after);

    let mut out = Vec::new();
    let dirty = encode_diff_into(&before, &after, &mut out).unwrap();
    assert_eq!(dirty, 2);
}
