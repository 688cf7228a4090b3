use eframe::egui;

use crate::config::{GRID_DIVISIONS, LABEL_GUTTER, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::pitch;

const TIME_LINES: u32 = 16;

pub struct CanvasResponse {
    /// Note the user struck this frame, if any.
    pub played: Option<String>,
}

/// The melody surface: a fixed 1200x600 logical canvas with horizontal
/// note bands. Hovering highlights the band under the pointer, clicking
/// strikes its chime.
pub fn show(ui: &mut egui::Ui) -> CanvasResponse {
    let mut played = None;

    let available = ui.available_size();
    let scale = (available.x / SURFACE_WIDTH)
        .min(available.y / SURFACE_HEIGHT)
        .max(0.1);
    let size = egui::Vec2::new(SURFACE_WIDTH * scale, SURFACE_HEIGHT * scale);

    let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
    let rect = response.rect;

    let to_screen = egui::emath::RectTransform::from_to(
        egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::Vec2::new(SURFACE_WIDTH, SURFACE_HEIGHT),
        ),
        rect,
    );
    let from_screen = to_screen.inverse();

    let hovered_note = response
        .hover_pos()
        .map(|pos| from_screen.transform_pos(pos))
        .map(|pos| pitch::position_to_note(pos.y, SURFACE_HEIGHT));

    painter.rect_filled(rect, 8.0, egui::Color32::from_rgb(245, 245, 250));
    painter.rect_stroke(
        rect,
        8.0,
        egui::Stroke::new(2.0, egui::Color32::from_rgb(102, 126, 234)),
        egui::StrokeKind::Inside,
    );

    let grid = pitch::grid_notes(SURFACE_HEIGHT, GRID_DIVISIONS);

    for (i, line) in grid.iter().enumerate() {
        let is_highlighted = hovered_note.as_deref() == Some(line.note.as_str());

        if is_highlighted {
            let next_y = grid.get(i + 1).map(|next| next.y).unwrap_or(SURFACE_HEIGHT);
            let band = egui::Rect::from_min_max(
                to_screen.transform_pos(egui::Pos2::new(LABEL_GUTTER, line.y)),
                to_screen.transform_pos(egui::Pos2::new(SURFACE_WIDTH, next_y)),
            );
            painter.rect_filled(
                band,
                0.0,
                egui::Color32::from_rgba_unmultiplied(255, 120, 120, 60),
            );
        }

        let start = to_screen.transform_pos(egui::Pos2::new(LABEL_GUTTER, line.y));
        let end = to_screen.transform_pos(egui::Pos2::new(SURFACE_WIDTH, line.y));
        painter.line_segment(
            [start, end],
            egui::Stroke::new(1.0, egui::Color32::from_rgb(150, 150, 150)),
        );

        let label_pos = to_screen.transform_pos(egui::Pos2::new(LABEL_GUTTER / 2.0, line.y));
        let (label_color, label_size) = if is_highlighted {
            (egui::Color32::from_rgb(255, 50, 50), 14.0)
        } else {
            (egui::Color32::from_rgb(80, 80, 80), 12.0)
        };
        painter.text(
            label_pos,
            egui::Align2::CENTER_CENTER,
            &line.note,
            egui::FontId::proportional(label_size),
            label_color,
        );
    }

    let time_step = SURFACE_WIDTH / TIME_LINES as f32;
    let mut x = LABEL_GUTTER;
    while x < SURFACE_WIDTH {
        let top = to_screen.transform_pos(egui::Pos2::new(x, 0.0));
        let bottom = to_screen.transform_pos(egui::Pos2::new(x, SURFACE_HEIGHT));
        painter.line_segment(
            [top, bottom],
            egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(150, 150, 150, 70)),
        );
        x += time_step;
    }

    if response.clicked() {
        if let Some(click_pos) = response.interact_pointer_pos() {
            let logical = from_screen.transform_pos(click_pos);
            played = Some(pitch::position_to_note(logical.y, SURFACE_HEIGHT));
        }
    }

    CanvasResponse { played }
}
