use eframe::egui;

use crate::config::{BLACK_KEYS, WHITE_KEYS};

const KEYBOARD_HEIGHT: f32 = 150.0;
const BLACK_KEY_WIDTH_RATIO: f32 = 0.6;
const BLACK_KEY_HEIGHT_RATIO: f32 = 0.6;

pub struct KeyboardResponse {
    pub played: Option<String>,
}

/// Two-octave piano keyboard, C4 to B5, every key pre-bound to a note
/// name.
pub fn show(ui: &mut egui::Ui) -> KeyboardResponse {
    let mut played = None;

    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(
        egui::Vec2::new(width, KEYBOARD_HEIGHT),
        egui::Sense::click(),
    );
    let rect = response.rect;

    let white_width = rect.width() / WHITE_KEYS.len() as f32;
    let black_width = white_width * BLACK_KEY_WIDTH_RATIO;
    let black_height = rect.height() * BLACK_KEY_HEIGHT_RATIO;

    let black_key_at = |pos: egui::Pos2| -> Option<&'static str> {
        BLACK_KEYS.iter().find_map(|&(note, boundary)| {
            let center_x = rect.left() + boundary as f32 * white_width;
            let key = egui::Rect::from_min_max(
                egui::Pos2::new(center_x - black_width / 2.0, rect.top()),
                egui::Pos2::new(center_x + black_width / 2.0, rect.top() + black_height),
            );
            key.contains(pos).then_some(note)
        })
    };

    let white_key_at = |pos: egui::Pos2| -> Option<&'static str> {
        if !rect.contains(pos) {
            return None;
        }
        let index = ((pos.x - rect.left()) / white_width) as usize;
        WHITE_KEYS.get(index.min(WHITE_KEYS.len() - 1)).copied()
    };

    let hovered_key = response
        .hover_pos()
        .and_then(|pos| black_key_at(pos).or_else(|| white_key_at(pos)));

    for (i, note) in WHITE_KEYS.iter().enumerate() {
        let key_rect = egui::Rect::from_min_size(
            egui::Pos2::new(rect.left() + i as f32 * white_width, rect.top()),
            egui::Vec2::new(white_width, rect.height()),
        );

        let fill = if hovered_key == Some(*note) {
            egui::Color32::from_rgb(225, 225, 225)
        } else {
            egui::Color32::WHITE
        };
        painter.rect_filled(key_rect.shrink(1.0), 3.0, fill);
        painter.rect_stroke(
            key_rect.shrink(1.0),
            3.0,
            egui::Stroke::new(1.0, egui::Color32::from_rgb(160, 160, 160)),
            egui::StrokeKind::Inside,
        );

        painter.text(
            egui::Pos2::new(key_rect.center().x, key_rect.bottom() - 14.0),
            egui::Align2::CENTER_CENTER,
            *note,
            egui::FontId::proportional(11.0),
            egui::Color32::from_rgb(100, 100, 100),
        );
    }

    for &(note, boundary) in &BLACK_KEYS {
        let center_x = rect.left() + boundary as f32 * white_width;
        let key_rect = egui::Rect::from_min_max(
            egui::Pos2::new(center_x - black_width / 2.0, rect.top()),
            egui::Pos2::new(center_x + black_width / 2.0, rect.top() + black_height),
        );

        let fill = if hovered_key == Some(note) {
            egui::Color32::from_rgb(70, 70, 70)
        } else {
            egui::Color32::from_rgb(30, 30, 30)
        };
        painter.rect_filled(key_rect, 3.0, fill);

        painter.text(
            egui::Pos2::new(key_rect.center().x, key_rect.bottom() - 10.0),
            egui::Align2::CENTER_CENTER,
            note,
            egui::FontId::proportional(9.0),
            egui::Color32::WHITE,
        );
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            // Black keys sit on top of white ones, so test them first.
            played = black_key_at(pos)
                .or_else(|| white_key_at(pos))
                .map(str::to_string);
        }
    }

    KeyboardResponse { played }
}
