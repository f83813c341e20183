// src/ui/helpers.rs
use egui::{Button, Color32, RichText, Ui, Vec2};

use crate::app::{Feedback, FeedbackKind};

pub fn big_list_button(ui: &mut Ui, label: String, width: f32, height: f32, enabled: bool) -> bool {
    ui.add_enabled(enabled, Button::new(label).min_size(Vec2::new(width, height)))
        .clicked()
}

/// Botón de respuesta grande con texto a tamaño de niño.
pub fn answer_button(ui: &mut Ui, label: &str, width: f32, enabled: bool) -> bool {
    ui.add_enabled(
        enabled,
        Button::new(RichText::new(label).size(24.0)).min_size(Vec2::new(width, 52.0)),
    )
    .clicked()
}

/// La frase de ánimo bajo la pregunta, verde si acierta y naranja si no.
pub fn feedback_label(ui: &mut Ui, feedback: &Feedback) {
    let color = match feedback.kind {
        FeedbackKind::Positive => Color32::from_rgb(0x2e, 0xb8, 0x50),
        FeedbackKind::Encouraging => Color32::from_rgb(0xe8, 0x8a, 0x1a),
    };
    ui.label(RichText::new(&feedback.text).color(color).size(22.0).strong());
}
