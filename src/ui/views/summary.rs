use egui::{Context, RichText};

use crate::app::GameApp;
use crate::model::EndMessageKind;
use crate::ui::helpers::answer_button;

/// El cartel de fin de ronda: mensaje, estrellas y vuelta al menú.
pub fn ui_end_overlay(app: &mut GameApp, ctx: &Context) {
    let mut confirm = false;

    egui::Window::new("end_overlay")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let Some(round) = app.round_opt() else {
                return;
            };
            let Some(message) = round.end_message.as_ref() else {
                return;
            };

            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new(message.icons.join(" ")).size(34.0));
                ui.add_space(6.0);
                let title = match message.kind {
                    EndMessageKind::Congrats => RichText::new(&message.text)
                        .size(26.0)
                        .strong()
                        .color(egui::Color32::from_rgb(0x2e, 0xb8, 0x50)),
                    EndMessageKind::Encourage => RichText::new(&message.text).size(26.0).strong(),
                };
                ui.label(title);
                ui.add_space(10.0);

                ui.label(RichText::new("⭐".repeat(round.stars_earned as usize)).size(30.0));
                ui.label(format!(
                    "Đúng {}/{} câu",
                    round.score, round.num_questions_target
                ));
                if let Some(seconds) = message.time_taken {
                    ui.label(format!("⏱️ {}:{:02}", seconds / 60, seconds % 60));
                }
                ui.add_space(12.0);

                if answer_button(ui, "🎈 Tuyệt vời!", 220.0, true) {
                    confirm = true;
                }
                ui.add_space(8.0);
            });
        });

    if confirm {
        app.confirmar_fin_de_ronda();
    }
}
