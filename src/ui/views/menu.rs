use egui::{Context, RichText, ScrollArea};

use crate::app::GameApp;
use crate::model::{DifficultyLevel, GameMode};
use crate::ui::helpers::big_list_button;
use crate::ui::layout::centered_panel;

fn mode_emoji(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Addition => "➕",
        GameMode::Subtraction => "➖",
        GameMode::Comparison => "⚖️",
        GameMode::Counting => "🎨",
        GameMode::NumberRecognition => "🧐",
        GameMode::MatchingPairs => "🔗",
        GameMode::NumberSequence => "🔢",
        GameMode::VisualPattern => "🖼️",
        GameMode::OddOneOut => "🔍",
        GameMode::ComprehensiveChallenge => "⏱️",
        GameMode::MixedMathChallenge => "🧮",
    }
}

pub fn ui_menu(app: &mut GameApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);

    centered_panel(ctx, 560.0, 520.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("🧮 Toán Học Thông Minh");
            ui.add_space(8.0);

            // Nivel
            ui.horizontal(|ui| {
                ui.label("Bé đang học lớp:");
                for level in [DifficultyLevel::Mam, DifficultyLevel::Choi] {
                    let selected = app.difficulty == level;
                    if ui.selectable_label(selected, level.title()).clicked() {
                        app.seleccionar_dificultad(level);
                    }
                }
            });

            if let Some((set, missing)) = app.next_unlock() {
                ui.add_space(4.0);
                if missing > 0 {
                    ui.label(format!("🔒 {}: còn thiếu {missing} ⭐", set.name));
                }
            }

            if !app.message.is_empty() {
                ui.add_space(6.0);
                ui.label(
                    RichText::new(&app.message)
                        .color(egui::Color32::YELLOW)
                        .strong(),
                );
            }

            ui.add_space(10.0);

            let btn_w = (ui.available_width() * 0.9).clamp(200.0, 420.0);
            let mut chosen: Option<GameMode> = None;
            ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    for mode in app.available_modes() {
                        let label = format!("{} {}", mode_emoji(mode), mode.title());
                        if big_list_button(ui, label, btn_w, 40.0, true) {
                            chosen = Some(mode);
                        }
                        ui.add_space(5.0);
                    }
                });
            });
            if let Some(mode) = chosen {
                app.empezar_ronda(mode, now);
            }

            ui.add_space(8.0);
            let has_sessions = !app.stored_sessions.is_empty();
            if big_list_button(ui, "📝 Xem lại câu sai".to_string(), btn_w, 36.0, has_sessions) {
                app.ver_repaso();
            }
        });
    });
}
