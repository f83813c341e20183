use egui::{Button, CentralPanel, Context, Frame, Ui, Visuals};

use crate::app::{AppState, GameApp};

pub fn top_panel(app: &mut GameApp, ctx: &Context) {
    egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
        ui.horizontal_centered(|ui| {
            match app.state {
                AppState::Game => {
                    if ui.button("🔙 Về menu").clicked() {
                        app.abandonar_ronda();
                    }
                    ui.separator();
                    ui.label(app.game_title());
                }
                AppState::Review => {
                    if ui.button("🔙 Về menu").clicked() {
                        app.volver_al_menu();
                    }
                }
                AppState::Menu => {
                    if ui.button("🔄 Borrar progreso").clicked() {
                        app.confirm_reset = true;
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("⭐ {}", app.total_stars));
            });
        });
    });
}

pub fn bottom_panel(ctx: &Context) {
    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        // ----------- BOTONES DE TEMA -----------
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("🌙 Tối").clicked() {
                ctx.set_visuals(Visuals::dark());
            }
            if ui.button("☀ Sáng").clicked() {
                ctx.set_visuals(Visuals::light());
            }
        });
    });
}

/// Panel centrado verticalmente con un ancho máximo de contenido.
pub fn centered_panel(ctx: &Context, est_height: f32, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        let extra = ((ui.available_height() - est_height) / 2.0).max(0.0);
        ui.add_space(extra);
        Frame::default()
            .fill(ui.visuals().window_fill())
            .inner_margin(egui::Margin::symmetric(16, 16))
            .show(ui, |ui| {
                let w = ui.available_width().min(max_width);
                ui.set_width(w);
                inner(ui);
            });
        ui.add_space(extra);
    });
}

/// Dos botones del mismo tamaño en una fila. Devuelve (izquierdo, derecho).
pub fn two_button_row(
    ui: &mut Ui,
    panel_width: f32,
    left_label: &str,
    right_label: &str,
) -> (bool, bool) {
    let btn_w = (panel_width - 8.0) / 2.0;
    let mut clicked_left = false;
    let mut clicked_right = false;
    ui.horizontal(|ui| {
        ui.add_space((ui.available_width() - panel_width).max(0.0) / 2.0);
        clicked_left = ui.add_sized([btn_w, 44.0], Button::new(left_label)).clicked();
        clicked_right = ui
            .add_sized([btn_w, 44.0], Button::new(right_label))
            .clicked();
    });
    (clicked_left, clicked_right)
}

pub fn confirm_reset_window(app: &mut GameApp, ctx: &Context) {
    egui::Window::new("Confirmar reinicio")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("¿Seguro que quieres borrar todas las estrellas y el progreso del peque? ¡No se puede deshacer!");
            ui.horizontal(|ui| {
                if ui.button("Sí, borrar").clicked() {
                    app.reset_progress();
                }
                if ui.button("No").clicked() {
                    app.confirm_reset = false;
                }
            });
        });
}
