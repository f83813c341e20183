mod helpers;
pub mod layout;
pub mod views;

use crate::app::{AppState, GameApp};
use eframe::{set_value, App, Frame, APP_KEY};
use egui::Context;
use layout::{bottom_panel, confirm_reset_window, top_panel};

impl App for GameApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        // El latido de la ronda: cronómetro y acciones aplazadas.
        let now = ctx.input(|i| i.time);
        self.poll_pendientes(now);
        if self.round.is_some() {
            // Que el reloj y los avances aplazados no esperen a un clic.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        top_panel(self, ctx);
        bottom_panel(ctx);

        // Dispatch por estado a las funciones en views
        match self.state {
            AppState::Menu => views::menu::ui_menu(self, ctx),
            AppState::Game => views::game::ui_game(self, ctx),
            AppState::Review => views::review::ui_review(self, ctx),
        }

        if self.confirm_reset {
            confirm_reset_window(self, ctx);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        set_value(storage, APP_KEY, self);
    }
}
