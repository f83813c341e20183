use super::*;
use crate::data::ImageSet;

impl RoundState {
    pub fn progress_percent(&self) -> f32 {
        if self.num_questions_target == 0 {
            return 0.0;
        }
        self.current_index as f32 * 100.0 / self.num_questions_target as f32
    }

    /// Reloj en formato m:ss para la cabecera del contrarreloj.
    pub fn time_display(&self) -> Option<String> {
        self.time_left.map(|left| format!("{}:{:02}", left / 60, left % 60))
    }
}

impl GameApp {
    pub fn current_question(&self) -> Option<&Question> {
        self.round_opt().and_then(|r| r.current_question())
    }

    pub fn game_title(&self) -> &'static str {
        self.round_opt().map(|r| r.mode.title()).unwrap_or("")
    }

    /// Modos que se ofrecen en el menú. Los dos de IA solo aparecen si
    /// hay una fuente conectada.
    pub fn available_modes(&self) -> Vec<GameMode> {
        let all = [
            GameMode::Addition,
            GameMode::Subtraction,
            GameMode::Comparison,
            GameMode::Counting,
            GameMode::NumberRecognition,
            GameMode::MatchingPairs,
            GameMode::NumberSequence,
            GameMode::VisualPattern,
            GameMode::OddOneOut,
            GameMode::ComprehensiveChallenge,
            GameMode::MixedMathChallenge,
        ];
        all.into_iter()
            .filter(|mode| !mode.is_ai_mode() || self.ai_source.is_some())
            .collect()
    }

    /// Próxima colección bloqueada y estrellas que le faltan al jugador.
    pub fn next_unlock(&self) -> Option<(&ImageSet, u32)> {
        self.bank
            .unlockable_sets
            .iter()
            .filter(|set| !self.unlocked_set_ids.contains(&set.id))
            .min_by_key(|set| set.stars_required)
            .map(|set| (set, set.stars_required.saturating_sub(self.total_stars)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_menu_esconde_los_modos_de_ia_sin_fuente() {
        let app = GameApp::new();
        let modes = app.available_modes();
        assert!(!modes.contains(&GameMode::OddOneOut));
        assert!(!modes.contains(&GameMode::VisualPattern));
        assert!(modes.contains(&GameMode::Addition));
        assert_eq!(modes.len(), 9);
    }

    #[test]
    fn la_proxima_coleccion_informa_de_lo_que_falta() {
        let mut app = GameApp::new();
        app.total_stars = 15;
        let (set, missing) = app.next_unlock().expect("hay colecciones");
        assert_eq!(set.id, "farm_animals");
        assert_eq!(missing, 5);

        app.unlocked_set_ids.push("farm_animals".into());
        let (set, _) = app.next_unlock().expect("quedan colecciones");
        assert_eq!(set.id, "sea_creatures");
    }
}
