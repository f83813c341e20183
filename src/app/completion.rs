use super::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{
    CONGRATS_ICONS, CONGRATS_MESSAGES, ENCOURAGE_TRY_AGAIN_ICONS, ENCOURAGE_TRY_AGAIN_MESSAGE,
    MAX_MASTER_ICONS_TO_STORE, MAX_SESSIONS_TO_STORE, POSITIVE_FEEDBACK_EMOJIS, TIMES_UP_MESSAGE,
};
use crate::model::EndMessageKind;
use crate::question_utils::{generate_id, shuffled};

/// Estrellas por porcentaje de aciertos: 90% son cinco, de ahí para abajo.
pub fn calculate_stars(score: u32, total_questions: usize) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    let percentage = score as f32 * 100.0 / total_questions as f32;
    if percentage >= 90.0 {
        5
    } else if percentage >= 75.0 {
        4
    } else if percentage >= 60.0 {
        3
    } else if percentage >= 40.0 {
        2
    } else if percentage >= 20.0 {
        1
    } else {
        0
    }
}

pub(crate) fn end_game_message(
    score: u32,
    total_questions: usize,
    time_up: bool,
    time_taken: Option<u32>,
    rng: &mut StdRng,
) -> EndGameMessage {
    if score as f32 >= total_questions as f32 * 0.7 && !time_up {
        let pool: Vec<Icon> = POSITIVE_FEEDBACK_EMOJIS
            .iter()
            .chain(CONGRATS_ICONS.iter())
            .map(|s| s.to_string())
            .collect();
        let mut icons = shuffled(&pool, rng);
        icons.truncate(3);
        EndGameMessage {
            text: CONGRATS_MESSAGES[rng.random_range(0..CONGRATS_MESSAGES.len())].to_string(),
            kind: EndMessageKind::Congrats,
            icons,
            time_taken,
        }
    } else {
        let pool: Vec<Icon> = ENCOURAGE_TRY_AGAIN_ICONS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut icons = shuffled(&pool, rng);
        icons.truncate(3);
        EndGameMessage {
            text: if time_up {
                TIMES_UP_MESSAGE.to_string()
            } else {
                ENCOURAGE_TRY_AGAIN_MESSAGE.to_string()
            },
            kind: EndMessageKind::Encourage,
            icons,
            time_taken,
        }
    }
}

/// Funde los iconos recién usados con el historial: lo nuevo delante,
/// sin duplicados y con el tope de tamaño.
pub fn merge_master_icons(newly_used: &[Icon], current: &[Icon]) -> Vec<Icon> {
    let mut merged: Vec<Icon> = Vec::new();
    for icon in newly_used.iter().chain(current.iter()) {
        if !merged.contains(icon) {
            merged.push(icon.clone());
        }
    }
    merged.truncate(MAX_MASTER_ICONS_TO_STORE);
    merged
}

impl GameApp {
    /// Vuelca la ronda terminada al perfil: estrellas, historial de
    /// iconos, sesión de repaso y desbloqueos.
    pub(crate) fn aplicar_resultados_de_ronda(&mut self) {
        let Some(round) = self.round.as_ref() else {
            return;
        };

        self.total_stars += round.stars_earned;

        let newly_used: Vec<Icon> = round.icons_used.iter().cloned().collect();
        self.master_used_icons = merge_master_icons(&newly_used, &self.master_used_icons);

        let session = StoredSession {
            id: generate_id(&mut self.rng),
            incorrect_attempts: round.incorrect_attempts.clone(),
            score: round.score,
            total_questions: round.num_questions_target,
            difficulty: round.difficulty,
        };
        self.stored_sessions.insert(0, session);
        self.stored_sessions.truncate(MAX_SESSIONS_TO_STORE);
        self.rounds_played += 1;

        // Colecciones que las estrellas acumuladas acaban de abrir.
        let newly_unlocked: Vec<(String, String)> = self
            .bank
            .unlockable_sets
            .iter()
            .filter(|set| {
                self.total_stars >= set.stars_required
                    && !self.unlocked_set_ids.contains(&set.id)
            })
            .map(|set| (set.id.clone(), set.name.clone()))
            .collect();
        for (id, name) in newly_unlocked {
            self.unlocked_set_ids.push(id);
            self.message = format!("🎉 Bé đã mở khóa: {name}!");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn la_escala_de_estrellas_corta_donde_debe() {
        assert_eq!(calculate_stars(0, 0), 0);
        assert_eq!(calculate_stars(27, 30), 5); // 90%
        assert_eq!(calculate_stars(26, 30), 4);
        assert_eq!(calculate_stars(18, 30), 3); // 60%
        assert_eq!(calculate_stars(12, 30), 2);
        assert_eq!(calculate_stars(6, 30), 1);
        assert_eq!(calculate_stars(5, 30), 0);
    }

    #[test]
    fn el_historial_de_iconos_pone_lo_nuevo_delante_y_respeta_el_tope() {
        let newly = vec!["🐶".to_string(), "🍎".to_string()];
        let current = vec!["🍎".to_string(), "⭐".to_string()];
        let merged = merge_master_icons(&newly, &current);
        assert_eq!(merged, vec!["🐶", "🍎", "⭐"]);

        let many: Vec<Icon> = (0..500).map(|i| format!("icon{i}")).collect();
        assert_eq!(
            merge_master_icons(&many, &[]).len(),
            MAX_MASTER_ICONS_TO_STORE
        );
    }

    #[test]
    fn el_mensaje_final_distingue_exito_animo_y_tiempo_agotado() {
        let mut rng = StdRng::seed_from_u64(1);
        let good = end_game_message(25, 30, false, None, &mut rng);
        assert_eq!(good.kind, EndMessageKind::Congrats);
        assert_eq!(good.icons.len(), 3);

        let meh = end_game_message(5, 30, false, None, &mut rng);
        assert_eq!(meh.kind, EndMessageKind::Encourage);
        assert_eq!(meh.text, ENCOURAGE_TRY_AGAIN_MESSAGE);

        // Con el tiempo agotado ni un buen marcador celebra.
        let timed = end_game_message(25, 30, true, Some(120), &mut rng);
        assert_eq!(timed.kind, EndMessageKind::Encourage);
        assert_eq!(timed.text, TIMES_UP_MESSAGE);
        assert_eq!(timed.time_taken, Some(120));
    }

    #[test]
    fn las_estrellas_acumuladas_desbloquean_colecciones() {
        use crate::model::GameMode;
        let mut app = GameApp::new();
        app.rng = StdRng::seed_from_u64(7);
        app.total_stars = 18;

        // Una ronda perfecta de comparaciones: 5 estrellas más.
        let mut now = 1.0;
        app.empezar_ronda(GameMode::Comparison, now);
        let target = app.round().questions.len();
        for _ in 0..target {
            let q = app.round().current_question().unwrap().clone();
            let answer = match &q.kind {
                crate::model::QuestionKind::Comparison(cv) => match cv {
                    crate::model::ComparisonVariant::Standard { answer, .. }
                    | crate::model::ComparisonVariant::Expression { answer, .. } => {
                        UserAnswer::Sign(*answer)
                    }
                    crate::model::ComparisonVariant::TrueFalse { answer, .. } => {
                        UserAnswer::Bool(*answer)
                    }
                },
                _ => panic!("tipo inesperado"),
            };
            now += 0.6;
            app.procesar_respuesta(answer, now);
            now += 1.1;
            app.poll_pendientes(now);
        }
        assert!(app.round().show_end_overlay);
        app.confirmar_fin_de_ronda();

        assert_eq!(app.total_stars, 23);
        assert!(app
            .unlocked_set_ids
            .contains(&"farm_animals".to_string()));
        assert!(!app.unlocked_set_ids.contains(&"sea_creatures".to_string()));
    }
}
