//! Clasificación del rendimiento del jugador, la brújula del modo
//! adaptativo.

use crate::model::{PlayerPerformanceState, QuestionRequestType};

const FLOWING_THRESHOLD: u32 = 3;
const STRUGGLING_THRESHOLD: u32 = 2;
const FAST_ANSWER_MS: u64 = 5000;
const GUESSING_MS: u64 = 2000;

/// Estado tras la última respuesta, a partir de las rachas y el tiempo
/// empleado.
pub fn classify_performance(
    is_correct: bool,
    consecutive_correct: u32,
    consecutive_incorrect: u32,
    answer_time_ms: u64,
) -> PlayerPerformanceState {
    if is_correct {
        if consecutive_correct >= FLOWING_THRESHOLD && answer_time_ms < FAST_ANSWER_MS {
            PlayerPerformanceState::Flowing
        } else {
            PlayerPerformanceState::Consolidating
        }
    } else if consecutive_incorrect >= STRUGGLING_THRESHOLD {
        PlayerPerformanceState::Struggling
    } else if answer_time_ms < GUESSING_MS {
        PlayerPerformanceState::Guessing
    } else {
        PlayerPerformanceState::Neutral
    }
}

/// Qué pedirle al compositor según el estado: al que vuela se le reta,
/// al que se atasca se le refuerza.
pub fn request_type_for(state: PlayerPerformanceState) -> QuestionRequestType {
    match state {
        PlayerPerformanceState::Flowing => QuestionRequestType::Challenge,
        PlayerPerformanceState::Struggling => QuestionRequestType::Booster,
        _ => QuestionRequestType::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tres_aciertos_rapidos_ponen_en_racha() {
        assert_eq!(
            classify_performance(true, 3, 0, 3000),
            PlayerPerformanceState::Flowing
        );
        // El mismo streak pero lento solo consolida.
        assert_eq!(
            classify_performance(true, 3, 0, 6000),
            PlayerPerformanceState::Consolidating
        );
        assert_eq!(
            classify_performance(true, 1, 0, 1000),
            PlayerPerformanceState::Consolidating
        );
    }

    #[test]
    fn dos_fallos_seguidos_marcan_atasco() {
        assert_eq!(
            classify_performance(false, 0, 2, 8000),
            PlayerPerformanceState::Struggling
        );
        // El atasco pesa más que la velocidad.
        assert_eq!(
            classify_performance(false, 0, 3, 500),
            PlayerPerformanceState::Struggling
        );
    }

    #[test]
    fn fallo_rapido_es_adivinar_y_fallo_lento_es_neutral() {
        assert_eq!(
            classify_performance(false, 0, 1, 1500),
            PlayerPerformanceState::Guessing
        );
        assert_eq!(
            classify_performance(false, 0, 1, 4000),
            PlayerPerformanceState::Neutral
        );
    }

    #[test]
    fn el_estado_decide_el_tipo_de_peticion() {
        assert_eq!(
            request_type_for(PlayerPerformanceState::Flowing),
            QuestionRequestType::Challenge
        );
        assert_eq!(
            request_type_for(PlayerPerformanceState::Struggling),
            QuestionRequestType::Booster
        );
        for state in [
            PlayerPerformanceState::Neutral,
            PlayerPerformanceState::Consolidating,
            PlayerPerformanceState::Guessing,
        ] {
            assert_eq!(request_type_for(state), QuestionRequestType::Standard);
        }
    }
}
