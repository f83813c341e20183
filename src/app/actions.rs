use super::*;
use rand::Rng;

use crate::app::performance::{classify_performance, request_type_for};
use crate::config::{
    round_length, time_limit, ENCOURAGING_FEEDBACKS, NEXT_QUESTION_DELAY, POSITIVE_FEEDBACKS,
    SLOW_NEXT_QUESTION_DELAY, TIMES_UP_OVERLAY_SECS, ZERO_LIMIT,
};
use crate::model::{CardFace, QuestionKind};
use crate::round::{generate_questions_for_round, generate_single_question};

const MAX_FETCH_ATTEMPTS: u32 = 20;

impl GameApp {
    /// Arranca una ronda del modo elegido. Los modos adaptativos piden
    /// una sola pregunta; el resto recibe el lote completo. Si no sale
    /// ninguna pregunta, la ronda ni empieza.
    pub fn empezar_ronda(&mut self, mode: GameMode, now: f64) {
        let difficulty = self.difficulty;
        let target = round_length(mode, difficulty);
        let initial = if mode.is_adaptive() { 1 } else { target };

        let mut ctx =
            GenerationContext::new(&self.bank, &self.unlocked_set_ids, &self.master_used_icons);
        let ai_source =
            self.ai_source.as_deref_mut().map(|s| s as &mut dyn AiQuestionSource);
        let result = generate_questions_for_round(
            mode,
            difficulty,
            initial,
            &self.bank,
            &self.unlocked_set_ids,
            &mut ctx,
            ai_source,
            &mut self.rng,
        );

        let batch = match result {
            Ok(b) if !b.questions.is_empty() => b,
            Ok(_) => {
                self.message = "Chưa tạo được câu hỏi. Bé thử lại sau nhé!".to_string();
                return;
            }
            Err(e) => {
                log::warn!("no se pudo montar la ronda de {mode:?}: {e}");
                self.message = "Chưa tạo được câu hỏi. Bé thử lại sau nhé!".to_string();
                return;
            }
        };

        let limit = time_limit(mode, difficulty);
        let status = if limit.is_some() {
            RoundStatus::Countdown
        } else {
            RoundStatus::Playing
        };

        let mut round = RoundState {
            mode,
            difficulty,
            questions: batch.questions,
            current_index: 0,
            score: 0,
            stars_earned: 0,
            incorrect_attempts: Vec::new(),
            feedback: None,
            input_disabled: false,
            last_answer: None,
            show_end_overlay: false,
            show_times_up_overlay: false,
            ended_by_timeout: false,
            end_message: None,
            num_questions_target: target,
            icons_used: batch.icons_used,
            status,
            time_left: limit,
            total_time: limit,
            player_state: PlayerPerformanceState::Neutral,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
            question_start: now,
            zeros_used: batch.zeros_generated,
            r#gen: ctx,
            pending: Vec::new(),
            next_tick_at: None,
            input: String::new(),
            blank_inputs: Vec::new(),
            sort_picked: Vec::new(),
            detective_pick: None,
        };
        round.reset_view_scratch();

        self.round = Some(round);
        self.state = AppState::Game;
        self.message.clear();
    }

    /// Sale de la cuenta atrás y pone el cronómetro en marcha.
    pub fn empezar_cronometro(&mut self, now: f64) {
        if let Some(round) = self.round.as_mut() {
            if round.status == RoundStatus::Countdown {
                round.status = RoundStatus::Playing;
                round.question_start = now;
                round.next_tick_at = Some(now + 1.0);
            }
        }
    }

    /// Una respuesta del jugador: se bloquea la entrada, se corrige, se
    /// actualizan rachas y estado, y se aplaza el avance para que el
    /// feedback se vea.
    pub fn procesar_respuesta(&mut self, answer: UserAnswer, now: f64) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.status != RoundStatus::Playing || round.input_disabled {
            return;
        }
        let Some(question) = round.current_question() else {
            return;
        };
        if matches!(question.kind, QuestionKind::MatchingPairs(_)) {
            // Las parejas se juegan carta a carta.
            return;
        }
        let question = question.clone();

        round.last_answer = Some(answer.clone());
        round.input_disabled = true;

        let is_correct = question.check_answer(&answer);
        let answer_ms = ((now - round.question_start).max(0.0) * 1000.0) as u64;

        round.consecutive_correct = if is_correct {
            round.consecutive_correct + 1
        } else {
            0
        };
        round.consecutive_incorrect = if is_correct {
            0
        } else {
            round.consecutive_incorrect + 1
        };
        round.player_state = classify_performance(
            is_correct,
            round.consecutive_correct,
            round.consecutive_incorrect,
            answer_ms,
        );

        if is_correct {
            round.score += 1;
        } else {
            round.incorrect_attempts.push(IncorrectAttempt {
                question: question.clone(),
                user_answer: answer,
            });
        }

        let pool = if is_correct {
            POSITIVE_FEEDBACKS
        } else {
            ENCOURAGING_FEEDBACKS
        };
        round.feedback = Some(Feedback {
            text: pool[self.rng.random_range(0..pool.len())].to_string(),
            kind: if is_correct {
                FeedbackKind::Positive
            } else {
                FeedbackKind::Encouraging
            },
        });

        let delay = if matches!(question.mode, GameMode::VisualPattern | GameMode::OddOneOut) {
            SLOW_NEXT_QUESTION_DELAY
        } else {
            NEXT_QUESTION_DELAY
        };
        round.pending.push(TimedEvent {
            at: now + delay,
            event: PendingEvent::Advance,
        });
    }

    /// Avanza tras el feedback: cierra la ronda si tocó la última, pide
    /// la siguiente en los modos adaptativos y pasa índice en el resto.
    fn avanzar_pregunta(&mut self, now: f64) {
        let (finished, adaptive) = {
            let Some(round) = self.round.as_ref() else {
                return;
            };
            if round.status != RoundStatus::Playing {
                return;
            }
            let next = round.current_index + 1;
            let finished = next >= round.num_questions_target
                || (!round.mode.is_adaptive() && next >= round.questions.len());
            (finished, round.mode.is_adaptive())
        };

        if finished {
            self.terminar_ronda(false, now);
            return;
        }
        if adaptive {
            self.fetch_siguiente_pregunta(now);
            return;
        }

        let round = self.round.as_mut().expect("round vivo tras la guarda");
        round.current_index += 1;
        round.feedback = None;
        round.input_disabled = false;
        round.last_answer = None;
        round.question_start = now;
        round.reset_view_scratch();
    }

    /// El bucle seguro del modo adaptativo: hasta veinte candidatas,
    /// descartando las que rompen el tope de ceros. Si se agota, la
    /// ronda termina antes de lo previsto.
    fn fetch_siguiente_pregunta(&mut self, now: f64) {
        let mut new_question: Option<Question> = None;
        {
            let Some(round) = self.round.as_mut() else {
                return;
            };
            let zero_limited = round.mode.is_zero_limited();
            let request_type = request_type_for(round.player_state);

            for _ in 0..MAX_FETCH_ATTEMPTS {
                let allow_zero = !zero_limited || round.zeros_used < ZERO_LIMIT;
                let candidate = generate_single_question(
                    round.mode,
                    round.difficulty,
                    request_type,
                    allow_zero,
                    &mut round.r#gen,
                    &mut self.rng,
                );
                let Ok(q) = candidate else { continue };
                if zero_limited && q.contains_zero() && round.zeros_used >= ZERO_LIMIT {
                    // Descartada, no reutilizada.
                    continue;
                }
                new_question = Some(q);
                break;
            }
        }

        match new_question {
            Some(q) => {
                let round = self.round.as_mut().expect("round vivo");
                if round.mode.is_zero_limited() && q.contains_zero() {
                    round.zeros_used += 1;
                }
                round.questions.push(q);
                round.current_index += 1;
                round.feedback = None;
                round.input_disabled = false;
                round.last_answer = None;
                round.question_start = now;
                round.reset_view_scratch();
            }
            None => {
                log::warn!("no salió la siguiente pregunta adaptativa, la ronda termina antes");
                self.terminar_ronda(false, now);
            }
        }
    }

    /// Una carta del modo de parejas. El estado parcial vive dentro de
    /// la propia pregunta y se muta en sitio.
    pub fn seleccionar_item_pareja(&mut self, item_id: &str, now: f64) {
        enum PairOutcome {
            Nothing,
            Matched { all: bool },
            Mismatch,
        }

        let Some(round) = self.round.as_mut() else {
            return;
        };
        if round.status != RoundStatus::Playing || round.input_disabled {
            return;
        }

        let outcome = {
            let Some(question) = round.current_question_mut() else {
                return;
            };
            let QuestionKind::MatchingPairs(mq) = &mut question.kind else {
                return;
            };

            match mq.items.iter_mut().find(|it| it.id == item_id) {
                Some(item) if !item.is_matched => item.is_selected = !item.is_selected,
                _ => return,
            }

            let selected: Vec<usize> = mq
                .items
                .iter()
                .enumerate()
                .filter(|(_, it)| it.is_selected && !it.is_matched)
                .map(|(i, _)| i)
                .collect();

            if selected.len() < 2 {
                PairOutcome::Nothing
            } else {
                let (a, b) = (selected[0], selected[1]);
                let is_pair = mq.items[a].match_id == mq.items[b].match_id
                    && matches!(
                        (&mq.items[a].face, &mq.items[b].face),
                        (CardFace::Digit(_), CardFace::IconGroup { .. })
                            | (CardFace::IconGroup { .. }, CardFace::Digit(_))
                    );
                if is_pair {
                    let match_id = mq.items[a].match_id.clone();
                    for it in mq.items.iter_mut() {
                        if it.match_id == match_id {
                            it.is_matched = true;
                        }
                        it.is_selected = false;
                    }
                    PairOutcome::Matched {
                        all: mq.all_matched(),
                    }
                } else {
                    PairOutcome::Mismatch
                }
            }
        };

        let positive = POSITIVE_FEEDBACKS[self.rng.random_range(0..POSITIVE_FEEDBACKS.len())];
        let encouraging =
            ENCOURAGING_FEEDBACKS[self.rng.random_range(0..ENCOURAGING_FEEDBACKS.len())];

        match outcome {
            PairOutcome::Nothing => {}
            PairOutcome::Matched { all: true } => {
                // El tablero completo cuenta como un único acierto lento.
                round.consecutive_correct += 1;
                round.consecutive_incorrect = 0;
                round.player_state =
                    classify_performance(true, round.consecutive_correct, 0, 9999);
                round.score += 1;
                round.last_answer = Some(UserAnswer::Solved(true));
                round.input_disabled = true;
                round.feedback = Some(Feedback {
                    text: positive.to_string(),
                    kind: FeedbackKind::Positive,
                });
                round.pending.push(TimedEvent {
                    at: now + NEXT_QUESTION_DELAY,
                    event: PendingEvent::Advance,
                });
            }
            PairOutcome::Matched { all: false } => {
                round.input_disabled = true;
                round.feedback = Some(Feedback {
                    text: positive.to_string(),
                    kind: FeedbackKind::Positive,
                });
                round.pending.push(TimedEvent {
                    at: now + NEXT_QUESTION_DELAY / 2.0,
                    event: PendingEvent::ClearFeedback,
                });
            }
            PairOutcome::Mismatch => {
                round.input_disabled = true;
                round.feedback = Some(Feedback {
                    text: encouraging.to_string(),
                    kind: FeedbackKind::Encouraging,
                });
                round.pending.push(TimedEvent {
                    at: now + NEXT_QUESTION_DELAY,
                    event: PendingEvent::RevertSelection,
                });
            }
        }
    }

    /// El latido de la ronda: el cronómetro y los eventos aplazados.
    /// La UI lo llama en cada frame con el reloj del contexto.
    pub fn poll_pendientes(&mut self, now: f64) {
        // Tic del cronómetro, solo mientras se juega.
        let mut time_up = false;
        if let Some(round) = self.round.as_mut() {
            if round.status == RoundStatus::Playing {
                if let (Some(next), Some(left)) = (round.next_tick_at, round.time_left) {
                    let mut next = next;
                    let mut left = left;
                    while now >= next && left > 0 {
                        left -= 1;
                        next += 1.0;
                    }
                    round.time_left = Some(left);
                    round.next_tick_at = Some(next);
                    if left == 0 {
                        round.next_tick_at = None;
                        time_up = true;
                    }
                }
            }
        }
        if time_up {
            self.terminar_ronda(true, now);
        }

        // Eventos aplazados, en orden de vencimiento.
        loop {
            let event = {
                let Some(round) = self.round.as_mut() else {
                    return;
                };
                let mut due: Option<usize> = None;
                for (i, e) in round.pending.iter().enumerate() {
                    if e.at <= now && due.map(|j| e.at < round.pending[j].at).unwrap_or(true) {
                        due = Some(i);
                    }
                }
                due.map(|i| round.pending.remove(i).event)
            };
            let Some(event) = event else { break };

            match event {
                PendingEvent::Advance => self.avanzar_pregunta(now),
                PendingEvent::ClearFeedback => {
                    if let Some(round) = self.round.as_mut() {
                        round.feedback = None;
                        round.input_disabled = false;
                    }
                }
                PendingEvent::RevertSelection => {
                    if let Some(round) = self.round.as_mut() {
                        if let Some(question) = round.current_question_mut() {
                            if let QuestionKind::MatchingPairs(mq) = &mut question.kind {
                                for it in mq.items.iter_mut() {
                                    it.is_selected = false;
                                }
                            }
                        }
                        round.feedback = None;
                        round.input_disabled = false;
                    }
                }
                PendingEvent::ShowSummary => self.mostrar_resumen(),
            }
        }
    }

    /// Cierra la ronda. Con tiempo agotado enseña primero el cartel y
    /// aplaza el resumen; si no, va directa al resumen.
    fn terminar_ronda(&mut self, time_up: bool, now: f64) {
        {
            let Some(round) = self.round.as_mut() else {
                return;
            };
            if round.status == RoundStatus::Ended
                && (round.show_end_overlay || round.show_times_up_overlay)
            {
                return;
            }
            round.status = RoundStatus::Ended;
            round.ended_by_timeout = time_up;
            round.next_tick_at = None;

            if time_up {
                round.show_times_up_overlay = true;
                round.pending.push(TimedEvent {
                    at: now + TIMES_UP_OVERLAY_SECS,
                    event: PendingEvent::ShowSummary,
                });
                return;
            }
        }
        self.mostrar_resumen();
    }

    /// Calcula estrellas y mensaje, y abre el resumen de fin de ronda.
    fn mostrar_resumen(&mut self) {
        let (score, target, time_up, total, left) = {
            let Some(round) = self.round.as_ref() else {
                return;
            };
            (
                round.score,
                round.num_questions_target,
                round.ended_by_timeout,
                round.total_time,
                round.time_left,
            )
        };
        let time_taken = if time_up {
            total
        } else {
            total.zip(left).map(|(t, l)| t - l)
        };
        let stars = completion::calculate_stars(score, target);
        let message = completion::end_game_message(score, target, time_up, time_taken, &mut self.rng);

        let round = self.round.as_mut().expect("round vivo");
        round.show_times_up_overlay = false;
        round.stars_earned = stars;
        round.end_message = Some(message);
        round.show_end_overlay = true;
        round.status = RoundStatus::Ended;
    }

    /// El "vale" del resumen: vuelca la ronda al perfil persistido y
    /// devuelve al menú.
    pub fn confirmar_fin_de_ronda(&mut self) {
        self.aplicar_resultados_de_ronda();
        self.round = None;
        self.state = AppState::Menu;
    }

    /// Salir a mitad de ronda descarta todo su estado, firmas incluidas.
    pub fn abandonar_ronda(&mut self) {
        self.round = None;
        self.state = AppState::Menu;
        self.message.clear();
    }

    pub fn ver_repaso(&mut self) {
        self.state = AppState::Review;
        self.message.clear();
    }

    pub fn volver_al_menu(&mut self) {
        self.state = AppState::Menu;
        self.message.clear();
    }
}
