use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::IconBank;
use crate::model::{
    DifficultyLevel, EndGameMessage, GameMode, Icon, IncorrectAttempt, PlayerPerformanceState,
    Question, StoredSession, UserAnswer,
};
use crate::round::{AiQuestionSource, GenerationContext};

// Submódulos
pub mod actions;
pub mod completion;
pub mod performance;
pub mod progress;
pub mod queries;

/// Pantalla activa.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Menu,
    Game,
    Review,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Menu
    }
}

/// Ciclo de vida de una ronda: cuenta atrás (solo el modo contrarreloj),
/// jugando, terminada.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundStatus {
    Countdown,
    Playing,
    Ended,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FeedbackKind {
    Positive,
    Encouraging,
}

#[derive(Clone, Debug)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

/// Lo que en la web eran setTimeout: acciones aplazadas que la ronda
/// ejecuta cuando les llega la hora, sondeadas desde el bucle de la UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingEvent {
    /// Pasar a la siguiente pregunta tras enseñar el feedback.
    Advance,
    ClearFeedback,
    /// Deshacer la selección de una pareja fallida.
    RevertSelection,
    /// Quitar el cartel de "se acabó el tiempo" y abrir el resumen.
    ShowSummary,
}

#[derive(Clone, Copy, Debug)]
pub struct TimedEvent {
    pub at: f64,
    pub event: PendingEvent,
}

/// Todo el estado de una ronda en curso. Nace al pulsar un modo en el
/// menú y muere al confirmar el resumen; nada de aquí se persiste.
pub struct RoundState {
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    /// Fija en los modos de lote; crece de una en una en los adaptativos.
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: u32,
    pub stars_earned: u32,
    pub incorrect_attempts: Vec<IncorrectAttempt>,
    pub feedback: Option<Feedback>,
    pub input_disabled: bool,
    pub last_answer: Option<UserAnswer>,
    pub show_end_overlay: bool,
    pub show_times_up_overlay: bool,
    pub ended_by_timeout: bool,
    pub end_message: Option<EndGameMessage>,
    pub num_questions_target: usize,
    pub icons_used: HashSet<Icon>,
    pub status: RoundStatus,
    pub time_left: Option<u32>,
    pub total_time: Option<u32>,
    // Estado adaptativo
    pub player_state: PlayerPerformanceState,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    /// Reloj de la pregunta actual, en segundos del contexto de egui.
    pub question_start: f64,
    pub zeros_used: u32,
    /// El arena de generación de la ronda: firmas e iconos consumidos.
    pub r#gen: GenerationContext,
    pub pending: Vec<TimedEvent>,
    pub next_tick_at: Option<f64>,
    // Borradores de la vista para la pregunta actual
    pub input: String,
    pub blank_inputs: Vec<String>,
    pub sort_picked: Vec<i32>,
    pub detective_pick: Option<usize>,
}

impl RoundState {
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_question_mut(&mut self) -> Option<&mut Question> {
        let idx = self.current_index;
        self.questions.get_mut(idx)
    }

    /// Deja los borradores de la vista a juego con la pregunta actual.
    pub fn reset_view_scratch(&mut self) {
        use crate::model::{QuestionKind, SequenceKind};
        let blanks = match self.current_question().map(|q| &q.kind) {
            Some(QuestionKind::NumberSequence(sq)) => match &sq.kind {
                SequenceKind::FillBlanks { answers, .. } => answers.len(),
                _ => 0,
            },
            _ => 0,
        };
        self.input.clear();
        self.blank_inputs = vec![String::new(); blanks];
        self.sort_picked.clear();
        self.detective_pick = None;
    }
}

fn default_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// El estado raíz. El perfil del jugador (estrellas, colecciones,
/// historial de iconos, sesiones de repaso) se serializa con eframe;
/// el resto se reconstruye en cada arranque.
#[derive(Serialize, Deserialize)]
pub struct GameApp {
    pub difficulty: DifficultyLevel,
    pub total_stars: u32,
    pub unlocked_set_ids: Vec<String>,
    /// Historial largo de iconos vistos, del más reciente al más antiguo.
    pub master_used_icons: Vec<Icon>,
    pub stored_sessions: Vec<StoredSession>,
    pub rounds_played: u32,
    #[serde(skip)]
    pub state: AppState,
    #[serde(skip)]
    pub round: Option<RoundState>,
    #[serde(skip)]
    pub bank: IconBank,
    #[serde(skip, default = "default_rng")]
    pub rng: StdRng,
    #[serde(skip)]
    pub message: String,
    #[serde(skip)]
    pub confirm_reset: bool,
    #[serde(skip)]
    pub ai_source: Option<Box<dyn AiQuestionSource>>,
}

impl GameApp {
    pub fn new() -> Self {
        Self {
            difficulty: DifficultyLevel::Mam,
            total_stars: 0,
            unlocked_set_ids: Vec::new(),
            master_used_icons: Vec::new(),
            stored_sessions: Vec::new(),
            rounds_played: 0,
            state: AppState::Menu,
            round: None,
            bank: IconBank::default(),
            rng: default_rng(),
            message: String::new(),
            confirm_reset: false,
            ai_source: None,
        }
    }

    pub fn seleccionar_dificultad(&mut self, difficulty: DifficultyLevel) {
        self.difficulty = difficulty;
        self.message.clear();
    }

    /// Conecta una fuente de preguntas de IA; sin ella, los dos modos
    /// que dependen de ella no aparecen en el menú.
    pub fn con_fuente_ia(mut self, source: Box<dyn AiQuestionSource>) -> Self {
        self.ai_source = Some(source);
        self
    }

    /// Borra todo el progreso del jugador y vuelve al menú.
    pub fn reset_progress(&mut self) {
        let ai_source = self.ai_source.take();
        *self = GameApp::new();
        self.ai_source = ai_source;
        self.confirm_reset = false;
    }
}

impl Default for GameApp {
    fn default() -> Self {
        GameApp::new()
    }
}
