use serde::{Deserialize, Serialize};

/// Un icono es simplemente su emoji.
pub type Icon = String;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameMode {
    Addition,
    Subtraction,
    Comparison,
    Counting,
    NumberRecognition,
    MatchingPairs,
    NumberSequence,
    VisualPattern,
    OddOneOut,
    ComprehensiveChallenge,
    MixedMathChallenge,
}

impl GameMode {
    /// Título que ve el niño en el menú y la cabecera.
    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Addition => "PHÉP CỘNG (+)",
            GameMode::Subtraction => "PHÉP TRỪ (-)",
            GameMode::Comparison => "SO SÁNH (<, >, =)",
            GameMode::Counting => "ĐẾM HÌNH",
            GameMode::NumberRecognition => "NHẬN BIẾT SỐ",
            GameMode::MatchingPairs => "TÌM CẶP TƯƠNG ỨNG",
            GameMode::NumberSequence => "HOÀN THIỆN DÃY SỐ",
            GameMode::VisualPattern => "TÌM QUY LUẬT HÌNH ẢNH",
            GameMode::OddOneOut => "TÌM VẬT KHÁC BIỆT",
            GameMode::ComprehensiveChallenge => "THỬ THÁCH TỔNG HỢP",
            GameMode::MixedMathChallenge => "CÂU HỎI TỔNG HỢP",
        }
    }

    /// Modos que piden las preguntas de una en una según el rendimiento.
    pub fn is_adaptive(&self) -> bool {
        matches!(self, GameMode::Addition | GameMode::Subtraction)
    }

    /// Modos sujetos al tope de ceros por ronda.
    pub fn is_zero_limited(&self) -> bool {
        matches!(
            self,
            GameMode::Addition
                | GameMode::Subtraction
                | GameMode::Comparison
                | GameMode::MixedMathChallenge
        )
    }

    /// Modos cuyo lote de preguntas genera una fuente externa (IA).
    pub fn is_ai_mode(&self) -> bool {
        matches!(self, GameMode::VisualPattern | GameMode::OddOneOut)
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, GameMode::ComprehensiveChallenge)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DifficultyLevel {
    /// Mầm, 3-4 años: números hasta 10.
    Mam,
    /// Chồi, 4-5 años: números hasta 20 (30 en comparaciones).
    Choi,
}

impl DifficultyLevel {
    pub fn title(&self) -> &'static str {
        match self {
            DifficultyLevel::Mam => "Mầm (3-4 tuổi)",
            DifficultyLevel::Choi => "Chồi (4-5 tuổi)",
        }
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Mam
    }
}

// =====================================================================
// Estado adaptativo
// =====================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlayerPerformanceState {
    /// Estado inicial o tras un fallo aislado.
    Neutral,
    /// Responde bien y rápido, listo para un reto.
    Flowing,
    /// Responde bien pero despacio, está afianzando.
    Consolidating,
    /// Encadena fallos.
    Struggling,
    /// Falla y responde demasiado rápido: está adivinando.
    Guessing,
}

impl Default for PlayerPerformanceState {
    fn default() -> Self {
        PlayerPerformanceState::Neutral
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionRequestType {
    Standard,
    Challenge,
    Booster,
}

// =====================================================================
// Preguntas
// =====================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Plus,
    Minus,
}

impl MathOperator {
    pub fn symbol(&self) -> char {
        match self {
            MathOperator::Plus => '+',
            MathOperator::Minus => '-',
        }
    }

    pub fn apply(&self, a: i32, b: i32) -> i32 {
        match self {
            MathOperator::Plus => a + b,
            MathOperator::Minus => a - b,
        }
    }
}

/// Hueco desconocido en una pregunta de suma/resta estándar.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnknownSlot {
    Operand1,
    Operand2,
    Result,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NumberOption {
    pub id: String,
    pub value: i32,
    pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum MathVariant {
    /// Rellenar el hueco: `a + b = ?` (o el hueco en un operando).
    Standard {
        operand1: i32,
        operand2: i32,
        result: i32,
        unknown: UnknownSlot,
        answer: i32,
    },
    /// Equilibrar: `a op b = c op ?`.
    Balancing {
        operand1: i32,
        operand2: i32,
        operand3: i32,
        answer: i32,
    },
    /// Tres opciones, una correcta y dos distractores a ±1/±2.
    MultipleChoice {
        operand1: i32,
        operand2: i32,
        options: Vec<NumberOption>,
        answer: i32,
    },
    /// Se muestra un resultado que puede estar perturbado a ±1/±2.
    TrueFalse {
        operand1: i32,
        operand2: i32,
        displayed_result: i32,
        answer: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MathQuestion {
    pub operator: MathOperator,
    pub variant: MathVariant,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CmpSign {
    Less,
    Greater,
    Equal,
}

impl CmpSign {
    pub fn symbol(&self) -> char {
        match self {
            CmpSign::Less => '<',
            CmpSign::Greater => '>',
            CmpSign::Equal => '=',
        }
    }

    pub fn of(a: i32, b: i32) -> CmpSign {
        if a < b {
            CmpSign::Less
        } else if a > b {
            CmpSign::Greater
        } else {
            CmpSign::Equal
        }
    }
}

/// En qué lado del signo va la expresión `a op b`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpressionSide {
    Left,
    Right,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ComparisonVariant {
    /// `a ? b` con el signo por decidir.
    Standard {
        number1: i32,
        number2: i32,
        answer: CmpSign,
    },
    /// `a op b ? c`, con la expresión a la izquierda o a la derecha.
    Expression {
        operand1: i32,
        operand2: i32,
        operator: MathOperator,
        compare_to: i32,
        answer: CmpSign,
        side: ExpressionSide,
    },
    /// Se muestra un signo que puede ser falso.
    TrueFalse {
        number1: i32,
        number2: i32,
        displayed: CmpSign,
        answer: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountingQuestion {
    pub icon: Icon,
    pub count: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum RecognitionDisplay {
    /// Un grupo de `count` iconos iguales.
    Items { icon: Icon, count: i32 },
    /// Un número escrito.
    Number(i32),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecognitionOption {
    pub id: String,
    pub display: RecognitionDisplay,
    pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum RecognitionVariant {
    /// "Busca el grupo con N iconos".
    NumberToItems { target: i32, icon: Icon },
    /// "¿Cuántos iconos hay?": se enseña el grupo y se elige el número.
    ItemsToNumber { target: i32, icon: Icon },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NumberRecognitionQuestion {
    pub variant: RecognitionVariant,
    pub options: Vec<RecognitionOption>,
}

/// Cara visible de una carta del modo de parejas.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CardFace {
    Digit(i32),
    IconGroup { icon: Icon, count: i32 },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchableItem {
    pub id: String,
    /// Las dos cartas de una pareja comparten este id.
    pub match_id: String,
    pub face: CardFace,
    pub is_matched: bool,
    pub is_selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchingPairsQuestion {
    pub items: Vec<MatchableItem>,
}

impl MatchingPairsQuestion {
    pub fn all_matched(&self) -> bool {
        self.items.iter().all(|it| it.is_matched)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SequenceTheme {
    Train,
    Steps,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RuleOption {
    pub display: String,
    pub step: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum SequenceKind {
    /// Progresión con huecos. Los dos primeros puestos nunca se tapan
    /// para que la regla quede a la vista.
    FillBlanks {
        full_sequence: Vec<i32>,
        step: i32,
        sequence: Vec<Option<i32>>,
        answers: Vec<i32>,
        rule_options: Vec<RuleOption>,
    },
    /// Una progresión con exactamente un valor mal puesto a partir del
    /// índice 3, para que la regla ya esté establecida antes del error.
    RuleDetective {
        full_sequence: Vec<i32>,
        step: i32,
        with_errors: Vec<i32>,
        /// Pares (índice, valor correcto).
        errors: Vec<(usize, i32)>,
        rule_options: Vec<RuleOption>,
    },
    /// Ordenar un puñado de números desordenados.
    Sort {
        scrambled: Vec<i32>,
        sorted: Vec<i32>,
        order: SortOrder,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NumberSequenceQuestion {
    pub theme: SequenceTheme,
    pub kind: SequenceKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternOption {
    pub id: String,
    pub emoji: Icon,
    pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisualPatternQuestion {
    pub displayed_sequence: Vec<Icon>,
    pub options: Vec<PatternOption>,
    pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OddOption {
    pub id: String,
    pub emoji: Icon,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OddOneOutQuestion {
    pub options: Vec<OddOption>,
    pub correct_answer_id: String,
    pub explanation: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum QuestionKind {
    Math(MathQuestion),
    Comparison(ComparisonVariant),
    Counting(CountingQuestion),
    NumberRecognition(NumberRecognitionQuestion),
    MatchingPairs(MatchingPairsQuestion),
    NumberSequence(NumberSequenceQuestion),
    VisualPattern(VisualPatternQuestion),
    OddOneOut(OddOneOutQuestion),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    /// ¿Aparece un cero entre los valores que definen la pregunta?
    /// Solo cuentan los modos numéricos; los modos de iconos nunca lo usan.
    pub fn contains_zero(&self) -> bool {
        match &self.kind {
            QuestionKind::Math(mq) => match &mq.variant {
                MathVariant::Standard {
                    operand1,
                    operand2,
                    result,
                    ..
                } => [*operand1, *operand2, *result].contains(&0),
                MathVariant::Balancing {
                    operand1,
                    operand2,
                    operand3,
                    answer,
                } => [*operand1, *operand2, *operand3, *answer].contains(&0),
                MathVariant::MultipleChoice {
                    operand1,
                    operand2,
                    options,
                    answer,
                } => {
                    [*operand1, *operand2, *answer].contains(&0)
                        || options.iter().any(|o| o.value == 0)
                }
                MathVariant::TrueFalse {
                    operand1,
                    operand2,
                    displayed_result,
                    ..
                } => [*operand1, *operand2, *displayed_result].contains(&0),
            },
            QuestionKind::Comparison(cv) => match cv {
                ComparisonVariant::Standard {
                    number1, number2, ..
                } => [*number1, *number2].contains(&0),
                ComparisonVariant::Expression {
                    operand1,
                    operand2,
                    compare_to,
                    ..
                } => [*operand1, *operand2, *compare_to].contains(&0),
                ComparisonVariant::TrueFalse {
                    number1, number2, ..
                } => [*number1, *number2].contains(&0),
            },
            _ => false,
        }
    }

    /// ¿La respuesta correcta de esta comparación es el signo igual?
    pub fn is_equals_comparison(&self) -> bool {
        match &self.kind {
            QuestionKind::Comparison(ComparisonVariant::Standard { answer, .. })
            | QuestionKind::Comparison(ComparisonVariant::Expression { answer, .. }) => {
                *answer == CmpSign::Equal
            }
            _ => false,
        }
    }

    /// Comprueba una respuesta del jugador. Las parejas no pasan por aquí:
    /// se resuelven carta a carta en la ronda.
    pub fn check_answer(&self, answer: &UserAnswer) -> bool {
        match (&self.kind, answer) {
            (QuestionKind::Math(mq), ans) => match (&mq.variant, ans) {
                (MathVariant::Standard { answer, .. }, UserAnswer::Number(n)) => n == answer,
                (MathVariant::Balancing { answer, .. }, UserAnswer::Number(n)) => n == answer,
                (MathVariant::MultipleChoice { options, .. }, UserAnswer::Choice(id)) => options
                    .iter()
                    .find(|o| &o.id == id)
                    .map(|o| o.is_correct)
                    .unwrap_or(false),
                (MathVariant::TrueFalse { answer, .. }, UserAnswer::Bool(b)) => b == answer,
                _ => false,
            },
            (QuestionKind::Comparison(cv), ans) => match (cv, ans) {
                (ComparisonVariant::Standard { answer, .. }, UserAnswer::Sign(s)) => s == answer,
                (ComparisonVariant::Expression { answer, .. }, UserAnswer::Sign(s)) => s == answer,
                (ComparisonVariant::TrueFalse { answer, .. }, UserAnswer::Bool(b)) => b == answer,
                _ => false,
            },
            (QuestionKind::Counting(cq), UserAnswer::Number(n)) => *n == cq.count,
            (QuestionKind::NumberRecognition(rq), UserAnswer::Choice(id)) => rq
                .options
                .iter()
                .find(|o| &o.id == id)
                .map(|o| o.is_correct)
                .unwrap_or(false),
            (QuestionKind::NumberSequence(sq), ans) => match (&sq.kind, ans) {
                // Las variantes interactivas validan paso a paso en la vista
                // y solo comunican el desenlace.
                (SequenceKind::FillBlanks { .. }, UserAnswer::Solved(ok)) => *ok,
                (SequenceKind::RuleDetective { .. }, UserAnswer::Solved(ok)) => *ok,
                (SequenceKind::Sort { sorted, .. }, UserAnswer::Ordering(seq)) => seq == sorted,
                _ => false,
            },
            (QuestionKind::VisualPattern(vq), UserAnswer::Choice(id)) => vq
                .options
                .iter()
                .find(|o| &o.id == id)
                .map(|o| o.is_correct)
                .unwrap_or(false),
            (QuestionKind::OddOneOut(oq), UserAnswer::Choice(id)) => &oq.correct_answer_id == id,
            _ => false,
        }
    }
}

// =====================================================================
// Respuestas y sesiones
// =====================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum UserAnswer {
    Number(i32),
    Bool(bool),
    /// Id de la opción elegida (opción múltiple, reconocimiento, IA).
    Choice(String),
    Sign(CmpSign),
    /// Orden propuesto para una secuencia desordenada.
    Ordering(Vec<i32>),
    /// Desenlace de las variantes interactivas de secuencias.
    Solved(bool),
}

impl std::fmt::Display for UserAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserAnswer::Number(n) => write!(f, "{n}"),
            UserAnswer::Bool(true) => write!(f, "Đúng"),
            UserAnswer::Bool(false) => write!(f, "Sai"),
            UserAnswer::Choice(id) => write!(f, "{id}"),
            UserAnswer::Sign(s) => write!(f, "{}", s.symbol()),
            UserAnswer::Ordering(seq) => {
                let parts: Vec<String> = seq.iter().map(|n| n.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            UserAnswer::Solved(true) => write!(f, "✔"),
            UserAnswer::Solved(false) => write!(f, "✘"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncorrectAttempt {
    pub question: Question,
    pub user_answer: UserAnswer,
}

/// Resumen de una ronda jugada, para la pantalla de repaso.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub id: String,
    pub incorrect_attempts: Vec<IncorrectAttempt>,
    pub score: u32,
    pub total_questions: usize,
    pub difficulty: DifficultyLevel,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EndMessageKind {
    Congrats,
    Encourage,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndGameMessage {
    pub text: String,
    pub kind: EndMessageKind,
    pub icons: Vec<Icon>,
    /// Segundos empleados, solo en el modo contrarreloj.
    pub time_taken: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_math(o1: i32, o2: i32) -> Question {
        Question {
            id: "t1".into(),
            mode: GameMode::Addition,
            difficulty: DifficultyLevel::Mam,
            prompt: String::new(),
            kind: QuestionKind::Math(MathQuestion {
                operator: MathOperator::Plus,
                variant: MathVariant::Standard {
                    operand1: o1,
                    operand2: o2,
                    result: o1 + o2,
                    unknown: UnknownSlot::Result,
                    answer: o1 + o2,
                },
            }),
        }
    }

    #[test]
    fn contains_zero_detecta_operandos_y_resultado() {
        assert!(standard_math(0, 5).contains_zero());
        assert!(standard_math(5, 0).contains_zero());
        assert!(!standard_math(2, 3).contains_zero());
        // 5 - 5 = 0 también cuenta
        let q = Question {
            kind: QuestionKind::Math(MathQuestion {
                operator: MathOperator::Minus,
                variant: MathVariant::Standard {
                    operand1: 5,
                    operand2: 5,
                    result: 0,
                    unknown: UnknownSlot::Result,
                    answer: 0,
                },
            }),
            ..standard_math(1, 1)
        };
        assert!(q.contains_zero());
    }

    #[test]
    fn check_answer_por_tipo() {
        let q = standard_math(3, 4);
        assert!(q.check_answer(&UserAnswer::Number(7)));
        assert!(!q.check_answer(&UserAnswer::Number(8)));
        assert!(!q.check_answer(&UserAnswer::Bool(true)));

        let cmp = Question {
            kind: QuestionKind::Comparison(ComparisonVariant::Standard {
                number1: 2,
                number2: 5,
                answer: CmpSign::Less,
            }),
            ..standard_math(1, 1)
        };
        assert!(cmp.check_answer(&UserAnswer::Sign(CmpSign::Less)));
        assert!(!cmp.check_answer(&UserAnswer::Sign(CmpSign::Equal)));

        let sort = Question {
            kind: QuestionKind::NumberSequence(NumberSequenceQuestion {
                theme: SequenceTheme::Train,
                kind: SequenceKind::Sort {
                    scrambled: vec![3, 1, 2],
                    sorted: vec![1, 2, 3],
                    order: SortOrder::Asc,
                },
            }),
            ..standard_math(1, 1)
        };
        assert!(sort.check_answer(&UserAnswer::Ordering(vec![1, 2, 3])));
        assert!(!sort.check_answer(&UserAnswer::Ordering(vec![3, 2, 1])));
    }
}
