//! Constantes de juego: tamaños de ronda, tiempos y frases para el niño.

use crate::model::DifficultyLevel;

pub const NUM_QUESTIONS_PER_ROUND: usize = 30;
pub const ADAPTIVE_ROUND_LENGTH: usize = 30;
pub const VISUAL_PATTERN_QUESTIONS_MAM: usize = 10;
pub const VISUAL_PATTERN_QUESTIONS_CHOI: usize = 15;
pub const ODD_ONE_OUT_QUESTIONS_MAM: usize = 10;
pub const ODD_ONE_OUT_QUESTIONS_CHOI: usize = 15;
pub const NUMBER_SEQUENCE_QUESTIONS_MAM: usize = 10;
pub const NUMBER_SEQUENCE_QUESTIONS_CHOI: usize = 15;
pub const COMPREHENSIVE_CHALLENGE_QUESTIONS: usize = 15;
pub const COMPREHENSIVE_CHALLENGE_TIME_MAM: u32 = 150; // 2,5 minutos
pub const COMPREHENSIVE_CHALLENGE_TIME_CHOI: u32 = 120; // 2 minutos
pub const MIXED_MATH_CHALLENGE_QUESTIONS: usize = 30;

/// Máximo de preguntas con cero por ronda en los modos numéricos.
pub const ZERO_LIMIT: u32 = 2;
/// Mínimo de comparaciones con resultado "=" por ronda.
pub const NUM_EQUALS_IN_COMPARISON_ROUND: usize = 5;

pub const MAX_SESSIONS_TO_STORE: usize = 3;
/// Historial largo de iconos ya vistos, para variar entre sesiones.
pub const MAX_MASTER_ICONS_TO_STORE: usize = 400;

/// Pausa entre la respuesta y la siguiente pregunta, en segundos.
pub const NEXT_QUESTION_DELAY: f64 = 1.0;
pub const SLOW_NEXT_QUESTION_DELAY: f64 = 2.0;
/// Duración del cartel de "se acabó el tiempo" antes del resumen.
pub const TIMES_UP_OVERLAY_SECS: f64 = 2.0;

pub fn round_length(mode: crate::model::GameMode, difficulty: DifficultyLevel) -> usize {
    use crate::model::GameMode::*;
    let mam = difficulty == DifficultyLevel::Mam;
    match mode {
        VisualPattern => {
            if mam {
                VISUAL_PATTERN_QUESTIONS_MAM
            } else {
                VISUAL_PATTERN_QUESTIONS_CHOI
            }
        }
        OddOneOut => {
            if mam {
                ODD_ONE_OUT_QUESTIONS_MAM
            } else {
                ODD_ONE_OUT_QUESTIONS_CHOI
            }
        }
        NumberSequence => {
            if mam {
                NUMBER_SEQUENCE_QUESTIONS_MAM
            } else {
                NUMBER_SEQUENCE_QUESTIONS_CHOI
            }
        }
        ComprehensiveChallenge => COMPREHENSIVE_CHALLENGE_QUESTIONS,
        MixedMathChallenge => MIXED_MATH_CHALLENGE_QUESTIONS,
        Addition | Subtraction => ADAPTIVE_ROUND_LENGTH,
        _ => NUM_QUESTIONS_PER_ROUND,
    }
}

pub fn time_limit(mode: crate::model::GameMode, difficulty: DifficultyLevel) -> Option<u32> {
    if mode.is_timed() {
        Some(match difficulty {
            DifficultyLevel::Mam => COMPREHENSIVE_CHALLENGE_TIME_MAM,
            DifficultyLevel::Choi => COMPREHENSIVE_CHALLENGE_TIME_CHOI,
        })
    } else {
        None
    }
}

// =====================================================================
// Frases y emojis (en vietnamita, como todo lo que ve el niño)
// =====================================================================

pub const POSITIVE_FEEDBACKS: &[&str] = &[
    "TUYỆT VỜI!",
    "GIỎI QUÁ!",
    "XUẤT SẮC!",
    "CHUẨN LUÔN!",
    "QUÁ ĐỈNH!",
    "BÉ LÀM TỐT LẮM!",
    "ĐÚNG RỒI ĐÓ BÉ!",
];

pub const ENCOURAGING_FEEDBACKS: &[&str] = &[
    "BÉ HÃY SUY NGHĨ KỸ HƠN!",
    "CỐ LÊN NÀO BÉ!",
    "THỬ LẠI NHÉ!",
    "SUÝT ĐÚNG RỒI!",
    "ĐỪNG NẢN LÒNG, BÉ CỐ GẮNG NHÉ!",
    "SAI MỘT CHÚT THÔI!",
];

pub const POSITIVE_FEEDBACK_EMOJIS: &[&str] = &[
    "🥳", "🤩", "🎉", "👍", "🌟", "💖", "💫", "🎈", "💯", "✨", "✔️", "🏆", "🥇", "🏅",
];

pub const ENCOURAGING_FEEDBACK_EMOJIS: &[&str] =
    &["🤔", "🧐", "💡", "💪", "🌱", "➡️", "🚀", "👀", "✏️", "🧠"];

pub const CONGRATS_MESSAGES: &[&str] = &[
    "Xuất sắc! Bé thật là siêu!",
    "Tuyệt vời! Bé đã làm rất tốt!",
    "Giỏi quá! Bé là một thiên tài toán học!",
    "Hoàn thành xuất sắc! Tiếp tục phát huy nhé!",
    "Chúc mừng bé đã chinh phục thử thách!",
];

pub const CONGRATS_ICONS: &[&str] = &["🎉", "🥳", "🌟", "🏆", "🥇", "🎈", "✨", "🤩", "💯"];

pub const ENCOURAGE_TRY_AGAIN_MESSAGE: &str = "Bé hãy cố gắng thêm ở lần sau nhé!";
pub const TIMES_UP_MESSAGE: &str = "Hết giờ rồi! Cố gắng hơn lần sau nhé!";
pub const ENCOURAGE_TRY_AGAIN_ICONS: &[&str] = &["💪", "👍", "💡", "🌱", "😊", "🤔"];

/// Frases que el compositor asigna a las preguntas que vienen de la IA.
pub const ODD_ONE_OUT_PROMPTS: &[&str] = &[
    "Tìm vật khác biệt với những vật còn lại:",
    "Vật nào không cùng nhóm với các bạn khác?",
    "Trong các hình sau, có một hình bị lạc loài, đó là hình nào?",
    "Bé hãy tìm ra một vật không giống với những vật kia nhé.",
    "Có một vật không thuộc nhóm này, bé có biết là vật nào không?",
];

pub const VISUAL_PATTERN_PROMPTS: &[&str] = &[
    "Hình nào tiếp theo trong dãy?",
    "Tìm hình tiếp theo để hoàn thành dãy.",
    "Quy luật của dãy này là gì? Hãy chọn hình đúng.",
    "Bé hãy tìm hình còn thiếu nhé.",
    "Điền hình đúng vào dấu chấm hỏi.",
];
