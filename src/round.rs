//! El compositor de rondas: reparte el trabajo entre los generadores,
//! vigila el tope de ceros y el suelo de igualdades, y da forma a las
//! peticiones para la fuente de preguntas de IA.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    COMPREHENSIVE_CHALLENGE_QUESTIONS, NUM_EQUALS_IN_COMPARISON_ROUND, ODD_ONE_OUT_PROMPTS,
    VISUAL_PATTERN_PROMPTS, ZERO_LIMIT,
};
use crate::data::{IconBank, IconData};
use crate::generators::{
    declump_equals, generate_addition_question, generate_comparison_question,
    generate_comparison_round_choi, generate_counting_question,
    generate_equals_comparison_question, generate_matching_pairs_question,
    generate_number_recognition_question, generate_number_sequence_question,
    generate_subtraction_question, ComparisonGenOptions, MathGenOptions,
};
use crate::model::{DifficultyLevel, GameMode, Icon, Question, QuestionRequestType};
use crate::question_utils::{shuffled, GenError, GenResult, SignatureSet};

const MAX_ATTEMPTS_PER_QUESTION: u32 = 20;
const MAX_SLOT_ATTEMPTS: u32 = 10;

/// El "arena" de una ronda: firmas e iconos consumidos viven aquí y
/// mueren con la ronda. Nada de esto se persiste.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationContext {
    pub signatures: SignatureSet,
    pub base_icons: Vec<Icon>,
    /// Historial largo del jugador, del más reciente al más antiguo.
    pub recent_icons: Vec<Icon>,
    pub icons_used_cycle: HashSet<Icon>,
    pub icons_used_mode_cycle: HashSet<Icon>,
}

impl GenerationContext {
    pub fn new(bank: &IconBank, unlocked_ids: &[String], master_used_icons: &[Icon]) -> Self {
        Self {
            signatures: SignatureSet::new(),
            base_icons: bank.base_unlocked_icons(unlocked_ids),
            recent_icons: master_used_icons.to_vec(),
            icons_used_cycle: HashSet::new(),
            icons_used_mode_cycle: HashSet::new(),
        }
    }
}

// =====================================================================
// Frontera con la fuente de preguntas de IA
// =====================================================================

#[derive(Clone, Debug)]
pub struct AiBatchRequest {
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    pub num_questions: usize,
    pub available_icons: Vec<IconData>,
    /// Iconos de inclusión obligatoria, elegidos por frescura.
    pub seed_icons: Vec<IconData>,
}

#[derive(Clone, Debug, Default)]
pub struct AiBatch {
    pub questions: Vec<Question>,
    pub icons_used: Vec<Icon>,
}

/// Quien sepa fabricar lotes de "busca el diferente" y "quy luật hình
/// ảnh" se conecta por aquí. El compositor solo da forma a la petición
/// y retoca la respuesta.
pub trait AiQuestionSource {
    fn generate_batch(
        &mut self,
        request: &AiBatchRequest,
    ) -> Result<AiBatch, Box<dyn std::error::Error>>;
}

/// Elige los iconos semilla del lote: primero los nunca vistos, luego
/// los menos recientes, y al azar si aun así faltan.
pub fn seed_icons_for_batch(
    all_icons: &[IconData],
    master_used_icons: &[Icon],
    count: usize,
    rng: &mut StdRng,
) -> Vec<IconData> {
    let used: HashSet<&str> = master_used_icons.iter().map(|i| i.as_str()).collect();

    let fresh: Vec<IconData> = all_icons
        .iter()
        .filter(|d| !used.contains(d.emoji.as_str()))
        .cloned()
        .collect();
    if fresh.len() >= count {
        let mut picked = shuffled(&fresh, rng);
        picked.truncate(count);
        return picked;
    }

    let mut seeded = fresh;
    // El historial guarda el más reciente primero: recorrido al revés
    // para empezar por el menos reciente.
    for used_emoji in master_used_icons.iter().rev() {
        if seeded.len() >= count {
            break;
        }
        if let Some(data) = all_icons.iter().find(|d| &d.emoji == used_emoji) {
            if !seeded.iter().any(|s| s.emoji == data.emoji) {
                seeded.push(data.clone());
            }
        }
    }

    if seeded.len() < count {
        let remaining: Vec<IconData> = all_icons
            .iter()
            .filter(|d| !seeded.iter().any(|s| s.emoji == d.emoji))
            .cloned()
            .collect();
        let mut filler = shuffled(&remaining, rng);
        filler.truncate(count - seeded.len());
        seeded.extend(filler);
    }

    shuffled(&seeded, rng)
}

// =====================================================================
// Generación de una pregunta
// =====================================================================

/// Una pregunta del modo pedido, reintentando hasta veinte veces si el
/// generador se atasca. Los modos de IA y los compuestos no pasan por
/// aquí como tales, solo sus submodos.
pub fn generate_single_question(
    mode: GameMode,
    difficulty: DifficultyLevel,
    request_type: QuestionRequestType,
    allow_zero: bool,
    ctx: &mut GenerationContext,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS_PER_QUESTION {
        let result = match mode {
            GameMode::Addition => generate_addition_question(
                difficulty,
                &mut ctx.signatures,
                MathGenOptions {
                    request_type,
                    allow_zero,
                },
                rng,
            ),
            GameMode::Subtraction => generate_subtraction_question(
                difficulty,
                &mut ctx.signatures,
                MathGenOptions {
                    request_type,
                    allow_zero,
                },
                rng,
            ),
            GameMode::Comparison => generate_comparison_question(
                difficulty,
                &mut ctx.signatures,
                ComparisonGenOptions {
                    request_type,
                    allow_zero,
                    ..Default::default()
                },
                rng,
            ),
            GameMode::Counting => generate_counting_question(
                difficulty,
                &mut ctx.signatures,
                &ctx.base_icons,
                &ctx.recent_icons,
                &mut ctx.icons_used_cycle,
                rng,
            ),
            GameMode::NumberRecognition => generate_number_recognition_question(
                difficulty,
                &mut ctx.signatures,
                &ctx.base_icons,
                &ctx.recent_icons,
                &mut ctx.icons_used_cycle,
                &mut ctx.icons_used_mode_cycle,
                rng,
            ),
            GameMode::MatchingPairs => generate_matching_pairs_question(
                difficulty,
                &mut ctx.signatures,
                &ctx.base_icons,
                &ctx.recent_icons,
                &mut ctx.icons_used_cycle,
                &mut ctx.icons_used_mode_cycle,
                rng,
            ),
            GameMode::NumberSequence => {
                generate_number_sequence_question(difficulty, &mut ctx.signatures, rng)
            }
            _ => return Err(GenError::UnsupportedMode),
        };

        match result {
            Ok(q) => return Ok(q),
            Err(GenError::EmptyIconPool) => return Err(GenError::EmptyIconPool),
            Err(_) => continue,
        }
    }
    Err(GenError::Exhausted {
        attempts: MAX_ATTEMPTS_PER_QUESTION,
    })
}

// =====================================================================
// Generación de rondas completas
// =====================================================================

#[derive(Clone, Debug, Default)]
pub struct RoundBatch {
    pub questions: Vec<Question>,
    pub icons_used: HashSet<Icon>,
    pub zeros_generated: u32,
}

/// Un hueco de un modo compuesto o de una ronda normal: genera,
/// comprueba el tope de ceros y descarta sin reutilizar.
fn fill_slot(
    mode: GameMode,
    difficulty: DifficultyLevel,
    zero_limited: bool,
    zeros_used: &mut u32,
    ctx: &mut GenerationContext,
    rng: &mut StdRng,
) -> Option<Question> {
    for _ in 0..MAX_SLOT_ATTEMPTS {
        let allow_zero = !zero_limited || *zeros_used < ZERO_LIMIT;
        let candidate = generate_single_question(
            mode,
            difficulty,
            QuestionRequestType::Standard,
            allow_zero,
            ctx,
            rng,
        );
        let Ok(q) = candidate else { continue };

        let has_zero = zero_limited && q.contains_zero();
        if has_zero && *zeros_used >= ZERO_LIMIT {
            // Descartada, no reutilizada: su firma ya quedó reclamada y
            // el siguiente intento saldrá distinto.
            continue;
        }
        if has_zero {
            *zeros_used += 1;
        }
        return Some(q);
    }
    None
}

pub fn generate_questions_for_round(
    mode: GameMode,
    difficulty: DifficultyLevel,
    num_questions: usize,
    bank: &IconBank,
    unlocked_ids: &[String],
    ctx: &mut GenerationContext,
    ai_source: Option<&mut dyn AiQuestionSource>,
    rng: &mut StdRng,
) -> GenResult<RoundBatch> {
    // --- Modos de IA: lote externo con siembra de iconos ---
    if mode.is_ai_mode() {
        let Some(source) = ai_source else {
            return Err(GenError::NoAiSource);
        };
        let all_icon_data = bank.unlocked_icon_data(unlocked_ids);
        let num_seed = if difficulty == DifficultyLevel::Mam { 2 } else { 4 };
        let seed_icons = seed_icons_for_batch(&all_icon_data, &ctx.recent_icons, num_seed, rng);

        let request = AiBatchRequest {
            mode,
            difficulty,
            num_questions,
            available_icons: shuffled(&all_icon_data, rng),
            seed_icons,
        };
        let batch = source
            .generate_batch(&request)
            .map_err(|e| GenError::AiSource(e.to_string()))?;

        // El texto del enunciado lo pone la casa, no la IA.
        let mut questions = batch.questions;
        for q in &mut questions {
            let prompts: &[&str] = match q.mode {
                GameMode::OddOneOut => ODD_ONE_OUT_PROMPTS,
                GameMode::VisualPattern => VISUAL_PATTERN_PROMPTS,
                _ => &[],
            };
            if !prompts.is_empty() {
                q.prompt = prompts[rng.random_range(0..prompts.len())].to_string();
            }
        }

        return Ok(RoundBatch {
            questions,
            icons_used: batch.icons_used.into_iter().collect(),
            zeros_generated: 0,
        });
    }

    let mut zeros_used: u32 = 0;

    // --- Reto total: multiconjunto fijo de submodos, barajado ---
    if mode == GameMode::ComprehensiveChallenge {
        let total = COMPREHENSIVE_CHALLENGE_QUESTIONS;
        let num_seq = 3;
        let num_comp = 4;
        let num_sub = 4;
        let num_add = total - num_seq - num_comp - num_sub;

        let mut tags: Vec<GameMode> = Vec::with_capacity(total);
        tags.extend(std::iter::repeat(GameMode::Addition).take(num_add));
        tags.extend(std::iter::repeat(GameMode::Subtraction).take(num_sub));
        tags.extend(std::iter::repeat(GameMode::Comparison).take(num_comp));
        tags.extend(std::iter::repeat(GameMode::NumberSequence).take(num_seq));
        let tags = shuffled(&tags, rng);

        let mut questions = Vec::with_capacity(total);
        for tag in tags {
            let zero_limited = matches!(
                tag,
                GameMode::Addition | GameMode::Subtraction | GameMode::Comparison
            );
            match fill_slot(tag, difficulty, zero_limited, &mut zeros_used, ctx, rng) {
                Some(q) => questions.push(q),
                None => log::warn!("hueco de {tag:?} sin pregunta válida, la ronda queda corta"),
            }
        }
        return Ok(RoundBatch {
            questions,
            icons_used: HashSet::new(),
            zeros_generated: zeros_used,
        });
    }

    // --- Mezcla de cálculo: diez de cada ---
    if mode == GameMode::MixedMathChallenge {
        let mut tags: Vec<GameMode> = Vec::new();
        tags.extend(std::iter::repeat(GameMode::Addition).take(10));
        tags.extend(std::iter::repeat(GameMode::Subtraction).take(10));
        tags.extend(std::iter::repeat(GameMode::Comparison).take(10));
        let tags = shuffled(&tags, rng);

        let mut questions = Vec::with_capacity(tags.len());
        for tag in tags {
            match fill_slot(tag, difficulty, true, &mut zeros_used, ctx, rng) {
                Some(q) => questions.push(q),
                None => log::warn!("hueco de {tag:?} sin pregunta válida, la ronda queda corta"),
            }
        }
        return Ok(RoundBatch {
            questions,
            icons_used: HashSet::new(),
            zeros_generated: zeros_used,
        });
    }

    // --- Comparaciones: suelo de igualdades y reparto ---
    if mode == GameMode::Comparison {
        if difficulty == DifficultyLevel::Choi {
            let questions = generate_comparison_round_choi(
                difficulty,
                &mut ctx.signatures,
                num_questions,
                rng,
            );
            let zeros_generated = questions.iter().filter(|q| q.contains_zero()).count() as u32;
            return Ok(RoundBatch {
                questions,
                icons_used: HashSet::new(),
                zeros_generated,
            });
        }

        let mut questions: Vec<Question> = Vec::new();
        for _ in 0..NUM_EQUALS_IN_COMPARISON_ROUND {
            let allow_zero = zeros_used < ZERO_LIMIT;
            match generate_equals_comparison_question(
                difficulty,
                &mut ctx.signatures,
                allow_zero,
                rng,
            ) {
                Ok(q) => {
                    if q.contains_zero() {
                        zeros_used += 1;
                    }
                    questions.push(q);
                }
                Err(_) => log::warn!(
                    "no salió una igualdad garantizada, la ronda puede traer menos de {NUM_EQUALS_IN_COMPARISON_ROUND}"
                ),
            }
        }

        let non_equals_needed = num_questions.saturating_sub(questions.len());
        for _ in 0..non_equals_needed {
            let allow_zero = zeros_used < ZERO_LIMIT;
            match generate_comparison_question(
                difficulty,
                &mut ctx.signatures,
                ComparisonGenOptions {
                    allow_zero,
                    force_not_equals: true,
                    ..Default::default()
                },
                rng,
            ) {
                Ok(q) => {
                    if q.contains_zero() {
                        zeros_used += 1;
                    }
                    questions.push(q);
                }
                Err(_) => log::warn!("sin pregunta de desigualdad, la ronda queda corta"),
            }
        }

        while questions.len() < num_questions {
            let allow_zero = zeros_used < ZERO_LIMIT;
            match generate_comparison_question(
                difficulty,
                &mut ctx.signatures,
                ComparisonGenOptions {
                    allow_zero,
                    ..Default::default()
                },
                rng,
            ) {
                Ok(q) => {
                    if q.contains_zero() {
                        zeros_used += 1;
                    }
                    questions.push(q);
                }
                Err(_) => break,
            }
        }

        let mut questions = shuffled(&questions, rng);
        declump_equals(&mut questions);
        return Ok(RoundBatch {
            questions,
            icons_used: HashSet::new(),
            zeros_generated: zeros_used,
        });
    }

    // --- Resto de modos: un hueco por pregunta ---
    let zero_limited = mode.is_zero_limited();
    let mut questions = Vec::with_capacity(num_questions);
    for i in 0..num_questions {
        match fill_slot(mode, difficulty, zero_limited, &mut zeros_used, ctx, rng) {
            Some(q) => questions.push(q),
            None => log::warn!(
                "sin pregunta válida para {mode:?} en el puesto {i}, la ronda queda corta"
            ),
        }
    }

    Ok(RoundBatch {
        questions,
        icons_used: ctx.icons_used_cycle.clone(),
        zeros_generated: zeros_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_icon_bank;
    use crate::model::{QuestionKind, UserAnswer};
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn batch(mode: GameMode, difficulty: DifficultyLevel, count: usize, seed: u64) -> RoundBatch {
        let bank = read_icon_bank();
        let mut ctx = GenerationContext::new(&bank, &[], &[]);
        let mut rng = rng(seed);
        generate_questions_for_round(mode, difficulty, count, &bank, &[], &mut ctx, None, &mut rng)
            .expect("la ronda debe generarse")
    }

    #[test]
    fn el_tope_de_ceros_se_respeta_en_los_modos_numericos() {
        for seed in 0..8 {
            for (mode, difficulty) in [
                (GameMode::MixedMathChallenge, DifficultyLevel::Mam),
                (GameMode::MixedMathChallenge, DifficultyLevel::Choi),
                (GameMode::ComprehensiveChallenge, DifficultyLevel::Mam),
                (GameMode::Comparison, DifficultyLevel::Mam),
                (GameMode::Comparison, DifficultyLevel::Choi),
            ] {
                let len = crate::config::round_length(mode, difficulty);
                let b = batch(mode, difficulty, len, seed);
                let zeros = b.questions.iter().filter(|q| q.contains_zero()).count();
                assert!(
                    zeros <= ZERO_LIMIT as usize,
                    "{zeros} ceros en {mode:?}/{difficulty:?} con seed {seed}"
                );
            }
        }
    }

    #[test]
    fn una_ronda_de_comparacion_de_choi_cumple_el_contrato_completo() {
        for seed in 0..6 {
            let b = batch(GameMode::Comparison, DifficultyLevel::Choi, 20, seed);
            assert_eq!(b.questions.len(), 20);

            let equals = b
                .questions
                .iter()
                .filter(|q| q.is_equals_comparison())
                .count();
            assert_eq!(equals, 5, "seed {seed}");

            for pair in b.questions.windows(2) {
                assert!(
                    !(pair[0].is_equals_comparison() && pair[1].is_equals_comparison()),
                    "dos '=' seguidos con seed {seed}"
                );
            }
            assert!(b.zeros_generated <= ZERO_LIMIT);
        }
    }

    #[test]
    fn el_reto_total_reparte_los_submodos_pactados() {
        let b = batch(
            GameMode::ComprehensiveChallenge,
            DifficultyLevel::Choi,
            COMPREHENSIVE_CHALLENGE_QUESTIONS,
            11,
        );
        assert_eq!(b.questions.len(), COMPREHENSIVE_CHALLENGE_QUESTIONS);

        let count = |m: GameMode| b.questions.iter().filter(|q| q.mode == m).count();
        assert_eq!(count(GameMode::Addition), 4);
        assert_eq!(count(GameMode::Subtraction), 4);
        assert_eq!(count(GameMode::Comparison), 4);
        assert_eq!(count(GameMode::NumberSequence), 3);
    }

    #[test]
    fn las_rondas_de_iconos_no_repiten_preguntas() {
        let b = batch(GameMode::Counting, DifficultyLevel::Mam, 30, 21);
        assert!(!b.questions.is_empty());
        let mut seen = HashSet::new();
        for q in &b.questions {
            if let QuestionKind::Counting(cq) = &q.kind {
                assert!(seen.insert((cq.icon.clone(), cq.count)), "pregunta repetida");
            }
        }
        assert!(!b.icons_used.is_empty());
    }

    #[test]
    fn generate_single_question_respeta_allow_zero() {
        let bank = read_icon_bank();
        let mut ctx = GenerationContext::new(&bank, &[], &[]);
        let mut rng = rng(31);
        for _ in 0..40 {
            let q = generate_single_question(
                GameMode::Addition,
                DifficultyLevel::Mam,
                QuestionRequestType::Standard,
                false,
                &mut ctx,
                &mut rng,
            )
            .expect("debe generar");
            assert!(!q.contains_zero());
        }
    }

    #[test]
    fn los_modos_de_ia_sin_fuente_fallan_limpiamente() {
        let bank = read_icon_bank();
        let mut ctx = GenerationContext::new(&bank, &[], &[]);
        let mut rng = rng(41);
        let err = generate_questions_for_round(
            GameMode::OddOneOut,
            DifficultyLevel::Mam,
            10,
            &bank,
            &[],
            &mut ctx,
            None,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, GenError::NoAiSource);
    }

    // Fuente falsa que apunta lo que se le pide.
    struct FakeSource {
        last_request: Option<AiBatchRequest>,
    }

    impl AiQuestionSource for FakeSource {
        fn generate_batch(
            &mut self,
            request: &AiBatchRequest,
        ) -> Result<AiBatch, Box<dyn std::error::Error>> {
            self.last_request = Some(request.clone());
            let questions = (0..request.num_questions)
                .map(|i| Question {
                    id: format!("ai-{i}"),
                    mode: request.mode,
                    difficulty: request.difficulty,
                    prompt: String::new(),
                    kind: QuestionKind::OddOneOut(crate::model::OddOneOutQuestion {
                        options: vec![],
                        correct_answer_id: "x".into(),
                        explanation: String::new(),
                    }),
                })
                .collect();
            Ok(AiBatch {
                questions,
                icons_used: vec!["🐶".into()],
            })
        }
    }

    #[test]
    fn el_lote_de_ia_se_siembra_y_recibe_enunciado() {
        let bank = read_icon_bank();
        let master: Vec<Icon> = bank
            .base_unlocked_icons(&[])
            .into_iter()
            .take(10)
            .collect();
        let mut ctx = GenerationContext::new(&bank, &[], &master);
        let mut rng = rng(51);
        let mut source = FakeSource { last_request: None };

        let b = generate_questions_for_round(
            GameMode::OddOneOut,
            DifficultyLevel::Choi,
            10,
            &bank,
            &[],
            &mut ctx,
            Some(&mut source),
            &mut rng,
        )
        .expect("la fuente falsa responde");

        assert_eq!(b.questions.len(), 10);
        for q in &b.questions {
            assert!(ODD_ONE_OUT_PROMPTS.contains(&q.prompt.as_str()));
        }
        assert!(b.icons_used.contains("🐶"));

        let request = source.last_request.expect("hubo petición");
        assert_eq!(request.seed_icons.len(), 4);
        // Con iconos frescos de sobra, ninguna semilla sale del historial.
        for seed in &request.seed_icons {
            assert!(!master.contains(&seed.emoji));
        }
    }

    #[test]
    fn las_semillas_recurren_al_historial_cuando_no_hay_frescos() {
        let bank = read_icon_bank();
        let all: Vec<Icon> = bank.base_unlocked_icons(&[]);
        // Todo el inventario está "visto": las semillas deben salir del
        // final del historial (lo menos reciente).
        let data = bank.unlocked_icon_data(&[]);
        let mut rng = rng(61);
        let seeds = seed_icons_for_batch(&data, &all, 3, &mut rng);
        assert_eq!(seeds.len(), 3);
        let tail: Vec<&Icon> = all.iter().rev().take(3).collect();
        for seed in &seeds {
            assert!(tail.contains(&&seed.emoji), "{} no es de las menos recientes", seed.emoji);
        }
    }

    #[test]
    fn respuesta_de_ordenar_valida_contra_la_secuencia_completa() {
        // Cubre el enlace modelo-compositor para las secuencias.
        let bank = read_icon_bank();
        let mut ctx = GenerationContext::new(&bank, &[], &[]);
        let mut rng = rng(71);
        for _ in 0..20 {
            let q = generate_single_question(
                GameMode::NumberSequence,
                DifficultyLevel::Choi,
                QuestionRequestType::Standard,
                true,
                &mut ctx,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::NumberSequence(sq) = &q.kind {
                if let crate::model::SequenceKind::Sort { sorted, .. } = &sq.kind {
                    assert!(q.check_answer(&UserAnswer::Ordering(sorted.clone())));
                }
            }
        }
    }
}
