//! Contar iconos: un tipo de icono y una cantidad objetivo.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{CountingQuestion, DifficultyLevel, GameMode, Icon, Question, QuestionKind};
use crate::question_utils::{
    candidate_icons, generate_id, prioritized_icon_pool, shuffled, GenError, GenResult,
    SignatureSet,
};

const MAX_ATTEMPTS: u32 = 20;

pub fn generate_counting_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    base_unlocked_icons: &[Icon],
    recently_used_icons: &[Icon],
    icons_used_in_cycle: &mut HashSet<Icon>,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let pool = prioritized_icon_pool(base_unlocked_icons, recently_used_icons);
    let mut candidates = candidate_icons(&pool, icons_used_in_cycle, None, 1, &[], rng);

    if candidates.is_empty() {
        // Recurso final: cualquier icono del pool que aún no haya contado.
        let fallback: Vec<Icon> = pool
            .iter()
            .filter(|icon| !signatures.contains(&format!("count-{icon}")))
            .cloned()
            .collect();
        if fallback.is_empty() {
            return Err(GenError::EmptyIconPool);
        }
        candidates.push(shuffled(&fallback, rng).remove(0));
    }
    let icon = candidates.remove(0);

    let max_count = if difficulty == DifficultyLevel::Mam {
        10
    } else {
        20
    };
    let min_count = if difficulty == DifficultyLevel::Mam { 1 } else { 5 };

    // Busca una cantidad con firma nueva; pasado el tope acepta la
    // repetición antes que quedarse sin pregunta.
    let mut count = rng.random_range(min_count..=max_count);
    let mut signature = format!("count-{icon}-{count}");
    let mut attempts = 0;
    while signatures.contains(&signature) && attempts <= MAX_ATTEMPTS {
        count = rng.random_range(min_count..=max_count);
        signature = format!("count-{icon}-{count}");
        attempts += 1;
    }

    signatures.add(&format!("count-{icon}"));
    signatures.add(&signature);
    icons_used_in_cycle.insert(icon.clone());

    Ok(Question {
        id: generate_id(rng),
        mode: GameMode::Counting,
        difficulty,
        prompt: format!("Đếm số lượng {icon} trong hình:"),
        kind: QuestionKind::Counting(CountingQuestion { icon, count }),
    })
}
