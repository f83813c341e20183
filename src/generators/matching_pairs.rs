//! Parejas: cada valor sale en dos cartas, la cifra y el grupo de iconos.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{
    CardFace, DifficultyLevel, GameMode, Icon, MatchableItem, MatchingPairsQuestion, Question,
    QuestionKind,
};
use crate::question_utils::{
    candidate_icons, generate_id, prioritized_icon_pool, shuffled, GenError, GenResult,
    SignatureSet,
};

const MAX_GENERATION_ATTEMPTS: u32 = 50;

pub fn generate_matching_pairs_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    base_unlocked_icons: &[Icon],
    recently_used_icons: &[Icon],
    icons_used_in_cycle: &mut HashSet<Icon>,
    icons_used_this_mode: &mut HashSet<Icon>,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let mam = difficulty == DifficultyLevel::Mam;
    let num_pairs = if mam { 3 } else { 5 };
    let max_value = if mam { 5 } else { 10 };
    let signature_base = if mam { "mp-m-" } else { "mp-c-" };

    let pool = prioritized_icon_pool(base_unlocked_icons, recently_used_icons);
    if pool.len() < num_pairs {
        return Err(GenError::EmptyIconPool);
    }

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let icons_for_question = candidate_icons(
            &pool,
            icons_used_in_cycle,
            Some(&*icons_used_this_mode),
            num_pairs,
            &[],
            rng,
        );
        if icons_for_question.len() < num_pairs {
            continue;
        }

        // Valores todos distintos dentro de la pregunta.
        let mut pairs: Vec<(i32, Icon)> = Vec::new();
        let mut used_values: HashSet<i32> = HashSet::new();
        for icon in icons_for_question.iter().take(num_pairs) {
            let mut value = rng.random_range(1..=max_value);
            let mut value_attempts = 0;
            while used_values.contains(&value) && value_attempts < max_value * 2 {
                value = rng.random_range(1..=max_value);
                value_attempts += 1;
            }
            if used_values.contains(&value) {
                pairs.clear();
                break;
            }
            used_values.insert(value);
            pairs.push((value, icon.clone()));
        }
        if pairs.len() != num_pairs {
            continue;
        }

        let mut values: Vec<i32> = pairs.iter().map(|(v, _)| *v).collect();
        values.sort_unstable();
        let mut icon_names: Vec<&str> = pairs.iter().map(|(_, i)| i.as_str()).collect();
        icon_names.sort_unstable();
        let numbers_part: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let signature = format!(
            "{signature_base}{}-{}",
            numbers_part.join("-"),
            icon_names.join(",")
        );
        if !signatures.claim(&signature) {
            continue;
        }

        let mut items: Vec<MatchableItem> = Vec::new();
        for (value, icon) in &pairs {
            let match_id = generate_id(rng);
            items.push(MatchableItem {
                id: generate_id(rng),
                match_id: match_id.clone(),
                face: CardFace::Digit(*value),
                is_matched: false,
                is_selected: false,
            });
            items.push(MatchableItem {
                id: generate_id(rng),
                match_id,
                face: CardFace::IconGroup {
                    icon: icon.clone(),
                    count: *value,
                },
                is_matched: false,
                is_selected: false,
            });
            icons_used_in_cycle.insert(icon.clone());
            icons_used_this_mode.insert(icon.clone());
        }

        return Ok(Question {
            id: generate_id(rng),
            mode: GameMode::MatchingPairs,
            difficulty,
            prompt: "Nối các cặp tương ứng:".to_string(),
            kind: QuestionKind::MatchingPairs(MatchingPairsQuestion {
                items: shuffled(&items, rng),
            }),
        });
    }

    Err(GenError::Exhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn icons(list: &[&str]) -> Vec<Icon> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn generate(difficulty: DifficultyLevel, seed: u64) -> Question {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = icons(&["🐶", "🐱", "🍎", "🍌", "⭐", "🌙", "🚗", "🎈"]);
        let mut used = HashSet::new();
        let mut used_mode = HashSet::new();
        let mut sigs = SignatureSet::new();
        generate_matching_pairs_question(
            difficulty,
            &mut sigs,
            &base,
            &[],
            &mut used,
            &mut used_mode,
            &mut rng,
        )
        .expect("debe generar")
    }

    #[test]
    fn mam_saca_tres_parejas_con_valores_e_iconos_unicos() {
        let q = generate(DifficultyLevel::Mam, 1);
        let QuestionKind::MatchingPairs(mq) = q.kind else {
            panic!("tipo inesperado");
        };
        assert_eq!(mq.items.len(), 6);

        let mut values = HashSet::new();
        let mut icons_seen = HashSet::new();
        for item in &mq.items {
            match &item.face {
                CardFace::Digit(v) => {
                    assert!((1..=5).contains(v));
                    assert!(values.insert(*v), "valor repetido");
                }
                CardFace::IconGroup { icon, count } => {
                    assert!((1..=5).contains(count));
                    assert!(icons_seen.insert(icon.clone()), "icono repetido");
                }
            }
        }
    }

    #[test]
    fn cada_pareja_casa_cifra_con_grupo_del_mismo_valor() {
        let q = generate(DifficultyLevel::Choi, 2);
        let QuestionKind::MatchingPairs(mq) = q.kind else {
            panic!("tipo inesperado");
        };
        assert_eq!(mq.items.len(), 10);

        for item in &mq.items {
            let partner = mq
                .items
                .iter()
                .find(|other| other.match_id == item.match_id && other.id != item.id)
                .expect("toda carta tiene pareja");
            match (&item.face, &partner.face) {
                (CardFace::Digit(v), CardFace::IconGroup { count, .. })
                | (CardFace::IconGroup { count, .. }, CardFace::Digit(v)) => {
                    assert_eq!(v, count)
                }
                _ => panic!("una pareja debe juntar cifra y grupo"),
            }
        }
    }

    #[test]
    fn con_pocos_iconos_no_genera() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = icons(&["🐶", "🐱"]);
        let mut used = HashSet::new();
        let mut used_mode = HashSet::new();
        let mut sigs = SignatureSet::new();
        let err = generate_matching_pairs_question(
            DifficultyLevel::Choi,
            &mut sigs,
            &base,
            &[],
            &mut used,
            &mut used_mode,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, GenError::EmptyIconPool);
    }
}
