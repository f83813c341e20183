//! Reconocer números: del número al grupo de iconos y del grupo al número.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{
    DifficultyLevel, GameMode, Icon, NumberRecognitionQuestion, Question, QuestionKind,
    RecognitionDisplay, RecognitionOption, RecognitionVariant,
};
use crate::question_utils::{
    candidate_icons, generate_id, prioritized_icon_pool, shuffled, GenError, GenResult,
    SignatureSet,
};

const MAX_ATTEMPTS: u32 = 30;
const NUM_OPTIONS: usize = 3;

pub fn generate_number_recognition_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    base_unlocked_icons: &[Icon],
    recently_used_icons: &[Icon],
    icons_used_in_cycle: &mut HashSet<Icon>,
    icons_used_this_mode: &mut HashSet<Icon>,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let signature_base = if difficulty == DifficultyLevel::Mam {
        "nr-m-"
    } else {
        "nr-c-"
    };
    let max_num = if difficulty == DifficultyLevel::Mam {
        10
    } else {
        20
    };

    let pool = prioritized_icon_pool(base_unlocked_icons, recently_used_icons);
    if pool.is_empty() {
        return Err(GenError::EmptyIconPool);
    }

    for _ in 0..MAX_ATTEMPTS {
        let candidates = candidate_icons(
            &pool,
            icons_used_in_cycle,
            Some(&*icons_used_this_mode),
            1,
            &[],
            rng,
        );
        let Some(icon) = candidates.into_iter().next() else {
            continue;
        };

        let target = rng.random_range(1..=max_num);
        let mut options: Vec<RecognitionOption> = Vec::new();

        let (variant, prompt, signature_part) = if rng.random_bool(0.5) {
            // Del número al grupo: la opción correcta es el grupo de
            // `target` iconos; las trampas varían la cantidad y a veces
            // el icono.
            options.push(RecognitionOption {
                id: generate_id(rng),
                display: RecognitionDisplay::Items {
                    icon: icon.clone(),
                    count: target,
                },
                is_correct: true,
            });

            let distractor_pool = candidate_icons(
                &pool,
                icons_used_in_cycle,
                Some(&HashSet::from([icon.clone()])),
                pool.len(),
                &[],
                rng,
            );

            while options.len() < NUM_OPTIONS {
                let wrong_count = rng.random_range(1..=max_num);
                let mut wrong_icon = icon.clone();
                if rng.random_bool(0.3) {
                    let others: Vec<&Icon> =
                        distractor_pool.iter().filter(|i| **i != icon).collect();
                    if let Some(other) = shuffled(&others, rng).first() {
                        wrong_icon = (*other).clone();
                    }
                }
                let duplicated = options.iter().any(|opt| {
                    matches!(&opt.display, RecognitionDisplay::Items { icon: i, count }
                        if *count == wrong_count && *i == wrong_icon)
                });
                if duplicated {
                    continue;
                }
                options.push(RecognitionOption {
                    id: generate_id(rng),
                    display: RecognitionDisplay::Items {
                        icon: wrong_icon,
                        count: wrong_count,
                    },
                    is_correct: false,
                });
            }

            (
                RecognitionVariant::NumberToItems {
                    target,
                    icon: icon.clone(),
                },
                format!("Tìm nhóm có {target} {icon}:"),
                format!("n2i-{target}-{icon}"),
            )
        } else {
            // Del grupo al número: se enseña el grupo y se elige la cifra.
            options.push(RecognitionOption {
                id: generate_id(rng),
                display: RecognitionDisplay::Number(target),
                is_correct: true,
            });

            while options.len() < NUM_OPTIONS {
                let wrong = rng.random_range(1..=max_num);
                let duplicated = wrong == target
                    || options
                        .iter()
                        .any(|opt| matches!(opt.display, RecognitionDisplay::Number(n) if n == wrong));
                if duplicated {
                    continue;
                }
                options.push(RecognitionOption {
                    id: generate_id(rng),
                    display: RecognitionDisplay::Number(wrong),
                    is_correct: false,
                });
            }

            (
                RecognitionVariant::ItemsToNumber {
                    target,
                    icon: icon.clone(),
                },
                format!("Có bao nhiêu {icon} ở đây?"),
                format!("i2n-{target}-{icon}"),
            )
        };

        let signature = format!("{signature_base}{signature_part}");
        if !signatures.claim(&signature) {
            continue;
        }

        icons_used_in_cycle.insert(icon.clone());
        icons_used_this_mode.insert(icon.clone());
        for opt in &options {
            if let RecognitionDisplay::Items { icon, .. } = &opt.display {
                icons_used_in_cycle.insert(icon.clone());
            }
        }

        return Ok(Question {
            id: generate_id(rng),
            mode: GameMode::NumberRecognition,
            difficulty,
            prompt,
            kind: QuestionKind::NumberRecognition(NumberRecognitionQuestion {
                variant,
                options: shuffled(&options, rng),
            }),
        });
    }

    Err(GenError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn icons(list: &[&str]) -> Vec<Icon> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn siempre_hay_tres_opciones_y_una_correcta() {
        let mut rng = StdRng::seed_from_u64(1);
        let base = icons(&["🐶", "🐱", "🍎", "🍌", "⭐", "🌙"]);
        let mut used = HashSet::new();
        let mut used_mode = HashSet::new();
        let mut sigs = SignatureSet::new();
        for _ in 0..6 {
            let q = generate_number_recognition_question(
                DifficultyLevel::Mam,
                &mut sigs,
                &base,
                &[],
                &mut used,
                &mut used_mode,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::NumberRecognition(rq) = q.kind {
                assert_eq!(rq.options.len(), 3);
                assert_eq!(rq.options.iter().filter(|o| o.is_correct).count(), 1);
            }
        }
    }

    #[test]
    fn la_opcion_correcta_coincide_con_el_objetivo() {
        let mut rng = StdRng::seed_from_u64(2);
        let base = icons(&["🐶", "🐱", "🍎", "🍌"]);
        let mut used = HashSet::new();
        let mut used_mode = HashSet::new();
        let mut sigs = SignatureSet::new();
        for _ in 0..4 {
            let q = generate_number_recognition_question(
                DifficultyLevel::Choi,
                &mut sigs,
                &base,
                &[],
                &mut used,
                &mut used_mode,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::NumberRecognition(rq) = q.kind {
                let correct = rq.options.iter().find(|o| o.is_correct).unwrap();
                match (&rq.variant, &correct.display) {
                    (
                        RecognitionVariant::NumberToItems { target, icon },
                        RecognitionDisplay::Items { icon: i, count },
                    ) => {
                        assert_eq!(count, target);
                        assert_eq!(i, icon);
                    }
                    (
                        RecognitionVariant::ItemsToNumber { target, .. },
                        RecognitionDisplay::Number(n),
                    ) => assert_eq!(n, target),
                    _ => panic!("opción correcta incoherente con la variante"),
                }
            }
        }
    }

    #[test]
    fn el_icono_principal_rota_dentro_del_modo() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = icons(&["🐶", "🐱", "🍎", "🍌", "⭐", "🌙", "🚗", "🎈"]);
        let mut used = HashSet::new();
        let mut used_mode = HashSet::new();
        let mut sigs = SignatureSet::new();
        let mut mains = Vec::new();
        for _ in 0..4 {
            let q = generate_number_recognition_question(
                DifficultyLevel::Mam,
                &mut sigs,
                &base,
                &[],
                &mut used,
                &mut used_mode,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::NumberRecognition(rq) = q.kind {
                let icon = match rq.variant {
                    RecognitionVariant::NumberToItems { icon, .. } => icon,
                    RecognitionVariant::ItemsToNumber { icon, .. } => icon,
                };
                mains.push(icon);
            }
        }
        let unique: HashSet<&Icon> = mains.iter().collect();
        assert_eq!(unique.len(), mains.len(), "icono principal repetido");
    }
}
