//! Dãy números: completar huecos, detectar el error y ordenar.

use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{
    DifficultyLevel, GameMode, NumberSequenceQuestion, Question, QuestionKind, RuleOption,
    SequenceKind, SequenceTheme, SortOrder,
};
use crate::question_utils::{generate_id, shuffled, GenError, GenResult, SignatureSet};

const MAX_ATTEMPTS: u32 = 30;

/// Números distintos al azar para la variante de ordenar.
fn random_number_set(difficulty: DifficultyLevel, rng: &mut StdRng) -> Vec<i32> {
    let count = if difficulty == DifficultyLevel::Mam { 4 } else { 5 };
    let max_num = if difficulty == DifficultyLevel::Mam {
        10
    } else {
        20
    };
    let mut numbers: Vec<i32> = Vec::new();
    while numbers.len() < count {
        let n = rng.random_range(1..=max_num);
        if !numbers.contains(&n) {
            numbers.push(n);
        }
    }
    numbers
}

fn arithmetic_sequence(difficulty: DifficultyLevel, step: i32, rng: &mut StdRng) -> Vec<i32> {
    let length_options: &[i32] = if difficulty == DifficultyLevel::Mam {
        &[5, 6]
    } else {
        &[6, 7]
    };
    let length = *shuffled(length_options, rng).first().unwrap();

    let start = if difficulty == DifficultyLevel::Choi {
        // Chồi se mueve entre 10 y 30.
        let (range_min, range_max) = (10, 30);
        if step > 0 {
            let limit = range_max - (length - 1) * step;
            if limit < range_min {
                range_min
            } else {
                rng.random_range(range_min..=limit)
            }
        } else {
            let min_start = range_min + (length - 1) * step.abs();
            if min_start > range_max {
                range_max
            } else {
                rng.random_range(min_start..=range_max)
            }
        }
    } else {
        let range_max = 20;
        if step > 0 {
            let limit = range_max - (length - 1) * step;
            if limit > 1 {
                rng.random_range(1..=limit)
            } else {
                rng.random_range(1..=2)
            }
        } else {
            let min_start = 1 + (length - 1) * step.abs();
            if range_max <= min_start {
                min_start + rng.random_range(0..=2)
            } else {
                rng.random_range(min_start..=range_max)
            }
        }
    };

    (0..length).map(|i| start + i * step).collect()
}

/// Tapa entre 1 y 3 posiciones. Los índices 0 y 1 nunca se tocan:
/// sin los dos primeros números no hay regla que deducir.
fn blank_out(
    difficulty: DifficultyLevel,
    full_sequence: &[i32],
    rng: &mut StdRng,
) -> (Vec<Option<i32>>, Vec<i32>) {
    let length = full_sequence.len();
    let blank_options: &[usize] = if difficulty == DifficultyLevel::Mam {
        &[1, 2]
    } else {
        &[2, 3]
    };
    let num_blanks = *shuffled(blank_options, rng).first().unwrap();

    let mut possible: Vec<usize> = (2..length).collect();
    if difficulty == DifficultyLevel::Mam && possible.len() > 2 && rng.random_bool(0.7) {
        // A los pequeños se les deja casi siempre el final a la vista.
        possible.pop();
    }

    let mut blank_indices: Vec<usize> = shuffled(&possible, rng)
        .into_iter()
        .take(num_blanks)
        .collect();
    if blank_indices.is_empty() && !possible.is_empty() {
        blank_indices.push(*shuffled(&possible, rng).first().unwrap());
    }
    blank_indices.sort_unstable();

    let mut sequence: Vec<Option<i32>> = full_sequence.iter().copied().map(Some).collect();
    let mut answers = Vec::new();
    for &idx in &blank_indices {
        answers.push(full_sequence[idx]);
        sequence[idx] = None;
    }
    (sequence, answers)
}

/// Mete exactamente un error en la progresión, nunca antes del índice 3
/// ni en el último puesto.
fn inject_error(full_sequence: &[i32], rng: &mut StdRng) -> (Vec<i32>, Vec<(usize, i32)>) {
    let length = full_sequence.len();
    if length < 5 {
        return (full_sequence.to_vec(), Vec::new());
    }

    let min_error_index = 3;
    let max_error_index = length - 2;
    if min_error_index > max_error_index {
        return (full_sequence.to_vec(), Vec::new());
    }
    let index = rng.random_range(min_error_index..=max_error_index);
    let correct = full_sequence[index];

    let mut wrong;
    loop {
        let offset = *shuffled(&[-2, -1, 1, 2], rng).first().unwrap();
        wrong = correct + offset;
        if wrong > 0 && wrong != correct {
            break;
        }
    }

    let mut with_errors = full_sequence.to_vec();
    with_errors[index] = wrong;
    (with_errors, vec![(index, correct)])
}

fn rule_display(step: i32) -> String {
    if step > 0 {
        format!("+ {step}")
    } else {
        format!("– {}", step.abs())
    }
}

fn build_rule_options(step: i32, rng: &mut StdRng) -> Vec<RuleOption> {
    let mut distractor_steps: Vec<i32> = Vec::new();
    while distractor_steps.len() < 2 {
        let offset = *shuffled(&[-2, -1, 1, 2], rng).first().unwrap();
        let candidate = step + offset;
        if candidate != 0 && candidate != step && !distractor_steps.contains(&candidate) {
            distractor_steps.push(candidate);
        }
    }
    let mut options = vec![RuleOption {
        display: rule_display(step),
        step,
    }];
    for s in distractor_steps {
        options.push(RuleOption {
            display: rule_display(s),
            step: s,
        });
    }
    shuffled(&options, rng)
}

fn join(nums: &[i32]) -> String {
    nums.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn generate_number_sequence_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        let theme = *shuffled(&[SequenceTheme::Train, SequenceTheme::Steps], rng)
            .first()
            .unwrap();

        let p: f64 = rng.random();
        let pick_sort = difficulty == DifficultyLevel::Choi && (0.45..0.75).contains(&p);
        let pick_fill = if difficulty == DifficultyLevel::Choi {
            p < 0.45
        } else {
            p < 0.5
        };

        let (kind, prompt, signature) = if pick_sort {
            let numbers = random_number_set(difficulty, rng);
            let order = *shuffled(&[SortOrder::Asc, SortOrder::Desc], rng)
                .first()
                .unwrap();
            let mut sorted = numbers.clone();
            match order {
                SortOrder::Asc => sorted.sort_unstable(),
                SortOrder::Desc => {
                    sorted.sort_unstable();
                    sorted.reverse();
                }
            }
            let mut scrambled = shuffled(&numbers, rng);
            let mut scramble_attempts = 0;
            while scrambled == sorted && scramble_attempts < 5 {
                scrambled = shuffled(&numbers, rng);
                scramble_attempts += 1;
            }

            let prompt = match order {
                SortOrder::Asc => "Sắp xếp các số theo thứ tự tăng dần (bé đến lớn):",
                SortOrder::Desc => "Sắp xếp các số theo thứ tự giảm dần (lớn đến bé):",
            };
            let mut canonical = numbers.clone();
            canonical.sort_unstable();
            let signature = format!(
                "ns-sort-{}-{}",
                join(&canonical),
                match order {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                }
            );
            (
                SequenceKind::Sort {
                    scrambled,
                    sorted,
                    order,
                },
                prompt.to_string(),
                signature,
            )
        } else {
            let possible_steps: &[i32] = if difficulty == DifficultyLevel::Mam {
                &[1, -1]
            } else {
                &[1, -1, 2]
            };
            let step = *shuffled(possible_steps, rng).first().unwrap();
            let full_sequence = arithmetic_sequence(difficulty, step, rng);
            let rule_options = build_rule_options(step, rng);

            if pick_fill {
                let (sequence, answers) = blank_out(difficulty, &full_sequence, rng);
                if answers.is_empty() {
                    continue;
                }
                let holes: Vec<String> = sequence
                    .iter()
                    .map(|slot| slot.map(|n| n.to_string()).unwrap_or_else(|| "_".into()))
                    .collect();
                let signature = format!("ns-fill-{}-{}", join(&full_sequence), holes.join(","));
                (
                    SequenceKind::FillBlanks {
                        full_sequence,
                        step,
                        sequence,
                        answers,
                        rule_options,
                    },
                    "Bé hãy tìm quy luật và hoàn thành dãy số nhé:".to_string(),
                    signature,
                )
            } else {
                let (with_errors, errors) = inject_error(&full_sequence, rng);
                if errors.is_empty() {
                    continue;
                }
                let signature =
                    format!("ns-det-{}-{}", join(&full_sequence), errors[0].1);
                (
                    SequenceKind::RuleDetective {
                        full_sequence,
                        step,
                        with_errors,
                        errors,
                        rule_options,
                    },
                    "Bé hãy làm thám tử tìm và sửa lỗi sai nhé!".to_string(),
                    signature,
                )
            }
        };

        if !signatures.claim(&signature) {
            continue;
        }

        return Ok(Question {
            id: generate_id(rng),
            mode: GameMode::NumberSequence,
            difficulty,
            prompt,
            kind: QuestionKind::NumberSequence(NumberSequenceQuestion { theme, kind }),
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

    fn collect(difficulty: DifficultyLevel, seed: u64, n: usize) -> Vec<NumberSequenceQuestion> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sigs = SignatureSet::new();
        (0..n)
            .filter_map(|_| {
                generate_number_sequence_question(difficulty, &mut sigs, &mut rng).ok()
            })
            .map(|q| match q.kind {
                QuestionKind::NumberSequence(sq) => sq,
                _ => panic!("tipo inesperado"),
            })
            .collect()
    }

    #[test]
    fn los_huecos_nunca_caen_en_las_dos_primeras_posiciones() {
        for sq in collect(DifficultyLevel::Mam, 1, 30)
            .into_iter()
            .chain(collect(DifficultyLevel::Choi, 2, 30))
        {
            if let SequenceKind::FillBlanks {
                full_sequence,
                sequence,
                answers,
                step,
                ..
            } = sq.kind
            {
                assert!(sequence[0].is_some());
                assert!(sequence[1].is_some());
                assert!(!answers.is_empty() && answers.len() <= 3);

                // La progresión es coherente con la regla.
                for pair in full_sequence.windows(2) {
                    assert_eq!(pair[1] - pair[0], step);
                }
                // Las respuestas coinciden con los valores tapados, en orden.
                let blanked: Vec<i32> = sequence
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_none())
                    .map(|(i, _)| full_sequence[i])
                    .collect();
                assert_eq!(blanked, answers);
            }
        }
    }

    #[test]
    fn el_detective_recibe_un_solo_error_bien_colocado() {
        for sq in collect(DifficultyLevel::Mam, 3, 40)
            .into_iter()
            .chain(collect(DifficultyLevel::Choi, 4, 40))
        {
            if let SequenceKind::RuleDetective {
                full_sequence,
                with_errors,
                errors,
                ..
            } = sq.kind
            {
                assert_eq!(errors.len(), 1);
                let (index, correct) = errors[0];
                assert!(index >= 3);
                assert!(index <= full_sequence.len() - 2);
                assert_eq!(full_sequence[index], correct);
                assert_ne!(with_errors[index], correct);
                assert!(with_errors[index] > 0);

                // Fuera del error las dos dãy son idénticas.
                for (i, (a, b)) in full_sequence.iter().zip(&with_errors).enumerate() {
                    if i != index {
                        assert_eq!(a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn ordenar_descendente_baja_en_cada_paso() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sigs = SignatureSet::new();
        let mut seen_desc = false;
        for _ in 0..60 {
            let Ok(q) = generate_number_sequence_question(DifficultyLevel::Choi, &mut sigs, &mut rng)
            else {
                continue;
            };
            let QuestionKind::NumberSequence(sq) = q.kind else {
                continue;
            };
            if let SequenceKind::Sort {
                scrambled,
                sorted,
                order: SortOrder::Desc,
            } = sq.kind
            {
                seen_desc = true;
                for pair in sorted.windows(2) {
                    assert!(pair[0] > pair[1], "no es estrictamente decreciente");
                }
                let mut a = scrambled.clone();
                let mut b = sorted.clone();
                a.sort_unstable();
                b.sort_unstable();
                assert_eq!(a, b, "no es una permutación");
            }
        }
        assert!(seen_desc, "el muestreo nunca sacó un sort descendente");
    }

    #[test]
    fn las_firmas_no_se_repiten_dentro_de_una_ronda() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut sigs = SignatureSet::new();
        let mut generated = 0;
        for _ in 0..15 {
            if generate_number_sequence_question(DifficultyLevel::Mam, &mut sigs, &mut rng).is_ok()
            {
                generated += 1;
            }
        }
        assert!(sigs.len() >= generated);
    }
}
