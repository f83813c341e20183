//! Comparaciones: `a ? b`, expresión contra número y verdadero/falso.
//! Aquí vive también el montaje de rondas de Chồi, con su suelo de
//! signos "=" y el reparto para que no salgan dos seguidos.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::NUM_EQUALS_IN_COMPARISON_ROUND;
use crate::model::{
    CmpSign, ComparisonVariant, DifficultyLevel, ExpressionSide, GameMode, MathOperator, Question,
    QuestionKind, QuestionRequestType,
};
use crate::question_utils::{generate_id, shuffled, GenError, GenResult, SignatureSet};

const MAX_ATTEMPTS: u32 = 50;

#[derive(Clone, Copy, Debug)]
pub struct ComparisonGenOptions {
    pub request_type: QuestionRequestType,
    pub allow_zero: bool,
    pub force_equals: bool,
    pub force_not_equals: bool,
}

impl Default for ComparisonGenOptions {
    fn default() -> Self {
        Self {
            request_type: QuestionRequestType::Standard,
            allow_zero: true,
            force_equals: false,
            force_not_equals: false,
        }
    }
}

fn wrap(
    difficulty: DifficultyLevel,
    prompt: &str,
    variant: ComparisonVariant,
    rng: &mut StdRng,
) -> Question {
    Question {
        id: generate_id(rng),
        mode: GameMode::Comparison,
        difficulty,
        prompt: prompt.to_string(),
        kind: QuestionKind::Comparison(variant),
    }
}

fn generate_standard(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: ComparisonGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        let (num1, mut num2) = if difficulty == DifficultyLevel::Choi {
            // 70% ambos de dos cifras, 30% una de cada.
            if rng.random_bool(0.7) {
                (rng.random_range(10..=30), rng.random_range(10..=30))
            } else {
                let min_single = if options.allow_zero { 0 } else { 1 };
                let single = rng.random_range(min_single..=9);
                let double = rng.random_range(10..=30);
                if rng.random_bool(0.5) {
                    (single, double)
                } else {
                    (double, single)
                }
            }
        } else if rng.random_bool(0.8) {
            // Mầm: casi siempre dentro de 10.
            let min_num = if options.allow_zero { 0 } else { 1 };
            (
                rng.random_range(min_num..=10),
                rng.random_range(min_num..=10),
            )
        } else {
            (rng.random_range(1..=20), rng.random_range(1..=20))
        };

        if options.force_equals {
            num2 = num1;
        }
        if options.force_not_equals && num1 == num2 {
            continue;
        }

        let answer = CmpSign::of(num1, num2);
        let (a, b) = if num1 <= num2 { (num1, num2) } else { (num2, num1) };
        let signature = format!("std-comp-{a}-{b}");
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                "Chọn dấu thích hợp:",
                ComparisonVariant::Standard {
                    number1: num1,
                    number2: num2,
                    answer,
                },
                rng,
            ));
        }
    }
    Err(GenError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

fn generate_expression(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: ComparisonGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        let operator = if rng.random_bool(0.6) {
            MathOperator::Plus
        } else {
            MathOperator::Minus
        };

        let (op1, op2, exp_res) = match (difficulty, operator) {
            (DifficultyLevel::Mam, MathOperator::Plus) => {
                let res = rng.random_range(3..=10);
                let o1 = rng.random_range(1..=(res - 2));
                (o1, res - o1, res)
            }
            (DifficultyLevel::Mam, MathOperator::Minus) => {
                let o1 = rng.random_range(2..=10);
                let o2 = rng.random_range(1..=(o1 - 1));
                (o1, o2, o1 - o2)
            }
            (DifficultyLevel::Choi, MathOperator::Plus) => {
                let res = rng.random_range(11..=18);
                let o1 = rng.random_range(2..=10);
                let o2 = res - o1;
                if o2 <= 0 {
                    continue;
                }
                (o1, o2, res)
            }
            (DifficultyLevel::Choi, MathOperator::Minus) => {
                let o1 = rng.random_range(10..=20);
                let o2 = rng.random_range(1..=(o1 - 2));
                (o1, o2, o1 - o2)
            }
        };

        if !options.allow_zero && (op1 == 0 || op2 == 0 || exp_res == 0) {
            continue;
        }

        let compare_to = if options.force_equals {
            exp_res
        } else {
            let max_compare = if difficulty == DifficultyLevel::Mam {
                10
            } else {
                20
            };
            let min_compare = if options.allow_zero { 0 } else { 1 };
            let offset_range = if difficulty == DifficultyLevel::Mam {
                2
            } else {
                3
            };

            let mut compare_to = 0;
            let mut ok = false;
            for _ in 0..20 {
                let mut offset = rng.random_range(-offset_range..=offset_range);
                if options.force_not_equals && offset == 0 {
                    offset = *shuffled(&[-1, 1], rng).first().unwrap();
                }
                compare_to = exp_res + offset;
                if (min_compare..=max_compare).contains(&compare_to) {
                    ok = true;
                    break;
                }
            }
            if !ok {
                // Pegado al resultado si el muestreo no cupo en rango.
                if exp_res > min_compare {
                    compare_to = exp_res - 1;
                } else {
                    compare_to = exp_res + 1;
                }
            }
            compare_to
        };

        if !options.allow_zero && compare_to == 0 {
            continue;
        }

        let side = if rng.random_bool(0.5) {
            ExpressionSide::Left
        } else {
            ExpressionSide::Right
        };
        let answer = match side {
            ExpressionSide::Left => CmpSign::of(exp_res, compare_to),
            ExpressionSide::Right => CmpSign::of(compare_to, exp_res),
        };

        let (a, b) = if op1 <= op2 { (op1, op2) } else { (op2, op1) };
        let signature = format!("exp-comp-{a}{}{b}-vs-{compare_to}", operator.symbol());
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                "So sánh kết quả phép tính:",
                ComparisonVariant::Expression {
                    operand1: op1,
                    operand2: op2,
                    operator,
                    compare_to,
                    answer,
                    side,
                },
                rng,
            ));
        }
    }
    Err(GenError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

fn generate_true_false(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: ComparisonGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        let (num1, num2) = if difficulty == DifficultyLevel::Choi {
            if rng.random_bool(0.15) {
                let min = if options.allow_zero { 0 } else { 1 };
                (rng.random_range(10..=20), rng.random_range(min..=8))
            } else {
                (rng.random_range(10..=20), rng.random_range(10..=20))
            }
        } else {
            let min_num = if options.allow_zero { 0 } else { 1 };
            (
                rng.random_range(min_num..=10),
                rng.random_range(min_num..=10),
            )
        };

        let true_sign = CmpSign::of(num1, num2);
        let (displayed, answer) = if rng.random_bool(0.5) {
            (true_sign, true)
        } else {
            let others: Vec<CmpSign> = [CmpSign::Less, CmpSign::Greater, CmpSign::Equal]
                .into_iter()
                .filter(|s| *s != true_sign)
                .collect();
            (*shuffled(&others, rng).first().unwrap(), false)
        };

        let signature = format!("tf-comp-{num1}{}{num2}", displayed.symbol());
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                "Phép so sánh này Đúng hay Sai?",
                ComparisonVariant::TrueFalse {
                    number1: num1,
                    number2: num2,
                    displayed,
                    answer,
                },
                rng,
            ));
        }
    }
    Err(GenError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

pub fn generate_comparison_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: ComparisonGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    if options.request_type == QuestionRequestType::Challenge
        && difficulty == DifficultyLevel::Choi
    {
        return generate_expression(difficulty, signatures, options, rng);
    }
    if options.request_type == QuestionRequestType::Booster {
        return generate_standard(difficulty, signatures, options, rng);
    }

    let p: f64 = rng.random();
    match difficulty {
        DifficultyLevel::Mam => {
            if p < 0.60 {
                generate_standard(difficulty, signatures, options, rng)
            } else if p < 0.80 {
                generate_true_false(difficulty, signatures, options, rng)
            } else {
                generate_expression(difficulty, signatures, options, rng)
            }
        }
        DifficultyLevel::Choi => {
            if p < 0.30 {
                generate_expression(difficulty, signatures, options, rng)
            } else if p < 0.55 {
                generate_true_false(difficulty, signatures, options, rng)
            } else {
                generate_standard(difficulty, signatures, options, rng)
            }
        }
    }
}

/// Comparación cuya respuesta es el signo igual, que sale poco al azar.
pub fn generate_equals_comparison_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    allow_zero: bool,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let options = ComparisonGenOptions {
        allow_zero,
        force_equals: true,
        ..Default::default()
    };
    // Chồi ya maneja expresiones: la mayoría de sus igualdades las llevan.
    if difficulty == DifficultyLevel::Choi && rng.random_bool(0.7) {
        return generate_expression(difficulty, signatures, options, rng);
    }
    generate_standard(difficulty, signatures, options, rng)
}

/// Recoloca los "=" para que no queden dos seguidos. Una sola pasada:
/// al encontrar un par, intercambia con una pregunta posterior que no
/// sea "="; si el par cae al final de la ronda, busca hacia atrás un
/// hueco con vecinos que tampoco lo sean.
pub fn declump_equals(questions: &mut [Question]) {
    for i in 0..questions.len().saturating_sub(1) {
        if !(questions[i].is_equals_comparison() && questions[i + 1].is_equals_comparison()) {
            continue;
        }
        if let Some(j) = (i + 2..questions.len()).find(|&j| !questions[j].is_equals_comparison()) {
            questions.swap(i + 1, j);
            continue;
        }
        for j in (0..i).rev() {
            let fits = !questions[j].is_equals_comparison()
                && (j == 0 || !questions[j - 1].is_equals_comparison())
                && !questions[j + 1].is_equals_comparison();
            if fits {
                questions.swap(i + 1, j);
                break;
            }
        }
    }
}

/// Ronda completa de comparaciones para Chồi: suelo de igualdades,
/// relleno sin igualdades, relleno libre si hace falta, barajar y
/// repartir.
pub fn generate_comparison_round_choi(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    count: usize,
    rng: &mut StdRng,
) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    let mut zeros_used: u32 = 0;
    let mut push = |questions: &mut Vec<Question>, zeros_used: &mut u32, q: Question| {
        if q.contains_zero() {
            *zeros_used += 1;
        }
        questions.push(q);
    };

    for _ in 0..NUM_EQUALS_IN_COMPARISON_ROUND {
        let allow_zero = zeros_used < crate::config::ZERO_LIMIT;
        match generate_equals_comparison_question(difficulty, signatures, allow_zero, rng) {
            Ok(q) => push(&mut questions, &mut zeros_used, q),
            Err(_) => {
                // Garantía directa: un A = A estándar.
                let fallback = generate_standard(
                    difficulty,
                    signatures,
                    ComparisonGenOptions {
                        allow_zero,
                        force_equals: true,
                        ..Default::default()
                    },
                    rng,
                );
                if let Ok(q) = fallback {
                    push(&mut questions, &mut zeros_used, q);
                }
            }
        }
    }

    while questions.len() < count {
        let q = generate_comparison_question(
            difficulty,
            signatures,
            ComparisonGenOptions {
                allow_zero: zeros_used < crate::config::ZERO_LIMIT,
                force_not_equals: true,
                ..Default::default()
            },
            rng,
        );
        match q {
            Ok(q) => push(&mut questions, &mut zeros_used, q),
            Err(_) => break,
        }
    }

    while questions.len() < count {
        match generate_comparison_question(
            difficulty,
            signatures,
            ComparisonGenOptions {
                allow_zero: zeros_used < crate::config::ZERO_LIMIT,
                ..Default::default()
            },
            rng,
        ) {
            Ok(q) => push(&mut questions, &mut zeros_used, q),
            Err(_) => break,
        }
    }

    questions.truncate(count);
    let mut questions = shuffled(&questions, rng);
    declump_equals(&mut questions);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn count_equals(questions: &[Question]) -> usize {
        questions.iter().filter(|q| q.is_equals_comparison()).count()
    }

    #[test]
    fn force_equals_produce_signo_igual() {
        let mut rng = rng(1);
        let mut sigs = SignatureSet::new();
        for _ in 0..10 {
            let q = generate_equals_comparison_question(
                DifficultyLevel::Mam,
                &mut sigs,
                true,
                &mut rng,
            )
            .expect("debe generar");
            assert!(q.is_equals_comparison());
        }
    }

    #[test]
    fn force_not_equals_nunca_da_igual() {
        let mut rng = rng(2);
        let mut sigs = SignatureSet::new();
        let opts = ComparisonGenOptions {
            force_not_equals: true,
            ..Default::default()
        };
        for _ in 0..30 {
            if let Ok(q) = generate_comparison_question(
                DifficultyLevel::Choi,
                &mut sigs,
                opts,
                &mut rng,
            ) {
                assert!(!q.is_equals_comparison());
            }
        }
    }

    #[test]
    fn la_ronda_de_choi_cumple_suelo_y_reparto() {
        for seed in 0..12 {
            let mut rng = rng(seed);
            let mut sigs = SignatureSet::new();
            let questions =
                generate_comparison_round_choi(DifficultyLevel::Choi, &mut sigs, 20, &mut rng);

            assert_eq!(questions.len(), 20, "seed {seed}");
            assert_eq!(count_equals(&questions), 5, "seed {seed}");
            for pair in questions.windows(2) {
                assert!(
                    !(pair[0].is_equals_comparison() && pair[1].is_equals_comparison()),
                    "dos '=' seguidos con seed {seed}"
                );
            }
        }
    }

    #[test]
    fn las_firmas_de_una_ronda_no_se_repiten() {
        let mut rng = rng(9);
        let mut sigs = SignatureSet::new();
        let questions =
            generate_comparison_round_choi(DifficultyLevel::Choi, &mut sigs, 20, &mut rng);
        // Cada pregunta reclamó una firma propia; con 20 preguntas tiene
        // que haber al menos 20 firmas distintas en el almacén.
        assert!(sigs.len() >= questions.len());
    }

    #[test]
    fn declump_separa_los_iguales() {
        let mut rng = rng(3);
        let mut sigs = SignatureSet::new();
        let mut questions = Vec::new();
        for _ in 0..3 {
            questions.push(
                generate_equals_comparison_question(
                    DifficultyLevel::Mam,
                    &mut sigs,
                    true,
                    &mut rng,
                )
                .unwrap(),
            );
        }
        for _ in 0..3 {
            questions.push(
                generate_comparison_question(
                    DifficultyLevel::Mam,
                    &mut sigs,
                    ComparisonGenOptions {
                        force_not_equals: true,
                        ..Default::default()
                    },
                    &mut rng,
                )
                .unwrap(),
            );
        }
        declump_equals(&mut questions);
        for pair in questions.windows(2) {
            assert!(!(pair[0].is_equals_comparison() && pair[1].is_equals_comparison()));
        }
    }
}
