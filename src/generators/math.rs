//! Sumas y restas en cuatro variantes: hueco, balanza, opción múltiple
//! y verdadero/falso.

use rand::rngs::StdRng;
use rand::Rng;

use crate::model::{
    DifficultyLevel, GameMode, MathOperator, MathQuestion, MathVariant, NumberOption, Question,
    QuestionKind, QuestionRequestType, UnknownSlot,
};
use crate::question_utils::{generate_id, shuffled, GenError, GenResult, SignatureSet};

const MAX_ATTEMPTS: u32 = 50;

#[derive(Clone, Copy, Debug)]
pub struct MathGenOptions {
    pub request_type: QuestionRequestType,
    pub allow_zero: bool,
}

impl Default for MathGenOptions {
    fn default() -> Self {
        Self {
            request_type: QuestionRequestType::Standard,
            allow_zero: true,
        }
    }
}

fn mode_for(operator: MathOperator) -> GameMode {
    match operator {
        MathOperator::Plus => GameMode::Addition,
        MathOperator::Minus => GameMode::Subtraction,
    }
}

fn wrap(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    prompt: &str,
    variant: MathVariant,
    rng: &mut StdRng,
) -> Question {
    Question {
        id: generate_id(rng),
        mode: mode_for(operator),
        difficulty,
        prompt: prompt.to_string(),
        kind: QuestionKind::Math(MathQuestion { operator, variant }),
    }
}

/// Muestrea (operando1, operando2, resultado) dentro del rango del nivel.
/// Mầm se mueve en 0-10; Chồi empuja los resultados a 11-20.
fn sample_operands(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    allow_zero: bool,
    rng: &mut StdRng,
) -> Option<(i32, i32, i32)> {
    let choi = difficulty == DifficultyLevel::Choi;
    match operator {
        MathOperator::Plus => {
            let min_result = if choi {
                11
            } else if allow_zero {
                0
            } else {
                2
            };
            let max_result = if choi { 20 } else { 10 };
            if max_result < min_result {
                return None;
            }
            let result = rng.random_range(min_result..=max_result);

            let min_operand = if allow_zero { 0 } else { 1 };
            let max_operand = result - min_operand;
            if max_operand < min_operand {
                return None;
            }
            let o1 = rng.random_range(min_operand..=max_operand);
            Some((o1, result - o1, result))
        }
        MathOperator::Minus => {
            let min_minuend = if choi {
                11
            } else if allow_zero {
                0
            } else {
                1
            };
            let max_minuend = if choi { 20 } else { 10 };
            let o1 = rng.random_range(min_minuend..=max_minuend);

            let min_subtrahend = if allow_zero { 0 } else { 1 };
            let max_subtrahend = o1 - min_subtrahend;
            if max_subtrahend < min_subtrahend {
                return None;
            }
            let o2 = rng.random_range(min_subtrahend..=max_subtrahend);
            Some((o1, o2, o1 - o2))
        }
    }
}

fn standard_signature(operator: MathOperator, o1: i32, o2: i32, res: i32, slot: UnknownSlot) -> String {
    let op = operator.symbol();
    match slot {
        UnknownSlot::Result => {
            // La suma es conmutativa: se ordenan los operandos para que
            // 3+4 y 4+3 compartan firma.
            let (a, b) = if operator == MathOperator::Plus && o1 > o2 {
                (o2, o1)
            } else {
                (o1, o2)
            };
            format!("std-{op}-{a}-{b}-q")
        }
        UnknownSlot::Operand1 => format!("std-{op}-q-{o2}-{res}"),
        UnknownSlot::Operand2 => format!("std-{op}-{o1}-q-{res}"),
    }
}

fn generate_standard(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    signatures: &mut SignatureSet,
    options: MathGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        // El hueco depende del nivel y del tipo de petición: un refuerzo
        // siempre pregunta por el resultado.
        let slot = if options.request_type == QuestionRequestType::Booster {
            UnknownSlot::Result
        } else {
            let p: f64 = rng.random();
            match difficulty {
                DifficultyLevel::Mam => {
                    if p < 0.6 {
                        UnknownSlot::Result
                    } else if p < 0.8 {
                        UnknownSlot::Operand2
                    } else {
                        UnknownSlot::Operand1
                    }
                }
                DifficultyLevel::Choi => {
                    if options.request_type == QuestionRequestType::Challenge {
                        if p < 0.6 {
                            UnknownSlot::Operand2
                        } else {
                            UnknownSlot::Operand1
                        }
                    } else if p < 0.4 {
                        UnknownSlot::Result
                    } else if p < 0.7 {
                        UnknownSlot::Operand2
                    } else {
                        UnknownSlot::Operand1
                    }
                }
            }
        };

        let Some((o1, o2, res)) = sample_operands(difficulty, operator, options.allow_zero, rng)
        else {
            continue;
        };

        if !options.allow_zero && (o1 == 0 || o2 == 0 || res == 0) {
            continue;
        }

        let answer = match slot {
            UnknownSlot::Result => res,
            UnknownSlot::Operand2 => o2,
            UnknownSlot::Operand1 => o1,
        };

        let signature = standard_signature(operator, o1, o2, res, slot);
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                operator,
                "Bé hãy điền số còn thiếu:",
                MathVariant::Standard {
                    operand1: o1,
                    operand2: o2,
                    result: res,
                    unknown: slot,
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

fn generate_balancing(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    signatures: &mut SignatureSet,
    allow_zero: bool,
    rng: &mut StdRng,
) -> GenResult<Question> {
    for _ in 0..MAX_ATTEMPTS {
        let (o1, o2, o3, answer) = match operator {
            MathOperator::Plus => {
                let total = rng.random_range(11..=20);
                let o1 = rng.random_range(1..=(total - 2));
                let o2 = total - o1;
                let o3 = rng.random_range(1..=(total - 2));
                (o1, o2, o3, total - o3)
            }
            MathOperator::Minus => {
                let result = rng.random_range(5..=15);
                let o1 = rng.random_range(result..=19);
                let o2 = o1 - result;
                let o3 = rng.random_range(result..=19);
                (o1, o2, o3, o3 - result)
            }
        };

        if !allow_zero && (o1 == 0 || o2 == 0 || o3 == 0 || answer == 0) {
            continue;
        }
        // Sin lados triviales: la incógnita tiene que ser positiva y los
        // dos lados distintos.
        if answer <= 0 || o2 <= 0 || o1 == o3 {
            continue;
        }

        let left_result = operator.apply(o1, o2);
        let signature = format!("bal-{}-{left_result}-vs-{o3}", operator.symbol());
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                operator,
                "Làm cho hai bên cân bằng nào!",
                MathVariant::Balancing {
                    operand1: o1,
                    operand2: o2,
                    operand3: o3,
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

fn generate_multiple_choice(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    signatures: &mut SignatureSet,
    allow_zero: bool,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let choi = difficulty == DifficultyLevel::Choi;
    for _ in 0..MAX_ATTEMPTS {
        let min_result = if choi {
            11
        } else if allow_zero {
            0
        } else {
            1
        };
        let max_result = if choi { 20 } else { 10 };

        let (o1, o2, answer) = match operator {
            MathOperator::Plus => {
                let answer = rng.random_range(min_result..=max_result);
                let min_operand = if allow_zero { 0 } else { 1 };
                let max_operand = answer - min_operand;
                if max_operand < min_operand {
                    continue;
                }
                let o1 = rng.random_range(min_operand..=max_operand);
                (o1, answer - o1, answer)
            }
            MathOperator::Minus => {
                let o1 = rng.random_range(min_result..=max_result);
                let min_subtrahend = if allow_zero { 0 } else { 1 };
                let max_subtrahend = o1 - min_subtrahend;
                if max_subtrahend < min_subtrahend {
                    continue;
                }
                let o2 = rng.random_range(min_subtrahend..=max_subtrahend);
                (o1, o2, o1 - o2)
            }
        };

        if !allow_zero && (o1 == 0 || o2 == 0 || answer == 0) {
            continue;
        }

        // Dos distractores a ±1/±2, no negativos y distintos entre sí.
        let min_value = if allow_zero { 0 } else { 1 };
        let mut distractors: Vec<i32> = Vec::new();
        while distractors.len() < 2 {
            let offset = *shuffled(&[-2, -1, 1, 2], rng).first().unwrap();
            let value = answer + offset;
            if value >= min_value && value != answer && !distractors.contains(&value) {
                distractors.push(value);
            }
        }

        let mut options = vec![NumberOption {
            id: generate_id(rng),
            value: answer,
            is_correct: true,
        }];
        for value in distractors {
            options.push(NumberOption {
                id: generate_id(rng),
                value,
                is_correct: false,
            });
        }
        let options = shuffled(&options, rng);

        let (a, b) = if operator == MathOperator::Plus && o1 > o2 {
            (o2, o1)
        } else {
            (o1, o2)
        };
        let signature = format!("mc-{}-{a}-{b}", operator.symbol());
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                operator,
                "Chọn đáp án đúng nhé:",
                MathVariant::MultipleChoice {
                    operand1: o1,
                    operand2: o2,
                    options,
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

fn generate_true_false(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    signatures: &mut SignatureSet,
    allow_zero: bool,
    rng: &mut StdRng,
) -> GenResult<Question> {
    let max_num = if difficulty == DifficultyLevel::Choi {
        20
    } else {
        10
    };
    let min_num = if allow_zero { 0 } else { 1 };

    for _ in 0..MAX_ATTEMPTS {
        let (o1, o2, true_result) = match operator {
            MathOperator::Plus => {
                let o1 = rng.random_range(min_num..=max_num / 2);
                let o2 = rng.random_range(min_num..=max_num / 2);
                let sum = o1 + o2;
                if sum > max_num {
                    continue;
                }
                (o1, o2, sum)
            }
            MathOperator::Minus => {
                let o1 = rng.random_range(min_num..=max_num);
                let o2 = rng.random_range(min_num..=o1);
                (o1, o2, o1 - o2)
            }
        };

        if !allow_zero && (o1 == 0 || o2 == 0 || true_result == 0) {
            continue;
        }

        let (displayed_result, answer) = if rng.random_bool(0.5) {
            (true_result, true)
        } else {
            let mut displayed;
            loop {
                let offset = *shuffled(&[-2, -1, 1, 2], rng).first().unwrap();
                displayed = true_result + offset;
                if displayed >= 0 && displayed != true_result {
                    break;
                }
            }
            (displayed, false)
        };

        let (a, b) = if operator == MathOperator::Plus && o1 > o2 {
            (o2, o1)
        } else {
            (o1, o2)
        };
        let signature = format!("tf-{}-{a}-{b}-vs-{displayed_result}", operator.symbol());
        if signatures.claim(&signature) {
            return Ok(wrap(
                difficulty,
                operator,
                "Phép tính này Đúng hay Sai?",
                MathVariant::TrueFalse {
                    operand1: o1,
                    operand2: o2,
                    displayed_result,
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

fn generate_question(
    difficulty: DifficultyLevel,
    operator: MathOperator,
    signatures: &mut SignatureSet,
    options: MathGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    // Los retos de Chồi mezclan la balanza; los refuerzos vuelven al
    // formato estándar con el resultado como hueco.
    if options.request_type == QuestionRequestType::Challenge
        && difficulty == DifficultyLevel::Choi
    {
        if rng.random_bool(0.4) {
            return generate_balancing(difficulty, operator, signatures, options.allow_zero, rng);
        }
        return generate_standard(difficulty, operator, signatures, options, rng);
    }

    if options.request_type == QuestionRequestType::Booster {
        return generate_standard(difficulty, operator, signatures, options, rng);
    }

    let p: f64 = rng.random();
    match difficulty {
        DifficultyLevel::Mam => {
            if p < 0.65 {
                generate_standard(difficulty, operator, signatures, options, rng)
            } else if p < 0.85 {
                generate_multiple_choice(difficulty, operator, signatures, options.allow_zero, rng)
            } else {
                generate_true_false(difficulty, operator, signatures, options.allow_zero, rng)
            }
        }
        DifficultyLevel::Choi => {
            if p < 0.55 {
                generate_standard(difficulty, operator, signatures, options, rng)
            } else if p < 0.80 {
                generate_multiple_choice(difficulty, operator, signatures, options.allow_zero, rng)
            } else {
                generate_true_false(difficulty, operator, signatures, options.allow_zero, rng)
            }
        }
    }
}

pub fn generate_addition_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: MathGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    generate_question(difficulty, MathOperator::Plus, signatures, options, rng)
}

pub fn generate_subtraction_question(
    difficulty: DifficultyLevel,
    signatures: &mut SignatureSet,
    options: MathGenOptions,
    rng: &mut StdRng,
) -> GenResult<Question> {
    generate_question(difficulty, MathOperator::Minus, signatures, options, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn mam_sin_cero_se_queda_en_1_a_10() {
        let mut rng = rng(1);
        let mut sigs = SignatureSet::new();
        let opts = MathGenOptions {
            allow_zero: false,
            ..Default::default()
        };
        for _ in 0..40 {
            let q = generate_standard(
                DifficultyLevel::Mam,
                MathOperator::Plus,
                &mut sigs,
                opts,
                &mut rng,
            )
            .expect("debe generar");
            match q.kind {
                QuestionKind::Math(MathQuestion {
                    variant:
                        MathVariant::Standard {
                            operand1,
                            operand2,
                            result,
                            ..
                        },
                    ..
                }) => {
                    for v in [operand1, operand2, result] {
                        assert!((1..=10).contains(&v), "{v} fuera de rango");
                    }
                }
                _ => panic!("variante inesperada"),
            }
        }
    }

    #[test]
    fn la_firma_conmutativa_bloquea_el_espejo() {
        // Si 3+4=? ya existe, ningún reintento puede devolver 4+3=?.
        let mut rng = rng(2);
        let mut sigs = SignatureSet::new();
        sigs.add("std-+-3-4-q");
        let opts = MathGenOptions::default();
        for _ in 0..300 {
            if let Ok(q) = generate_standard(
                DifficultyLevel::Mam,
                MathOperator::Plus,
                &mut sigs,
                opts,
                &mut rng,
            ) {
                if let QuestionKind::Math(MathQuestion {
                    variant:
                        MathVariant::Standard {
                            operand1,
                            operand2,
                            unknown: UnknownSlot::Result,
                            ..
                        },
                    ..
                }) = q.kind
                {
                    let mut pair = [operand1, operand2];
                    pair.sort();
                    assert_ne!(pair, [3, 4], "reapareció la pregunta espejo");
                }
            }
        }
    }

    #[test]
    fn el_refuerzo_siempre_pregunta_por_el_resultado() {
        let mut rng = rng(3);
        let mut sigs = SignatureSet::new();
        let opts = MathGenOptions {
            request_type: QuestionRequestType::Booster,
            allow_zero: true,
        };
        for _ in 0..20 {
            let q = generate_addition_question(DifficultyLevel::Mam, &mut sigs, opts, &mut rng)
                .expect("debe generar");
            match q.kind {
                QuestionKind::Math(MathQuestion {
                    variant: MathVariant::Standard { unknown, .. },
                    ..
                }) => assert_eq!(unknown, UnknownSlot::Result),
                _ => panic!("el refuerzo debe ser estándar"),
            }
        }
    }

    #[test]
    fn choi_empuja_los_resultados_por_encima_de_diez() {
        let mut rng = rng(4);
        let mut sigs = SignatureSet::new();
        for _ in 0..30 {
            let q = generate_standard(
                DifficultyLevel::Choi,
                MathOperator::Plus,
                &mut sigs,
                MathGenOptions::default(),
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::Math(MathQuestion {
                variant: MathVariant::Standard { result, .. },
                ..
            }) = q.kind
            {
                assert!((11..=20).contains(&result));
            }
        }
    }

    #[test]
    fn opcion_multiple_trae_tres_opciones_distintas_y_una_correcta() {
        // El espacio de firmas de Mầm sin cero es de 25 parejas: no se
        // piden más de 20 para no agotarlo.
        let mut rng = rng(5);
        let mut sigs = SignatureSet::new();
        for _ in 0..20 {
            let q = generate_multiple_choice(
                DifficultyLevel::Mam,
                MathOperator::Plus,
                &mut sigs,
                false,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::Math(MathQuestion {
                variant: MathVariant::MultipleChoice { options, answer, .. },
                ..
            }) = q.kind
            {
                assert_eq!(options.len(), 3);
                assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
                let correct = options.iter().find(|o| o.is_correct).unwrap();
                assert_eq!(correct.value, answer);
                let mut values: Vec<i32> = options.iter().map(|o| o.value).collect();
                values.sort();
                values.dedup();
                assert_eq!(values.len(), 3, "opciones repetidas");
                assert!(values.iter().all(|v| *v >= 1));
            }
        }
    }

    #[test]
    fn verdadero_falso_perturba_como_mucho_en_dos() {
        let mut rng = rng(6);
        let mut sigs = SignatureSet::new();
        for _ in 0..40 {
            let q = generate_true_false(
                DifficultyLevel::Mam,
                MathOperator::Minus,
                &mut sigs,
                true,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::Math(MathQuestion {
                variant:
                    MathVariant::TrueFalse {
                        operand1,
                        operand2,
                        displayed_result,
                        answer,
                    },
                ..
            }) = q.kind
            {
                let real = operand1 - operand2;
                if answer {
                    assert_eq!(displayed_result, real);
                } else {
                    let diff = (displayed_result - real).abs();
                    assert!(diff >= 1 && diff <= 2);
                    assert!(displayed_result >= 0);
                }
            }
        }
    }

    #[test]
    fn la_balanza_nunca_iguala_los_dos_lados_literalmente() {
        let mut rng = rng(7);
        let mut sigs = SignatureSet::new();
        for _ in 0..30 {
            let q = generate_balancing(
                DifficultyLevel::Choi,
                MathOperator::Plus,
                &mut sigs,
                false,
                &mut rng,
            )
            .expect("debe generar");
            if let QuestionKind::Math(MathQuestion {
                variant:
                    MathVariant::Balancing {
                        operand1,
                        operand2,
                        operand3,
                        answer,
                    },
                ..
            }) = q.kind
            {
                assert_eq!(operand1 + operand2, operand3 + answer);
                assert_ne!(operand1, operand3);
                assert!(answer > 0);
            }
        }
    }
}
