use egui::{Context, RichText, Ui};

use crate::app::{GameApp, RoundState, RoundStatus};
use crate::model::{
    CardFace, CmpSign, ComparisonVariant, ExpressionSide, MathVariant, Question, QuestionKind,
    RecognitionDisplay, SequenceKind, UserAnswer,
};
use crate::ui::helpers::{answer_button, feedback_label};
use crate::ui::layout::{centered_panel, two_button_row};
use crate::ui::views::summary;

enum GameAction {
    Start,
    Submit(UserAnswer),
    SelectPair(String),
}

pub fn ui_game(app: &mut GameApp, ctx: &Context) {
    let now = ctx.input(|i| i.time);
    if app.round.is_none() {
        app.volver_al_menu();
        return;
    }

    let mut action: Option<GameAction> = None;

    centered_panel(ctx, 540.0, 640.0, |ui| {
        let Some(round) = app.round_mut_opt() else {
            return;
        };

        ui.vertical_centered(|ui| {
            // Cabecera de la ronda
            ui.horizontal(|ui| {
                let shown = (round.current_index + 1).min(round.num_questions_target);
                ui.label(format!("Câu {}/{}", shown, round.num_questions_target));
                ui.separator();
                ui.label(format!("Đúng: {}", round.score));
                if let Some(time) = round.time_display() {
                    ui.separator();
                    let low = round.time_left.map(|t| t <= 15).unwrap_or(false);
                    let text = RichText::new(format!("⏱️ {time}")).strong();
                    ui.label(if low {
                        text.color(egui::Color32::RED)
                    } else {
                        text
                    });
                }
            });
            ui.add_space(10.0);

            match round.status {
                RoundStatus::Countdown => {
                    ui.add_space(30.0);
                    ui.label(RichText::new("Bé sẵn sàng chưa?").size(30.0).strong());
                    ui.add_space(16.0);
                    if answer_button(ui, "🚀 Bắt đầu!", 220.0, true) {
                        action = Some(GameAction::Start);
                    }
                }
                RoundStatus::Ended => {
                    // Los carteles finales se dibujan como ventanas aparte.
                }
                RoundStatus::Playing => {
                    let Some(question) = round.current_question().cloned() else {
                        return;
                    };
                    ui.label(RichText::new(&question.prompt).size(22.0));
                    ui.add_space(12.0);
                    draw_question(ui, round, &question, &mut action);

                    ui.add_space(12.0);
                    if let Some(feedback) = round.feedback.clone() {
                        feedback_label(ui, &feedback);
                    }
                }
            }
        });
    });

    let (times_up, end_overlay) = app
        .round_opt()
        .map(|r| (r.show_times_up_overlay, r.show_end_overlay))
        .unwrap_or((false, false));
    if times_up {
        egui::Window::new("times_up")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new("⏰ HẾT GIỜ RỒI!").size(36.0).strong());
            });
    }
    if end_overlay {
        summary::ui_end_overlay(app, ctx);
    }

    match action {
        Some(GameAction::Start) => app.empezar_cronometro(now),
        Some(GameAction::Submit(answer)) => app.procesar_respuesta(answer, now),
        Some(GameAction::SelectPair(id)) => app.seleccionar_item_pareja(&id, now),
        None => {}
    }
}

fn big_statement(ui: &mut Ui, text: String) {
    ui.label(RichText::new(text).size(34.0).strong());
    ui.add_space(10.0);
}

/// Entrada numérica con botón de envío.
fn number_input_row(ui: &mut Ui, round: &mut RoundState, action: &mut Option<GameAction>) {
    let enabled = !round.input_disabled;
    ui.horizontal(|ui| {
        ui.add_space((ui.available_width() - 260.0).max(0.0) / 2.0);
        ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut round.input)
                .desired_width(100.0)
                .font(egui::TextStyle::Heading),
        );
        if answer_button(ui, "Trả lời", 140.0, enabled) {
            if let Ok(n) = round.input.trim().parse::<i32>() {
                *action = Some(GameAction::Submit(UserAnswer::Number(n)));
            }
        }
    });
}

fn true_false_row(ui: &mut Ui, enabled: bool, action: &mut Option<GameAction>) {
    ui.horizontal(|ui| {
        ui.add_space((ui.available_width() - 300.0).max(0.0) / 2.0);
        if answer_button(ui, "✔ Đúng", 140.0, enabled) {
            *action = Some(GameAction::Submit(UserAnswer::Bool(true)));
        }
        if answer_button(ui, "✘ Sai", 140.0, enabled) {
            *action = Some(GameAction::Submit(UserAnswer::Bool(false)));
        }
    });
}

fn draw_question(
    ui: &mut Ui,
    round: &mut RoundState,
    question: &Question,
    action: &mut Option<GameAction>,
) {
    let enabled = !round.input_disabled;
    match &question.kind {
        QuestionKind::Math(mq) => {
            let op = mq.operator.symbol();
            match &mq.variant {
                MathVariant::Standard {
                    operand1,
                    operand2,
                    result,
                    unknown,
                    ..
                } => {
                    let text = match unknown {
                        crate::model::UnknownSlot::Result => {
                            format!("{operand1} {op} {operand2} = ?")
                        }
                        crate::model::UnknownSlot::Operand2 => {
                            format!("{operand1} {op} ? = {result}")
                        }
                        crate::model::UnknownSlot::Operand1 => {
                            format!("? {op} {operand2} = {result}")
                        }
                    };
                    big_statement(ui, text);
                    number_input_row(ui, round, action);
                }
                MathVariant::Balancing {
                    operand1,
                    operand2,
                    operand3,
                    ..
                } => {
                    big_statement(ui, format!("{operand1} {op} {operand2} = {operand3} {op} ?"));
                    number_input_row(ui, round, action);
                }
                MathVariant::MultipleChoice {
                    operand1,
                    operand2,
                    options,
                    ..
                } => {
                    big_statement(ui, format!("{operand1} {op} {operand2} = ?"));
                    ui.horizontal(|ui| {
                        ui.add_space((ui.available_width() - 320.0).max(0.0) / 2.0);
                        for option in options {
                            if answer_button(ui, &option.value.to_string(), 100.0, enabled) {
                                *action = Some(GameAction::Submit(UserAnswer::Choice(
                                    option.id.clone(),
                                )));
                            }
                        }
                    });
                }
                MathVariant::TrueFalse {
                    operand1,
                    operand2,
                    displayed_result,
                    ..
                } => {
                    big_statement(ui, format!("{operand1} {op} {operand2} = {displayed_result}"));
                    true_false_row(ui, enabled, action);
                }
            }
        }

        QuestionKind::Comparison(cv) => match cv {
            ComparisonVariant::Standard {
                number1, number2, ..
            } => {
                big_statement(ui, format!("{number1}  ❓  {number2}"));
                sign_row(ui, enabled, action);
            }
            ComparisonVariant::Expression {
                operand1,
                operand2,
                operator,
                compare_to,
                side,
                ..
            } => {
                let expression = format!("{operand1} {} {operand2}", operator.symbol());
                let text = match side {
                    ExpressionSide::Left => format!("{expression}  ❓  {compare_to}"),
                    ExpressionSide::Right => format!("{compare_to}  ❓  {expression}"),
                };
                big_statement(ui, text);
                sign_row(ui, enabled, action);
            }
            ComparisonVariant::TrueFalse {
                number1,
                number2,
                displayed,
                ..
            } => {
                big_statement(ui, format!("{number1} {} {number2}", displayed.symbol()));
                true_false_row(ui, enabled, action);
            }
        },

        QuestionKind::Counting(cq) => {
            ui.label(
                RichText::new(cq.icon.repeat(cq.count as usize))
                    .size(30.0),
            );
            ui.add_space(10.0);
            number_input_row(ui, round, action);
        }

        QuestionKind::NumberRecognition(rq) => {
            ui.vertical_centered(|ui| {
                for option in &rq.options {
                    let label = match &option.display {
                        RecognitionDisplay::Items { icon, count } => icon.repeat(*count as usize),
                        RecognitionDisplay::Number(n) => n.to_string(),
                    };
                    if answer_button(ui, &label, 360.0, enabled) {
                        *action = Some(GameAction::Submit(UserAnswer::Choice(option.id.clone())));
                    }
                    ui.add_space(6.0);
                }
            });
        }

        QuestionKind::MatchingPairs(mq) => {
            ui.horizontal_wrapped(|ui| {
                for item in &mq.items {
                    let label = match &item.face {
                        CardFace::Digit(v) => v.to_string(),
                        CardFace::IconGroup { icon, count } => icon.repeat(*count as usize),
                    };
                    if item.is_matched {
                        ui.add_enabled(
                            false,
                            egui::Button::new(RichText::new(format!("✔ {label}")).size(20.0)),
                        );
                    } else {
                        let response = ui.add_enabled(
                            enabled,
                            egui::Button::new(RichText::new(&label).size(20.0))
                                .selected(item.is_selected),
                        );
                        if response.clicked() {
                            *action = Some(GameAction::SelectPair(item.id.clone()));
                        }
                    }
                }
            });
        }

        QuestionKind::NumberSequence(sq) => draw_sequence(ui, round, &sq.kind, action),

        QuestionKind::VisualPattern(vq) => {
            let shown = vq.displayed_sequence.join("  ");
            big_statement(ui, format!("{shown}  ❓"));
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 340.0).max(0.0) / 2.0);
                for option in &vq.options {
                    if answer_button(ui, &option.emoji, 80.0, enabled) {
                        *action = Some(GameAction::Submit(UserAnswer::Choice(option.id.clone())));
                    }
                }
            });
        }

        QuestionKind::OddOneOut(oq) => {
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 340.0).max(0.0) / 2.0);
                for option in &oq.options {
                    if answer_button(ui, &option.emoji, 80.0, enabled) {
                        *action = Some(GameAction::Submit(UserAnswer::Choice(option.id.clone())));
                    }
                }
            });
        }
    }
}

fn sign_row(ui: &mut Ui, enabled: bool, action: &mut Option<GameAction>) {
    ui.horizontal(|ui| {
        ui.add_space((ui.available_width() - 310.0).max(0.0) / 2.0);
        for sign in [CmpSign::Less, CmpSign::Equal, CmpSign::Greater] {
            if answer_button(ui, &sign.symbol().to_string(), 96.0, enabled) {
                *action = Some(GameAction::Submit(UserAnswer::Sign(sign)));
            }
        }
    });
}

fn draw_sequence(
    ui: &mut Ui,
    round: &mut RoundState,
    kind: &SequenceKind,
    action: &mut Option<GameAction>,
) {
    let enabled = !round.input_disabled;
    match kind {
        SequenceKind::FillBlanks {
            sequence, answers, ..
        } => {
            let mut blank_idx = 0;
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - sequence.len() as f32 * 56.0).max(0.0) / 2.0);
                for slot in sequence {
                    match slot {
                        Some(n) => {
                            ui.label(RichText::new(format!(" {n} ")).size(28.0).strong());
                        }
                        None => {
                            if let Some(input) = round.blank_inputs.get_mut(blank_idx) {
                                ui.add_enabled(
                                    enabled,
                                    egui::TextEdit::singleline(input).desired_width(44.0),
                                );
                            }
                            blank_idx += 1;
                        }
                    }
                }
            });
            ui.add_space(10.0);
            if answer_button(ui, "Kiểm tra", 180.0, enabled) {
                // La vista corrige los huecos y el juego solo recibe el
                // desenlace, como en las variantes interactivas.
                let solved = round.blank_inputs.len() == answers.len()
                    && round
                        .blank_inputs
                        .iter()
                        .zip(answers)
                        .all(|(text, answer)| text.trim().parse::<i32>() == Ok(*answer));
                *action = Some(GameAction::Submit(UserAnswer::Solved(solved)));
            }
        }

        SequenceKind::RuleDetective {
            with_errors, errors, ..
        } => {
            ui.label("Bấm vào số sai rồi sửa lại nhé:");
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.add_space(
                    (ui.available_width() - with_errors.len() as f32 * 56.0).max(0.0) / 2.0,
                );
                for (i, n) in with_errors.iter().enumerate() {
                    let selected = round.detective_pick == Some(i);
                    let response = ui.add_enabled(
                        enabled,
                        egui::Button::new(RichText::new(n.to_string()).size(24.0))
                            .selected(selected),
                    );
                    if response.clicked() {
                        round.detective_pick = Some(i);
                    }
                }
            });
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - 300.0).max(0.0) / 2.0);
                ui.label("Số đúng là:");
                ui.add_enabled(
                    enabled,
                    egui::TextEdit::singleline(&mut round.input).desired_width(60.0),
                );
                if answer_button(ui, "Sửa lại", 120.0, enabled) {
                    let (error_index, correct_value) = errors[0];
                    let solved = round.detective_pick == Some(error_index)
                        && round.input.trim().parse::<i32>() == Ok(correct_value);
                    *action = Some(GameAction::Submit(UserAnswer::Solved(solved)));
                }
            });
        }

        SequenceKind::Sort { scrambled, .. } => {
            ui.horizontal(|ui| {
                ui.add_space((ui.available_width() - scrambled.len() as f32 * 64.0).max(0.0) / 2.0);
                for n in scrambled {
                    let already = round.sort_picked.contains(n);
                    if answer_button(ui, &n.to_string(), 56.0, enabled && !already) {
                        round.sort_picked.push(*n);
                    }
                }
            });
            ui.add_space(8.0);
            let picked: Vec<String> = round.sort_picked.iter().map(|n| n.to_string()).collect();
            ui.label(RichText::new(format!("👉 {}", picked.join("  "))).size(24.0));
            ui.add_space(8.0);
            let (clear, done) = two_button_row(ui, 320.0, "🧹 Xóa", "✔ Xong!");
            if clear && enabled {
                round.sort_picked.clear();
            }
            if done && enabled && round.sort_picked.len() == scrambled.len() {
                *action = Some(GameAction::Submit(UserAnswer::Ordering(
                    round.sort_picked.clone(),
                )));
            }
        }
    }
}
