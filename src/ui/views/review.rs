use egui::{Context, RichText, ScrollArea};

use crate::app::GameApp;
use crate::model::{
    ComparisonVariant, MathVariant, Question, QuestionKind, RecognitionDisplay, SequenceKind,
};
use crate::ui::layout::centered_panel;

/// Enunciado corto para la lista de repaso.
fn question_statement(q: &Question) -> String {
    match &q.kind {
        QuestionKind::Math(mq) => {
            let op = mq.operator.symbol();
            match &mq.variant {
                MathVariant::Standard {
                    operand1, operand2, ..
                } => format!("{operand1} {op} {operand2} = ?"),
                MathVariant::Balancing {
                    operand1,
                    operand2,
                    operand3,
                    ..
                } => format!("{operand1} {op} {operand2} = {operand3} {op} ?"),
                MathVariant::MultipleChoice {
                    operand1, operand2, ..
                } => format!("{operand1} {op} {operand2} = ?"),
                MathVariant::TrueFalse {
                    operand1,
                    operand2,
                    displayed_result,
                    ..
                } => format!("{operand1} {op} {operand2} = {displayed_result}"),
            }
        }
        QuestionKind::Comparison(cv) => match cv {
            ComparisonVariant::Standard {
                number1, number2, ..
            } => format!("{number1} ? {number2}"),
            ComparisonVariant::Expression {
                operand1,
                operand2,
                operator,
                compare_to,
                ..
            } => format!("{operand1} {} {operand2} ? {compare_to}", operator.symbol()),
            ComparisonVariant::TrueFalse {
                number1,
                number2,
                displayed,
                ..
            } => format!("{number1} {} {number2}", displayed.symbol()),
        },
        QuestionKind::Counting(cq) => format!("{} × {}", cq.icon, cq.count),
        QuestionKind::NumberRecognition(_) => q.prompt.clone(),
        QuestionKind::MatchingPairs(_) => q.prompt.clone(),
        QuestionKind::NumberSequence(sq) => match &sq.kind {
            SequenceKind::FillBlanks { sequence, .. } => sequence
                .iter()
                .map(|slot| slot.map(|n| n.to_string()).unwrap_or_else(|| "_".into()))
                .collect::<Vec<_>>()
                .join(", "),
            SequenceKind::RuleDetective { with_errors, .. } => with_errors
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            SequenceKind::Sort { scrambled, .. } => scrambled
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        },
        QuestionKind::VisualPattern(vq) => format!("{} ?", vq.displayed_sequence.join(" ")),
        QuestionKind::OddOneOut(oq) => oq
            .options
            .iter()
            .map(|o| o.emoji.clone())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn correct_answer_text(q: &Question) -> String {
    match &q.kind {
        QuestionKind::Math(mq) => match &mq.variant {
            MathVariant::Standard { answer, .. } => answer.to_string(),
            MathVariant::Balancing { answer, .. } => answer.to_string(),
            MathVariant::MultipleChoice { answer, .. } => answer.to_string(),
            MathVariant::TrueFalse { answer, .. } => {
                if *answer { "Đúng" } else { "Sai" }.to_string()
            }
        },
        QuestionKind::Comparison(cv) => match cv {
            ComparisonVariant::Standard { answer, .. }
            | ComparisonVariant::Expression { answer, .. } => answer.symbol().to_string(),
            ComparisonVariant::TrueFalse { answer, .. } => {
                if *answer { "Đúng" } else { "Sai" }.to_string()
            }
        },
        QuestionKind::Counting(cq) => cq.count.to_string(),
        QuestionKind::NumberRecognition(rq) => rq
            .options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| match &o.display {
                RecognitionDisplay::Items { icon, count } => format!("{count} × {icon}"),
                RecognitionDisplay::Number(n) => n.to_string(),
            })
            .unwrap_or_default(),
        QuestionKind::MatchingPairs(_) => "—".to_string(),
        QuestionKind::NumberSequence(sq) => match &sq.kind {
            SequenceKind::FillBlanks { full_sequence, .. }
            | SequenceKind::RuleDetective { full_sequence, .. } => full_sequence
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            SequenceKind::Sort { sorted, .. } => sorted
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        },
        QuestionKind::VisualPattern(vq) => vq
            .options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| o.emoji.clone())
            .unwrap_or_default(),
        QuestionKind::OddOneOut(oq) => oq
            .options
            .iter()
            .find(|o| o.id == oq.correct_answer_id)
            .map(|o| o.emoji.clone())
            .unwrap_or_default(),
    }
}

pub fn ui_review(app: &mut GameApp, ctx: &Context) {
    centered_panel(ctx, 540.0, 640.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("📝 Cùng xem lại các câu sai nhé");
            ui.add_space(10.0);
        });

        if app.stored_sessions.is_empty() {
            ui.label("Chưa có vòng chơi nào được lưu.");
            return;
        }

        ScrollArea::vertical().max_height(440.0).show(ui, |ui| {
            for (i, session) in app.stored_sessions.iter().enumerate() {
                ui.group(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "Vòng {} · {} · Đúng {}/{}",
                            i + 1,
                            session.difficulty.title(),
                            session.score,
                            session.total_questions
                        ))
                        .strong(),
                    );

                    if session.incorrect_attempts.is_empty() {
                        ui.label("🎉 Không sai câu nào!");
                    }
                    for attempt in &session.incorrect_attempts {
                        ui.separator();
                        ui.label(question_statement(&attempt.question));
                        ui.label(format!("Bé trả lời: {}", attempt.user_answer));
                        ui.label(
                            RichText::new(format!(
                                "Đáp án đúng: {}",
                                correct_answer_text(&attempt.question)
                            ))
                            .color(egui::Color32::from_rgb(0x2e, 0xb8, 0x50)),
                        );
                    }
                });
                ui.add_space(8.0);
            }
        });
    });
}
