use criterion::{black_box, criterion_group, criterion_main, Criterion};

use leveltest_core::model::{Answer, Question, QuestionCategory};
use leveltest_core::scoring::{score, ProficiencyLevel};

fn make_set(count: usize, correct_every: usize) -> (Vec<Question>, Vec<Answer>) {
    let categories = [
        QuestionCategory::Vocabulary,
        QuestionCategory::Grammar,
        QuestionCategory::Reading,
        QuestionCategory::Listening,
    ];
    let questions: Vec<Question> = (0..count)
        .map(|i| Question {
            id: i as i64 + 1,
            text: format!("question {i}"),
            category: categories[i % categories.len()],
            options: vec!["right".into(), "wrong".into()],
            correct_answer: "right".into(),
            narration_text: None,
        })
        .collect();
    let answers: Vec<Answer> = (0..count)
        .map(|i| {
            let pick = if i % correct_every == 0 { "right" } else { "wrong" };
            Answer {
                question_id: i as i64 + 1,
                selected_text: pick.into(),
                is_correct: pick == "right",
                response_time_seconds: 3.2,
            }
        })
        .collect();
    (questions, answers)
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for &count in &[12usize, 100, 1000] {
        let (questions, answers) = make_set(count, 3);
        group.bench_function(format!("n={count}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| ProficiencyLevel::classify(black_box(70.0)))
    });
}

criterion_group!(benches, bench_score, bench_classify);
criterion_main!(benches);
