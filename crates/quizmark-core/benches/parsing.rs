use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::model::SubmittedAnswer;

fn bench_answer_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("answer_parsing");

    let inputs = [
        ("flag", "true"),
        ("choice_id", r#""b""#),
        ("choice_list", r#"["a", "c", 4, "idk"]"#),
        (
            "essay",
            r#"{"essay_text": "Unit tests check small pieces of code in isolation.", "attachment": {"file_name": "notes.pdf"}}"#,
        ),
        ("malformed", r#"{"unexpected": [1, 2, 3]}"#),
    ];

    for (name, json) in inputs {
        group.bench_function(name, |b| {
            b.iter(|| serde_json::from_str::<SubmittedAnswer>(black_box(json)))
        });
    }

    group.finish();
}

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    // Generate quiz bank TOML strings of various sizes
    let small_toml = generate_quiz_toml(5);
    let medium_toml = generate_quiz_toml(50);
    let large_toml = generate_quiz_toml(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| {
            quizmark_core::parser::parse_quiz_str(
                black_box(&small_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| {
            quizmark_core::parser::parse_quiz_str(
                black_box(&medium_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| {
            quizmark_core::parser::parse_quiz_str(
                black_box(&large_toml),
                black_box("bench.toml".as_ref()),
            )
        })
    });

    group.finish();
}

fn generate_quiz_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[quiz]
id = "bench"
title = "Benchmark"
passing_score = 70
"#,
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
id = "q_{i}"
type = "multiple_choice"
text = "Question {i}"
points = 10
use_partial_credit = true
normalization = {{ method = "minmax", input_min = 0, input_max = 9, output_min = 1, output_max = 10 }}

[[questions.choices]]
id = "a"
is_correct = true
points_value = 5

[[questions.choices]]
id = "b"
points_value = -2

[[questions.choices]]
id = "idk"
is_neutral = true
"#
        ));
    }
    s
}

criterion_group!(benches, bench_answer_parsing, bench_toml_parsing);
criterion_main!(benches);
