//! quizmark-report — Gradebook output for grade reports.

pub mod html;
