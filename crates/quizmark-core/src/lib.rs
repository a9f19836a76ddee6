//! quizmark-core — Scoring engine, grading, and data model.
//!
//! This crate defines the quiz data model, the answer evaluator and score
//! normalizer, rubric aggregation, and the batch grading engine that the
//! quizmark CLI builds on.

pub mod attempt;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod grading;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod rubric;
pub mod statistics;
pub mod store;
