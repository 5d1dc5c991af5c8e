//! frqtutor-core — Persona orchestration, quality gates, and evaluation.
//!
//! This crate implements the tutoring pipeline: five persona agents over a
//! single LLM completion backend, quality-gated free-response-question
//! generation, and sentence-level fact checking of student responses.

pub mod error;
pub mod evaluator;
pub mod generator;
pub mod persona;
pub mod quality;
pub mod retry;
pub mod segment;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_util;
