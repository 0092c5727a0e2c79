// Evaluation — resume to interview questions, answers to a scored scorecard.

pub mod answers;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod questions;
pub mod skill_scoring;
pub mod skills;
