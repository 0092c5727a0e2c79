//! Interview question generation from an extracted skill list.

use tracing::{debug, warn};

use crate::evaluation::prompts::QUESTION_GENERATION_PROMPT;
use crate::llm_client::TextGenerator;

pub const MAX_GENERATED_QUESTIONS: usize = 5;

pub struct QuestionGenerator<'a> {
    llm: &'a dyn TextGenerator,
    role: &'a str,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(llm: &'a dyn TextGenerator, role: &'a str) -> Self {
        Self { llm, role }
    }

    /// Returns an empty list on generative-service failure; the caller can
    /// still proceed with manual questions only.
    pub async fn generate(&self, skills: &[String]) -> Vec<String> {
        let skills_text = if skills.is_empty() {
            "general software engineering".to_string()
        } else {
            skills.join(", ")
        };
        let prompt = QUESTION_GENERATION_PROMPT
            .replace("{role}", self.role)
            .replace("{skills}", &skills_text);

        match self.llm.generate(&prompt).await {
            Ok(raw) => {
                let questions = parse_question_lines(&raw);
                debug!("Generated {} interview questions", questions.len());
                questions
            }
            Err(e) => {
                warn!("Question generation failed: {e}");
                Vec::new()
            }
        }
    }
}

/// One question per line with any leading `N.` / `N)` token removed.
///
/// Preamble lines are dropped before the cap is applied: lines ending in `:`
/// ("Here are five questions:"), and any unnumbered line when the response
/// numbers its questions.
pub fn parse_question_lines(raw: &str) -> Vec<String> {
    let lines: Vec<(bool, &str)> = raw
        .lines()
        .map(split_numbering)
        .filter(|(_, text)| !text.is_empty() && !text.ends_with(':'))
        .collect();

    let any_numbered = lines.iter().any(|(numbered, _)| *numbered);

    lines
        .into_iter()
        .filter(|(numbered, _)| *numbered || !any_numbered)
        .map(|(_, text)| text.to_string())
        .take(MAX_GENERATED_QUESTIONS)
        .collect()
}

/// Appends reviewer-supplied questions after the generated ones. Blank entries are ignored.
pub fn append_manual_questions(questions: &mut Vec<String>, manual: &[String]) {
    questions.extend(
        manual
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .map(String::from),
    );
}

fn split_numbering(line: &str) -> (bool, &str) {
    let line = line.trim();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return (true, rest.trim());
        }
    }
    (false, line)
}
