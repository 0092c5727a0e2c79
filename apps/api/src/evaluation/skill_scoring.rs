//! Skill scoring — rates every canonical skill 0–100 from the full answer set.

use serde_json::Value;
use tracing::{debug, warn};

use crate::evaluation::prompts::SKILL_SCORING_PROMPT;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{extract_json_array, LlmError, TextGenerator};
use crate::models::scorecard::SkillScore;

/// Result of a scoring call that reached the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillScoring {
    /// Exactly one entry per canonical skill, in canonical order.
    pub scores: Vec<SkillScore>,
    /// False when the model output was unusable and every score defaulted to 0.
    pub parsed: bool,
}

pub struct SkillScorer<'a> {
    llm: &'a dyn TextGenerator,
}

impl<'a> SkillScorer<'a> {
    pub fn new(llm: &'a dyn TextGenerator) -> Self {
        Self { llm }
    }

    /// Malformed output degrades to zero scores. Only a failed call is an `Err`,
    /// which the pipeline records as a failed evaluation.
    pub async fn score(
        &self,
        skills: &[String],
        answers: &[String],
    ) -> Result<SkillScoring, LlmError> {
        if skills.is_empty() {
            return Ok(SkillScoring {
                scores: Vec::new(),
                parsed: true,
            });
        }

        let answers_text = answers
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}. {}", i + 1, a.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = SKILL_SCORING_PROMPT
            .replace("{json_only}", JSON_ONLY_INSTRUCTION)
            .replace("{skills}", &skills.join(", "))
            .replace("{answers}", &answers_text);

        let raw = self.llm.generate(&prompt).await?;

        match parse_skill_scores(&raw) {
            Ok(returned) => {
                debug!("Model scored {} skills", returned.len());
                Ok(SkillScoring {
                    scores: reconcile(skills, &returned),
                    parsed: true,
                })
            }
            Err(reason) => {
                warn!("Unusable skill scores ({reason}); defaulting to 0");
                Ok(SkillScoring {
                    scores: default_skill_scores(skills),
                    parsed: false,
                })
            }
        }
    }
}

/// Locates the outermost JSON array and validates every element is `{skill: string, score: number}`.
pub fn parse_skill_scores(raw: &str) -> Result<Vec<(String, f64)>, String> {
    let array_text = extract_json_array(raw).ok_or("no JSON array in response")?;
    let value: Value =
        serde_json::from_str(array_text).map_err(|e| format!("not JSON: {e}"))?;
    let items = value.as_array().ok_or("not an array")?;

    items
        .iter()
        .map(|item| -> Result<(String, f64), String> {
            let skill = item
                .get("skill")
                .and_then(Value::as_str)
                .ok_or("entry without a string skill")?;
            let score = item
                .get("score")
                .and_then(Value::as_f64)
                .ok_or("entry without a numeric score")?;
            Ok((skill.to_string(), score))
        })
        .collect()
}

/// One entry per canonical skill. Names match case-insensitively; the first
/// match wins and unmatched skills score 0. Extra returned names are ignored.
pub fn reconcile(skills: &[String], returned: &[(String, f64)]) -> Vec<SkillScore> {
    skills
        .iter()
        .map(|skill| {
            let wanted = skill.trim().to_lowercase();
            let score = returned
                .iter()
                .find(|(name, _)| name.trim().to_lowercase() == wanted)
                .map(|(_, score)| clamp_score(*score))
                .unwrap_or(0);
            SkillScore {
                skill: skill.clone(),
                score,
            }
        })
        .collect()
}

pub fn default_skill_scores(skills: &[String]) -> Vec<SkillScore> {
    skills
        .iter()
        .map(|skill| SkillScore {
            skill: skill.clone(),
            score: 0,
        })
        .collect()
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}
