//! Answer evaluation — classifies one free-text answer and scores it against
//! the rubric for its type.
//!
//! The evaluator never returns an error. Short answers, service failures and
//! unusable output all produce `EvaluatedAnswer::fallback()`, so one bad
//! response cannot abort the other answers of the same candidate.

use serde_json::Value;
use tracing::warn;

use crate::evaluation::prompts::ANSWER_EVALUATION_PROMPT;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::models::scorecard::{AnswerType, EvaluatedAnswer, RubricScore};

/// Answers shorter than this are not substantive and are never sent to the model.
pub const MIN_ANSWER_CHARS: usize = 10;

pub struct AnswerEvaluator<'a> {
    llm: &'a dyn TextGenerator,
}

impl<'a> AnswerEvaluator<'a> {
    pub fn new(llm: &'a dyn TextGenerator) -> Self {
        Self { llm }
    }

    pub async fn evaluate(&self, answer: &str) -> EvaluatedAnswer {
        let answer = answer.trim();
        if answer.chars().count() < MIN_ANSWER_CHARS {
            return EvaluatedAnswer::fallback();
        }

        let prompt = ANSWER_EVALUATION_PROMPT
            .replace("{json_only}", JSON_ONLY_INSTRUCTION)
            .replace("{answer}", answer);

        let raw = match self.llm.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Answer evaluation call failed: {e}");
                return EvaluatedAnswer::fallback();
            }
        };

        parse_evaluation(&raw).unwrap_or_else(|reason| {
            warn!(
                "Unusable answer evaluation ({reason}): {:?}",
                raw.chars().take(80).collect::<String>()
            );
            EvaluatedAnswer::fallback()
        })
    }
}

/// Tolerant parse of the evaluator's JSON. `Err` carries the reason the output was rejected.
///
/// Requires `type`, `scores` and a numeric `total`. `scores` may be an object
/// keyed by criterion or an array of `{criterion|name, score}` objects.
pub fn parse_evaluation(raw: &str) -> Result<EvaluatedAnswer, String> {
    let value: Value =
        serde_json::from_str(strip_json_fences(raw)).map_err(|e| format!("not JSON: {e}"))?;
    let object = value.as_object().ok_or("not a JSON object")?;

    let answer_type = object
        .get("type")
        .and_then(Value::as_str)
        .map(AnswerType::parse)
        .ok_or("missing type")?;

    let mut scores = parse_scores(object.get("scores").ok_or("missing scores")?)?;
    let rubric = answer_type.rubric();
    scores.sort_by_key(|s| {
        rubric
            .iter()
            .position(|c| *c == s.criterion)
            .unwrap_or(rubric.len())
    });

    let total = object
        .get("total")
        .and_then(as_number)
        .ok_or("missing total")?;

    Ok(EvaluatedAnswer {
        answer_type: Some(answer_type),
        scores,
        total: total.clamp(0.0, 100.0),
    })
}

fn parse_scores(value: &Value) -> Result<Vec<RubricScore>, String> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(criterion, score)| {
                as_number(score).map(|score| RubricScore {
                    criterion: criterion.to_lowercase(),
                    score,
                })
            })
            .collect()),
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| {
                let criterion = item
                    .get("criterion")
                    .or_else(|| item.get("name"))
                    .and_then(Value::as_str)?;
                let score = item.get("score").and_then(as_number)?;
                Some(RubricScore {
                    criterion: criterion.to_lowercase(),
                    score,
                })
            })
            .collect()),
        _ => Err("scores is neither an object nor an array".to_string()),
    }
}

/// Accepts JSON numbers and numeric strings ("80"). Non-finite values ("NaN", "inf") are rejected.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
