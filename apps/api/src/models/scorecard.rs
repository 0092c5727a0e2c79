use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::ResumeSnapshot;

// ────────────────────────────────────────────────────────────────────────────
// Evaluation results
// ────────────────────────────────────────────────────────────────────────────

/// The kind of answer the evaluator inferred. Selects the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Technical,
    Practical,
    Challenge,
    Unknown,
}

impl AnswerType {
    /// Case-insensitive parse; anything outside the three known kinds is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "technical" => AnswerType::Technical,
            "practical" => AnswerType::Practical,
            "challenge" => AnswerType::Challenge,
            _ => AnswerType::Unknown,
        }
    }

    pub fn rubric(self) -> &'static [&'static str] {
        match self {
            AnswerType::Technical => &["terminology", "process", "tool_usage", "logic"],
            AnswerType::Practical => &["problem_clarity", "relevance", "outcome"],
            AnswerType::Challenge => &["depth", "applicability", "confidence"],
            AnswerType::Unknown => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub criterion: String,
    pub score: f64,
}

/// Score breakdown for one answer. Index-aligned with `Scorecard::answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedAnswer {
    #[serde(rename = "type")]
    pub answer_type: Option<AnswerType>,
    pub scores: Vec<RubricScore>,
    /// 0–100.
    pub total: f64,
}

impl EvaluatedAnswer {
    /// `{ type: null, scores: [], total: 0 }` — used for short answers and unusable model output.
    pub fn fallback() -> Self {
        Self {
            answer_type: None,
            scores: Vec::new(),
            total: 0.0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.answer_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    pub score: u8,
}

/// Whether a scorecard's numbers came from the model or from fallbacks.
/// Separates "evaluated but scored zero" from "evaluation degraded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Complete,
    Partial,
    Failed,
}

impl EvaluationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::Complete => "complete",
            EvaluationStatus::Partial => "partial",
            EvaluationStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "complete" => Some(EvaluationStatus::Complete),
            "partial" => Some(EvaluationStatus::Partial),
            "failed" => Some(EvaluationStatus::Failed),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Review status state machine
// ────────────────────────────────────────────────────────────────────────────

/// Review state of a scorecard. A single variant, so two outcomes can never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewStatus {
    Submitted,
    Screening,
    Shortlisted,
    Rejected { feedback: String },
    AnotherRoundRequested { email_sent: bool },
    ApprovedForClient { feedback: String },
}

/// A reviewer decision applied to a `ReviewStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Screen,
    Shortlist,
    Reject { feedback: String },
    RequestAnotherRound,
    Approve { feedback: String },
}

impl ReviewAction {
    pub fn name(&self) -> &'static str {
        match self {
            ReviewAction::Screen => "screen",
            ReviewAction::Shortlist => "shortlist",
            ReviewAction::Reject { .. } => "reject",
            ReviewAction::RequestAnotherRound => "request another round for",
            ReviewAction::Approve { .. } => "approve",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} a scorecard in state '{from}'")]
pub struct TransitionError {
    pub from: &'static str,
    pub action: &'static str,
}

impl ReviewStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ReviewStatus::Submitted => "submitted",
            ReviewStatus::Screening => "screening",
            ReviewStatus::Shortlisted => "shortlisted",
            ReviewStatus::Rejected { .. } => "rejected",
            ReviewStatus::AnotherRoundRequested { .. } => "another_round_requested",
            ReviewStatus::ApprovedForClient { .. } => "approved_for_client",
        }
    }

    /// Total over every (state, action) pair: either the next state or a `TransitionError`.
    ///
    /// submitted → screening → shortlisted → approved_for_client, with rejected and
    /// another_round_requested reachable from any open state. After another round the
    /// candidate re-enters screening or the shortlist, or is rejected. Re-applying the
    /// action that produced the current state is accepted and rewrites its payload.
    pub fn apply(&self, action: &ReviewAction) -> Result<ReviewStatus, TransitionError> {
        use ReviewStatus::*;

        let next = match (self, action) {
            (Submitted | Screening | AnotherRoundRequested { .. }, ReviewAction::Screen) => {
                Screening
            }
            (
                Submitted | Screening | Shortlisted | AnotherRoundRequested { .. },
                ReviewAction::Shortlist,
            ) => Shortlisted,
            (
                Submitted
                | Screening
                | Shortlisted
                | Rejected { .. }
                | AnotherRoundRequested { .. },
                ReviewAction::Reject { feedback },
            ) => Rejected {
                feedback: feedback.clone(),
            },
            (Submitted | Screening | Shortlisted, ReviewAction::RequestAnotherRound) => {
                AnotherRoundRequested { email_sent: false }
            }
            (AnotherRoundRequested { email_sent }, ReviewAction::RequestAnotherRound) => {
                AnotherRoundRequested {
                    email_sent: *email_sent,
                }
            }
            (Shortlisted | ApprovedForClient { .. }, ReviewAction::Approve { feedback }) => {
                ApprovedForClient {
                    feedback: feedback.clone(),
                }
            }
            _ => {
                return Err(TransitionError {
                    from: self.name(),
                    action: action.name(),
                })
            }
        };

        Ok(next)
    }

    /// Boolean view kept for clients that read the individual review flags.
    pub fn flags(&self) -> ReviewFlags {
        let mut flags = ReviewFlags::default();
        match self {
            ReviewStatus::Rejected { feedback } => {
                flags.is_rejected = true;
                flags.reject_feedback = feedback.clone();
                flags.feedback = feedback.clone();
            }
            ReviewStatus::AnotherRoundRequested { email_sent } => {
                flags.request_another_round = true;
                flags.email_sent = *email_sent;
            }
            ReviewStatus::ApprovedForClient { feedback } => {
                flags.is_approved = true;
                flags.feedback = feedback.clone();
            }
            ReviewStatus::Submitted | ReviewStatus::Screening | ReviewStatus::Shortlisted => {}
        }
        flags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewFlags {
    pub is_approved: bool,
    pub is_rejected: bool,
    pub reject_feedback: String,
    pub request_another_round: bool,
    pub email_sent: bool,
    pub feedback: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Scorecard entity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub id: Uuid,
    pub candidate_id: String,
    pub job_id: String,
    pub resume: ResumeSnapshot,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub evaluated_answers: Vec<EvaluatedAnswer>,
    pub skill_scores: Vec<SkillScore>,
    pub average_score: i32,
    pub evaluation_status: EvaluationStatus,
    pub status: ReviewStatus,
    pub note: String,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API representation: the scorecard plus its derived review flags.
#[derive(Debug, Clone, Serialize)]
pub struct ScorecardView {
    #[serde(flatten)]
    pub scorecard: Scorecard,
    #[serde(flatten)]
    pub flags: ReviewFlags,
}

impl From<Scorecard> for ScorecardView {
    fn from(scorecard: Scorecard) -> Self {
        let flags = scorecard.status.flags();
        Self { scorecard, flags }
    }
}

/// Everything the evaluation pipeline produces. The store assigns id, status and timestamps.
#[derive(Debug, Clone)]
pub struct NewScorecard {
    pub candidate_id: String,
    pub job_id: String,
    pub resume: ResumeSnapshot,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub evaluated_answers: Vec<EvaluatedAnswer>,
    pub skill_scores: Vec<SkillScore>,
    pub average_score: i32,
    pub evaluation_status: EvaluationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Field-level partial update. The resume snapshot and evaluation results are not patchable.
#[derive(Debug, Clone, Default)]
pub struct ScorecardPatch {
    pub status: Option<ReviewStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorecardFilter {
    pub job_id: Option<String>,
    pub candidate_id: Option<String>,
}

impl ScorecardFilter {
    pub fn matches(&self, scorecard: &Scorecard) -> bool {
        self.job_id.as_ref().map_or(true, |j| *j == scorecard.job_id)
            && self
                .candidate_id
                .as_ref()
                .map_or(true, |c| *c == scorecard.candidate_id)
    }
}

#[derive(Debug, FromRow)]
pub struct ScorecardRow {
    pub id: Uuid,
    pub candidate_id: String,
    pub job_id: String,
    pub resume: Json<ResumeSnapshot>,
    pub questions: Json<Vec<String>>,
    pub answers: Json<Vec<String>>,
    pub evaluated_answers: Json<Vec<EvaluatedAnswer>>,
    pub skill_scores: Json<Vec<SkillScore>>,
    pub average_score: i32,
    pub evaluation_status: String,
    pub status: Json<ReviewStatus>,
    pub note: String,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScorecardRow> for Scorecard {
    type Error = anyhow::Error;

    fn try_from(row: ScorecardRow) -> Result<Self, Self::Error> {
        let evaluation_status = EvaluationStatus::parse(&row.evaluation_status).ok_or_else(|| {
            anyhow!(
                "scorecard {} has unknown evaluation_status '{}'",
                row.id,
                row.evaluation_status
            )
        })?;

        Ok(Scorecard {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            resume: row.resume.0,
            questions: row.questions.0,
            answers: row.answers.0,
            evaluated_answers: row.evaluated_answers.0,
            skill_scores: row.skill_scores.0,
            average_score: row.average_score,
            evaluation_status,
            status: row.status.0,
            note: row.note,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
