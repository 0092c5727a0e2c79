//! Evaluation pipeline — drives one candidate from resume to persisted scorecard.
//!
//! Flow: extract skills → generate questions → (candidate answers, external) →
//!       evaluate answers concurrently → score skills → persist scorecard.
//!
//! The run is split at the answer-collection suspension point:
//! `prepare_interview` covers everything before it and `complete_evaluation`
//! everything after. Nothing is persisted until scoring has finished, so a run
//! that fails part-way can simply be started again.

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::evaluation::answers::AnswerEvaluator;
use crate::evaluation::questions::{append_manual_questions, QuestionGenerator};
use crate::evaluation::skill_scoring::{default_skill_scores, SkillScorer};
use crate::evaluation::skills::{parse_skill_list, SkillExtractor};
use crate::llm_client::TextGenerator;
use crate::models::resume::ResumeSnapshot;
use crate::models::scorecard::{EvaluatedAnswer, EvaluationStatus, NewScorecard, Scorecard};
use crate::scorecards::store::ScorecardStore;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStage {
    Idle,
    ExtractingSkills,
    GeneratingQuestions,
    AwaitingAnswers,
    Evaluating,
    Scoring,
    Persisted,
}

/// What the interviewer needs before answers can be collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewPlan {
    pub skills: Vec<String>,
    pub questions: Vec<String>,
}

/// Answers collected for a previously prepared `InterviewPlan`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerSubmission {
    pub candidate_id: String,
    pub job_id: String,
    pub resume: ResumeSnapshot,
    /// Skills from `prepare_interview`. Re-extracted from the resume only when empty.
    #[serde(default)]
    pub skills: Vec<String>,
    pub questions: Vec<String>,
    /// `answers[i]` answers `questions[i]`.
    pub answers: Vec<String>,
}

/// Tracks the stage of a single run for logging.
struct Run {
    candidate: String,
    stage: EvaluationStage,
}

impl Run {
    fn new(candidate: &str, stage: EvaluationStage) -> Self {
        Self {
            candidate: candidate.to_string(),
            stage,
        }
    }

    fn advance(&mut self, next: EvaluationStage) {
        debug!("Evaluation of {}: {:?} -> {:?}", self.candidate, self.stage, next);
        self.stage = next;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct EvaluationPipeline<'a> {
    llm: &'a dyn TextGenerator,
    store: &'a dyn ScorecardStore,
    target_role: &'a str,
}

impl<'a> EvaluationPipeline<'a> {
    pub fn new(
        llm: &'a dyn TextGenerator,
        store: &'a dyn ScorecardStore,
        target_role: &'a str,
    ) -> Self {
        Self {
            llm,
            store,
            target_role,
        }
    }

    /// Idle → ExtractingSkills → GeneratingQuestions → AwaitingAnswers.
    ///
    /// Infallible: each generative step degrades to an empty list, and the
    /// reviewer's manual questions are always appended.
    pub async fn prepare_interview(
        &self,
        resume: &ResumeSnapshot,
        manual_questions: &[String],
    ) -> InterviewPlan {
        let mut run = Run::new(&resume.name, EvaluationStage::Idle);

        run.advance(EvaluationStage::ExtractingSkills);
        let skills = SkillExtractor::new(self.llm).extract(resume).await;

        run.advance(EvaluationStage::GeneratingQuestions);
        let mut questions = QuestionGenerator::new(self.llm, self.target_role)
            .generate(&skills)
            .await;
        append_manual_questions(&mut questions, manual_questions);

        run.advance(EvaluationStage::AwaitingAnswers);
        info!(
            "Interview prepared for {}: {} skills, {} questions",
            resume.name,
            skills.len(),
            questions.len()
        );

        InterviewPlan { skills, questions }
    }

    /// AwaitingAnswers → Evaluating → Scoring → Persisted.
    ///
    /// Only validation and persistence errors are returned. Generative failures
    /// are folded into the scorecard as fallback values and an `evaluation_status`.
    pub async fn complete_evaluation(
        &self,
        submission: AnswerSubmission,
    ) -> Result<Scorecard, AppError> {
        validate_submission(&submission)?;

        let mut run = Run::new(&submission.candidate_id, EvaluationStage::AwaitingAnswers);

        run.advance(EvaluationStage::Evaluating);
        let evaluator = AnswerEvaluator::new(self.llm);
        let evaluated_answers: Vec<EvaluatedAnswer> =
            join_all(submission.answers.iter().map(|a| evaluator.evaluate(a))).await;

        run.advance(EvaluationStage::Scoring);
        let (skills, skills_degraded) = self.resolve_skills(&submission).await;
        let (skill_scores, average_score, evaluation_status) = match SkillScorer::new(self.llm)
            .score(&skills, &submission.answers)
            .await
        {
            Ok(scoring) => {
                let degraded = skills_degraded
                    || !scoring.parsed
                    || evaluated_answers.iter().any(EvaluatedAnswer::is_fallback);
                let status = if degraded {
                    EvaluationStatus::Partial
                } else {
                    EvaluationStatus::Complete
                };
                (scoring.scores, average_score(&evaluated_answers), status)
            }
            Err(e) => {
                warn!(
                    "Skill scoring failed for candidate {}: {e}; recording zero scores",
                    submission.candidate_id
                );
                (default_skill_scores(&skills), 0, EvaluationStatus::Failed)
            }
        };

        let scorecard = self
            .store
            .create(NewScorecard {
                candidate_id: submission.candidate_id,
                job_id: submission.job_id,
                resume: submission.resume,
                questions: submission.questions,
                answers: submission.answers,
                evaluated_answers,
                skill_scores,
                average_score,
                evaluation_status,
                submitted_at: Utc::now(),
            })
            .await?;

        run.advance(EvaluationStage::Persisted);
        info!(
            "Scorecard {} persisted for candidate {} (average {}, {})",
            scorecard.id,
            scorecard.candidate_id,
            scorecard.average_score,
            scorecard.evaluation_status.as_str()
        );

        Ok(scorecard)
    }

    /// Reuses the skills the questions were generated from, so both phases
    /// agree. Falls back to a fresh extraction when the caller sent none.
    ///
    /// The flag is true when that extraction came back empty, which marks the run degraded.
    async fn resolve_skills(&self, submission: &AnswerSubmission) -> (Vec<String>, bool) {
        let provided = parse_skill_list(&submission.skills.join(","));
        if !provided.is_empty() {
            return (provided, false);
        }
        debug!(
            "No skills supplied for candidate {}; re-extracting",
            submission.candidate_id
        );
        let extracted = SkillExtractor::new(self.llm).extract(&submission.resume).await;
        if extracted.is_empty() {
            warn!(
                "No skills could be extracted for candidate {}; skill scores will be empty",
                submission.candidate_id
            );
        }
        let degraded = extracted.is_empty();
        (extracted, degraded)
    }
}

/// `floor(mean(totals))`, or 0 when there are no answers.
pub fn average_score(evaluated: &[EvaluatedAnswer]) -> i32 {
    if evaluated.is_empty() {
        return 0;
    }
    let sum: f64 = evaluated.iter().map(|e| e.total).sum();
    (sum / evaluated.len() as f64).floor() as i32
}

fn validate_submission(submission: &AnswerSubmission) -> Result<(), AppError> {
    if submission.candidate_id.trim().is_empty() {
        return Err(AppError::Validation("candidate_id cannot be empty".to_string()));
    }
    if submission.job_id.trim().is_empty() {
        return Err(AppError::Validation("job_id cannot be empty".to_string()));
    }
    if submission.answers.len() != submission.questions.len() {
        return Err(AppError::Validation(format!(
            "expected {} answers (one per question), got {}",
            submission.questions.len(),
            submission.answers.len()
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
