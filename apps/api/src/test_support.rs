//! In-memory doubles and fixtures shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::{Config, SmtpConfig};
use crate::errors::AppError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::resume::ResumeSnapshot;
use crate::models::scorecard::{
    EvaluatedAnswer, EvaluationStatus, NewScorecard, ReviewStatus, Scorecard, ScorecardFilter,
    ScorecardPatch, SkillScore,
};
use crate::notifications::{EmailTemplate, NotificationService, NotifyError};
use crate::scorecards::store::ScorecardStore;

// ────────────────────────────────────────────────────────────────────────────
// Generative model
// ────────────────────────────────────────────────────────────────────────────

enum Reply {
    Text(String),
    Fail,
}

/// Answers each prompt with the first rule whose needle the prompt contains.
/// Prompts that match no rule get `LlmError::EmptyContent`.
#[derive(Default)]
pub struct ScriptedGenerator {
    rules: Vec<(String, Reply)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, needle: &str, reply: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Text(reply.to_string())));
        self
    }

    pub fn fail(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail));
        self
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, Reply::Text(text))) => Ok(text.clone()),
            Some((_, Reply::Fail)) => Err(LlmError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryScorecardStore {
    rows: RwLock<Vec<Scorecard>>,
}

impl MemoryScorecardStore {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl ScorecardStore for MemoryScorecardStore {
    async fn create(&self, new: NewScorecard) -> Result<Scorecard, AppError> {
        let now = Utc::now();
        let scorecard = Scorecard {
            id: Uuid::new_v4(),
            candidate_id: new.candidate_id,
            job_id: new.job_id,
            resume: new.resume,
            questions: new.questions,
            answers: new.answers,
            evaluated_answers: new.evaluated_answers,
            skill_scores: new.skill_scores,
            average_score: new.average_score,
            evaluation_status: new.evaluation_status,
            status: ReviewStatus::Submitted,
            note: String::new(),
            submitted_at: new.submitted_at,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(scorecard.clone());
        Ok(scorecard)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Scorecard>, AppError> {
        Ok(self.rows.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn find(&self, filter: &ScorecardFilter) -> Result<Vec<Scorecard>, AppError> {
        let mut found: Vec<Scorecard> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(found)
    }

    async fn patch(&self, id: Uuid, patch: ScorecardPatch) -> Result<Scorecard, AppError> {
        let mut rows = self.rows.write().await;
        let scorecard = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Scorecard {id} not found")))?;
        Ok(apply_patch(scorecard, patch))
    }

    async fn patch_if_status(
        &self,
        id: Uuid,
        expected: &ReviewStatus,
        patch: ScorecardPatch,
    ) -> Result<Option<Scorecard>, AppError> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|s| s.id == id && s.status == *expected)
            .map(|scorecard| apply_patch(scorecard, patch)))
    }
}

fn apply_patch(scorecard: &mut Scorecard, patch: ScorecardPatch) -> Scorecard {
    if let Some(status) = patch.status {
        scorecard.status = status;
    }
    if let Some(note) = patch.note {
        scorecard.note = note;
    }
    scorecard.updated_at = Utc::now();
    scorecard.clone()
}

// ────────────────────────────────────────────────────────────────────────────
// Notifications
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    sent: Mutex<Vec<(String, EmailTemplate)>>,
}

impl RecordingNotifier {
    /// A notifier whose every send fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, EmailTemplate)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send_email(&self, to: &str, template: &EmailTemplate) -> Result<(), NotifyError> {
        if self.fail {
            let err = "not an address".parse::<lettre::Address>().unwrap_err();
            return Err(err.into());
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), template.clone()));
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn resume_fixture() -> ResumeSnapshot {
    ResumeSnapshot {
        name: "Ada Lovelace".to_string(),
        email: Some("ada@example.com".to_string()),
        location: Some("London".to_string()),
        summary: Some("Full-stack engineer with six years of product work.".to_string()),
        skills: Some("React, Node, SQL".to_string()),
        experience: Some("Senior Engineer at Analytical Engines Ltd".to_string()),
        ats_score: Some(78.0),
        ..Default::default()
    }
}

pub fn new_scorecard_fixture() -> NewScorecard {
    NewScorecard {
        candidate_id: "cand-1".to_string(),
        job_id: "job-1".to_string(),
        resume: resume_fixture(),
        questions: vec!["What is a JOIN?".to_string()],
        answers: vec!["It combines rows from two tables on a key.".to_string()],
        evaluated_answers: vec![EvaluatedAnswer::fallback()],
        skill_scores: vec![SkillScore {
            skill: "SQL".to_string(),
            score: 0,
        }],
        average_score: 0,
        evaluation_status: EvaluationStatus::Partial,
        submitted_at: Utc::now(),
    }
}

pub fn scorecard_fixture() -> Scorecard {
    let new = new_scorecard_fixture();
    Scorecard {
        id: Uuid::new_v4(),
        candidate_id: new.candidate_id,
        job_id: new.job_id,
        resume: new.resume,
        questions: new.questions,
        answers: new.answers,
        evaluated_answers: new.evaluated_answers,
        skill_scores: new.skill_scores,
        average_score: new.average_score,
        evaluation_status: new.evaluation_status,
        status: ReviewStatus::Submitted,
        note: String::new(),
        submitted_at: new.submitted_at,
        created_at: new.submitted_at,
        updated_at: new.submitted_at,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/hirescore_test".to_string(),
        anthropic_api_key: "test-key".to_string(),
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            username: "user".to_string(),
            password: "pass".to_string(),
            from_address: "Hiring Team <hiring@example.com>".to_string(),
        },
        target_role: "Software Engineer".to_string(),
        llm_max_in_flight: 4,
        port: 0,
        rust_log: "debug".to_string(),
    }
}
