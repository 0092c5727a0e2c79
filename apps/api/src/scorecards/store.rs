use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::scorecard::{
    NewScorecard, ReviewStatus, Scorecard, ScorecardFilter, ScorecardPatch, ScorecardRow,
};

/// Persistence boundary for scorecards.
///
/// Carried in `AppState` as `Arc<dyn ScorecardStore>`. Updates are single-row,
/// field-level and last-write-wins.
#[async_trait]
pub trait ScorecardStore: Send + Sync {
    /// Stores a finished evaluation with status `submitted` and an empty note.
    async fn create(&self, scorecard: NewScorecard) -> Result<Scorecard, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Scorecard>, AppError>;

    /// Newest first. Empty filter fields match everything.
    async fn find(&self, filter: &ScorecardFilter) -> Result<Vec<Scorecard>, AppError>;

    /// Applies only the fields set on `patch`. `NotFound` if the id is unknown.
    async fn patch(&self, id: Uuid, patch: ScorecardPatch) -> Result<Scorecard, AppError>;

    /// Like `patch`, but only while the stored status still equals `expected`.
    /// `None` when the status has moved on (or the id is unknown); nothing is written then.
    async fn patch_if_status(
        &self,
        id: Uuid,
        expected: &ReviewStatus,
        patch: ScorecardPatch,
    ) -> Result<Option<Scorecard>, AppError>;
}

pub struct PgScorecardStore {
    pool: PgPool,
}

impl PgScorecardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScorecardStore for PgScorecardStore {
    async fn create(&self, scorecard: NewScorecard) -> Result<Scorecard, AppError> {
        let row = sqlx::query_as::<_, ScorecardRow>(
            r#"
            INSERT INTO scorecards
                (id, candidate_id, job_id, resume, questions, answers, evaluated_answers,
                 skill_scores, average_score, evaluation_status, status, note, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, '', $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&scorecard.candidate_id)
        .bind(&scorecard.job_id)
        .bind(Json(&scorecard.resume))
        .bind(Json(&scorecard.questions))
        .bind(Json(&scorecard.answers))
        .bind(Json(&scorecard.evaluated_answers))
        .bind(Json(&scorecard.skill_scores))
        .bind(scorecard.average_score)
        .bind(scorecard.evaluation_status.as_str())
        .bind(Json(ReviewStatus::Submitted))
        .bind(scorecard.submitted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(Scorecard::try_from(row)?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Scorecard>, AppError> {
        let row = sqlx::query_as::<_, ScorecardRow>("SELECT * FROM scorecards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Scorecard::try_from).transpose()?)
    }

    async fn find(&self, filter: &ScorecardFilter) -> Result<Vec<Scorecard>, AppError> {
        let rows = sqlx::query_as::<_, ScorecardRow>(
            r#"
            SELECT * FROM scorecards
            WHERE ($1::text IS NULL OR job_id = $1)
              AND ($2::text IS NULL OR candidate_id = $2)
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(filter.job_id.as_deref())
        .bind(filter.candidate_id.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(Scorecard::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn patch(&self, id: Uuid, patch: ScorecardPatch) -> Result<Scorecard, AppError> {
        let row = sqlx::query_as::<_, ScorecardRow>(
            r#"
            UPDATE scorecards
            SET status = COALESCE($2, status),
                note = COALESCE($3, note),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.status.map(Json))
        .bind(patch.note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scorecard {id} not found")))?;

        Ok(Scorecard::try_from(row)?)
    }

    async fn patch_if_status(
        &self,
        id: Uuid,
        expected: &ReviewStatus,
        patch: ScorecardPatch,
    ) -> Result<Option<Scorecard>, AppError> {
        let row = sqlx::query_as::<_, ScorecardRow>(
            r#"
            UPDATE scorecards
            SET status = COALESCE($2, status),
                note = COALESCE($3, note),
                updated_at = now()
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.status.map(Json))
        .bind(patch.note)
        .bind(Json(expected))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Scorecard::try_from).transpose()?)
    }
}
