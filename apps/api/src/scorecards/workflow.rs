//! Review workflow — moves a scorecard through its review states.
//!
//! Each operation: check the reviewer's permission, load the scorecard, run
//! the transition on `ReviewStatus`, then write the new status back. The
//! candidate email sent on "another round" is best-effort.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::scorecard::{ReviewAction, ReviewStatus, Scorecard, ScorecardPatch};
use crate::notifications::{EmailTemplate, NotificationService};
use crate::scorecards::reviewer::Reviewer;
use crate::scorecards::store::ScorecardStore;

pub struct ScorecardWorkflow<'a> {
    store: &'a dyn ScorecardStore,
    notifier: &'a dyn NotificationService,
}

impl<'a> ScorecardWorkflow<'a> {
    pub fn new(store: &'a dyn ScorecardStore, notifier: &'a dyn NotificationService) -> Self {
        Self { store, notifier }
    }

    pub async fn start_screening(&self, reviewer: &Reviewer, id: Uuid) -> Result<Scorecard, AppError> {
        self.transition(reviewer, id, ReviewAction::Screen).await
    }

    pub async fn shortlist(&self, reviewer: &Reviewer, id: Uuid) -> Result<Scorecard, AppError> {
        self.transition(reviewer, id, ReviewAction::Shortlist).await
    }

    pub async fn reject(
        &self,
        reviewer: &Reviewer,
        id: Uuid,
        feedback: Option<String>,
    ) -> Result<Scorecard, AppError> {
        let feedback = feedback.map(|f| f.trim().to_string()).unwrap_or_default();
        self.transition(reviewer, id, ReviewAction::Reject { feedback })
            .await
    }

    /// Marks the candidate ready for client submission. Feedback is mandatory.
    pub async fn approve(
        &self,
        reviewer: &Reviewer,
        id: Uuid,
        feedback: &str,
    ) -> Result<Scorecard, AppError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(AppError::Validation(
                "feedback is required to approve a candidate".to_string(),
            ));
        }
        self.transition(
            reviewer,
            id,
            ReviewAction::Approve {
                feedback: feedback.to_string(),
            },
        )
        .await
    }

    /// Records the request, then emails the candidate.
    ///
    /// The request stands even if the email cannot be sent; `email_sent` stays
    /// false and a later call retries delivery. Once sent, repeat calls are no-ops.
    pub async fn request_another_round(
        &self,
        reviewer: &Reviewer,
        id: Uuid,
    ) -> Result<Scorecard, AppError> {
        let scorecard = self
            .transition(reviewer, id, ReviewAction::RequestAnotherRound)
            .await?;

        if scorecard.status != (ReviewStatus::AnotherRoundRequested { email_sent: false }) {
            return Ok(scorecard);
        }

        if !self.notify_candidate(&scorecard).await {
            return Ok(scorecard);
        }

        // Only flag the email while the request is still the current state.
        let marked = self
            .store
            .patch_if_status(
                id,
                &scorecard.status,
                ScorecardPatch {
                    status: Some(ReviewStatus::AnotherRoundRequested { email_sent: true }),
                    ..Default::default()
                },
            )
            .await?;

        match marked {
            Some(updated) => Ok(updated),
            None => {
                warn!("Scorecard {id}: status changed while emailing; email_sent not recorded");
                self.store
                    .get(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Scorecard {id} not found")))
            }
        }
    }

    /// Replaces the reviewer note. Allowed in every state.
    pub async fn add_note(
        &self,
        reviewer: &Reviewer,
        id: Uuid,
        note: &str,
    ) -> Result<Scorecard, AppError> {
        let scorecard = self
            .store
            .patch(
                id,
                ScorecardPatch {
                    note: Some(note.trim().to_string()),
                    ..Default::default()
                },
            )
            .await?;
        info!("Reviewer {} updated the note on scorecard {id}", reviewer.id);
        Ok(scorecard)
    }

    async fn transition(
        &self,
        reviewer: &Reviewer,
        id: Uuid,
        action: ReviewAction,
    ) -> Result<Scorecard, AppError> {
        reviewer.authorize(&action)?;

        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scorecard {id} not found")))?;

        let next = current.status.apply(&action)?;
        if next == current.status {
            return Ok(current);
        }

        let updated = self
            .store
            .patch(
                id,
                ScorecardPatch {
                    status: Some(next),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            "Scorecard {id}: {} -> {} by {} ({})",
            current.status.name(),
            updated.status.name(),
            reviewer.id,
            reviewer.role.as_str()
        );
        Ok(updated)
    }

    /// True when the email went out.
    async fn notify_candidate(&self, scorecard: &Scorecard) -> bool {
        let Some(to) = scorecard.resume.contact_email() else {
            warn!(
                "Scorecard {}: candidate has no email address; another-round email not sent",
                scorecard.id
            );
            return false;
        };

        let template = EmailTemplate::AnotherRound {
            candidate_name: scorecard.resume.name.clone(),
            job_id: scorecard.job_id.clone(),
        };

        match self.notifier.send_email(to, &template).await {
            Ok(()) => {
                info!("Scorecard {}: another-round email sent to {to}", scorecard.id);
                true
            }
            Err(e) => {
                warn!(
                    "Scorecard {}: another-round email to {to} failed: {e}",
                    scorecard.id
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecards::reviewer::ReviewerRole;
    use crate::test_support::{new_scorecard_fixture, MemoryScorecardStore, RecordingNotifier};

    fn reviewer(role: ReviewerRole) -> Reviewer {
        Reviewer {
            id: "rev-1".to_string(),
            role,
        }
    }

    async fn seeded(store: &MemoryScorecardStore) -> Uuid {
        store.create(new_scorecard_fixture()).await.unwrap().id
    }

    #[tokio::test]
    async fn test_review_path_to_approval() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;

        workflow.start_screening(&manager, id).await.unwrap();
        workflow.shortlist(&manager, id).await.unwrap();
        let approved = workflow
            .approve(&manager, id, " Great fit for the client ")
            .await
            .unwrap();

        assert_eq!(
            approved.status,
            ReviewStatus::ApprovedForClient {
                feedback: "Great fit for the client".to_string()
            }
        );
        assert!(approved.status.flags().is_approved);
    }

    #[tokio::test]
    async fn test_shortlisted_then_rejected_is_only_rejected() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let recruiter = reviewer(ReviewerRole::Recruiter);
        let id = seeded(&store).await;

        workflow.shortlist(&recruiter, id).await.unwrap();
        let rejected = workflow
            .reject(&recruiter, id, Some("Not enough SQL depth".to_string()))
            .await
            .unwrap();

        let flags = rejected.status.flags();
        assert!(flags.is_rejected);
        assert!(!flags.is_approved);
        assert_eq!(flags.reject_feedback, "Not enough SQL depth");
    }

    #[tokio::test]
    async fn test_approve_without_feedback_is_rejected_before_any_write() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;
        workflow.shortlist(&manager, id).await.unwrap();

        let err = workflow.approve(&manager, id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            ReviewStatus::Shortlisted
        );
    }

    #[tokio::test]
    async fn test_invalid_transition_is_a_conflict() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;

        let err = workflow.approve(&manager, id, "yes").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_permissions_are_checked_first() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let recruiter = reviewer(ReviewerRole::Recruiter);

        // Unknown id: the permission check fires before the lookup.
        let err = workflow
            .approve(&recruiter, Uuid::new_v4(), "yes")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = workflow
            .request_another_round(&recruiter, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unknown_scorecard_is_not_found() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);

        let err = workflow
            .shortlist(&reviewer(ReviewerRole::Recruiter), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_another_round_sends_email_once() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let account_manager = reviewer(ReviewerRole::AccountManager);
        let id = seeded(&store).await;

        let scorecard = workflow
            .request_another_round(&account_manager, id)
            .await
            .unwrap();
        assert_eq!(
            scorecard.status,
            ReviewStatus::AnotherRoundRequested { email_sent: true }
        );

        workflow
            .request_another_round(&account_manager, id)
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ada@example.com");
        assert!(matches!(sent[0].1, EmailTemplate::AnotherRound { .. }));
    }

    /// Rejects the scorecard while the email is being sent, like a concurrent reviewer would.
    struct RejectingNotifier<'s> {
        store: &'s MemoryScorecardStore,
        id: Uuid,
    }

    #[async_trait::async_trait]
    impl<'s> NotificationService for RejectingNotifier<'s> {
        async fn send_email(
            &self,
            _to: &str,
            _template: &EmailTemplate,
        ) -> Result<(), crate::notifications::NotifyError> {
            self.store
                .patch(
                    self.id,
                    ScorecardPatch {
                        status: Some(ReviewStatus::Rejected {
                            feedback: "Withdrew".to_string(),
                        }),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_email_flag_never_overwrites_a_newer_decision() {
        let store = MemoryScorecardStore::default();
        let id = seeded(&store).await;
        let notifier = RejectingNotifier { store: &store, id };
        let workflow = ScorecardWorkflow::new(&store, &notifier);

        let scorecard = workflow
            .request_another_round(&reviewer(ReviewerRole::Manager), id)
            .await
            .unwrap();

        let expected = ReviewStatus::Rejected {
            feedback: "Withdrew".to_string(),
        };
        assert_eq!(scorecard.status, expected);
        assert_eq!(store.get(id).await.unwrap().unwrap().status, expected);
    }

    #[tokio::test]
    async fn test_another_round_can_be_shortlisted_and_approved() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;

        workflow.request_another_round(&manager, id).await.unwrap();
        workflow.shortlist(&manager, id).await.unwrap();
        let approved = workflow
            .approve(&manager, id, "Convincing second round")
            .await
            .unwrap();

        let flags = approved.status.flags();
        assert!(flags.is_approved);
        assert!(!flags.request_another_round);
    }

    #[tokio::test]
    async fn test_another_round_can_end_in_rejection() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;

        workflow.request_another_round(&manager, id).await.unwrap();
        let rejected = workflow
            .reject(&manager, id, Some("No show".to_string()))
            .await
            .unwrap();

        assert_eq!(
            rejected.status,
            ReviewStatus::Rejected {
                feedback: "No show".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_another_round_survives_email_failure() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::failing();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let manager = reviewer(ReviewerRole::Manager);
        let id = seeded(&store).await;

        let scorecard = workflow.request_another_round(&manager, id).await.unwrap();

        let flags = scorecard.status.flags();
        assert!(flags.request_another_round);
        assert!(!flags.email_sent);
        assert_eq!(
            store.get(id).await.unwrap().unwrap().status,
            ReviewStatus::AnotherRoundRequested { email_sent: false }
        );
    }

    #[tokio::test]
    async fn test_another_round_without_email_address() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let mut new_scorecard = new_scorecard_fixture();
        new_scorecard.resume.email = None;
        let id = store.create(new_scorecard).await.unwrap().id;

        let scorecard = workflow
            .request_another_round(&reviewer(ReviewerRole::Manager), id)
            .await
            .unwrap();

        assert_eq!(
            scorecard.status,
            ReviewStatus::AnotherRoundRequested { email_sent: false }
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_note_is_replaced_in_any_state() {
        let store = MemoryScorecardStore::default();
        let notifier = RecordingNotifier::default();
        let workflow = ScorecardWorkflow::new(&store, &notifier);
        let recruiter = reviewer(ReviewerRole::Recruiter);
        let id = seeded(&store).await;

        workflow.reject(&recruiter, id, None).await.unwrap();
        workflow.add_note(&recruiter, id, "first").await.unwrap();
        let scorecard = workflow.add_note(&recruiter, id, " second ").await.unwrap();

        assert_eq!(scorecard.note, "second");
        assert_eq!(
            scorecard.status,
            ReviewStatus::Rejected {
                feedback: String::new()
            }
        );
    }
}
