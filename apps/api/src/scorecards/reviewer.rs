//! Explicit caller identity for review operations.
//!
//! Authentication happens upstream. The gateway forwards who is acting and in
//! which role as `X-Reviewer-Id` / `X-Reviewer-Role`, and every workflow
//! operation receives that identity as a parameter.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::models::scorecard::ReviewAction;

pub const REVIEWER_ID_HEADER: &str = "x-reviewer-id";
pub const REVIEWER_ROLE_HEADER: &str = "x-reviewer-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewerRole {
    Recruiter,
    AccountManager,
    Manager,
}

impl ReviewerRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recruiter" => Some(ReviewerRole::Recruiter),
            "account_manager" => Some(ReviewerRole::AccountManager),
            "manager" => Some(ReviewerRole::Manager),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewerRole::Recruiter => "recruiter",
            ReviewerRole::AccountManager => "account_manager",
            ReviewerRole::Manager => "manager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub id: String,
    pub role: ReviewerRole,
}

impl Reviewer {
    /// Approval is manager-only; another round needs an account manager or manager.
    pub fn authorize(&self, action: &ReviewAction) -> Result<(), AppError> {
        let allowed = match action {
            ReviewAction::Approve { .. } => self.role == ReviewerRole::Manager,
            ReviewAction::RequestAnotherRound => {
                matches!(self.role, ReviewerRole::AccountManager | ReviewerRole::Manager)
            }
            ReviewAction::Screen | ReviewAction::Shortlist | ReviewAction::Reject { .. } => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "a {} may not {} a scorecard",
                self.role.as_str(),
                action.name()
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Reviewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, REVIEWER_ID_HEADER).ok_or(AppError::Unauthorized)?;
        let role = header_value(parts, REVIEWER_ROLE_HEADER)
            .and_then(ReviewerRole::parse)
            .ok_or(AppError::Unauthorized)?;

        Ok(Reviewer {
            id: id.to_string(),
            role,
        })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
