// Scorecard persistence and the review workflow that moves a scorecard
// from submission to a final decision.

pub mod handlers;
pub mod reviewer;
pub mod store;
pub mod workflow;
