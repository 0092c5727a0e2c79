pub mod resume;
pub mod scorecard;
