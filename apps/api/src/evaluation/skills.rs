//! Skill extraction — a resume snapshot in, at most five ranked skill names out.

use tracing::{debug, warn};

use crate::evaluation::prompts::SKILL_EXTRACTION_PROMPT;
use crate::llm_client::TextGenerator;
use crate::models::resume::ResumeSnapshot;

pub const MAX_SKILLS: usize = 5;

pub struct SkillExtractor<'a> {
    llm: &'a dyn TextGenerator,
}

impl<'a> SkillExtractor<'a> {
    pub fn new(llm: &'a dyn TextGenerator) -> Self {
        Self { llm }
    }

    /// Never fails: a generative-service error yields an empty list, which
    /// downstream steps accept as degraded input.
    pub async fn extract(&self, resume: &ResumeSnapshot) -> Vec<String> {
        let prompt = SKILL_EXTRACTION_PROMPT.replace("{resume}", &resume.describe());

        match self.llm.generate(&prompt).await {
            Ok(raw) => {
                let skills = parse_skill_list(&raw);
                debug!("Extracted {} skills for {}", skills.len(), resume.name);
                skills
            }
            Err(e) => {
                warn!("Skill extraction failed for {}: {e}", resume.name);
                Vec::new()
            }
        }
    }
}

/// Splits on commas, trims, drops empties and keeps the first `MAX_SKILLS`.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SKILLS)
        .map(String::from)
        .collect()
}
