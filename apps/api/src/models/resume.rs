use serde::{Deserialize, Serialize};

/// Denormalized copy of a candidate's resume taken when evaluation starts.
///
/// Stored on the scorecard as-is; later edits to the source resume never reach it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    /// Applicant-tracking score computed upstream. Carried, never recomputed here.
    #[serde(default)]
    pub ats_score: Option<f64>,
}

impl ResumeSnapshot {
    /// Renders the non-empty sections as labelled prose for prompt building.
    pub fn describe(&self) -> String {
        let sections = [
            ("Summary", &self.summary),
            ("Skills", &self.skills),
            ("Experience", &self.experience),
            ("Education", &self.education),
        ];

        let mut text = format!("Candidate: {}\n", self.name.trim());
        for (label, value) in sections {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                text.push_str(&format!("{label}: {value}\n"));
            }
        }
        text
    }

    /// Trimmed, non-empty contact address, if the resume has one.
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}
