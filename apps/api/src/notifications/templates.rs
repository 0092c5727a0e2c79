/// A named email template together with the data it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    AnotherRound {
        candidate_name: String,
        job_id: String,
    },
}

impl EmailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::AnotherRound { .. } => "another_round",
        }
    }

    pub fn subject(&self) -> String {
        match self {
            EmailTemplate::AnotherRound { .. } => {
                "Next step in your application: one more interview".to_string()
            }
        }
    }

    /// Plain-text body.
    pub fn body(&self) -> String {
        match self {
            EmailTemplate::AnotherRound {
                candidate_name,
                job_id,
            } => format!(
                "Dear {},\n\n\
                 Thank you for completing your interview for position {}.\n\n\
                 The hiring team would like to continue the conversation and has asked \
                 for one more interview round. A recruiter will contact you shortly to \
                 arrange a time that suits you.\n\n\
                 Best regards,\n\
                 The Hiring Team\n\n\
                 This is an automated message. Please do not reply directly to this email.",
                greeting_name(candidate_name),
                job_id
            ),
        }
    }
}

fn greeting_name(name: &str) -> &str {
    let name = name.trim();
    if name.is_empty() {
        "Candidate"
    } else {
        name
    }
}
