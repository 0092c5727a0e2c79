// All prompt templates for the evaluation module.
// Placeholders in `{braces}` are filled with `str::replace` before sending.

/// Skill extraction. Replace `{resume}`.
pub const SKILL_EXTRACTION_PROMPT: &str = "\
Based on the following resume, list the top 5 most relevant technical skills of this candidate.
Return a comma-separated list only, with no numbering and no extra text.

{resume}";

/// Interview question generation. Replace `{role}` and `{skills}`.
pub const QUESTION_GENERATION_PROMPT: &str = "\
Generate five unique and realistic interview questions for a {role} candidate, \
considering skills: {skills}.
Write one question per line, numbered \"1.\" to \"5.\", with no other text.";

/// Per-answer rubric scoring. Replace `{answer}` and `{json_only}`.
pub const ANSWER_EVALUATION_PROMPT: &str = r#"Classify the following interview answer as exactly one of: "technical", "practical", "challenge".

Then score it with the rubric for that type:
- technical: terminology (0-25), process (0-25), tool_usage (0-25), logic (0-25)
- practical: problem_clarity (0-35), relevance (0-35), outcome (0-30)
- challenge: depth (0-35), applicability (0-35), confidence (0-30)

"total" is the weighted sum of the sub-scores, from 0 to 100.

Return a JSON object with this EXACT schema:
{"type": "technical", "scores": {"terminology": 20, "process": 18, "tool_usage": 22, "logic": 20}, "total": 80}

ANSWER:
{answer}

{json_only}"#;

/// Per-skill scoring across all answers. Replace `{skills}`, `{answers}` and `{json_only}`.
pub const SKILL_SCORING_PROMPT: &str = r#"Skills under evaluation: {skills}

Based on the previous answers below, rate the candidate on each skill from 0 to 100.

ANSWERS:
{answers}

Return a JSON array with one object per skill, using this EXACT schema:
[{"skill": "React", "score": 75}]

{json_only}"#;
