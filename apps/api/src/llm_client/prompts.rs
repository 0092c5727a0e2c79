// Shared prompt constants.
// Each service that needs generative calls defines its own prompts.rs alongside it.

/// System prompt sent with every `TextGenerator::generate` call made through `LlmClient`.
pub const EVALUATOR_SYSTEM: &str = "You are an experienced technical interviewer. \
    Follow the requested output format exactly. \
    Do NOT add greetings, apologies or explanations unless asked.";

/// Appended to prompts whose output is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences.";
