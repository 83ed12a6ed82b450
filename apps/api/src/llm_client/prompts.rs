// Cross-cutting prompt fragments shared by every generation prompt.
// Task-specific prompts live in generation/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that write on the candidate's behalf.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the candidate profile. \
    Do NOT invent employers, titles, years, degrees or metrics. \
    If a detail is missing, leave it out instead of guessing.";
