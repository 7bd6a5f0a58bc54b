// Cross-cutting prompt fragments. Interview-specific prompts live in
// interview/prompts.rs next to the service that uses them.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-text replies that must come back without decoration.
pub const PLAIN_TEXT_SYSTEM: &str = "You are a senior technical interviewer. \
    Reply with the requested text only. \
    Do NOT add headings, numbering, quotes, or commentary.";
