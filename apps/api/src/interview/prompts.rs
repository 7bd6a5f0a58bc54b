// Prompt templates for the interview content service.
// Placeholders are filled with `str::replace` by interview/content.rs.

pub const QUESTION_PROMPT_TEMPLATE: &str = "\
Write ONE {difficulty} technical interview question about {topic} for a full-stack \
developer candidate.
- easy: fundamentals and definitions
- medium: intermediate patterns and implementation choices
- hard: advanced internals, trade-offs, and complex scenarios
Return the question text only, as a single sentence ending in a question mark or period.";

pub const EVALUATION_PROMPT_TEMPLATE: &str = "\
Score this interview answer from 0 to 10.

Topic: {topic}
Difficulty: {difficulty}
Question: {question}
Answer: {answer}

Return JSON: {\"score\": <integer 0-10>, \"feedback\": \"<one or two sentences>\", \
\"keywords\": {\"high\": <int>, \"medium\": <int>, \"low\": <int>}}
`keywords` counts the distinct important, supporting, and minor technical terms the answer used.";

pub const SUMMARY_PROMPT_TEMPLATE: &str = "\
Write a three-sentence hiring summary for {candidate} after a technical interview.
Total score: {total_score} out of {max_score}.
Per-question results (JSON): {answers_json}
Describe overall technical depth, notable strengths or gaps, and a hiring readiness statement.
Return the summary text only.";
