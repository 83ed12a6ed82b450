// Prompt templates for the writing assistant.
// Placeholders in braces are substituted before sending.

pub const ASSISTANT_SYSTEM: &str = "\
You are a practical job-search coach helping a candidate run an email \
application campaign. Answer in plain text without markdown headings. \
Be concise and concrete.";

/// Placeholders the manual template supports, as shown to the model.
pub const TEMPLATE_PLACEHOLDERS: &str = "\
  [COMPANY] - company name
  [JOB_TITLE] - role being applied for
  [SKILLS] - main skills
  [EXPERIENCE] - most recent experience
  [NAME] - candidate name";

/// Replace `{profile}`, `{placeholders}` and `{tone}` before sending.
pub const SUGGEST_TEMPLATE_PROMPT: &str = r#"Write a reusable job application email template for this candidate.

CANDIDATE:
{profile}

STRUCTURE:
- A strong, personal opening
- A body with 2-3 main points
- A confident closing
- At most 150 words

TONE: {tone}. Show value instead of asking for a chance.

PLACEHOLDERS (use them so the template works for any company):
{placeholders}

Return ONLY the template text, ready to use, with no explanation."#;

/// Replace `{template}`, `{feedback}` and `{placeholders}` before sending.
pub const IMPROVE_TEMPLATE_PROMPT: &str = r#"Improve this job application email template based on the candidate's feedback.

CURRENT TEMPLATE:
{template}

FEEDBACK:
{feedback}

Keep:
- The overall structure
- Every placeholder that appears in the current template. The supported ones are:
{placeholders}
- At most 150 words
- A professional but human tone

Return ONLY the improved template."#;

/// Replace `{settings}` and `{question}` before sending.
pub const HELP_PROMPT: &str = r#"The candidate uses a tool that writes and sends job application emails.

CURRENT SETTINGS:
{settings}

QUESTION:
{question}

RULES:
- Answer clearly and concisely, at most 300 words
- Give practical suggestions
- For template questions, suggest variations
- For settings questions, explain the trade-offs"#;

/// Replace `{stats}` before sending.
pub const OPTIMIZE_PROMPT: &str = r#"Review the results of this job application email campaign.

STATISTICS:
{stats}

Suggest:
1. One change to the email template
2. One settings change
3. One strategy to get more replies

Be practical and brief, at most 200 words."#;
