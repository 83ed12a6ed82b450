// Prompt templates for the text generator.
// Placeholders in braces are substituted before sending.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const PROFILE_EXTRACT_SYSTEM: &str = "\
You are a precise résumé data extractor. \
Read the résumé text and return the candidate's details as structured JSON. \
You MUST respond with valid JSON only, without markdown fences or explanations. \
Use null for anything the résumé does not state.";

/// Replace `{resume_text}` before sending.
pub const PROFILE_EXTRACT_PROMPT: &str = r#"Extract every relevant detail from the résumé below.

RÉSUMÉ:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "full name",
  "email": "primary email",
  "phone": "phone number with area code",
  "title": "current or desired professional title",
  "linkedin": "full LinkedIn URL",
  "github": "full GitHub URL",
  "portfolio": "portfolio or personal site URL",
  "summary": "2-3 sentence professional summary",
  "skills": ["every technology, tool and framework mentioned"],
  "experience_years": 0,
  "languages": ["spoken languages"],
  "education": [
    {"degree": "string", "institution": "string", "year": "completion year or period"}
  ],
  "experience": [
    {"title": "string", "company": "string", "period": "string", "description": "short description"}
  ],
  "certifications": ["string"],
  "location": "city / region / country"
}

RULES:
1. Use null for any field that is not present
2. For skills, list ALL technologies, tools and frameworks
3. Social links must be complete URLs (linkedin.com/in/..., github.com/...)
4. experience_years is a whole number estimate
5. Return ONLY the JSON object"#;

pub fn email_system() -> String {
    format!(
        "You are an experienced professional writing a short, human job application email. \
         {JSON_ONLY_SYSTEM}"
    )
}

/// Replace `{context}`, `{tone}`, `{max_words}`, `{emoji_rule}` and
/// `{fabrication_rule}` before sending.
pub const EMAIL_PROMPT_TEMPLATE: &str = r#"Write a simple, human job application email.

{context}

CONTENT:
- Conversational and professional, as if written by a real person
- A direct subject line (e.g. "Application for [Role] - [Name]")
- A short greeting, then 2-3 short paragraphs: who the candidate is, why this
  company or role, the most relevant qualifications (no exaggeration)
- A natural closing that asks for a reply
- At most {max_words} words in total

TONE: {tone}

DESIGN:
- Minimal HTML: white background, dark text, Arial/Helvetica/sans-serif
- Bold only for key points, at most one plain separator line
- A discreet footer with contact details
- {emoji_rule}

If no specific role is given, write a brief open application.

{fabrication_rule}

Return this JSON:
{
  "subject": "simple, direct subject",
  "html_body": "minimal professional HTML"
}"#;

pub fn emoji_rule(use_emojis: bool) -> &'static str {
    if use_emojis {
        "At most two tasteful emojis, never in the subject"
    } else {
        "No emojis anywhere"
    }
}
