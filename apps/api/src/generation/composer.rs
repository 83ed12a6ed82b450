//! Prompt assembly, generated-email validation, and manual template rendering.

use crate::generation::prompts::{emoji_rule, EMAIL_PROMPT_TEMPLATE};
use crate::generation::{EmailBrief, GeneratedEmail, GenerationError};
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::profile::Experience;
use crate::settings::GenerationSettings;

const MIN_SUBJECT_CHARS: usize = 5;
const MIN_BODY_CHARS: usize = 50;
/// Skills listed in the generator context.
const CONTEXT_SKILLS: usize = 10;
/// Skills substituted for `[SKILLS]` in manual templates.
const TEMPLATE_SKILLS: usize = 3;

/// Plain-text description of the candidate and target role for the prompt.
pub fn candidate_context(brief: &EmailBrief) -> String {
    let profile = &brief.profile;
    let mut lines = vec!["CANDIDATE PROFILE:".to_string()];

    push_field(&mut lines, "Name", profile.name.as_deref());
    push_field(&mut lines, "Current title", profile.title.as_deref());
    push_field(&mut lines, "Email", profile.email.as_deref());
    push_field(&mut lines, "Phone", profile.phone.as_deref());
    push_field(&mut lines, "LinkedIn", profile.linkedin.as_deref());
    push_field(&mut lines, "GitHub", profile.github.as_deref());
    push_field(&mut lines, "Summary", profile.summary.as_deref());
    if !profile.skills.is_empty() {
        lines.push(format!("Key skills: {}", join_first(&profile.skills, CONTEXT_SKILLS)));
    }
    if profile.experience_years > 0 {
        lines.push(format!("Years of experience: {}", profile.experience_years));
    }
    if !profile.languages.is_empty() {
        lines.push(format!("Languages: {}", profile.languages.join(", ")));
    }

    if let Some(company) = &brief.company_name {
        lines.push(format!("\nTARGET COMPANY: {company}"));
    }
    if let Some(job) = &brief.job_title {
        lines.push(format!("ROLE: {job}"));
    }
    if let Some(description) = &brief.job_description {
        lines.push(format!("JOB DESCRIPTION:\n{description}"));
    }

    lines.join("\n")
}

pub fn build_email_prompt(brief: &EmailBrief, settings: &GenerationSettings) -> String {
    // Context goes in last so user text cannot inject the other placeholders.
    EMAIL_PROMPT_TEMPLATE
        .replace("{tone}", settings.email_tone.guidance())
        .replace("{max_words}", &settings.max_email_length.to_string())
        .replace("{emoji_rule}", emoji_rule(settings.use_emojis))
        .replace("{fabrication_rule}", NO_FABRICATION_INSTRUCTION)
        .replace("{context}", &candidate_context(brief))
}

/// Rejects missing, blank, or implausibly short generator output.
pub fn validate_generated(
    subject: Option<String>,
    html_body: Option<String>,
) -> Result<GeneratedEmail, GenerationError> {
    let subject = non_blank(subject)
        .ok_or_else(|| GenerationError::Invalid("reply has no subject".to_string()))?;
    let html_body = non_blank(html_body)
        .ok_or_else(|| GenerationError::Invalid("reply has no html_body".to_string()))?;

    let subject_len = subject.chars().count();
    if subject_len < MIN_SUBJECT_CHARS {
        return Err(GenerationError::Invalid(format!(
            "subject too short ({subject_len} chars)"
        )));
    }
    let body_len = html_body.chars().count();
    if body_len < MIN_BODY_CHARS {
        return Err(GenerationError::Invalid(format!(
            "body too short ({body_len} chars)"
        )));
    }

    Ok(GeneratedEmail { subject, html_body })
}

pub fn default_subject(brief: &EmailBrief) -> String {
    let name = brief.profile.name.as_deref().unwrap_or("Candidate");
    match (&brief.job_title, &brief.company_name) {
        (Some(job), _) => format!("Application for {job} - {name}"),
        (None, Some(_)) => format!("Application - {name}"),
        (None, None) => format!("Professional Application - {name}"),
    }
}

/// Fills a manual template from the profile and renders it as simple HTML.
pub fn render_manual(template: &str, brief: &EmailBrief) -> GeneratedEmail {
    let profile = &brief.profile;

    let skills = if profile.skills.is_empty() {
        "software development".to_string()
    } else {
        join_first(&profile.skills, TEMPLATE_SKILLS)
    };
    let experience = profile
        .experience
        .first()
        .and_then(experience_headline)
        .unwrap_or_else(|| {
            if profile.experience_years > 0 {
                format!("{} years of professional experience", profile.experience_years)
            } else {
                "a range of professional projects".to_string()
            }
        });

    let text = template
        .replace("[COMPANY]", brief.company_name.as_deref().unwrap_or("your company"))
        .replace("[JOB_TITLE]", brief.job_title.as_deref().unwrap_or("this position"))
        .replace("[SKILLS]", &skills)
        .replace("[EXPERIENCE]", &experience)
        .replace("[NAME]", profile.name.as_deref().unwrap_or("Candidate"));

    GeneratedEmail {
        subject: default_subject(brief),
        html_body: text_to_html(&text),
    }
}

fn experience_headline(experience: &Experience) -> Option<String> {
    match (experience.title.as_deref(), experience.company.as_deref()) {
        (Some(title), Some(company)) => Some(format!("{title} at {company}")),
        (Some(title), None) => Some(title.to_string()),
        (None, Some(company)) => Some(format!("work at {company}")),
        (None, None) => None,
    }
}

/// Blank-line separated paragraphs become `<p>`, single newlines `<br>`.
fn text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let paragraphs: String = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let lines: Vec<String> = p.lines().map(|l| escape_html(l.trim())).collect();
            format!("<p>{}</p>", lines.join("<br>"))
        })
        .collect();

    format!(
        "<div style=\"font-family: Arial, Helvetica, sans-serif; color: #222;\">{paragraphs}</div>"
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        lines.push(format!("{label}: {value}"));
    }
}

fn join_first(items: &[String], n: usize) -> String {
    items
        .iter()
        .take(n)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::settings::EmailTone;

    fn profile() -> Profile {
        Profile {
            name: Some("Ada Lovelace".to_string()),
            title: Some("Backend Engineer".to_string()),
            email: Some("ada@example.com".to_string()),
            skills: vec![
                "Rust".to_string(),
                "PostgreSQL".to_string(),
                "Kubernetes".to_string(),
                "Go".to_string(),
            ],
            experience_years: 6,
            experience: vec![Experience {
                title: Some("Senior Engineer".to_string()),
                company: Some("Analytical Engines".to_string()),
                period: None,
                description: None,
            }],
            ..Profile::default()
        }
    }

    fn brief(company: Option<&str>, job: Option<&str>) -> EmailBrief {
        EmailBrief {
            profile: profile(),
            company_name: company.map(String::from),
            job_title: job.map(String::from),
            job_description: None,
        }
    }

    #[test]
    fn test_subject_rules() {
        assert_eq!(
            default_subject(&brief(Some("Acme"), Some("SRE"))),
            "Application for SRE - Ada Lovelace"
        );
        assert_eq!(
            default_subject(&brief(Some("Acme"), None)),
            "Application - Ada Lovelace"
        );
        assert_eq!(
            default_subject(&brief(None, None)),
            "Professional Application - Ada Lovelace"
        );
    }

    #[test]
    fn test_render_manual_fills_placeholders() {
        let email = render_manual(
            "Hi [COMPANY], I want [JOB_TITLE]. I know [SKILLS]; I was [EXPERIENCE].\n\n[NAME]",
            &brief(Some("Acme"), Some("Platform Engineer")),
        );
        assert!(email.html_body.contains("Hi Acme, I want Platform Engineer."));
        assert!(email.html_body.contains("I know Rust, PostgreSQL, Kubernetes;"));
        assert!(!email.html_body.contains("Go"));
        assert!(email.html_body.contains("Senior Engineer at Analytical Engines"));
        assert!(email.html_body.contains("<p>Ada Lovelace</p>"));
        assert!(!email.html_body.contains('['));
    }

    #[test]
    fn test_render_manual_defaults_for_missing_target() {
        let mut b = brief(None, None);
        b.profile.experience.clear();
        let email = render_manual("[COMPANY] / [JOB_TITLE] / [EXPERIENCE]", &b);
        assert!(email
            .html_body
            .contains("your company / this position / 6 years of professional experience"));
    }

    #[test]
    fn test_render_manual_escapes_user_text() {
        let email = render_manual("Dear [COMPANY]", &brief(Some("<Acme & Sons>"), None));
        assert!(email.html_body.contains("Dear &lt;Acme &amp; Sons&gt;"));
    }

    #[test]
    fn test_text_to_html_paragraphs() {
        let html = text_to_html("Line one\nLine two\n\nSecond para\r\n\r\n\n");
        assert!(html.contains("<p>Line one<br>Line two</p><p>Second para</p>"));
    }

    #[test]
    fn test_validate_generated_ok() {
        let body = "<p>".to_string() + &"x".repeat(60) + "</p>";
        let email = validate_generated(Some("  Application  ".into()), Some(body)).unwrap();
        assert_eq!(email.subject, "Application");
    }

    #[test]
    fn test_validate_generated_rejects_short_or_missing() {
        let body = "y".repeat(60);
        assert!(validate_generated(None, Some(body.clone())).is_err());
        assert!(validate_generated(Some("Hey".into()), Some(body)).is_err());
        assert!(validate_generated(Some("Application".into()), Some("<p>hi</p>".into())).is_err());
        assert!(validate_generated(Some("Application".into()), Some("   ".into())).is_err());
    }

    #[test]
    fn test_prompt_contains_settings_and_context() {
        let settings = GenerationSettings {
            email_tone: EmailTone::Formal,
            max_email_length: 120,
            ..GenerationSettings::default()
        };
        let mut b = brief(Some("Acme"), Some("SRE"));
        b.job_description = Some("Run {tone} things".to_string());
        let prompt = build_email_prompt(&b, &settings);

        assert!(prompt.contains("At most 120 words"));
        assert!(prompt.contains(EmailTone::Formal.guidance()));
        assert!(prompt.contains("No emojis anywhere"));
        assert!(prompt.contains("TARGET COMPANY: Acme"));
        assert!(prompt.contains("Key skills: Rust, PostgreSQL, Kubernetes, Go"));
        // Placeholder-looking text inside user input is left alone.
        assert!(prompt.contains("Run {tone} things"));
        assert!(!prompt.contains("{context}"));
    }
}
