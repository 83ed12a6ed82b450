use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub languages: Vec<String>,
    pub education: Vec<Education>,
    /// Most recent first, as listed on the résumé.
    pub experience: Vec<Experience>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub period: Option<String>,
    pub description: Option<String>,
}

impl Profile {
    /// Trims text fields, turns blanks into `None` and drops blank list items.
    pub fn tidied(self) -> Self {
        Self {
            name: tidy(self.name),
            email: tidy(self.email),
            phone: tidy(self.phone),
            title: tidy(self.title),
            linkedin: tidy(self.linkedin),
            github: tidy(self.github),
            portfolio: tidy(self.portfolio),
            summary: tidy(self.summary),
            location: tidy(self.location),
            skills: tidy_list(self.skills),
            experience_years: self.experience_years,
            languages: tidy_list(self.languages),
            education: self
                .education
                .into_iter()
                .map(|e| Education {
                    degree: tidy(e.degree),
                    institution: tidy(e.institution),
                    year: tidy(e.year),
                })
                .filter(|e| *e != Education::default())
                .collect(),
            experience: self
                .experience
                .into_iter()
                .map(|e| Experience {
                    title: tidy(e.title),
                    company: tidy(e.company),
                    period: tidy(e.period),
                    description: tidy(e.description),
                })
                .filter(|e| *e != Experience::default())
                .collect(),
            certifications: tidy_list(self.certifications),
        }
    }
}

/// Builds a `Profile` from loosely typed generator output.
///
/// Wrong-typed list fields become empty, `experience_years` accepts numbers
/// and numeric strings, and blank strings are treated as absent.
pub fn normalize_profile(raw: &Value) -> Profile {
    let profile = Profile {
        name: text(raw, "name"),
        email: text(raw, "email"),
        phone: text(raw, "phone"),
        title: text(raw, "title"),
        linkedin: text(raw, "linkedin"),
        github: text(raw, "github"),
        portfolio: text(raw, "portfolio"),
        summary: text(raw, "summary"),
        location: text(raw, "location"),
        skills: text_list(raw, "skills"),
        experience_years: years(raw.get("experience_years")),
        languages: text_list(raw, "languages"),
        education: objects(raw, "education")
            .map(|e| Education {
                degree: text(e, "degree"),
                institution: text(e, "institution"),
                year: text(e, "year"),
            })
            .filter(|e| *e != Education::default())
            .collect(),
        experience: objects(raw, "experience")
            .map(|e| Experience {
                title: text(e, "title"),
                company: text(e, "company"),
                period: text(e, "period"),
                description: text(e, "description"),
            })
            .filter(|e| *e != Experience::default())
            .collect(),
        certifications: text_list(raw, "certifications"),
    };

    for (field, missing) in [
        ("name", profile.name.is_none()),
        ("email", profile.email.is_none()),
        ("skills", profile.skills.is_empty()),
    ] {
        if missing {
            warn!("Extracted profile has no {field}");
        }
    }

    profile
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(scalar_text)
}

fn text_list(raw: &Value, key: &str) -> Vec<String> {
    match raw.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    }
}

fn objects<'a>(raw: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    raw.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|v| v.is_object())
}

fn years(value: Option<&Value>) -> u32 {
    let years = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match years {
        Some(y) if y.is_finite() && y > 0.0 => y.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn tidy(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn tidy_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
