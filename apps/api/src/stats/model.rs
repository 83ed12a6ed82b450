use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::StatsError;

/// Number of companies in the snapshot's ranking.
pub const TOP_COMPANIES: usize = 5;
/// Number of calendar months in the snapshot's recent-activity view.
pub const RECENT_MONTHS: usize = 6;

/// Outcome of a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Success,
    Error,
    /// Composition failed before anything was handed to the mailer.
    Pending,
}

impl SendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStatus::Success => "success",
            SendStatus::Error => "error",
            SendStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SendStatus {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SendStatus::Success),
            "error" => Ok(SendStatus::Error),
            "pending" => Ok(SendStatus::Pending),
            other => Err(StatsError::Validation(format!(
                "unknown send status '{other}' (expected success, error or pending)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    pub success: u64,
    pub error: u64,
    pub pending: u64,
}

impl StatusCounts {
    fn increment(&mut self, status: SendStatus) {
        match status {
            SendStatus::Success => self.success += 1,
            SendStatus::Error => self.error += 1,
            SendStatus::Pending => self.pending += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.error + self.pending
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateUsage {
    pub ai_generated: u64,
    pub manual: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiUsage {
    pub cv_analyzed: u64,
    pub emails_generated: u64,
}

/// One send attempt, as reported to the aggregator. Never persisted by itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SendEvent {
    pub company: Option<String>,
    pub status: SendStatus,
    /// Wall-clock latency of compose + send. Zero means "not measured".
    pub response_time_ms: f64,
    pub generated_by_ai: bool,
    pub timestamp: DateTime<Utc>,
}

impl SendEvent {
    pub fn validate(&self) -> Result<(), StatsError> {
        if !self.response_time_ms.is_finite() || self.response_time_ms < 0.0 {
            return Err(StatsError::Validation(format!(
                "response time must be a non-negative number of milliseconds, got {}",
                self.response_time_ms
            )));
        }
        Ok(())
    }

    fn month_key(&self) -> String {
        self.timestamp.format("%Y-%m").to_string()
    }
}

/// The persisted aggregate. Mutated only through the aggregator.
///
/// Older documents used `total_emails_sent` and `email_templates_used`; both
/// names are still accepted on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    #[serde(alias = "total_emails_sent")]
    pub total_sent: u64,
    pub total_errors: u64,
    pub emails_by_status: StatusCounts,
    pub emails_by_month: BTreeMap<String, u64>,
    /// Insertion ordered, so ranking ties resolve to the first company seen.
    pub popular_companies: IndexMap<String, u64>,
    #[serde(alias = "email_templates_used")]
    pub template_usage: TemplateUsage,
    pub ai_usage: AiUsage,
    /// Most recent response-time samples, oldest first.
    pub response_times: Vec<f64>,
    #[serde(deserialize_with = "crate::storage::timestamp::option::deserialize")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: u64,
}

/// Point-in-time read of the aggregate plus derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_sent: u64,
    pub total_errors: u64,
    pub success_rate: f64,
    pub emails_by_status: StatusCounts,
    pub emails_by_month: BTreeMap<String, u64>,
    pub recent_months: BTreeMap<String, u64>,
    pub popular_companies: IndexMap<String, u64>,
    pub top_companies: Vec<CompanyCount>,
    pub template_usage: TemplateUsage,
    pub ai_usage: AiUsage,
    pub avg_response_time: f64,
    pub response_time_samples: usize,
    pub last_updated: Option<DateTime<Utc>>,
    /// True when the last write to disk failed and memory is ahead of the file.
    pub stale: bool,
}

impl StatsRecord {
    /// Folds a validated event into the aggregate. `sample_cap` bounds the
    /// retained response-time window.
    pub fn apply_send(&mut self, event: &SendEvent, sample_cap: usize, now: DateTime<Utc>) {
        self.total_sent += 1;
        self.emails_by_status.increment(event.status);
        if event.status == SendStatus::Error {
            self.total_errors += 1;
        }

        if let Some(company) = &event.company {
            *self.popular_companies.entry(company.clone()).or_insert(0) += 1;
        }

        *self.emails_by_month.entry(event.month_key()).or_insert(0) += 1;

        if event.generated_by_ai {
            self.template_usage.ai_generated += 1;
        } else {
            self.template_usage.manual += 1;
        }

        if event.response_time_ms > 0.0 {
            self.response_times.push(event.response_time_ms);
            if self.response_times.len() > sample_cap {
                let excess = self.response_times.len() - sample_cap;
                self.response_times.drain(..excess);
            }
        }

        self.last_updated = Some(now);
    }

    /// Percentage of successful sends, 100 when nothing has been sent.
    pub fn success_rate(&self) -> f64 {
        if self.total_sent == 0 {
            return 100.0;
        }
        round2(self.emails_by_status.success as f64 / self.total_sent as f64 * 100.0)
    }

    pub fn avg_response_time(&self) -> f64 {
        if self.response_times.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.response_times.iter().sum();
        round2(sum / self.response_times.len() as f64)
    }

    /// Highest counts first; equal counts keep first-inserted order.
    pub fn top_companies(&self, limit: usize) -> Vec<CompanyCount> {
        let mut ranked: Vec<CompanyCount> = self
            .popular_companies
            .iter()
            .map(|(company, &count)| CompanyCount {
                company: company.clone(),
                count,
            })
            .collect();
        // Stable sort: ties stay in insertion order.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(limit);
        ranked
    }

    /// The latest `limit` months with activity.
    pub fn recent_months(&self, limit: usize) -> BTreeMap<String, u64> {
        let skip = self.emails_by_month.len().saturating_sub(limit);
        self.emails_by_month
            .iter()
            .skip(skip)
            .map(|(month, &count)| (month.clone(), count))
            .collect()
    }

    pub fn snapshot(&self, stale: bool) -> StatsSnapshot {
        StatsSnapshot {
            total_sent: self.total_sent,
            total_errors: self.total_errors,
            success_rate: self.success_rate(),
            emails_by_status: self.emails_by_status,
            emails_by_month: self.emails_by_month.clone(),
            recent_months: self.recent_months(RECENT_MONTHS),
            popular_companies: self.popular_companies.clone(),
            top_companies: self.top_companies(TOP_COMPANIES),
            template_usage: self.template_usage,
            ai_usage: self.ai_usage,
            avg_response_time: self.avg_response_time(),
            response_time_samples: self.response_times.len(),
            last_updated: self.last_updated,
            stale,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
