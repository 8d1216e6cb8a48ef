use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One support interaction, already tagged with a sentiment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub id: String,
    pub message: String,
    pub sentiment: f64,
    pub channel: String,
    pub agent: String,
    pub customer: String,
    pub category: String,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub csat_prediction: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSummary {
    pub total: usize,
    pub mean_sentiment: f64,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub average_confidence: f64,
    pub agents: Vec<AgentRollup>,
    pub keywords: Vec<KeywordRollup>,
    pub issues: Vec<KeywordRollup>,
}

impl AggregateSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            mean_sentiment: 0.0,
            positive: 0,
            neutral: 0,
            negative: 0,
            average_confidence: 0.0,
            agents: Vec::new(),
            keywords: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Share of positive records as a percentage, zero for an empty summary.
    pub fn positive_rate(&self) -> f64 {
        percentage(self.positive, self.total)
    }

    pub fn negative_rate(&self) -> f64 {
        percentage(self.negative, self.total)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRollup {
    pub agent: String,
    pub count: usize,
    pub mean_sentiment: f64,
    pub positive_rate: f64,
    pub negative_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRollup {
    pub keyword: String,
    pub mentions: usize,
    pub mean_sentiment: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentBreakdown {
    pub very_positive: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub very_negative: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsatSummary {
    pub average: f64,
    pub low: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCount {
    pub channel: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    pub day: NaiveDate,
    pub count: usize,
    pub mean_sentiment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Which rule raised an alert. The two rules keep separate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Spike,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub details: String,
    pub suggested_actions: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub(crate) fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(crate) fn record(id: &str, sentiment: f64) -> InteractionRecord {
        InteractionRecord {
            id: id.to_string(),
            message: "Billing error again!".to_string(),
            sentiment,
            channel: "Email".to_string(),
            agent: "Sarah".to_string(),
            customer: format!("{id}@example.com"),
            category: "Billing".to_string(),
            confidence: 0.9,
            keywords: vec!["service".to_string()],
            csat_prediction: Some(3),
            timestamp: base_time(),
        }
    }

    #[test]
    fn empty_summary_rates_are_zero() {
        let summary = AggregateSummary::empty();
        assert_eq!(summary.positive_rate(), 0.0);
        assert_eq!(summary.negative_rate(), 0.0);
    }

    #[test]
    fn guarded_mean_handles_zero_count() {
        assert_eq!(mean(5.0, 0), 0.0);
        assert!((mean(3.0, 4) - 0.75).abs() < 1e-12);
    }
}
