//! Alert triggering for negative sentiment spikes and standing warnings.
//!
//! An [`AlertContext`] belongs to one dashboard session. The spike channel
//! holds at most one active alert; while it is active further spikes are
//! suppressed until the alert is acknowledged (moved to history) or
//! dismissed (discarded). Standing warnings are raised from the session mean
//! and are tracked separately.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::summarize;
use crate::models::{Alert, AlertKind, AlertSeverity, InteractionRecord};
use crate::sentiment::{is_issue, ISSUE_THRESHOLD};

/// Negative rate above which a spike is `High`.
pub const SPIKE_HIGH_RATE: f64 = 0.20;
/// Negative rate above which a spike is `Critical`.
pub const SPIKE_CRITICAL_RATE: f64 = 0.40;
/// Session mean below which a standing warning is raised.
pub const WARNING_MEAN_THRESHOLD: f64 = ISSUE_THRESHOLD;

pub const SUGGESTED_ACTIONS: [&str; 4] = [
    "Alert customer experience team",
    "Review recent tickets for common issues",
    "Consider proactive customer outreach",
    "Schedule team training on empathy",
];

/// Which records the spike rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertWindow {
    #[default]
    All,
    LastDays(i64),
    MostRecent(usize),
}

impl AlertWindow {
    pub fn apply<'a>(
        &self,
        records: &'a [InteractionRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a InteractionRecord> {
        match *self {
            AlertWindow::All => records.iter().collect(),
            AlertWindow::LastDays(days) => {
                let cutoff = now - Duration::days(days.max(0));
                records
                    .iter()
                    .filter(|record| record.timestamp >= cutoff)
                    .collect()
            }
            AlertWindow::MostRecent(count) => {
                let mut recent: Vec<&InteractionRecord> = records.iter().collect();
                recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                recent.truncate(count);
                recent
            }
        }
    }
}

/// Fraction of records below the issue threshold, `None` for no records.
pub fn negative_rate<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a InteractionRecord>,
{
    let (total, negative) = records.into_iter().fold((0usize, 0usize), |(total, negative), record| {
        (total + 1, negative + usize::from(is_issue(record.sentiment)))
    });
    if total == 0 {
        None
    } else {
        Some(negative as f64 / total as f64)
    }
}

pub fn spike_severity(rate: f64) -> Option<AlertSeverity> {
    if rate > SPIKE_CRITICAL_RATE {
        Some(AlertSeverity::Critical)
    } else if rate > SPIKE_HIGH_RATE {
        Some(AlertSeverity::High)
    } else {
        None
    }
}

pub fn spike_alert(rate: f64, severity: AlertSeverity, now: DateTime<Utc>) -> Alert {
    Alert {
        id: Uuid::new_v4(),
        kind: AlertKind::Spike,
        severity,
        message: "Negative sentiment spike detected".to_string(),
        details: format!(
            "{:.1}% of recent interactions show negative sentiment",
            rate * 100.0
        ),
        suggested_actions: SUGGESTED_ACTIONS.iter().map(|action| action.to_string()).collect(),
        timestamp: now,
        acknowledged: false,
    }
}

pub fn warning_alert(mean_sentiment: f64, now: DateTime<Utc>) -> Alert {
    Alert {
        id: Uuid::new_v4(),
        kind: AlertKind::Warning,
        severity: AlertSeverity::High,
        message: "High negative sentiment detected".to_string(),
        details: format!("Average sentiment across the session is {mean_sentiment:.2}"),
        suggested_actions: SUGGESTED_ACTIONS.iter().map(|action| action.to_string()).collect(),
        timestamp: now,
        acknowledged: false,
    }
}

/// What a single evaluation produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub spike: Option<Alert>,
    pub spike_suppressed: bool,
    pub warning: Option<Alert>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertContext {
    window: AlertWindow,
    active: Option<Alert>,
    history: Vec<Alert>,
    warnings: Vec<Alert>,
}

impl AlertContext {
    pub fn new(window: AlertWindow) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn window(&self) -> AlertWindow {
        self.window
    }

    pub fn active(&self) -> Option<&Alert> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    /// The last `count` acknowledged alerts, oldest first.
    pub fn recent_history(&self, count: usize) -> &[Alert] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }

    /// Standing warnings, newest first.
    pub fn warnings(&self) -> &[Alert] {
        &self.warnings
    }

    /// Run both rules against the current records.
    pub fn evaluate(&mut self, records: &[InteractionRecord], now: DateTime<Utc>) -> Evaluation {
        let mut evaluation = Evaluation::default();

        let windowed = self.window.apply(records, now);
        if let Some(rate) = negative_rate(windowed.iter().copied()) {
            if let Some(severity) = spike_severity(rate) {
                let alert = spike_alert(rate, severity, now);
                if self.trigger(alert.clone()) {
                    evaluation.spike = Some(alert);
                } else {
                    evaluation.spike_suppressed = true;
                }
            }
        }

        if !records.is_empty() {
            let summary = summarize(records);
            if summary.mean_sentiment < WARNING_MEAN_THRESHOLD {
                let alert = warning_alert(summary.mean_sentiment, now);
                info!(mean = summary.mean_sentiment, "standing sentiment warning raised");
                self.warnings.insert(0, alert.clone());
                evaluation.warning = Some(alert);
            }
        }

        evaluation
    }

    /// Activate `alert` unless one is already active. Returns whether it took.
    pub fn trigger(&mut self, alert: Alert) -> bool {
        if let Some(current) = &self.active {
            debug!(active = %current.id, "spike alert suppressed while another is active");
            return false;
        }
        info!(id = %alert.id, severity = %alert.severity, "spike alert triggered");
        self.active = Some(alert);
        true
    }

    /// Move the active alert into history and return to idle.
    pub fn acknowledge(&mut self) -> Option<&Alert> {
        let mut alert = self.active.take()?;
        alert.acknowledged = true;
        info!(id = %alert.id, "spike alert acknowledged");
        self.history.push(alert);
        self.history.last()
    }

    /// Drop the active alert without recording it.
    pub fn dismiss(&mut self) -> Option<Alert> {
        let alert = self.active.take()?;
        debug!(id = %alert.id, "spike alert dismissed");
        Some(alert)
    }

    pub fn acknowledge_warning(&mut self, id: Uuid) -> bool {
        match self.warnings.iter_mut().find(|alert| alert.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }
}
