use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::alerts::AlertContext;
use crate::models::InteractionRecord;

fn signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

pub fn build_report(
    source_label: &str,
    records: &[InteractionRecord],
    alerts: &AlertContext,
    now: DateTime<Utc>,
) -> String {
    let summary = aggregate::summarize(records);
    let breakdown = aggregate::sentiment_breakdown(records);
    let csat = aggregate::csat_summary(records);

    let mut output = String::new();

    let _ = writeln!(output, "# Support Sentiment Report");
    let _ = writeln!(output, "Generated for {} at {}", source_label, now.to_rfc3339());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if summary.total == 0 {
        let _ = writeln!(output, "No interactions loaded.");
        return output;
    }

    let _ = writeln!(output, "- Total interactions: {}", summary.total);
    let _ = writeln!(output, "- Average sentiment: {}", signed(summary.mean_sentiment));
    let _ = writeln!(
        output,
        "- Positive {} ({:.1}%), neutral {}, negative {} ({:.1}%)",
        summary.positive,
        summary.positive_rate(),
        summary.neutral,
        summary.negative,
        summary.negative_rate()
    );
    let _ = writeln!(
        output,
        "- Average confidence: {:.1}%",
        summary.average_confidence * 100.0
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment Breakdown");
    let _ = writeln!(output, "- Very positive: {}", breakdown.very_positive);
    let _ = writeln!(output, "- Positive: {}", breakdown.positive);
    let _ = writeln!(output, "- Neutral: {}", breakdown.neutral);
    let _ = writeln!(output, "- Negative: {}", breakdown.negative);
    let _ = writeln!(output, "- Very negative: {}", breakdown.very_negative);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Agent Coaching");
    let _ = writeln!(output, "| Agent | Tickets | Avg sentiment | Positive | Negative | Tip |");
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for agent in summary.agents.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {:.1}% | {:.1}% | {} |",
            agent.agent,
            agent.count,
            signed(agent.mean_sentiment),
            agent.positive_rate,
            agent.negative_rate,
            aggregate::coaching_tip(agent)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Keywords");
    for keyword in summary.keywords.iter().take(5) {
        let _ = writeln!(
            output,
            "- {}: {} mentions (avg {})",
            keyword.keyword,
            keyword.mentions,
            signed(keyword.mean_sentiment)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Issues");
    if summary.issues.is_empty() {
        let _ = writeln!(output, "No recurring issues in negative interactions.");
    } else {
        for issue in summary.issues.iter().take(3) {
            let _ = writeln!(output, "- {}: {} negative mentions", issue.keyword, issue.mentions);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## CSAT Prediction");
    let _ = writeln!(output, "- Predicted average: {:.1} / 5", csat.average);
    let _ = writeln!(output, "- At risk (1-2): {}", csat.low);
    let _ = writeln!(output, "- Satisfied (4-5): {}", csat.high);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Alerts");
    match alerts.active() {
        Some(alert) => {
            let _ = writeln!(output, "- [{}] {}: {}", alert.severity, alert.message, alert.details);
            for action in alert.suggested_actions.iter() {
                let _ = writeln!(output, "  - {action}");
            }
        }
        None => {
            let _ = writeln!(output, "No active spike alert.");
        }
    }
    for warning in alerts.warnings().iter() {
        let _ = writeln!(output, "- [{}] {}: {}", warning.severity, warning.message, warning.details);
    }
    for past in alerts.recent_history(3).iter() {
        let _ = writeln!(
            output,
            "- acknowledged {} at {}",
            past.message,
            past.timestamp.to_rfc3339()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Summary");
    for day in aggregate::daily_trend(records, now, 7).iter() {
        let _ = writeln!(
            output,
            "- {}: {} tickets, avg {}",
            day.day.format("%a %Y-%m-%d"),
            day.count,
            signed(day.mean_sentiment)
        );
    }
    let insights = aggregate::weekly_insights(records, now);
    if insights.is_empty() {
        let _ = writeln!(output, "No notable patterns this week.");
    } else {
        for insight in insights.iter() {
            let _ = writeln!(output, "- {insight}");
        }
    }

    let mut recent = records.to_vec();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Interactions");
    for record in recent.iter().take(5) {
        let _ = writeln!(
            output,
            "- {} ({}, {}) {}: {}",
            record.customer,
            record.channel,
            record.agent,
            signed(record.sentiment),
            record.message
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{generate_mock_data, SeededRng};
    use crate::models::tests::{base_time, record};

    #[test]
    fn empty_report_says_so() {
        let report = build_report("upload.csv", &[], &AlertContext::default(), base_time());
        assert!(report.contains("No interactions loaded."));
        assert!(!report.contains("## Agent Coaching"));
    }

    #[test]
    fn report_includes_each_section() {
        let now = base_time();
        let records = generate_mock_data(&mut SeededRng::new(3), now);
        let mut alerts = AlertContext::default();
        alerts.evaluate(&records, now);

        let report = build_report("sample data", &records, &alerts, now);
        for heading in [
            "## Overview",
            "## Sentiment Breakdown",
            "## Agent Coaching",
            "## Top Keywords",
            "## Top Issues",
            "## CSAT Prediction",
            "## Alerts",
            "## Weekly Summary",
            "## Recent Interactions",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
        assert!(report.contains("- Total interactions: 50"));
    }

    #[test]
    fn active_alert_lists_actions() {
        let now = base_time();
        let records: Vec<_> = (0..5).map(|i| record(&i.to_string(), -0.8)).collect();
        let mut alerts = AlertContext::default();
        alerts.evaluate(&records, now);

        let report = build_report("upload.csv", &records, &alerts, now);
        assert!(report.contains("- [critical] Negative sentiment spike detected"));
        assert!(report.contains("  - Schedule team training on empathy"));
        assert!(report.contains("High negative sentiment detected"));
    }
}
