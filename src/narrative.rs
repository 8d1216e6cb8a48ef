//! Conversational summary text for the support team.

use chrono::{DateTime, Timelike, Utc};

use crate::aggregate::{summarize, top_channel};
use crate::mock::RandomSource;
use crate::models::InteractionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTemplate {
    Overview,
    Channels,
    Escalations,
}

impl SummaryTemplate {
    pub const ALL: [SummaryTemplate; 3] = [
        SummaryTemplate::Overview,
        SummaryTemplate::Channels,
        SummaryTemplate::Escalations,
    ];

    pub fn pick<R: RandomSource>(rng: &mut R) -> Self {
        Self::ALL[rng.next_index(Self::ALL.len())]
    }
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

pub fn summarize_text(
    records: &[InteractionRecord],
    template: SummaryTemplate,
    now: DateTime<Utc>,
) -> String {
    if records.is_empty() {
        return "No interactions loaded yet.".to_string();
    }

    let summary = summarize(records);
    let (total, positive, negative) = (summary.total, summary.positive, summary.negative);
    let mean = summary.mean_sentiment;

    match template {
        SummaryTemplate::Overview => {
            let trend = if mean > 0.0 {
                "positive"
            } else if mean < -0.2 {
                "concerning"
            } else {
                "neutral"
            };
            format!(
                "{}! I've analyzed {total} support interactions today. Here's what I found: \
                 {negative} customers expressed frustration, while {positive} were satisfied. \
                 The overall sentiment trend is {trend}.",
                greeting(now.hour())
            )
        }
        SummaryTemplate::Channels => {
            let channel = match top_channel(records) {
                Some(top) => format!(
                    "Most interactions came through {} ({} tickets)",
                    top.channel, top.count
                ),
                None => "Balanced across all channels".to_string(),
            };
            let mood = if negative as f64 > total as f64 * 0.3 {
                format!("High frustration detected - {negative} angry customers need attention.")
            } else {
                "Customer satisfaction levels are stable.".to_string()
            };
            format!("Today's support overview: {channel}. {mood}")
        }
        SummaryTemplate::Escalations => {
            let escalation = if negative > 5 {
                format!("I've flagged {negative} cases for escalation due to negative sentiment.")
            } else {
                "No critical escalations needed today.".to_string()
            };
            let team = if positive > negative {
                "Your team is doing great with customer relations!"
            } else {
                "Consider reviewing support processes for improvement opportunities."
            };
            format!("Insight: {escalation} {team}")
        }
    }
}
