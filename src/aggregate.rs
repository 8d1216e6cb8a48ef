use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{
    mean, percentage, AgentRollup, AggregateSummary, ChannelCount, CsatSummary, DailyTrend,
    InteractionRecord, KeywordRollup, SentimentBreakdown,
};
use crate::sentiment::{
    classify_sentiment, classify_severity_band, csat_or_default, is_issue, SentimentBand,
    SeverityBand,
};

/// Categorical fields the dashboard offers as filter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Channel,
    Agent,
    Category,
}

impl Field {
    fn value<'a>(&self, record: &'a InteractionRecord) -> &'a str {
        match self {
            Field::Channel => &record.channel,
            Field::Agent => &record.agent,
            Field::Category => &record.category,
        }
    }
}

pub fn summarize(records: &[InteractionRecord]) -> AggregateSummary {
    if records.is_empty() {
        return AggregateSummary::empty();
    }

    let mut summary = AggregateSummary::empty();
    let mut sentiment_sum = 0.0;
    let mut confidence_sum = 0.0;

    for record in records {
        sentiment_sum += record.sentiment;
        confidence_sum += record.confidence;
        match classify_sentiment(record.sentiment) {
            SentimentBand::Positive => summary.positive += 1,
            SentimentBand::Neutral => summary.neutral += 1,
            SentimentBand::Negative => summary.negative += 1,
        }
    }

    summary.total = records.len();
    summary.mean_sentiment = mean(sentiment_sum, records.len());
    summary.average_confidence = mean(confidence_sum, records.len());
    summary.agents = per_agent_rollup(records);
    summary.keywords = per_keyword_rollup(records, false);
    summary.issues = per_keyword_rollup(records, true);
    summary
}

#[derive(Default)]
struct AgentTally {
    count: usize,
    sentiment: f64,
    positive: usize,
    negative: usize,
}

/// Rollup per agent, best mean sentiment first. Ties keep first-seen order.
pub fn per_agent_rollup(records: &[InteractionRecord]) -> Vec<AgentRollup> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, AgentTally> = HashMap::new();

    for record in records {
        let tally = tallies.entry(record.agent.as_str()).or_insert_with(|| {
            order.push(record.agent.as_str());
            AgentTally::default()
        });
        tally.count += 1;
        tally.sentiment += record.sentiment;
        match classify_sentiment(record.sentiment) {
            SentimentBand::Positive => tally.positive += 1,
            SentimentBand::Negative => tally.negative += 1,
            SentimentBand::Neutral => {}
        }
    }

    let mut rollups: Vec<AgentRollup> = order
        .into_iter()
        .filter_map(|agent| {
            let tally = tallies.get(agent)?;
            Some(AgentRollup {
                agent: agent.to_string(),
                count: tally.count,
                mean_sentiment: mean(tally.sentiment, tally.count),
                positive_rate: percentage(tally.positive, tally.count),
                negative_rate: percentage(tally.negative, tally.count),
            })
        })
        .collect();

    rollups.sort_by(|a, b| {
        b.mean_sentiment
            .partial_cmp(&a.mean_sentiment)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rollups
}

/// Keyword mentions with their mean sentiment, most mentioned first.
///
/// With `restrict_to_negative` only records below the issue threshold count,
/// which is how the dashboard surfaces its "top issues".
pub fn per_keyword_rollup(
    records: &[InteractionRecord],
    restrict_to_negative: bool,
) -> Vec<KeywordRollup> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, (usize, f64)> = HashMap::new();

    for record in records {
        if restrict_to_negative && !is_issue(record.sentiment) {
            continue;
        }
        for keyword in &record.keywords {
            let entry = tallies.entry(keyword.as_str()).or_insert_with(|| {
                order.push(keyword.as_str());
                (0, 0.0)
            });
            entry.0 += 1;
            entry.1 += record.sentiment;
        }
    }

    let mut rollups: Vec<KeywordRollup> = order
        .into_iter()
        .filter_map(|keyword| {
            let (mentions, sentiment) = tallies.get(keyword)?;
            Some(KeywordRollup {
                keyword: keyword.to_string(),
                mentions: *mentions,
                mean_sentiment: mean(*sentiment, *mentions),
            })
        })
        .collect();

    rollups.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    rollups
}

pub fn top_issues(records: &[InteractionRecord], limit: usize) -> Vec<KeywordRollup> {
    let mut issues = per_keyword_rollup(records, true);
    issues.truncate(limit);
    issues
}

pub fn sentiment_breakdown(records: &[InteractionRecord]) -> SentimentBreakdown {
    let mut breakdown = SentimentBreakdown::default();
    for record in records {
        match classify_severity_band(record.sentiment) {
            SeverityBand::VeryPositive => breakdown.very_positive += 1,
            SeverityBand::Positive => breakdown.positive += 1,
            SeverityBand::Neutral => breakdown.neutral += 1,
            SeverityBand::Negative => breakdown.negative += 1,
            SeverityBand::VeryNegative => breakdown.very_negative += 1,
        }
    }
    breakdown
}

pub fn csat_summary(records: &[InteractionRecord]) -> CsatSummary {
    let scores: Vec<u8> = records.iter().map(csat_or_default).collect();
    let sum: f64 = scores.iter().map(|score| f64::from(*score)).sum();
    CsatSummary {
        average: mean(sum, scores.len()),
        low: scores.iter().filter(|score| **score <= 2).count(),
        high: scores.iter().filter(|score| **score >= 4).count(),
    }
}

/// Distinct values of a field in first-seen order.
pub fn distinct_values(records: &[InteractionRecord], field: Field) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for record in records {
        let value = field.value(record);
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

pub fn channel_counts(records: &[InteractionRecord]) -> Vec<ChannelCount> {
    let mut counts: Vec<ChannelCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|entry| entry.channel == record.channel) {
            Some(entry) => entry.count += 1,
            None => counts.push(ChannelCount {
                channel: record.channel.clone(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_channel(records: &[InteractionRecord]) -> Option<ChannelCount> {
    channel_counts(records).into_iter().next()
}

/// Records whose timestamp falls within `days` days before `now`.
pub fn within_days(
    records: &[InteractionRecord],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<InteractionRecord> {
    let cutoff = now - Duration::days(days.max(0));
    records
        .iter()
        .filter(|record| record.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Count and mean sentiment for each of the last `days` UTC calendar days,
/// oldest first.
pub fn daily_trend(records: &[InteractionRecord], now: DateTime<Utc>, days: u32) -> Vec<DailyTrend> {
    let today = now.date_naive();
    (0..i64::from(days))
        .rev()
        .map(|offset| {
            let day: NaiveDate = today - Duration::days(offset);
            let (count, sum) = records
                .iter()
                .filter(|record| record.timestamp.date_naive() == day)
                .fold((0usize, 0.0), |(count, sum), record| {
                    (count + 1, sum + record.sentiment)
                });
            DailyTrend {
                day,
                count,
                mean_sentiment: mean(sum, count),
            }
        })
        .collect()
}

/// Canned insight lines for the trailing week.
pub fn weekly_insights(records: &[InteractionRecord], now: DateTime<Utc>) -> Vec<String> {
    let week = within_days(records, now, 7);
    let issue_count = week.iter().filter(|record| is_issue(record.sentiment)).count();
    let mean_sentiment = mean(week.iter().map(|record| record.sentiment).sum(), week.len());
    let chat_count = week.iter().filter(|record| record.channel == "Chat").count();

    let mut insights = Vec::new();
    if issue_count > 5 {
        insights.push("High volume of negative sentiment detected this week".to_string());
    }
    if mean_sentiment > 0.2 {
        insights.push("Overall positive sentiment trend this week".to_string());
    }
    if !week.is_empty() && chat_count as f64 > week.len() as f64 * 0.6 {
        insights.push("Live chat is the primary support channel".to_string());
    }
    insights
}

pub fn coaching_tip(rollup: &AgentRollup) -> &'static str {
    if rollup.negative_rate > 30.0 {
        "Focus on empathy and active listening"
    } else if rollup.positive_rate < 40.0 {
        "Try to create more positive interactions"
    } else {
        "Maintain current performance level"
    }
}
