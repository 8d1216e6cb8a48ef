use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::InteractionRecord;
use crate::sentiment::{classify_sentiment, is_critical, SentimentBand};

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SentimentFilter {
    #[default]
    All,
    Positive,
    Neutral,
    Negative,
    Critical,
}

impl SentimentFilter {
    pub fn matches(&self, sentiment: f64) -> bool {
        match self {
            SentimentFilter::All => true,
            SentimentFilter::Positive => classify_sentiment(sentiment) == SentimentBand::Positive,
            SentimentFilter::Neutral => classify_sentiment(sentiment) == SentimentBand::Neutral,
            SentimentFilter::Negative => classify_sentiment(sentiment) == SentimentBand::Negative,
            SentimentFilter::Critical => is_critical(sentiment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first.
    #[default]
    Timestamp,
    SentimentAsc,
    SentimentDesc,
    /// Most confident first.
    Confidence,
}

impl SortKey {
    fn compare(&self, a: &InteractionRecord, b: &InteractionRecord) -> Ordering {
        match self {
            SortKey::Timestamp => b.timestamp.cmp(&a.timestamp),
            SortKey::SentimentAsc => a.sentiment.partial_cmp(&b.sentiment).unwrap_or(Ordering::Equal),
            SortKey::SentimentDesc => b.sentiment.partial_cmp(&a.sentiment).unwrap_or(Ordering::Equal),
            SortKey::Confidence => b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal),
        }
    }
}

/// User-selected view parameters. `None` selectors mean "all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub sentiment: SentimentFilter,
    pub channel: Option<String>,
    pub agent: Option<String>,
    pub sort_by: SortKey,
    pub limit: usize,
    pub search: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            sentiment: SentimentFilter::All,
            channel: None,
            agent: None,
            sort_by: SortKey::Timestamp,
            limit: DEFAULT_LIMIT,
            search: String::new(),
        }
    }
}

impl FilterCriteria {
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn only_negative(self) -> Self {
        Self {
            sentiment: SentimentFilter::Negative,
            ..self
        }
    }

    pub fn critical_issues(self) -> Self {
        Self {
            sentiment: SentimentFilter::Critical,
            ..self
        }
    }

    pub fn recent_first(self) -> Self {
        Self {
            sort_by: SortKey::Timestamp,
            ..self
        }
    }

    pub fn worst_first(self) -> Self {
        Self {
            sort_by: SortKey::SentimentAsc,
            ..self
        }
    }

    fn matches(&self, record: &InteractionRecord, needle: &str) -> bool {
        let found = needle.is_empty()
            || record.message.to_lowercase().contains(needle)
            || record.customer.to_lowercase().contains(needle);

        found
            && self.sentiment.matches(record.sentiment)
            && selected(self.channel.as_deref(), &record.channel)
            && selected(self.agent.as_deref(), &record.agent)
    }
}

fn selected(selector: Option<&str>, value: &str) -> bool {
    selector.map_or(true, |wanted| wanted == value)
}

/// Treat the literal `all` as "no selection".
pub fn parse_selector(value: Option<String>) -> Option<String> {
    value.filter(|selected| !selected.eq_ignore_ascii_case("all"))
}

/// Search, filter, stable-sort and truncate a copy of `records`.
pub fn filter_and_sort(records: &[InteractionRecord], criteria: &FilterCriteria) -> Vec<InteractionRecord> {
    let needle = criteria.search.to_lowercase();
    let mut view: Vec<InteractionRecord> = records
        .iter()
        .filter(|record| criteria.matches(record, &needle))
        .cloned()
        .collect();

    view.sort_by(|a, b| criteria.sort_by.compare(a, b));
    view.truncate(criteria.limit);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{base_time, record};
    use chrono::Duration;
    use proptest::prelude::*;

    fn sample() -> Vec<InteractionRecord> {
        let mut records = Vec::new();
        let rows = [
            ("1", -0.8, "Email", "Sarah", "Terrible delivery delay", 0.95),
            ("2", 0.9, "Chat", "Mike", "Excellent service", 0.80),
            ("3", 0.0, "Chat", "Sarah", "Average experience", 0.75),
            ("4", -0.3, "Phone", "Emma", "Billing error again", 0.85),
            ("5", 0.4, "Email", "Mike", "Great support", 0.80),
        ];
        for (i, (id, sentiment, channel, agent, message, confidence)) in rows.iter().enumerate() {
            let mut value = record(id, *sentiment);
            value.channel = channel.to_string();
            value.agent = agent.to_string();
            value.message = message.to_string();
            value.confidence = *confidence;
            value.timestamp = base_time() - Duration::hours(i as i64);
            records.push(value);
        }
        records
    }

    fn ids(records: &[InteractionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn default_criteria_sort_newest_first() {
        let mut records = sample();
        records.reverse();
        let view = filter_and_sort(&records, &FilterCriteria::default());
        assert_eq!(ids(&view), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn search_matches_message_or_customer_case_insensitively() {
        let criteria = FilterCriteria {
            search: "BILLING".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &criteria)), vec!["4"]);

        let criteria = FilterCriteria {
            search: "5@EXAMPLE".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &criteria)), vec!["5"]);
    }

    #[test]
    fn sentiment_bands_filter() {
        let view = filter_and_sort(&sample(), &FilterCriteria::default().only_negative());
        assert_eq!(ids(&view), vec!["1", "4"]);

        let view = filter_and_sort(&sample(), &FilterCriteria::default().critical_issues());
        assert_eq!(ids(&view), vec!["1"]);

        let neutral = FilterCriteria {
            sentiment: SentimentFilter::Neutral,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &neutral)), vec!["3"]);
    }

    #[test]
    fn channel_and_agent_are_exact() {
        let criteria = FilterCriteria {
            channel: Some("Chat".to_string()),
            agent: Some("Sarah".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &criteria)), vec!["3"]);

        let criteria = FilterCriteria {
            channel: Some("chat".to_string()),
            ..FilterCriteria::default()
        };
        assert!(filter_and_sort(&sample(), &criteria).is_empty());
    }

    #[test]
    fn sort_keys_order_results() {
        let worst = filter_and_sort(&sample(), &FilterCriteria::default().worst_first());
        assert_eq!(ids(&worst), vec!["1", "4", "3", "5", "2"]);

        let best = FilterCriteria {
            sort_by: SortKey::SentimentDesc,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &best)), vec!["2", "5", "3", "4", "1"]);
    }

    #[test]
    fn confidence_sort_is_stable() {
        let criteria = FilterCriteria {
            sort_by: SortKey::Confidence,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &criteria)), vec!["1", "4", "2", "5", "3"]);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let criteria = FilterCriteria {
            limit: 2,
            ..FilterCriteria::default().worst_first()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &criteria)), vec!["1", "4"]);
    }

    #[test]
    fn presets_compose_and_reset() {
        let criteria = FilterCriteria::default().worst_first().only_negative().recent_first();
        assert_eq!(criteria.sort_by, SortKey::Timestamp);
        assert_eq!(criteria.sentiment, SentimentFilter::Negative);
        assert_eq!(FilterCriteria::reset(), FilterCriteria::default());
    }

    #[test]
    fn all_selector_means_no_filter() {
        assert_eq!(parse_selector(Some("All".to_string())), None);
        assert_eq!(parse_selector(Some("Chat".to_string())), Some("Chat".to_string()));
        assert_eq!(parse_selector(None), None);
    }

    #[test]
    fn input_is_untouched() {
        let records = sample();
        let before = records.clone();
        let _ = filter_and_sort(&records, &FilterCriteria::default().worst_first());
        assert_eq!(records, before);
    }

    fn arb_records() -> impl Strategy<Value = Vec<InteractionRecord>> {
        proptest::collection::vec((-1.0f64..1.0, 0.0f64..1.0, 0i64..500, 0usize..3), 0..40).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (sentiment, confidence, minutes, channel))| {
                        let mut value = record(&i.to_string(), sentiment);
                        value.confidence = confidence;
                        value.timestamp = base_time() - Duration::minutes(minutes);
                        value.channel = ["Email", "Chat", "Phone"][channel].to_string();
                        value
                    })
                    .collect()
            },
        )
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            prop_oneof![
                Just(SentimentFilter::All),
                Just(SentimentFilter::Positive),
                Just(SentimentFilter::Neutral),
                Just(SentimentFilter::Negative),
                Just(SentimentFilter::Critical),
            ],
            prop_oneof![
                Just(SortKey::Timestamp),
                Just(SortKey::SentimentAsc),
                Just(SortKey::SentimentDesc),
                Just(SortKey::Confidence),
            ],
            proptest::option::of(Just("Chat".to_string())),
            1usize..60,
        )
            .prop_map(|(sentiment, sort_by, channel, limit)| FilterCriteria {
                sentiment,
                sort_by,
                channel,
                limit,
                ..FilterCriteria::default()
            })
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(records in arb_records(), criteria in arb_criteria()) {
            let once = filter_and_sort(&records, &criteria);
            let twice = filter_and_sort(&once, &criteria);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn limit_caps_result_size(records in arb_records(), criteria in arb_criteria()) {
            let unlimited = FilterCriteria { limit: usize::MAX, ..criteria.clone() };
            let matching = filter_and_sort(&records, &unlimited).len();
            let view = filter_and_sort(&records, &criteria);
            prop_assert_eq!(view.len(), matching.min(criteria.limit));
        }
    }
}
