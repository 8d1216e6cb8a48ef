//! Sentiment banding shared by every aggregate, alert and filter.

use serde::{Deserialize, Serialize};

use crate::models::InteractionRecord;

/// Scores above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;
/// Scores below this are critical (the "very negative" band).
pub const CRITICAL_THRESHOLD: f64 = -0.5;
/// Scores above this are very positive.
pub const VERY_POSITIVE_THRESHOLD: f64 = 0.5;
/// Stricter negative cut used for issue surfacing and spike alerts.
pub const ISSUE_THRESHOLD: f64 = -0.3;

/// CSAT assumed when a record carries no prediction.
pub const DEFAULT_CSAT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBand {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

/// Three-way classification. NaN falls into `Neutral` since it compares
/// false against both thresholds.
pub fn classify_sentiment(value: f64) -> SentimentBand {
    if value > POSITIVE_THRESHOLD {
        SentimentBand::Positive
    } else if value < NEGATIVE_THRESHOLD {
        SentimentBand::Negative
    } else {
        SentimentBand::Neutral
    }
}

pub fn classify_severity_band(value: f64) -> SeverityBand {
    match classify_sentiment(value) {
        SentimentBand::Positive if value > VERY_POSITIVE_THRESHOLD => SeverityBand::VeryPositive,
        SentimentBand::Positive => SeverityBand::Positive,
        SentimentBand::Neutral => SeverityBand::Neutral,
        SentimentBand::Negative if is_critical(value) => SeverityBand::VeryNegative,
        SentimentBand::Negative => SeverityBand::Negative,
    }
}

pub fn is_critical(value: f64) -> bool {
    value < CRITICAL_THRESHOLD
}

pub fn is_issue(value: f64) -> bool {
    value < ISSUE_THRESHOLD
}

pub fn csat_or_default(record: &InteractionRecord) -> u8 {
    record.csat_prediction.unwrap_or(DEFAULT_CSAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(classify_sentiment(0.11), SentimentBand::Positive);
        assert_eq!(classify_sentiment(0.1), SentimentBand::Neutral);
        assert_eq!(classify_sentiment(-0.1), SentimentBand::Neutral);
        assert_eq!(classify_sentiment(-0.06), SentimentBand::Neutral);
        assert_eq!(classify_sentiment(-0.11), SentimentBand::Negative);
        assert_eq!(classify_sentiment(f64::NAN), SentimentBand::Neutral);
    }

    #[test]
    fn five_way_bands_split_the_outer_ranges() {
        assert_eq!(classify_severity_band(0.9), SeverityBand::VeryPositive);
        assert_eq!(classify_severity_band(0.5), SeverityBand::Positive);
        assert_eq!(classify_severity_band(0.0), SeverityBand::Neutral);
        assert_eq!(classify_severity_band(-0.5), SeverityBand::Negative);
        assert_eq!(classify_severity_band(-0.51), SeverityBand::VeryNegative);
        assert_eq!(classify_severity_band(-7.0), SeverityBand::VeryNegative);
    }

    #[test]
    fn missing_csat_defaults_to_three() {
        let mut record = crate::models::tests::record("r-1", -0.4);
        record.csat_prediction = None;
        assert_eq!(csat_or_default(&record), 3);
        record.csat_prediction = Some(5);
        assert_eq!(csat_or_default(&record), 5);
    }

    proptest! {
        #[test]
        fn exactly_one_band_matches(value in proptest::num::f64::ANY) {
            let hits = [
                value > POSITIVE_THRESHOLD,
                value < NEGATIVE_THRESHOLD,
                !(value > POSITIVE_THRESHOLD) && !(value < NEGATIVE_THRESHOLD),
            ];
            prop_assert_eq!(hits.iter().filter(|hit| **hit).count(), 1);

            let expected = if hits[0] {
                SentimentBand::Positive
            } else if hits[1] {
                SentimentBand::Negative
            } else {
                SentimentBand::Neutral
            };
            prop_assert_eq!(classify_sentiment(value), expected);
        }
    }
}
