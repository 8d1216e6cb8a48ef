//! Synthetic interaction records for demos and tests.

use chrono::{DateTime, Duration, Utc};

use crate::models::InteractionRecord;

pub const MOCK_RECORD_COUNT: usize = 50;

const CHANNELS: [&str; 4] = ["Email", "Chat", "Phone", "Social"];
const AGENTS: [&str; 5] = ["Sarah", "Mike", "Emma", "David", "Lisa"];
const CATEGORIES: [&str; 5] = ["Billing", "Technical", "Delivery", "Product", "General"];
const KEYWORDS: [&str; 4] = ["service", "product", "delivery", "support"];

pub const CANNED_MESSAGES: [(&str, f64); 10] = [
    ("I'm extremely disappointed with the delayed delivery. This is unacceptable!", -0.8),
    ("Thank you so much for the quick resolution! Excellent service.", 0.9),
    ("The product quality is below expectations. Not happy with this purchase.", -0.6),
    ("Great customer support! Very helpful and professional.", 0.8),
    ("Average experience. Nothing special but got the job done.", 0.1),
    ("Terrible experience! I want a full refund immediately!", -0.9),
    ("The team was amazing! Solved my issue in minutes.", 0.7),
    ("Product works as described. Standard quality.", 0.2),
    ("Billing error again! This is the third time this month.", -0.7),
    ("Outstanding service! Will definitely recommend to others.", 0.9),
];

const WEEK_MILLIS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Source of uniform randomness for the generator.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_f64() * bound as f64) as usize % bound
    }
}

/// Deterministic xorshift64 generator.
#[derive(Debug, Clone)]
pub struct SeededRng(u64);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    pub fn from_clock() -> Self {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self::new(nanos as u64)
    }
}

impl RandomSource for SeededRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

pub fn csat_for(base_sentiment: f64) -> u8 {
    (3.0 + base_sentiment * 2.0).round().clamp(1.0, 5.0) as u8
}

pub fn generate_mock_data<R: RandomSource>(rng: &mut R, now: DateTime<Utc>) -> Vec<InteractionRecord> {
    generate_records(rng, now, MOCK_RECORD_COUNT)
}

pub fn generate_records<R: RandomSource>(
    rng: &mut R,
    now: DateTime<Utc>,
    count: usize,
) -> Vec<InteractionRecord> {
    (0..count)
        .map(|i| {
            let (message, base) = CANNED_MESSAGES[i % CANNED_MESSAGES.len()];
            let sentiment = base + (rng.next_f64() - 0.5) * 0.2;
            let channel = CHANNELS[rng.next_index(CHANNELS.len())];
            let agent = AGENTS[rng.next_index(AGENTS.len())];
            let age = Duration::milliseconds((rng.next_f64() * WEEK_MILLIS) as i64);
            let category = CATEGORIES[rng.next_index(CATEGORIES.len())];
            let confidence = 0.7 + rng.next_f64() * 0.3;
            let keyword_count = rng.next_index(3) + 1;

            InteractionRecord {
                id: format!("ticket-{}", i + 1),
                message: message.to_string(),
                sentiment,
                channel: channel.to_string(),
                agent: agent.to_string(),
                customer: format!("customer-{}@example.com", i + 1),
                category: category.to_string(),
                confidence,
                keywords: KEYWORDS[..keyword_count].iter().map(|k| k.to_string()).collect(),
                csat_prediction: Some(csat_for(base)),
                timestamp: now - age,
            }
        })
        .collect()
}
