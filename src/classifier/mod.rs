//! Bot/human classification over the published feature snapshot.
//!
//! Stateless: the decision is a pure function of the current row count and
//! the configured thresholds. Staleness up to one poll interval is expected
//! and tolerated.

use crate::config::BotManagerConfig;

/// Outcome of classifying one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward to the backend.
    Human,
    /// Intercept with the synthetic response.
    Bot,
}

/// Threshold-based classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    low: usize,
    high: usize,
    always_bot: bool,
}

impl Classifier {
    pub fn new(config: &BotManagerConfig) -> Self {
        Self {
            low: config.threshold_low,
            high: config.threshold_high,
            always_bot: config.always_bot,
        }
    }

    /// HUMAN iff `low < row_count < high`; BOT otherwise. The `always_bot`
    /// switch forces BOT regardless of the signal.
    pub fn classify(&self, row_count: usize) -> Verdict {
        if self.always_bot {
            return Verdict::Bot;
        }
        if self.low < row_count && row_count < self.high {
            Verdict::Human
        } else {
            Verdict::Bot
        }
    }
}
