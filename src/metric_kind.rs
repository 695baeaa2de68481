//! Metric taxonomy: the closed set of metric types the gate knows how to judge
//!
//! Each kind carries a direction. Lower-is-better kinds regress when they
//! increase, higher-is-better kinds regress when they decrease.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an increase or a decrease of the metric is unfavorable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Metric type, keyed by the substring used to recognize it in metric names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Word error rate
    Wer,
    LatencyMs,
    FalseInterruptionRate,
    Accuracy,
    /// Perceptual speech quality score
    Pesq,
    SuccessRate,
}

impl MetricKind {
    /// All kinds in classification order
    ///
    /// Name inference walks this list and stops at the first hit, so the
    /// order is part of the contract.
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Wer,
        MetricKind::LatencyMs,
        MetricKind::FalseInterruptionRate,
        MetricKind::Accuracy,
        MetricKind::Pesq,
        MetricKind::SuccessRate,
    ];

    /// Key as it appears in metric names and threshold files
    pub fn key(self) -> &'static str {
        match self {
            MetricKind::Wer => "wer",
            MetricKind::LatencyMs => "latency_ms",
            MetricKind::FalseInterruptionRate => "false_interruption_rate",
            MetricKind::Accuracy => "accuracy",
            MetricKind::Pesq => "pesq",
            MetricKind::SuccessRate => "success_rate",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn direction(self) -> Direction {
        match self {
            MetricKind::Wer | MetricKind::LatencyMs | MetricKind::FalseInterruptionRate => {
                Direction::LowerIsBetter
            }
            MetricKind::Accuracy | MetricKind::Pesq | MetricKind::SuccessRate => {
                Direction::HigherIsBetter
            }
        }
    }

    /// First kind whose key is a substring of `name`
    ///
    /// # Example
    /// ```
    /// use voicegate::metric_kind::MetricKind;
    ///
    /// assert_eq!(MetricKind::classify("stt_wer_clean"), Some(MetricKind::Wer));
    /// assert_eq!(MetricKind::classify("tts_latency_ms"), Some(MetricKind::LatencyMs));
    /// assert_eq!(MetricKind::classify("custom_thing_unrelated"), None);
    /// ```
    pub fn classify(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| name.contains(kind.key()))
    }

    /// Prefix/suffix heuristic used by the collector's baseline comparison
    ///
    /// Only four kinds are recognized: `wer*`, `*latency_ms`, `pesq*` and
    /// `*accuracy`.
    pub fn classify_affix(name: &str) -> Option<Self> {
        if name.starts_with("wer") {
            Some(MetricKind::Wer)
        } else if name.ends_with("latency_ms") {
            Some(MetricKind::LatencyMs)
        } else if name.starts_with("pesq") {
            Some(MetricKind::Pesq)
        } else if name.ends_with("accuracy") {
            Some(MetricKind::Accuracy)
        } else {
            None
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_substring() {
        assert_eq!(MetricKind::classify("stt_wer_noisy_10db"), Some(MetricKind::Wer));
        assert_eq!(
            MetricKind::classify("conversation_latency_ms"),
            Some(MetricKind::LatencyMs)
        );
        assert_eq!(
            MetricKind::classify("false_interruption_rate"),
            Some(MetricKind::FalseInterruptionRate)
        );
        assert_eq!(
            MetricKind::classify("turn_taking_overall_accuracy"),
            Some(MetricKind::Accuracy)
        );
        assert_eq!(MetricKind::classify("tts_pesq_score"), Some(MetricKind::Pesq));
        assert_eq!(
            MetricKind::classify("conversation_success_rate"),
            Some(MetricKind::SuccessRate)
        );
    }

    #[test]
    fn test_classify_no_match() {
        assert_eq!(MetricKind::classify("stt_rtf"), None);
        assert_eq!(MetricKind::classify("custom_thing_unrelated"), None);
        assert_eq!(MetricKind::classify(""), None);
    }

    #[test]
    fn test_classify_first_key_wins() {
        // Matches both "wer" and "accuracy"; taxonomy order decides
        assert_eq!(MetricKind::classify("wer_accuracy"), Some(MetricKind::Wer));
        assert_eq!(MetricKind::classify("accuracy_wer"), Some(MetricKind::Wer));
    }

    #[test]
    fn test_classify_affix() {
        assert_eq!(MetricKind::classify_affix("wer_clean"), Some(MetricKind::Wer));
        assert_eq!(MetricKind::classify_affix("stt_wer_clean"), None);
        assert_eq!(
            MetricKind::classify_affix("stt_latency_ms"),
            Some(MetricKind::LatencyMs)
        );
        assert_eq!(MetricKind::classify_affix("pesq_clean"), Some(MetricKind::Pesq));
        assert_eq!(
            MetricKind::classify_affix("backchannel_accuracy"),
            Some(MetricKind::Accuracy)
        );
        assert_eq!(MetricKind::classify_affix("false_interruption_rate"), None);
    }

    #[test]
    fn test_direction() {
        assert_eq!(MetricKind::Wer.direction(), Direction::LowerIsBetter);
        assert_eq!(MetricKind::LatencyMs.direction(), Direction::LowerIsBetter);
        assert_eq!(
            MetricKind::FalseInterruptionRate.direction(),
            Direction::LowerIsBetter
        );
        assert_eq!(MetricKind::Accuracy.direction(), Direction::HigherIsBetter);
        assert_eq!(MetricKind::Pesq.direction(), Direction::HigherIsBetter);
        assert_eq!(MetricKind::SuccessRate.direction(), Direction::HigherIsBetter);
    }

    #[test]
    fn test_key_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(MetricKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(MetricKind::from_key("snr_db"), None);
    }

    #[test]
    fn test_serde_uses_key() {
        let json = serde_json::to_string(&MetricKind::FalseInterruptionRate).unwrap();
        assert_eq!(json, "\"false_interruption_rate\"");
        let kind: MetricKind = serde_json::from_str("\"latency_ms\"").unwrap();
        assert_eq!(kind, MetricKind::LatencyMs);
    }
}
