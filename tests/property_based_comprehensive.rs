//! Property-based tests for the regression gate
//!
//! Core properties covered:
//! 1. Threshold classification per metric type and direction
//! 2. Strict inequality at tier boundaries
//! 3. Zero baselines never produce a result
//! 4. Percentile ordering and small-sample degradation
//! 5. Snapshot persistence round-trip

use proptest::prelude::*;
use voicegate::metric_kind::{Direction, MetricKind};
use voicegate::regression::{Comparator, Severity};
use voicegate::stats::MetricStats;
use voicegate::thresholds::ThresholdTable;

fn lower_is_better() -> impl Strategy<Value = MetricKind> {
    prop::sample::select(vec![
        MetricKind::Wer,
        MetricKind::LatencyMs,
        MetricKind::FalseInterruptionRate,
    ])
}

fn higher_is_better() -> impl Strategy<Value = MetricKind> {
    prop::sample::select(vec![
        MetricKind::Accuracy,
        MetricKind::Pesq,
        MetricKind::SuccessRate,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_lower_is_better_past_critical_is_critical(
        kind in lower_is_better(),
        baseline in 0.01f64..10_000.0,
        margin in 0.01f64..3.0,
    ) {
        let table = ThresholdTable::default();
        let critical = table.get(kind).unwrap().critical;
        let x = critical + margin;
        let current = baseline * (1.0 + x);

        let result = Comparator::tiered(table)
            .check_regression(kind.key(), baseline, current)
            .unwrap();

        prop_assert_eq!(result.severity, Severity::Critical);
        prop_assert!((result.threshold_exceeded - margin * 100.0).abs() < 1e-6);
        prop_assert!(result.change_percent > 0.0);
    }

    #[test]
    fn prop_higher_is_better_past_critical_is_critical(
        kind in higher_is_better(),
        baseline in 0.01f64..10_000.0,
        margin in 0.01f64..0.8,
    ) {
        let table = ThresholdTable::default();
        let critical = table.get(kind).unwrap().critical;
        let x = critical - margin;
        let current = baseline * (1.0 + x);

        let result = Comparator::tiered(table)
            .check_regression(kind.key(), baseline, current)
            .unwrap();

        prop_assert_eq!(result.severity, Severity::Critical);
        prop_assert!(result.threshold_exceeded >= 0.0);
        prop_assert!(result.change_percent < 0.0);
    }

    #[test]
    fn prop_zero_baseline_never_classified(
        kind in prop::sample::select(MetricKind::ALL.to_vec()),
        current in -1e6f64..1e6,
    ) {
        let comparator = Comparator::tiered(ThresholdTable::default());
        prop_assert!(comparator.check_regression(kind.key(), 0.0, current).is_none());
    }

    #[test]
    fn prop_favorable_change_is_never_a_regression(
        kind in prop::sample::select(MetricKind::ALL.to_vec()),
        baseline in 0.01f64..10_000.0,
        x in 0.0f64..0.9,
    ) {
        let current = match kind.direction() {
            Direction::LowerIsBetter => baseline * (1.0 - x),
            Direction::HigherIsBetter => baseline * (1.0 + x),
        };
        let comparator = Comparator::tiered(ThresholdTable::default());
        prop_assert!(comparator.check_regression(kind.key(), baseline, current).is_none());
    }

    #[test]
    fn prop_unclassified_names_never_reported(
        name in "[a-v]{1,12}",
        baseline in 0.01f64..100.0,
        current in 0.0f64..1000.0,
    ) {
        // a-v rules out every key but "pesq"
        prop_assume!(MetricKind::classify(&name).is_none());
        let comparator = Comparator::tiered(ThresholdTable::default());
        prop_assert!(comparator.check_regression(&name, baseline, current).is_none());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_stats_ordering(values in prop::collection::vec(-1e6f64..1e6, 1..300)) {
        let s = MetricStats::from_values(&values).unwrap();

        prop_assert_eq!(s.count, values.len());
        prop_assert!(s.min <= s.max);
        prop_assert!(s.min <= s.median && s.median <= s.max);
        prop_assert!(s.stdev >= 0.0);
        prop_assert!(s.p95 <= s.max && s.p99 <= s.max);
        prop_assert!(s.p95 <= s.p99 + 1e-9);
        prop_assert!(s.median <= s.p95 + 1e-9);
        prop_assert_eq!(s.p50, s.median);
    }

    #[test]
    fn prop_small_samples_fall_back_to_max(values in prop::collection::vec(-1e3f64..1e3, 1..20)) {
        let s = MetricStats::from_values(&values).unwrap();
        prop_assert_eq!(s.p95, s.max);
        prop_assert_eq!(s.p99, s.max);
    }

    #[test]
    fn prop_snapshot_round_trip(
        series in prop::collection::btree_map("[a-z_]{3,16}", prop::collection::vec(-1e4f64..1e4, 1..40), 1..6),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let collector = voicegate::collector::MetricsCollector::new(dir.path());
        for (name, values) in &series {
            for value in values {
                collector.record(name, *value, None);
            }
        }

        let saved = collector.save_to_file(Some("prop_metrics.json")).unwrap();
        let loaded = voicegate::snapshot::MetricSnapshot::load(&saved.summary_path).unwrap();

        prop_assert_eq!(loaded.metrics, collector.get_summary().metrics);
    }
}
