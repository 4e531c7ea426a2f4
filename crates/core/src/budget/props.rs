//! Property-based tests for threshold mapping.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::AlertLevel;

/// Strategy for arbitrary observed percentages (0.00 to 500.00).
fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..50_000).prop_map(|v| Decimal::new(v, 2))
}

proptest! {
    /// A single observation always maps to exactly one band.
    #[test]
    fn prop_one_band_per_observation(p in percent()) {
        let level = AlertLevel::from_percent(p);
        let matches = [
            p >= Decimal::from(100),
            p >= Decimal::from(90) && p < Decimal::from(100),
            p >= Decimal::from(80) && p < Decimal::from(90),
            p < Decimal::from(80),
        ];
        prop_assert_eq!(matches.iter().filter(|m| **m).count(), 1);
        // And the chosen band's threshold is the highest one not above p.
        prop_assert!(Decimal::from(level.threshold()) <= p.max(Decimal::ZERO)
            || level == AlertLevel::None);
    }

    /// The mapping is monotone: more spend never lowers the band.
    #[test]
    fn prop_mapping_is_monotone(a in percent(), b in percent()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(AlertLevel::from_percent(lo) <= AlertLevel::from_percent(hi));
    }

    /// Threshold storage round-trips for every band.
    #[test]
    fn prop_threshold_roundtrip(p in percent()) {
        let level = AlertLevel::from_percent(p);
        prop_assert_eq!(AlertLevel::from_threshold(i16::from(level.threshold())), level);
    }
}
