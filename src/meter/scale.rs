//! dBFS to bar column mapping for the K-20 scale.

/// Number of columns in the meter bar
pub const METER_WIDTH: usize = 71;

/// Below this level the scale compresses to 2 dB per column
const BREAKPOINT_DB: f32 = -50.0;

/// Map a level in dBFS to a column of the bar.
///
/// Quiet levels (below -50 dBFS) take 2 dB per column, louder levels 1 dB per
/// column. The result is clamped to `0..METER_WIDTH`.
pub fn scale(level_dbfs: f32) -> usize {
    let x = if level_dbfs < BREAKPOINT_DB {
        ((90.0 + level_dbfs) / 2.0).round()
    } else {
        (71.0 + level_dbfs).round()
    };

    // NaN lands on column 0
    x.clamp(0.0, (METER_WIDTH - 1) as f32) as usize
}

/// Color zone a bar column belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Columns 0-49: up to -20 dBFS (K-20 "0")
    Normal,
    /// Columns 50-54: the first 4 dB above reference
    Caution,
    /// Columns 55-70: approaching full scale
    Hot,
}

impl Zone {
    pub fn of(column: usize) -> Self {
        match column {
            0..=49 => Zone::Normal,
            50..=54 => Zone::Caution,
            _ => Zone::Hot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn quiet_range_uses_two_db_per_column() {
        assert_eq!(scale(-70.0), 10);
        assert_eq!(scale(-60.0), 15);
        assert_eq!(scale(-52.0), 19);
        // -51 / 2 rounds half away from zero
        assert_eq!(scale(-51.0), 20);
    }

    #[test]
    fn breakpoint_belongs_to_upper_branch() {
        assert_eq!(scale(-50.0), 21);
        assert_eq!(scale(-50.0001), 20);
    }

    #[test]
    fn loud_range_uses_one_db_per_column() {
        assert_eq!(scale(-20.0), 51);
        assert_eq!(scale(-10.0), 61);
        assert_eq!(scale(-1.0), 70);
        assert_eq!(scale(-1.6), 69);
    }

    #[test]
    fn clamps_to_bar_bounds() {
        assert_eq!(scale(-90.0), 0);
        assert_eq!(scale(-200.0), 0);
        assert_eq!(scale(0.0), 70);
        assert_eq!(scale(20.0), 70);
        assert_eq!(scale(f32::NEG_INFINITY), 0);
        assert_eq!(scale(f32::NAN), 0);
    }

    #[test]
    fn zones_split_at_reference_marks() {
        assert_eq!(Zone::of(0), Zone::Normal);
        assert_eq!(Zone::of(49), Zone::Normal);
        assert_eq!(Zone::of(50), Zone::Caution);
        assert_eq!(Zone::of(54), Zone::Caution);
        assert_eq!(Zone::of(55), Zone::Hot);
        assert_eq!(Zone::of(70), Zone::Hot);
    }

    proptest! {
        #[test]
        fn matches_piecewise_formula(level in -200.0f32..40.0) {
            let expected = if level < -50.0 {
                ((90.0 + level) / 2.0).round()
            } else {
                (71.0 + level).round()
            };
            let expected = expected.clamp(0.0, 70.0) as usize;
            prop_assert_eq!(scale(level), expected);
        }

        #[test]
        fn is_non_decreasing(a in -200.0f32..40.0, b in -200.0f32..40.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scale(lo) <= scale(hi));
        }
    }
}
