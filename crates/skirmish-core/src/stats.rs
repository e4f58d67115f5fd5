//! The stat-to-modifier table.
//!
//! Clamps a stat in `[1, 100]` to an accuracy modifier in `[-20, 20]`,
//! mirror-symmetric around 50/51 (both map to 0). The curve between anchors
//! must stay monotone non-decreasing.

/// Anchors for the low half, stat 1..=6.
const LOW_ANCHORS: [(u8, i32); 6] = [(1, -20), (2, -19), (3, -18), (4, -17), (5, -16), (6, -15)];

/// Convert a raw stat (clamped to `[1, 100]`) into an accuracy modifier.
///
/// The curve is built from the low anchors (1..=6), a monotone ramp from 6
/// to 50 that reaches 0 at 50/51, and the mirror image for the upper half
/// (51..=100), so that `stat_to_modifier(50 - i) == -stat_to_modifier(51 + i)`
/// for every `i` in `0..49`.
pub fn stat_to_modifier(stat: i32) -> i32 {
    let clamped = stat.clamp(1, 100) as u8;

    if clamped <= 50 {
        low_half_modifier(clamped)
    } else {
        -low_half_modifier(101 - clamped)
    }
}

/// Modifier for a stat in `1..=50`, anchored at the low-anchor table and
/// ramping linearly (monotone non-decreasing, one unit per two stat points)
/// from the last anchor (6 -> -15) up to 0 at 50.
fn low_half_modifier(stat: u8) -> i32 {
    if let Some(&(_, modifier)) = LOW_ANCHORS.iter().find(|&&(s, _)| s == stat) {
        return modifier;
    }
    debug_assert!(stat > 6 && stat <= 50);
    // Ramp from (6, -15) to (50, 0): 15 points of modifier over 44 points of
    // stat. Distribute non-decreasingly: one extra modifier step every
    // ceil(44/15) stat points.
    let span_stat = 50 - 6;
    let span_mod = 15;
    let offset = stat - 6;
    let modifier = -15 + ((offset as i32 * span_mod) / span_stat);
    modifier.min(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_anchors_match_the_table_exactly() {
        assert_eq!(stat_to_modifier(1), -20);
        assert_eq!(stat_to_modifier(2), -19);
        assert_eq!(stat_to_modifier(3), -18);
        assert_eq!(stat_to_modifier(4), -17);
        assert_eq!(stat_to_modifier(5), -16);
        assert_eq!(stat_to_modifier(6), -15);
    }

    #[test]
    fn center_is_zero() {
        assert_eq!(stat_to_modifier(50), 0);
        assert_eq!(stat_to_modifier(51), 0);
    }

    #[test]
    fn top_anchor_is_plus_twenty() {
        assert_eq!(stat_to_modifier(100), 20);
        assert_eq!(stat_to_modifier(99), 19);
        assert_eq!(stat_to_modifier(95), 15);
    }

    #[test]
    fn mirror_symmetric_around_50_51() {
        for i in 0..49 {
            assert_eq!(
                stat_to_modifier(50 - i),
                -stat_to_modifier(51 + i),
                "asymmetry at i={i}"
            );
        }
    }

    #[test]
    fn monotone_non_decreasing() {
        let mut prev = stat_to_modifier(1);
        for stat in 2..=100 {
            let cur = stat_to_modifier(stat);
            assert!(cur >= prev, "modifier decreased at stat={stat}");
            prev = cur;
        }
    }

    #[test]
    fn clamps_out_of_range_stats() {
        assert_eq!(stat_to_modifier(0), stat_to_modifier(1));
        assert_eq!(stat_to_modifier(-50), stat_to_modifier(1));
        assert_eq!(stat_to_modifier(101), stat_to_modifier(100));
        assert_eq!(stat_to_modifier(9999), stat_to_modifier(100));
    }
}
